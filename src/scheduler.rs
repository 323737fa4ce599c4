/*
Look-Ahead Scheduler
====================

The control thread cannot wake up on time: timers fire late, the UI blocks,
the OS preempts. The audio clock, on the other hand, is exact. So the
scheduler never plays anything "now". It wakes every TICK, looks LOOKAHEAD
seconds into the future on the output clock, and hands every step that falls
inside that window to the renderer with an absolute start time.

    output clock ──────────────────────────────────────────────────►
                   now          now + LOOKAHEAD
                    │◄──── window ────►│
    steps:     ·    ·   ●    ●    ●    │  ○    ○
                        └ scheduled ┘     └ next pass

As long as TICK < LOOKAHEAD, a wake-up can be late by up to the difference
without anything sounding late.

Timing
------

Step times are computed from an anchor instead of summed one interval at a
time:

    time(n)  = anchor + n * interval + shift(n)

where shift(n) is the sum of the swing offsets of the odd steps scheduled
before step n. A swung step lands on its own slot and pushes every step
after it; the swing offset is carried forward, never pulled back. Rounding
never piles up and a late pass schedules exactly the same times as an
on-time one. A tempo change re-anchors at the next unscheduled step.
*/

use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use log::{info, trace, warn};

use crate::{
    engine::clock::OutputClock,
    error::Error,
    humanize::{step_interval, seconds_per_beat, timing_offset, velocity_multiplier, voice_gain},
    kernel::DspKernel,
    params::EffectParameters,
    pattern::Pattern,
    voice::{VoiceSink, VoiceTrigger},
};

/// How far ahead of the output clock steps are scheduled, in seconds.
pub const LOOKAHEAD: f64 = 0.1;
/// Wake-up period of the pump.
pub const TICK: Duration = Duration::from_millis(25);

pub const MIN_BPM: f64 = 60.0;
pub const MAX_BPM: f64 = 200.0;
pub const DEFAULT_BPM: f64 = 120.0;

/// Scheduled (time, step) pairs kept for the playhead.
const HISTORY_LEN: usize = 64;

#[derive(Debug, Clone, Copy)]
struct Transport {
    /// Next step to schedule.
    step: usize,
    anchor: f64,
    /// Steps scheduled since `anchor`.
    count: u64,
    interval: f64,
    /// Swing offsets carried from odd steps scheduled since `anchor`.
    shift: f64,
}

impl Transport {
    fn next_time(&self) -> f64 {
        self.anchor + self.count as f64 * self.interval + self.shift
    }

    fn rebase(&mut self, interval: f64) {
        if interval != self.interval {
            self.anchor = self.next_time();
            self.count = 0;
            self.interval = interval;
            self.shift = 0.0;
        }
    }
}

/// Outcome of one scheduling pass
#[derive(Debug, Default)]
pub struct PumpReport {
    /// Steps moved past.
    pub steps: usize,
    /// Voices handed to the sink.
    pub voices: usize,
    /// Kernel failures; those voices were skipped.
    pub errors: Vec<Error>,
}

pub struct Scheduler<C, K, S> {
    clock: C,
    trigger: VoiceTrigger<K>,
    sink: S,
    bpm: f64,
    transport: Option<Transport>,
    wake: Option<Instant>,
    history: VecDeque<(f64, usize)>,
}

impl<C: OutputClock, K: DspKernel, S: VoiceSink> Scheduler<C, K, S> {
    pub fn new(clock: C, trigger: VoiceTrigger<K>, sink: S, bpm: f64) -> Self {
        let mut scheduler = Self {
            clock,
            trigger,
            sink,
            bpm: DEFAULT_BPM,
            transport: None,
            wake: None,
            history: VecDeque::with_capacity(HISTORY_LEN),
        };
        scheduler.set_tempo(bpm);
        scheduler
    }

    pub fn is_running(&self) -> bool {
        self.transport.is_some()
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Clamp to [60, 200] BPM. Takes effect from the next unscheduled step.
    pub fn set_tempo(&mut self, bpm: f64) {
        if !bpm.is_nan() {
            self.bpm = bpm.clamp(MIN_BPM, MAX_BPM);
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn trigger(&self) -> &VoiceTrigger<K> {
        &self.trigger
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Start from step 0 at the current output time and run a first pass.
    ///
    /// Returns `None` if already running.
    pub fn start(&mut self, pattern: &Pattern, params: &EffectParameters, now: Instant) -> Option<PumpReport> {
        if self.is_running() {
            return None;
        }

        let start = self.clock.now();
        self.transport = Some(Transport {
            step: 0,
            anchor: start,
            count: 0,
            interval: step_interval(self.bpm, pattern.step_count().steps_per_beat()),
            shift: 0.0,
        });
        self.history.clear();
        info!("transport started at {start:.3}s, {} BPM", self.bpm);

        let report = self.pump(pattern, params);
        self.wake = Some(now + TICK);
        Some(report)
    }

    /// Cancel the pending wake-up. Voices already handed over play out.
    ///
    /// Returns `false` if not running.
    pub fn stop(&mut self) -> bool {
        if self.transport.take().is_none() {
            return false;
        }
        self.wake = None;
        self.history.clear();
        info!("transport stopped at {:.3}s", self.clock.now());
        true
    }

    /// When the next pass is due.
    pub fn next_wake(&self) -> Option<Instant> {
        self.wake
    }

    /// Run a pass if the wake-up is due, then re-arm it.
    pub fn poll(&mut self, pattern: &Pattern, params: &EffectParameters, now: Instant) -> Option<PumpReport> {
        match self.wake {
            Some(wake) if now >= wake => {
                let report = self.pump(pattern, params);
                self.wake = Some(now + TICK);
                Some(report)
            }
            _ => None,
        }
    }

    /// Schedule every step that starts before `clock.now() + LOOKAHEAD`.
    pub fn pump(&mut self, pattern: &Pattern, params: &EffectParameters) -> PumpReport {
        let mut report = PumpReport::default();
        let Some(mut transport) = self.transport else {
            return report;
        };

        let horizon = self.clock.now() + LOOKAHEAD;
        let steps = pattern.step_count().steps();
        let steps_per_beat = pattern.step_count().steps_per_beat();
        let spb = seconds_per_beat(self.bpm);
        let avg_swing = pattern.average_swing();
        let kernel_params = params.kernel_params();

        transport.rebase(step_interval(self.bpm, steps_per_beat));
        transport.step %= steps;

        loop {
            let step = transport.step;
            let time = transport.next_time();
            if time >= horizon {
                break;
            }

            for track in pattern.active_at(step) {
                let gain = voice_gain(params.velocity(), velocity_multiplier(step, track.swing()));
                match self
                    .trigger
                    .trigger(track.id(), time, gain, &kernel_params, &mut self.sink)
                {
                    Ok(true) => report.voices += 1,
                    Ok(false) => {}
                    Err(err) => {
                        warn!("skipped voice: {err}");
                        report.errors.push(err);
                    }
                }
            }

            if self.history.len() == HISTORY_LEN {
                self.history.pop_front();
            }
            self.history.push_back((time, step));

            transport.shift += timing_offset(step, avg_swing, spb, steps_per_beat);
            transport.step = (step + 1) % steps;
            transport.count += 1;
            report.steps += 1;
        }

        trace!(
            "pass up to {horizon:.3}s: {} steps, {} voices, next step {}",
            report.steps,
            report.voices,
            transport.step
        );

        self.transport = Some(transport);
        report
    }

    /// Step sounding now on the output clock, if any has started yet.
    pub fn current_step(&self) -> Option<usize> {
        let now = self.clock.now();
        self.history
            .iter()
            .rev()
            .find(|(time, _)| *time <= now)
            .map(|&(_, step)| step)
    }

    /// Next step the scheduler will hand out.
    pub fn next_step(&self) -> Option<usize> {
        self.transport.map(|t| t.step)
    }
}
