//! A sequencer session: the pattern, the effect settings, the scheduler and
//! the single current error, behind one imperative surface.
//!
//! Everything here runs on the control thread. The audio thread only sees
//! what the session publishes through the chain handle and the event sink.

use std::time::Instant;

use log::{error, info, warn};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    config::SessionConfig,
    engine::{
        clock::{FrameClock, OutputClock},
        device::OutputDevice,
        renderer::{connect, EventSender},
    },
    error::Error,
    graph::chain::ChainHandle,
    kernel::{DspKernel, SpectralKernel},
    params::EffectParameters,
    pattern::{Pattern, StepCount, TrackId},
    samples::SampleBank,
    scheduler::{PumpReport, Scheduler},
    voice::{VoiceSink, VoiceTrigger},
};

/// Rate used for the detached engine when no device could be opened.
const FALLBACK_SAMPLE_RATE: f32 = 44_100.0;

pub struct Session<K = SpectralKernel, C = FrameClock, S = EventSender> {
    pattern: Pattern,
    params: EffectParameters,
    scheduler: Scheduler<C, K, S>,
    chain: Option<ChainHandle>,
    error: Option<Error>,
    rng: StdRng,
}

impl Session {
    /// Load samples, open the default output device and build a session.
    ///
    /// Never fails outright: a missing device or sample is recorded as the
    /// session's current error, which keeps [`start`](Self::start) disabled.
    /// The device, when there is one, must be kept alive for playback.
    pub fn open(config: &SessionConfig) -> (Self, Option<OutputDevice>) {
        let params = config.effect_parameters();
        let (bank, sample_errors) = SampleBank::load(config);

        let (device, handle, init_error) = match OutputDevice::open(&params) {
            Ok((device, handle)) => (Some(device), handle, None),
            Err(err) => {
                error!("{err}");
                let (_detached, handle) = connect(FALLBACK_SAMPLE_RATE, &params);
                (None, handle, Some(err))
            }
        };

        let mut session = Session::with_parts(
            config,
            bank,
            SpectralKernel::new(),
            handle.clock,
            handle.sender,
            Some(handle.chain),
        )
        .with_rng(StdRng::from_os_rng());

        for err in sample_errors.into_iter().chain(init_error) {
            session.report_error(err);
        }

        (session, device)
    }
}

impl<K: DspKernel, C: OutputClock, S: VoiceSink> Session<K, C, S> {
    pub fn with_parts(
        config: &SessionConfig,
        bank: SampleBank,
        kernel: K,
        clock: C,
        sink: S,
        mut chain: Option<ChainHandle>,
    ) -> Self {
        let params = config.effect_parameters();
        if let Some(chain) = &mut chain {
            chain.apply(&params);
        }

        Self {
            pattern: Pattern::starter(config.initial_step_count()),
            params,
            scheduler: Scheduler::new(clock, VoiceTrigger::new(kernel, bank), sink, config.initial_bpm()),
            chain,
            error: None,
            rng: StdRng::seed_from_u64(0),
        }
    }

    /// Replace the randomizer's generator.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn params(&self) -> &EffectParameters {
        &self.params
    }

    pub fn bpm(&self) -> f64 {
        self.scheduler.bpm()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn current_step(&self) -> Option<usize> {
        self.scheduler.current_step()
    }

    pub fn scheduler(&self) -> &Scheduler<C, K, S> {
        &self.scheduler
    }

    pub fn sink(&self) -> &S {
        self.scheduler.sink()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        self.scheduler.sink_mut()
    }

    // Pattern surface

    pub fn toggle_step(&mut self, track: TrackId, step: usize) -> bool {
        self.pattern.toggle_step(track, step)
    }

    pub fn set_swing(&mut self, track: TrackId, amount: f32) {
        self.pattern.set_swing(track, amount);
    }

    pub fn randomize(&mut self, track: TrackId) {
        self.pattern.randomize(track, &mut self.rng);
    }

    /// Resize the grid. A running transport is stopped first.
    pub fn set_step_count(&mut self, step_count: StepCount) {
        if step_count == self.pattern.step_count() {
            return;
        }
        self.stop();
        self.pattern.set_step_count(step_count);
        info!("step count set to {}", step_count.steps());
    }

    pub fn toggle_step_count(&mut self) {
        self.set_step_count(self.pattern.step_count().toggled());
    }

    // Transport surface

    /// Whether [`start`](Self::start) would do anything.
    pub fn can_start(&self) -> bool {
        !self.is_running()
            && self.scheduler.trigger().bank().is_complete()
            && !self.error.as_ref().is_some_and(Error::blocks_start)
    }

    /// Start from step 0. A no-op while running or while a blocking error
    /// is present.
    pub fn start(&mut self, now: Instant) -> bool {
        if !self.can_start() {
            return false;
        }
        match self.scheduler.start(&self.pattern, &self.params, now) {
            Some(report) => {
                self.absorb(report);
                true
            }
            None => false,
        }
    }

    /// Stop scheduling. A no-op while stopped.
    pub fn stop(&mut self) -> bool {
        self.scheduler.stop()
    }

    pub fn toggle_transport(&mut self, now: Instant) -> bool {
        if self.is_running() {
            self.stop()
        } else {
            self.start(now)
        }
    }

    /// Run a pass if the wake-up is due. Returns whether one ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.scheduler.poll(&self.pattern, &self.params, now) {
            Some(report) => {
                self.absorb(report);
                true
            }
            None => false,
        }
    }

    pub fn next_wake(&self) -> Option<Instant> {
        self.scheduler.next_wake()
    }

    /// Run a pass now regardless of the wake-up timer.
    pub fn pump(&mut self) -> usize {
        let report = self.scheduler.pump(&self.pattern, &self.params);
        let steps = report.steps;
        self.absorb(report);
        steps
    }

    fn absorb(&mut self, report: PumpReport) {
        if let Some(err) = report.errors.into_iter().last() {
            self.report_error(err);
        }
    }

    // Effect surface

    fn update_params(&mut self, change: impl FnOnce(&mut EffectParameters)) {
        change(&mut self.params);
        if let Some(chain) = &mut self.chain {
            chain.apply(&self.params);
        }
    }

    pub fn set_cutoff(&mut self, hz: f32) {
        self.update_params(|p| p.set_cutoff_hz(hz));
    }

    pub fn set_distortion_amount(&mut self, amount: f32) {
        self.update_params(|p| p.set_distortion_amount(amount));
    }

    pub fn set_distortion_enabled(&mut self, enabled: bool) {
        self.update_params(|p| p.set_distortion_enabled(enabled));
    }

    pub fn set_compression_amount(&mut self, amount: f32) {
        self.update_params(|p| p.set_compression_amount(amount));
    }

    pub fn set_compression_enabled(&mut self, enabled: bool) {
        self.update_params(|p| p.set_compression_enabled(enabled));
    }

    pub fn set_reverb_enabled(&mut self, enabled: bool) {
        self.update_params(|p| p.set_reverb_enabled(enabled));
    }

    pub fn set_master_gain(&mut self, gain: f32) {
        self.update_params(|p| p.set_master_gain(gain));
    }

    pub fn set_velocity(&mut self, velocity: f32) {
        self.update_params(|p| p.set_velocity(velocity));
    }

    pub fn set_tempo(&mut self, bpm: f64) {
        self.scheduler.set_tempo(bpm);
    }

    // Errors

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Make `err` the current error.
    ///
    /// A start-blocking error is never replaced by one that does not block.
    pub fn report_error(&mut self, err: Error) {
        if self.error.as_ref().is_some_and(Error::blocks_start) && !err.blocks_start() {
            warn!("{err}");
            return;
        }
        self.error = Some(err);
    }

    /// Clear the current error unless it blocks starting.
    pub fn dismiss_error(&mut self) -> bool {
        if self.error.as_ref().is_some_and(|e| !e.blocks_start()) {
            self.error = None;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::clock::ManualClock,
        kernel::{KernelError, KernelParams},
        samples::synthesize,
        voice::ScheduledEvent,
    };

    type Kernel = fn(&[f32], f32, &KernelParams) -> Result<Vec<f32>, KernelError>;

    fn copy(input: &[f32], _: f32, _: &KernelParams) -> Result<Vec<f32>, KernelError> {
        Ok(input.to_vec())
    }

    fn session(bank: SampleBank) -> (Session<Kernel, ManualClock, Vec<ScheduledEvent>>, ManualClock) {
        let clock = ManualClock::new(0.0);
        let session = Session::with_parts(
            &SessionConfig::new(),
            bank,
            copy as Kernel,
            clock.clone(),
            Vec::new(),
            None,
        );
        (session, clock)
    }

    #[test]
    fn test_start_blocked_by_missing_sample() {
        let mut bank = SampleBank::new();
        bank.insert(TrackId::Kick, synthesize(TrackId::Kick, 44_100));
        bank.insert(TrackId::HiHat, synthesize(TrackId::HiHat, 44_100));
        let (mut s, _) = session(bank);
        s.report_error(Error::SampleDecode {
            track: TrackId::Snare,
            reason: "bad header".into(),
        });

        assert!(!s.can_start());
        assert!(!s.start(Instant::now()));
        assert!(!s.dismiss_error());
        assert!(!s.is_running());
    }

    #[test]
    fn test_blocking_error_is_sticky() {
        let (mut s, _) = session(SampleBank::synthesized());
        s.report_error(Error::Initialization("no device".into()));
        s.report_error(Error::Kernel {
            track: TrackId::Kick,
            source: KernelError::EmptyInput,
        });
        assert!(matches!(s.error(), Some(Error::Initialization(_))));
        assert!(!s.start(Instant::now()));
    }

    #[test]
    fn test_non_blocking_error_can_be_dismissed() {
        let (mut s, _) = session(SampleBank::synthesized());
        s.report_error(Error::Kernel {
            track: TrackId::Kick,
            source: KernelError::EmptyInput,
        });
        assert!(s.can_start());
        assert!(s.dismiss_error());
        assert!(s.error().is_none());
    }

    #[test]
    fn test_step_count_change_stops_transport() {
        let (mut s, _) = session(SampleBank::synthesized());
        assert!(s.start(Instant::now()));

        s.set_step_count(StepCount::Eight);

        assert!(!s.is_running());
        assert!(s.pattern().tracks().iter().all(|t| t.steps().len() == 8));
        assert!(s.start(Instant::now()));
        assert_eq!(s.scheduler().next_step(), Some(1));
    }

    #[test]
    fn test_randomize_uses_session_rng() {
        let (a, _) = session(SampleBank::synthesized());
        let (b, _) = session(SampleBank::synthesized());
        let mut a = a.with_rng(StdRng::seed_from_u64(7));
        let mut b = b.with_rng(StdRng::seed_from_u64(7));

        a.randomize(TrackId::Snare);
        b.randomize(TrackId::Snare);

        assert_eq!(a.pattern(), b.pattern());
        assert!(a.pattern().track(TrackId::Snare).active_count() > 0);
    }

    #[test]
    fn test_effect_setters_reach_chain() {
        let (_chain, handle) = crate::graph::SignalChain::new(48_000.0, &EffectParameters::default());
        let mut s = Session::with_parts(
            &SessionConfig::new(),
            SampleBank::synthesized(),
            copy as Kernel,
            ManualClock::new(0.0),
            Vec::<ScheduledEvent>::new(),
            Some(handle.clone()),
        );

        s.set_cutoff(1_200.0);
        assert_eq!(handle.cutoff_hz(), 1_200.0);
        s.set_cutoff(5.0);
        assert_eq!(handle.cutoff_hz(), 20.0);
    }

    #[test]
    fn test_kernel_failure_is_reported_but_transport_keeps_running() {
        let failing: Kernel = |_, _, _| Err(KernelError::EmptyInput);
        let mut s = Session::with_parts(
            &SessionConfig::new(),
            SampleBank::synthesized(),
            failing,
            ManualClock::new(0.0),
            Vec::<ScheduledEvent>::new(),
            None,
        );

        assert!(s.start(Instant::now()));
        assert!(s.is_running());
        assert!(matches!(s.error(), Some(Error::Kernel { .. })));
        assert!(s.sink().is_empty());
    }
}
