/*
Pattern Store
=============

A pattern is a fixed set of drum tracks over a shared step grid. Each track
has one on/off flag per step and its own swing amount.

    step:    0 1 2 3 4 5 6 7 8 9 ...
    kick   [x . . . x . . . x . ...]
    snare  [. . x . . . x . . . ...]
    hihat  [x x x x x x x x x x ...]

Every track always has exactly `step_count` flags. Changing the step count
resizes all tracks together; nothing else can change a track's length.

All mutations validate at the boundary: out-of-range steps are ignored and
swing is clamped, so the scheduler never sees a malformed grid.
*/

use std::fmt;

use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const TRACK_COUNT: usize = 3;

/// Probability threshold for a randomized step: active when `draw > 0.7`.
const RANDOM_ACTIVE_THRESHOLD: f64 = 0.7;

pub const MIN_SWING: f32 = 0.0;
pub const MAX_SWING: f32 = 100.0;
/// Straight timing.
pub const DEFAULT_SWING: f32 = 50.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackId {
    Kick,
    Snare,
    HiHat,
}

impl TrackId {
    pub const ALL: [TrackId; TRACK_COUNT] = [TrackId::Kick, TrackId::Snare, TrackId::HiHat];

    pub fn index(self) -> usize {
        match self {
            TrackId::Kick => 0,
            TrackId::Snare => 1,
            TrackId::HiHat => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            TrackId::Kick => "kick",
            TrackId::Snare => "snare",
            TrackId::HiHat => "hihat",
        }
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Note division of the grid
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepCount {
    /// 8 steps, one per beat
    Eight,
    /// 16 steps, two per beat
    Sixteen,
}

impl StepCount {
    pub fn steps(self) -> usize {
        match self {
            StepCount::Eight => 8,
            StepCount::Sixteen => 16,
        }
    }

    pub fn steps_per_beat(self) -> u32 {
        match self {
            StepCount::Eight => 1,
            StepCount::Sixteen => 2,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            StepCount::Eight => StepCount::Sixteen,
            StepCount::Sixteen => StepCount::Eight,
        }
    }

    pub fn from_steps(steps: usize) -> Option<Self> {
        match steps {
            8 => Some(StepCount::Eight),
            16 => Some(StepCount::Sixteen),
            _ => None,
        }
    }
}

/// One drum's row of the grid
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    id: TrackId,
    steps: Vec<bool>,
    swing: f32,
}

impl Track {
    fn empty(id: TrackId, len: usize) -> Self {
        Self {
            id,
            steps: vec![false; len],
            swing: DEFAULT_SWING,
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn steps(&self) -> &[bool] {
        &self.steps
    }

    pub fn is_active(&self, step: usize) -> bool {
        self.steps.get(step).copied().unwrap_or(false)
    }

    pub fn swing(&self) -> f32 {
        self.swing
    }

    pub fn active_count(&self) -> usize {
        self.steps.iter().filter(|&&s| s).count()
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    step_count: StepCount,
    tracks: [Track; TRACK_COUNT],
}

impl Pattern {
    /// An all-silent pattern.
    pub fn empty(step_count: StepCount) -> Self {
        Self {
            step_count,
            tracks: TrackId::ALL.map(|id| Track::empty(id, step_count.steps())),
        }
    }

    /// Four-on-the-floor starter groove: kick on every beat, snare on the
    /// off-beats, hihat on every step.
    pub fn starter(step_count: StepCount) -> Self {
        let mut pattern = Self::empty(step_count);
        for step in 0..step_count.steps() {
            pattern.tracks[TrackId::Kick.index()].steps[step] = step % 4 == 0;
            pattern.tracks[TrackId::Snare.index()].steps[step] = step % 4 == 2;
            pattern.tracks[TrackId::HiHat.index()].steps[step] = true;
        }
        pattern
    }

    pub fn step_count(&self) -> StepCount {
        self.step_count
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track(&self, id: TrackId) -> &Track {
        &self.tracks[id.index()]
    }

    /// Flip one step. Out-of-range steps are ignored; returns whether
    /// anything changed.
    pub fn toggle_step(&mut self, track: TrackId, step: usize) -> bool {
        match self.tracks[track.index()].steps.get_mut(step) {
            Some(flag) => {
                *flag = !*flag;
                true
            }
            None => false,
        }
    }

    /// Set a track's swing, clamped to [0, 100]. NaN is ignored.
    pub fn set_swing(&mut self, track: TrackId, amount: f32) {
        if amount.is_nan() {
            return;
        }
        self.tracks[track.index()].swing = amount.clamp(MIN_SWING, MAX_SWING);
    }

    /// Mean swing across all tracks; drives swing timing for every track.
    pub fn average_swing(&self) -> f32 {
        self.tracks.iter().map(|t| t.swing).sum::<f32>() / TRACK_COUNT as f32
    }

    /// Replace a track with a random sequence, roughly 30% dense.
    ///
    /// If every draw comes up inactive, one uniformly chosen step is forced
    /// on, so a randomized track is never silent.
    pub fn randomize<R: Rng + ?Sized>(&mut self, track: TrackId, rng: &mut R) {
        let len = self.step_count.steps();
        let steps = &mut self.tracks[track.index()].steps;

        for flag in steps.iter_mut() {
            *flag = rng.random::<f64>() > RANDOM_ACTIVE_THRESHOLD;
        }

        if !steps.iter().any(|&s| s) {
            steps[rng.random_range(0..len)] = true;
        }
    }

    /// Resize every track, keeping flags that still fit. New steps start off.
    pub fn set_step_count(&mut self, step_count: StepCount) {
        let len = step_count.steps();
        for track in &mut self.tracks {
            track.steps.resize(len, false);
        }
        self.step_count = step_count;
    }

    /// Tracks with an active flag at `step`.
    pub fn active_at(&self, step: usize) -> impl Iterator<Item = &Track> + '_ {
        self.tracks.iter().filter(move |t| t.is_active(step))
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::starter(StepCount::Sixteen)
    }
}
