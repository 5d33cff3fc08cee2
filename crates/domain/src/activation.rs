use std::collections::BTreeMap;

use crate::{BodyRegion, Exercise, ExerciseCache, Stimulus, Workout};

/// Summed muscle stimulus per body region of a set of exercises.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MuscleActivation {
    stimulus: BTreeMap<BodyRegion, Stimulus>,
    exercise_count: u32,
}

impl MuscleActivation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_exercises<'a>(exercises: impl IntoIterator<Item = &'a Exercise>) -> Self {
        let mut activation = Self::new();
        for exercise in exercises {
            activation.add(exercise);
        }
        activation
    }

    /// Activation of all exercises of a workout, each exercise counted once per entry.
    ///
    /// Exercises missing from the cache are skipped.
    #[must_use]
    pub fn from_workout(workout: &Workout, exercises: &ExerciseCache) -> Self {
        Self::from_exercises(
            workout
                .entries
                .iter()
                .flat_map(|entry| &entry.exercises)
                .filter_map(|config| exercises.get(config.exercise_id)),
        )
    }

    /// Adds the contribution of an exercise.
    ///
    /// Muscles of the same exercise that belong to the same region contribute only once with
    /// the highest stimulus.
    pub fn add(&mut self, exercise: &Exercise) {
        let mut contribution: BTreeMap<BodyRegion, Stimulus> = BTreeMap::new();
        for (muscle, stimulus) in exercise.muscle_stimulus() {
            let entry = contribution.entry(muscle.region()).or_insert(Stimulus::NONE);
            if stimulus > *entry {
                *entry = stimulus;
            }
        }
        for (region, stimulus) in contribution {
            *self.stimulus.entry(region).or_insert(Stimulus::NONE) += stimulus;
        }
        self.exercise_count += 1;
    }

    #[must_use]
    pub fn exercise_count(&self) -> u32 {
        self.exercise_count
    }

    #[must_use]
    pub fn stimulus(&self, region: BodyRegion) -> Stimulus {
        self.stimulus.get(&region).copied().unwrap_or(Stimulus::NONE)
    }

    /// Stimulus relative to the maximum possible stimulus, in [0, 1].
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn level(&self, region: BodyRegion) -> f32 {
        if self.exercise_count == 0 {
            return 0.0;
        }
        let max = *Stimulus::PRIMARY * self.exercise_count;
        (*self.stimulus(region) as f32 / max as f32).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn tier(&self, region: BodyRegion) -> Tier {
        Tier::from_level(self.level(region))
    }

    /// Tier of every body region.
    #[must_use]
    pub fn heat_map(&self) -> BTreeMap<BodyRegion, Tier> {
        BodyRegion::iter()
            .map(|region| (*region, self.tier(*region)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    None,
    Low,
    Medium,
    High,
}

impl Tier {
    pub const LOW_LIMIT: f32 = 1.0 / 3.0;
    pub const HIGH_LIMIT: f32 = 2.0 / 3.0;

    #[must_use]
    pub fn from_level(level: f32) -> Tier {
        if level <= 0.0 {
            Tier::None
        } else if level < Self::LOW_LIMIT {
            Tier::Low
        } else if level < Self::HIGH_LIMIT {
            Tier::Medium
        } else {
            Tier::High
        }
    }

    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Tier::None => "#d1d5db",
            Tier::Low => "#fde047",
            Tier::Medium => "#f97316",
            Tier::High => "#dc2626",
        }
    }
}
