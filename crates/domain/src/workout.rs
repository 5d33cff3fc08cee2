use std::{collections::BTreeSet, fmt, ops::Mul};

use chrono::Duration;
use derive_more::{Deref, Display, Into};
use uuid::Uuid;

use crate::{CompletedWorkout, ExerciseID, Name, ReadError, WriteError};

pub trait WorkoutHistoryRepository {
    fn read_workout_history(&self) -> Result<Vec<CompletedWorkout>, ReadError>;
    fn append_workout_history(&self, workout: CompletedWorkout) -> Result<(), WriteError>;
}

pub trait WorkoutHistoryService {
    /// Completed workouts, most recent first.
    fn get_history(&self) -> Result<Vec<CompletedWorkout>, ReadError>;
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Workout {
    pub id: WorkoutID,
    pub name: Name,
    pub entries: Vec<WorkoutEntry>,
}

impl Workout {
    /// Assumed duration of a single repetition.
    pub const SECONDS_PER_REP: u32 = 3;

    #[must_use]
    pub fn new(id: WorkoutID, name: Name) -> Self {
        Self {
            id,
            name,
            entries: vec![],
        }
    }

    pub fn add_entry(&mut self, entry: WorkoutEntry) -> Result<(), WorkoutError> {
        if self.entry(entry.id).is_some() {
            return Err(WorkoutError::DuplicateEntry(entry.id));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn remove_entry(&mut self, id: GroupID) -> Option<WorkoutEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    /// Moves an entry to the given position. Positions beyond the end move the entry to the end.
    ///
    /// Returns `false` if the workout contains no entry with the given ID.
    pub fn move_entry(&mut self, id: GroupID, position: usize) -> bool {
        let Some(entry) = self.remove_entry(id) else {
            return false;
        };
        let position = position.min(self.entries.len());
        self.entries.insert(position, entry);
        true
    }

    #[must_use]
    pub fn entry(&self, id: GroupID) -> Option<&WorkoutEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Distinct exercises in order of first occurrence.
    #[must_use]
    pub fn exercises(&self) -> Vec<ExerciseID> {
        let mut seen = BTreeSet::new();
        self.entries
            .iter()
            .flat_map(|e| &e.exercises)
            .map(|c| c.exercise_id)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    #[must_use]
    pub fn num_sets(&self) -> u32 {
        self.entries.iter().map(|e| e.sets).sum()
    }

    #[must_use]
    pub fn estimated_duration(&self) -> Duration {
        Duration::seconds(self.entries.iter().map(WorkoutEntry::estimated_seconds).sum())
    }
}

#[derive(
    Deref,
    Debug,
    Display,
    Default,
    Clone,
    Copy,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct WorkoutID(Uuid);

impl WorkoutID {
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for WorkoutID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for WorkoutID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

/// Identifies a workout entry and the group log of a session that was started from it.
#[derive(
    Deref,
    Debug,
    Display,
    Default,
    Clone,
    Copy,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct GroupID(Uuid);

impl GroupID {
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for GroupID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for GroupID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EntryKind {
    Single,
    Superset,
    Circuit,
}

impl EntryKind {
    #[must_use]
    pub fn min_exercises(self) -> usize {
        match self {
            EntryKind::Single => 1,
            EntryKind::Superset => 2,
            EntryKind::Circuit => 3,
        }
    }

    #[must_use]
    pub fn max_exercises(self) -> usize {
        match self {
            EntryKind::Single => 1,
            EntryKind::Superset => 3,
            EntryKind::Circuit => 10,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            EntryKind::Single => "Single",
            EntryKind::Superset => "Superset",
            EntryKind::Circuit => "Circuit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExerciseConfig {
    pub exercise_id: ExerciseID,
    pub reps: Reps,
    pub weight: Option<Weight>,
    pub rest: Time,
    pub notes: String,
}

/// A single exercise, superset or circuit with its number of sets or rounds.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WorkoutEntry {
    pub id: GroupID,
    pub kind: EntryKind,
    pub exercises: Vec<ExerciseConfig>,
    pub sets: u32,
    pub rpe: Option<RPE>,
}

impl WorkoutEntry {
    pub const MAX_SETS: u32 = 99;

    pub fn new(
        id: GroupID,
        kind: EntryKind,
        exercises: Vec<ExerciseConfig>,
        sets: u32,
        rpe: Option<RPE>,
    ) -> Result<Self, WorkoutEntryError> {
        let count = exercises.len();
        if !(kind.min_exercises()..=kind.max_exercises()).contains(&count) {
            return Err(WorkoutEntryError::ExerciseCount { kind, count });
        }

        let mut seen = BTreeSet::new();
        if let Some(duplicate) = exercises.iter().find(|c| !seen.insert(c.exercise_id)) {
            return Err(WorkoutEntryError::DuplicateExercise(duplicate.exercise_id));
        }

        if !(1..=Self::MAX_SETS).contains(&sets) {
            return Err(WorkoutEntryError::SetCount(sets));
        }

        Ok(Self {
            id,
            kind,
            exercises,
            sets,
            rpe,
        })
    }

    /// Work time of all exercises plus the longest rest of the group, for each set.
    #[must_use]
    pub fn estimated_seconds(&self) -> i64 {
        let work: u32 = self
            .exercises
            .iter()
            .map(|c| u32::from(c.reps) * Workout::SECONDS_PER_REP)
            .sum();
        let rest = self
            .exercises
            .iter()
            .map(|c| u32::from(c.rest))
            .max()
            .unwrap_or_default();
        i64::from(self.sets) * i64::from(work + rest)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WorkoutError {
    #[error("Entry {0} is already part of the workout")]
    DuplicateEntry(GroupID),
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WorkoutEntryError {
    #[error(
        "{} requires {} to {} exercises ({count} given)",
        .kind.name(),
        .kind.min_exercises(),
        .kind.max_exercises()
    )]
    ExerciseCount { kind: EntryKind, count: usize },
    #[error("Exercise {0} must not occur more than once in a group")]
    DuplicateExercise(ExerciseID),
    #[error("Number of sets must be in the range 1 to 99 ({0} given)")]
    SetCount(u32),
}

#[derive(
    Debug,
    Display,
    Clone,
    Copy,
    Into,
    PartialEq,
    PartialOrd,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct Reps(u32);

impl Reps {
    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(1..1000).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl Default for Reps {
    fn default() -> Self {
        Self(1)
    }
}

impl TryFrom<u32> for Reps {
    type Error = RepsError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Reps::new(value)
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

impl Mul<Weight> for Reps {
    type Output = f32;

    #[allow(clippy::cast_precision_loss)]
    fn mul(self, rhs: Weight) -> Self::Output {
        self.0 as f32 * rhs.0
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 1 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

#[derive(
    Debug,
    Default,
    Display,
    Clone,
    Copy,
    Into,
    PartialEq,
    PartialOrd,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct Time(u32);

impl Time {
    pub fn new(value: u32) -> Result<Self, TimeError> {
        if !(0..1000).contains(&value) {
            return Err(TimeError::OutOfRange);
        }

        Ok(Self(value))
    }
}

impl TryFrom<u32> for Time {
    type Error = TimeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Time::new(value)
    }
}

impl TryFrom<&str> for Time {
    type Error = TimeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Time::new(parsed_value),
            Err(_) => Err(TimeError::ParseError),
        }
    }
}

impl From<Time> for i64 {
    fn from(value: Time) -> Self {
        i64::from(value.0)
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TimeError {
    #[error("Time must be in the range 0 to 999 s")]
    OutOfRange,
    #[error("Time must be an integer")]
    ParseError,
}

#[derive(
    Debug,
    Default,
    Display,
    Clone,
    Copy,
    Into,
    PartialEq,
    PartialOrd,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(try_from = "f32", into = "f32")]
pub struct Weight(f32);

impl Weight {
    pub fn new(value: f32) -> Result<Self, WeightError> {
        if !(0.0..1000.0).contains(&value) {
            return Err(WeightError::OutOfRange);
        }

        let tenths = value * 10.0;
        if (tenths - tenths.round()).abs() > 1e-3 {
            return Err(WeightError::InvalidResolution);
        }

        Ok(Self(value))
    }
}

impl TryFrom<f32> for Weight {
    type Error = WeightError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Weight::new(value)
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<f32>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must be in the range 0.0 to 999.9 kg")]
    OutOfRange,
    #[error("Weight must be a multiple of 0.1 kg")]
    InvalidResolution,
    #[error("Weight must be a decimal")]
    ParseError,
}

/// Rate of perceived exertion, stored in tenths.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "f32", into = "f32")]
pub struct RPE(u8);

impl RPE {
    pub const SIX: RPE = RPE(60);
    pub const SEVEN: RPE = RPE(70);
    pub const EIGHT: RPE = RPE(80);
    pub const NINE: RPE = RPE(90);
    pub const TEN: RPE = RPE(100);

    pub fn new(value: f32) -> Result<Self, RPEError> {
        if !(6.0..=10.0).contains(&value) {
            return Err(RPEError::OutOfRange);
        }

        let tenths = value * 10.0;
        if (tenths - tenths.round()).abs() > 1e-3 {
            return Err(RPEError::InvalidResolution);
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let v = tenths.round() as u8;

        if v % 5 != 0 {
            return Err(RPEError::InvalidResolution);
        }

        Ok(Self(v))
    }

    /// All valid values in ascending order.
    pub fn values() -> impl Iterator<Item = RPE> {
        (60..=100).step_by(5).map(RPE)
    }
}

impl From<RPE> for f32 {
    fn from(value: RPE) -> Self {
        f32::from(value.0) / 10.0
    }
}

impl TryFrom<f32> for RPE {
    type Error = RPEError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        RPE::new(value)
    }
}

impl TryFrom<&str> for RPE {
    type Error = RPEError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<f32>() {
            Ok(parsed_value) => RPE::new(parsed_value),
            Err(_) => Err(RPEError::ParseError),
        }
    }
}

impl fmt::Display for RPE {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", f32::from(*self))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RPEError {
    #[error("RPE must be in the range 6.0 to 10.0")]
    OutOfRange,
    #[error("RPE must be a multiple of 0.5")]
    InvalidResolution,
    #[error("RPE must be a decimal")]
    ParseError,
}
