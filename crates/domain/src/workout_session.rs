use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Duration, Utc};
use derive_more::{Deref, Display};
use uuid::Uuid;

use crate::{
    DeleteError, EntryKind, ExerciseID, GroupID, Name, RPE, ReadError, Reps, Weight, Workout,
    WorkoutEntry, WorkoutID, WriteError,
};

/// Storage of the single workout session that can be continued later.
pub trait WorkoutSessionRepository {
    fn read_workout_session(&self) -> Result<Option<WorkoutSessionState>, ReadError>;
    fn write_workout_session(&self, session: &WorkoutSessionState) -> Result<(), WriteError>;
    fn delete_workout_session(&self) -> Result<(), DeleteError>;
}

pub trait WorkoutSessionService {
    /// Persists the session so that it survives a reload.
    fn save_session(&self, session: &WorkoutSessionState) -> Result<(), WriteError>;
    /// Closes the session, keeping it for later if it is paused and discarding it otherwise.
    fn close_session(
        &self,
        session: &mut WorkoutSessionState,
        now: DateTime<Utc>,
    ) -> Result<SessionStatus, WorkoutSessionError>;
    /// Continues the saved session, if there is one.
    fn resume_session(&self, now: DateTime<Utc>) -> Option<WorkoutSessionState>;
    /// Completes the session and adds it to the workout history.
    fn finish_session(
        &self,
        session: &mut WorkoutSessionState,
        now: DateTime<Utc>,
    ) -> Result<CompletedWorkout, WorkoutSessionError>;
    fn discard_session(&self) -> Result<(), DeleteError>;
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WorkoutSessionState {
    pub id: SessionID,
    pub workout_id: WorkoutID,
    pub workout_name: Name,
    pub started: DateTime<Utc>,
    status: SessionStatus,
    active_since: Option<DateTime<Utc>>,
    accumulated_ms: i64,
    group_order: Vec<GroupID>,
    groups: BTreeMap<GroupID, GroupSessionLog>,
}

impl WorkoutSessionState {
    /// Starts a session with the sets of all workout entries pre-filled from their configuration.
    pub fn start(
        id: SessionID,
        workout: &Workout,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if workout.entries.is_empty() {
            return Err(SessionError::EmptyWorkout);
        }
        let mut groups = BTreeMap::new();
        for entry in &workout.entries {
            if groups.insert(entry.id, GroupSessionLog::from(entry)).is_some() {
                return Err(SessionError::DuplicateGroup(entry.id));
            }
        }

        Ok(Self {
            id,
            workout_id: workout.id,
            workout_name: workout.name.clone(),
            started: now,
            status: SessionStatus::Active,
            active_since: Some(now),
            accumulated_ms: 0,
            group_order: workout.entries.iter().map(|e| e.id).collect(),
            groups,
        })
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Groups in workout order.
    pub fn groups(&self) -> impl Iterator<Item = (GroupID, &GroupSessionLog)> {
        self.group_order
            .iter()
            .filter_map(|id| self.groups.get(id).map(|g| (*id, g)))
    }

    #[must_use]
    pub fn group(&self, id: GroupID) -> Option<&GroupSessionLog> {
        self.groups.get(&id)
    }

    #[must_use]
    pub fn completed_sets(&self) -> usize {
        self.groups.values().map(GroupSessionLog::completed_sets).sum()
    }

    #[must_use]
    pub fn total_sets(&self) -> usize {
        self.groups.values().map(|g| g.sets.len()).sum()
    }

    /// Active time, excluding paused periods.
    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        let running = self
            .active_since
            .map_or_else(Duration::zero, |since| (now - since).max(Duration::zero()));
        Duration::milliseconds(self.accumulated_ms) + running
    }

    pub fn set_reps(
        &mut self,
        group: GroupID,
        set: u32,
        exercise_id: ExerciseID,
        reps: Reps,
    ) -> Result<(), SessionError> {
        self.exercise_mut(group, set, exercise_id)?.reps = reps;
        Ok(())
    }

    pub fn set_weight(
        &mut self,
        group: GroupID,
        set: u32,
        exercise_id: ExerciseID,
        weight: Option<Weight>,
    ) -> Result<(), SessionError> {
        self.exercise_mut(group, set, exercise_id)?.weight = weight;
        Ok(())
    }

    pub fn set_completed(
        &mut self,
        group: GroupID,
        set: u32,
        exercise_id: ExerciseID,
        completed: bool,
    ) -> Result<(), SessionError> {
        self.exercise_mut(group, set, exercise_id)?.completed = completed;
        Ok(())
    }

    /// Returns the new completion state.
    pub fn toggle_completed(
        &mut self,
        group: GroupID,
        set: u32,
        exercise_id: ExerciseID,
    ) -> Result<bool, SessionError> {
        let exercise = self.exercise_mut(group, set, exercise_id)?;
        exercise.completed = !exercise.completed;
        Ok(exercise.completed)
    }

    /// Appends a set with the values of the last set. Returns the number of the new set.
    pub fn add_set(&mut self, group: GroupID) -> Result<u32, SessionError> {
        let group = self.group_mut(group)?;
        if group.sets.len() >= WorkoutEntry::MAX_SETS as usize {
            return Err(SessionError::TooManySets);
        }
        let Some(last) = group.sets.last() else {
            return Err(SessionError::UnknownSet(1));
        };
        let number = last.number + 1;
        let set = SetLog {
            number,
            exercises: last
                .exercises
                .iter()
                .map(|e| ExerciseInSetLog {
                    completed: false,
                    ..e.clone()
                })
                .collect(),
        };
        group.sets.push(set);
        Ok(number)
    }

    /// Removes a set and renumbers the following sets. The last remaining set cannot be removed.
    pub fn remove_set(&mut self, group: GroupID, set: u32) -> Result<(), SessionError> {
        let group = self.group_mut(group)?;
        let Some(index) = group.sets.iter().position(|s| s.number == set) else {
            return Err(SessionError::UnknownSet(set));
        };
        if group.sets.len() == 1 {
            return Err(SessionError::LastSet);
        }
        group.sets.remove(index);
        for (number, set) in (1..).zip(group.sets.iter_mut()) {
            set.number = number;
        }
        Ok(())
    }

    pub fn set_group_rpe(&mut self, group: GroupID, rpe: Option<RPE>) -> Result<(), SessionError> {
        self.group_mut(group)?.rpe = rpe;
        Ok(())
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        self.transition(SessionAction::Pause, &[SessionStatus::Active])?;
        self.stop_clock(now);
        self.status = SessionStatus::Paused;
        Ok(())
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        self.transition(SessionAction::Resume, &[SessionStatus::Paused])?;
        self.active_since = Some(now);
        self.status = SessionStatus::Active;
        Ok(())
    }

    /// Leaves the session. A session with at least one completed set is paused so that it can be
    /// resumed later, otherwise it is cancelled.
    pub fn close(&mut self, now: DateTime<Utc>) -> Result<SessionStatus, SessionError> {
        self.transition(
            SessionAction::Close,
            &[SessionStatus::Active, SessionStatus::Paused],
        )?;
        self.stop_clock(now);
        self.status = if self.completed_sets() > 0 {
            SessionStatus::Paused
        } else {
            SessionStatus::Cancelled
        };
        Ok(self.status)
    }

    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<CompletedWorkout, SessionError> {
        self.transition(
            SessionAction::Finish,
            &[SessionStatus::Active, SessionStatus::Paused],
        )?;
        self.stop_clock(now);
        self.status = SessionStatus::Completed;
        Ok(CompletedWorkout {
            session_id: self.id,
            workout_id: self.workout_id,
            workout_name: self.workout_name.clone(),
            started: self.started,
            finished: now,
            duration_ms: self.accumulated_ms,
            groups: self.groups().map(|(_, g)| g.clone()).collect(),
        })
    }

    fn transition(
        &self,
        action: SessionAction,
        allowed: &[SessionStatus],
    ) -> Result<(), SessionError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                action,
                status: self.status,
            })
        }
    }

    fn stop_clock(&mut self, now: DateTime<Utc>) {
        self.accumulated_ms = self.elapsed(now).num_milliseconds();
        self.active_since = None;
    }

    fn group_mut(&mut self, id: GroupID) -> Result<&mut GroupSessionLog, SessionError> {
        if self.status != SessionStatus::Active {
            return Err(SessionError::NotActive(self.status));
        }
        self.groups
            .get_mut(&id)
            .ok_or(SessionError::UnknownGroup(id))
    }

    fn exercise_mut(
        &mut self,
        group: GroupID,
        set: u32,
        exercise_id: ExerciseID,
    ) -> Result<&mut ExerciseInSetLog, SessionError> {
        self.group_mut(group)?
            .sets
            .iter_mut()
            .find(|s| s.number == set)
            .ok_or(SessionError::UnknownSet(set))?
            .exercises
            .iter_mut()
            .find(|e| e.exercise_id == exercise_id)
            .ok_or(SessionError::UnknownExercise(exercise_id))
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
pub struct SessionID(Uuid);

impl SessionID {
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for SessionID {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<u128> for SessionID {
    fn from(value: u128) -> Self {
        Self(Uuid::from_bytes(value.to_be_bytes()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SessionStatus {
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Active => "active",
            SessionStatus::Paused => "paused",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Pause,
    Resume,
    Close,
    Finish,
}

impl fmt::Display for SessionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionAction::Pause => "pause",
            SessionAction::Resume => "resume",
            SessionAction::Close => "close",
            SessionAction::Finish => "finish",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GroupSessionLog {
    pub kind: EntryKind,
    pub sets: Vec<SetLog>,
    pub rpe: Option<RPE>,
}

impl GroupSessionLog {
    #[must_use]
    pub fn completed_sets(&self) -> usize {
        self.sets.iter().filter(|s| s.is_completed()).count()
    }
}

impl From<&WorkoutEntry> for GroupSessionLog {
    fn from(entry: &WorkoutEntry) -> Self {
        Self {
            kind: entry.kind,
            sets: (1..=entry.sets)
                .map(|number| SetLog {
                    number,
                    exercises: entry
                        .exercises
                        .iter()
                        .map(|c| ExerciseInSetLog {
                            exercise_id: c.exercise_id,
                            reps: c.reps,
                            weight: c.weight,
                            completed: false,
                        })
                        .collect(),
                })
                .collect(),
            rpe: entry.rpe,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SetLog {
    pub number: u32,
    pub exercises: Vec<ExerciseInSetLog>,
}

impl SetLog {
    /// A set is completed when all of its exercises are completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        !self.exercises.is_empty() && self.exercises.iter().all(|e| e.completed)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExerciseInSetLog {
    pub exercise_id: ExerciseID,
    pub reps: Reps,
    pub weight: Option<Weight>,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompletedWorkout {
    pub session_id: SessionID,
    pub workout_id: WorkoutID,
    pub workout_name: Name,
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
    pub duration_ms: i64,
    pub groups: Vec<GroupSessionLog>,
}

impl CompletedWorkout {
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::milliseconds(self.duration_ms)
    }

    #[must_use]
    pub fn completed_sets(&self) -> usize {
        self.groups.iter().map(GroupSessionLog::completed_sets).sum()
    }

    /// Sum of reps times weight of all completed exercises.
    #[must_use]
    pub fn volume_load(&self) -> f32 {
        self.groups
            .iter()
            .flat_map(|g| &g.sets)
            .flat_map(|s| &s.exercises)
            .filter(|e| e.completed)
            .filter_map(|e| e.weight.map(|w| e.reps * w))
            .sum()
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SessionError {
    #[error("Cannot {action} a session that is {status}")]
    InvalidTransition {
        action: SessionAction,
        status: SessionStatus,
    },
    #[error("Session is {0}")]
    NotActive(SessionStatus),
    #[error("Workout has no exercises")]
    EmptyWorkout,
    #[error("Group {0} occurs more than once in the workout")]
    DuplicateGroup(GroupID),
    #[error("Group {0} is not part of the session")]
    UnknownGroup(GroupID),
    #[error("Set {0} does not exist")]
    UnknownSet(u32),
    #[error("Exercise {0} is not part of the set")]
    UnknownExercise(ExerciseID),
    #[error("A group must have at least one set")]
    LastSet,
    #[error("A group can have at most 99 sets")]
    TooManySets,
}

#[derive(thiserror::Error, Debug)]
pub enum WorkoutSessionError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error(transparent)]
    Delete(#[from] DeleteError),
}
