#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod activation;
pub mod catalog;
mod error;
pub mod exercise;
pub mod muscle;
mod name;
pub mod search;
mod service;
pub mod workout;
pub mod workout_session;

pub use activation::{MuscleActivation, Tier};
pub use error::{DeleteError, ReadError, StorageError, WriteError};
pub use exercise::{
    ENGLISH, Exercise, ExerciseCache, ExerciseID, ExerciseRecord, ExerciseRepository,
    ExerciseService, ImageRecord, MuscleInfo, NormalizeError, Stimulus, StimulusError,
    Translation, is_weighted, strip_html,
};
pub use muscle::{
    BodyRegion, Category, Equipment, Label, Muscle, Property, Side, UNKNOWN_LABEL,
    category_label, equipment_label, muscle_label, region_slug,
};
pub use name::{MAX_NAME_LEN, Name, NameError};
pub use search::{
    DEFAULT_DEBOUNCE_DELAY, DEFAULT_LIMIT, Debounce, ExerciseQuery, SearchEngine, SearchResults,
};
pub use service::Service;
pub use workout::{
    EntryKind, ExerciseConfig, GroupID, RPE, RPEError, Reps, RepsError, Time, TimeError, Weight,
    WeightError, Workout, WorkoutEntry, WorkoutEntryError, WorkoutError,
    WorkoutHistoryRepository, WorkoutHistoryService, WorkoutID,
};
pub use workout_session::{
    CompletedWorkout, ExerciseInSetLog, GroupSessionLog, SessionAction, SessionError, SessionID,
    SessionStatus, SetLog, WorkoutSessionError, WorkoutSessionRepository, WorkoutSessionService,
    WorkoutSessionState,
};
