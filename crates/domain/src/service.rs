use std::cell::{Cell, RefCell};

use chrono::{DateTime, Utc};
use log::{debug, error, warn};

use crate::{
    CompletedWorkout, DeleteError, Exercise, ExerciseCache, ExerciseID, ExerciseQuery,
    ExerciseRepository, ExerciseService, Muscle, MuscleInfo, Property, ReadError, SearchEngine,
    SearchResults, SessionStatus, WorkoutHistoryRepository, WorkoutHistoryService,
    WorkoutSessionError, WorkoutSessionRepository, WorkoutSessionService, WorkoutSessionState,
    WriteError, catalog,
};

pub struct Service<R> {
    repository: R,
    exercises: RefCell<ExerciseCache>,
    exercises_loaded: Cell<bool>,
    search: RefCell<SearchEngine>,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            exercises: RefCell::new(ExerciseCache::new()),
            exercises_loaded: Cell::new(false),
            search: RefCell::new(SearchEngine::new()),
        }
    }

    /// Exercises cached so far, without accessing the repository.
    pub fn cached_exercises(&self) -> Vec<Exercise> {
        self.exercises.borrow().values().cloned().collect()
    }

    /// Searches the cached exercises only.
    pub fn search_cached_exercises(&self, query: &ExerciseQuery, limit: usize) -> SearchResults {
        self.search
            .borrow_mut()
            .search(query, &self.exercises.borrow(), limit)
    }
}

macro_rules! log_on_error {
    ($result: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $result;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: ExerciseRepository> ExerciseService for Service<R> {
    async fn get_exercises(&self) -> Vec<Exercise> {
        if !self.exercises_loaded.get() {
            match log_on_error!(
                self.repository.read_exercises().await,
                ReadError,
                "get",
                "exercises"
            ) {
                Ok(exercises) => {
                    let mut cache = self.exercises.borrow_mut();
                    cache.retain(|e| *e.id < catalog::FIRST_ID);
                    cache.extend(exercises);
                    self.exercises_loaded.set(true);
                }
                Err(_) => {
                    warn!("using built-in exercises");
                    self.exercises
                        .borrow_mut()
                        .extend(catalog::fallback_exercises());
                }
            }
        }
        self.cached_exercises()
    }

    async fn get_exercise(&self, id: ExerciseID) -> Result<Exercise, ReadError> {
        if let Some(exercise) = self.exercises.borrow().get(id) {
            return Ok(exercise.clone());
        }
        let exercise = log_on_error!(
            self.repository.read_exercise(id).await,
            ReadError,
            "get",
            "exercise"
        )?;
        self.exercises.borrow_mut().insert(exercise.clone());
        Ok(exercise)
    }

    async fn get_muscles(&self) -> Vec<MuscleInfo> {
        log_on_error!(
            self.repository.read_muscles().await,
            ReadError,
            "get",
            "muscles"
        )
        .unwrap_or_else(|_| Muscle::iter().map(|m| MuscleInfo::from(*m)).collect())
    }

    /// Exercises unknown to the local search are looked up in the exercise database.
    async fn search_exercises(&self, query: &ExerciseQuery, limit: usize) -> SearchResults {
        self.get_exercises().await;
        let results = self.search_cached_exercises(query, limit);
        let term = query.text.trim();

        if !results.is_empty() || term.is_empty() || !self.exercises_loaded.get() {
            return results;
        }

        let Ok(ids) = log_on_error!(
            self.repository.search_exercises(term).await,
            ReadError,
            "search",
            "exercises"
        ) else {
            return results;
        };

        for id in ids {
            // Failures are already logged
            let _ = self.get_exercise(id).await;
        }

        self.search_cached_exercises(query, limit)
    }
}

impl<R: WorkoutSessionRepository + WorkoutHistoryRepository> WorkoutSessionService
    for Service<R>
{
    fn save_session(&self, session: &WorkoutSessionState) -> Result<(), WriteError> {
        log_on_error!(
            self.repository.write_workout_session(session),
            WriteError,
            "save",
            "workout session"
        )
    }

    fn close_session(
        &self,
        session: &mut WorkoutSessionState,
        now: DateTime<Utc>,
    ) -> Result<SessionStatus, WorkoutSessionError> {
        let status = session.close(now)?;
        if status == SessionStatus::Paused {
            self.save_session(session)?;
        } else {
            self.discard_session()?;
        }
        Ok(status)
    }

    fn resume_session(&self, now: DateTime<Utc>) -> Option<WorkoutSessionState> {
        let mut session = log_on_error!(
            self.repository.read_workout_session(),
            ReadError,
            "resume",
            "workout session"
        )
        .ok()??;

        match session.status() {
            SessionStatus::Active => Some(session),
            SessionStatus::Paused => {
                session.resume(now).ok()?;
                // The session is usable even if it could not be saved
                let _ = self.save_session(&session);
                Some(session)
            }
            SessionStatus::Completed | SessionStatus::Cancelled => {
                debug!("discarding {} workout session", session.status());
                let _ = self.discard_session();
                None
            }
        }
    }

    fn finish_session(
        &self,
        session: &mut WorkoutSessionState,
        now: DateTime<Utc>,
    ) -> Result<CompletedWorkout, WorkoutSessionError> {
        let completed = session.finish(now)?;
        log_on_error!(
            self.repository.append_workout_history(completed.clone()),
            WriteError,
            "save",
            "workout history"
        )?;
        self.discard_session()?;
        Ok(completed)
    }

    fn discard_session(&self) -> Result<(), DeleteError> {
        log_on_error!(
            self.repository.delete_workout_session(),
            DeleteError,
            "discard",
            "workout session"
        )
    }
}

impl<R: WorkoutHistoryRepository> WorkoutHistoryService for Service<R> {
    fn get_history(&self) -> Result<Vec<CompletedWorkout>, ReadError> {
        let mut history = log_on_error!(
            self.repository.read_workout_history(),
            ReadError,
            "get",
            "workout history"
        )?;
        history.sort_by(|a, b| b.finished.cmp(&a.finished));
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{Duration, TimeZone};
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        Category, EntryKind, ExerciseConfig, Name, Reps, StorageError, Time, Workout,
        WorkoutEntry, catalog::FIRST_ID,
    };

    #[derive(Default)]
    struct FakeRepository {
        offline: Cell<bool>,
        exercises: Vec<Exercise>,
        remote_only: Vec<Exercise>,
        exercise_reads: Cell<u32>,
        session: RefCell<Option<WorkoutSessionState>>,
        session_unreadable: bool,
        history: RefCell<Vec<CompletedWorkout>>,
    }

    impl FakeRepository {
        fn connection(&self) -> Result<(), StorageError> {
            if self.offline.get() {
                Err(StorageError::NoConnection)
            } else {
                Ok(())
            }
        }
    }

    impl ExerciseRepository for FakeRepository {
        async fn read_exercises(&self) -> Result<Vec<Exercise>, ReadError> {
            self.connection()?;
            self.exercise_reads.set(self.exercise_reads.get() + 1);
            Ok(self.exercises.clone())
        }

        async fn read_exercise(&self, id: ExerciseID) -> Result<Exercise, ReadError> {
            self.connection()?;
            self.exercise_reads.set(self.exercise_reads.get() + 1);
            self.exercises
                .iter()
                .chain(&self.remote_only)
                .find(|e| e.id == id)
                .cloned()
                .ok_or(ReadError::Storage(StorageError::NotFound))
        }

        async fn search_exercises(&self, term: &str) -> Result<Vec<ExerciseID>, ReadError> {
            self.connection()?;
            Ok(self
                .remote_only
                .iter()
                .filter(|e| e.name.as_ref().to_lowercase().contains(&term.to_lowercase()))
                .map(|e| e.id)
                .collect())
        }

        async fn read_muscles(&self) -> Result<Vec<MuscleInfo>, ReadError> {
            self.connection()?;
            Ok(vec![MuscleInfo {
                id: 4,
                name: "Pectoralis major".to_string(),
                name_en: "Chest".to_string(),
                is_front: true,
            }])
        }
    }

    impl WorkoutSessionRepository for FakeRepository {
        fn read_workout_session(&self) -> Result<Option<WorkoutSessionState>, ReadError> {
            if self.session_unreadable {
                return Err(ReadError::Other("invalid JSON".into()));
            }
            Ok(self.session.borrow().clone())
        }

        fn write_workout_session(&self, session: &WorkoutSessionState) -> Result<(), WriteError> {
            *self.session.borrow_mut() = Some(session.clone());
            Ok(())
        }

        fn delete_workout_session(&self) -> Result<(), DeleteError> {
            *self.session.borrow_mut() = None;
            Ok(())
        }
    }

    impl WorkoutHistoryRepository for FakeRepository {
        fn read_workout_history(&self) -> Result<Vec<CompletedWorkout>, ReadError> {
            Ok(self.history.borrow().clone())
        }

        fn append_workout_history(&self, workout: CompletedWorkout) -> Result<(), WriteError> {
            self.history.borrow_mut().push(workout);
            Ok(())
        }
    }

    fn exercise(id: u32, name: &str) -> Exercise {
        Exercise {
            id: id.into(),
            name: Name::new(name).unwrap(),
            description: String::new(),
            category: Some(Category::Back),
            equipment: vec![],
            primary_muscles: vec![Muscle::LatissimusDorsi],
            secondary_muscles: vec![],
            instructions: vec![],
            weighted: false,
            image: None,
        }
    }

    fn remote() -> FakeRepository {
        FakeRepository {
            exercises: vec![exercise(1, "Barbell Row"), exercise(2, "Chin Up")],
            remote_only: vec![exercise(3, "Seal Row")],
            ..FakeRepository::default()
        }
    }

    fn offline() -> FakeRepository {
        FakeRepository {
            offline: Cell::new(true),
            ..FakeRepository::default()
        }
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 2, 7, 30, 0).unwrap() + Duration::seconds(seconds)
    }

    fn session() -> WorkoutSessionState {
        let mut workout = Workout::new(1.into(), Name::new("Pull").unwrap());
        workout
            .add_entry(
                WorkoutEntry::new(
                    1.into(),
                    EntryKind::Single,
                    vec![ExerciseConfig {
                        exercise_id: 1.into(),
                        reps: Reps::new(8).unwrap(),
                        weight: None,
                        rest: Time::new(120).unwrap(),
                        notes: String::new(),
                    }],
                    3,
                    None,
                )
                .unwrap(),
            )
            .unwrap();
        WorkoutSessionState::start(1.into(), &workout, at(0)).unwrap()
    }

    fn names(exercises: &[Exercise]) -> Vec<String> {
        exercises.iter().map(|e| e.name.to_string()).collect()
    }

    #[test]
    fn test_get_exercises() {
        let service = Service::new(remote());

        assert_eq!(
            names(&block_on(service.get_exercises())),
            vec!["Barbell Row", "Chin Up"]
        );
        assert_eq!(block_on(service.get_exercises()).len(), 2);
        assert_eq!(service.repository.exercise_reads.get(), 1);
    }

    #[test]
    fn test_get_exercises_fallback() {
        let service = Service::new(offline());

        let exercises = block_on(service.get_exercises());

        assert_eq!(exercises.len(), catalog::fallback_exercises().len());
        assert!(exercises.iter().all(|e| *e.id >= FIRST_ID));
    }

    #[test]
    fn test_get_exercises_after_reconnect() {
        let service = Service::new(FakeRepository {
            offline: Cell::new(true),
            ..remote()
        });

        assert!(
            block_on(service.get_exercises())
                .iter()
                .all(|e| *e.id >= FIRST_ID)
        );

        service.repository.offline.set(false);

        assert_eq!(
            names(&block_on(service.get_exercises())),
            vec!["Barbell Row", "Chin Up"]
        );
        assert!(
            block_on(service.search_exercises(&ExerciseQuery::new("bench press", None), 15))
                .exercises
                .iter()
                .all(|e| *e.id < FIRST_ID)
        );
    }

    #[test]
    fn test_get_exercise_cached() {
        let service = Service::new(remote());

        assert_eq!(
            block_on(service.get_exercise(2.into())).unwrap().name.as_ref(),
            "Chin Up"
        );
        assert_eq!(
            block_on(service.get_exercise(2.into())).unwrap().name.as_ref(),
            "Chin Up"
        );
        assert_eq!(service.repository.exercise_reads.get(), 1);
        assert!(matches!(
            block_on(service.get_exercise(9.into())),
            Err(ReadError::Storage(StorageError::NotFound))
        ));
    }

    #[test]
    fn test_get_muscles() {
        assert_eq!(block_on(Service::new(remote()).get_muscles()).len(), 1);
        assert_eq!(
            block_on(Service::new(offline()).get_muscles()).len(),
            Muscle::iter().len()
        );
    }

    #[test]
    fn test_search_exercises() {
        let service = Service::new(remote());

        let results = block_on(service.search_exercises(&ExerciseQuery::new("chin", None), 15));

        assert_eq!(names(&results.exercises), vec!["Chin Up"]);
        assert_eq!(results.total, 1);
    }

    #[test]
    fn test_search_exercises_remote() {
        let service = Service::new(remote());

        let results = block_on(service.search_exercises(&ExerciseQuery::new("seal", None), 15));

        assert_eq!(names(&results.exercises), vec!["Seal Row"]);
        assert_eq!(service.cached_exercises().len(), 3);
    }

    #[test]
    fn test_search_exercises_offline() {
        let service = Service::new(offline());

        let results =
            block_on(service.search_exercises(&ExerciseQuery::new("", Some(Category::Arms)), 15));

        assert_eq!(names(&results.exercises), vec!["Dumbbell Curl", "Triceps Dip"]);
    }

    #[test]
    fn test_close_session_without_completed_sets() {
        let service = Service::new(FakeRepository::default());
        let mut session = session();
        service.save_session(&session).unwrap();

        assert_eq!(
            service.close_session(&mut session, at(60)).unwrap(),
            SessionStatus::Cancelled
        );
        assert_eq!(*service.repository.session.borrow(), None);
        assert_eq!(service.resume_session(at(120)), None);
    }

    #[test]
    fn test_close_and_resume_session() {
        let service = Service::new(FakeRepository::default());
        let mut session = session();
        session.toggle_completed(1.into(), 1, 1.into()).unwrap();
        session
            .set_reps(1.into(), 1, 1.into(), Reps::new(6).unwrap())
            .unwrap();

        assert_eq!(
            service.close_session(&mut session, at(60)).unwrap(),
            SessionStatus::Paused
        );
        assert_eq!(*service.repository.session.borrow(), Some(session.clone()));

        let resumed = service.resume_session(at(600)).unwrap();

        assert_eq!(resumed.status(), SessionStatus::Active);
        assert_eq!(resumed.completed_sets(), 1);
        assert_eq!(
            resumed.group(1.into()).unwrap().sets[0].exercises[0].reps,
            Reps::new(6).unwrap()
        );
        assert_eq!(resumed.elapsed(at(630)), Duration::seconds(90));
        assert_eq!(
            service.repository.session.borrow().as_ref().map(|s| s.status()),
            Some(SessionStatus::Active)
        );
    }

    #[test]
    fn test_resume_unreadable_session() {
        let service = Service::new(FakeRepository {
            session_unreadable: true,
            ..FakeRepository::default()
        });

        assert_eq!(service.resume_session(at(0)), None);
    }

    #[test]
    fn test_finish_session() {
        let service = Service::new(FakeRepository::default());
        let mut session = session();
        session.toggle_completed(1.into(), 1, 1.into()).unwrap();
        service.save_session(&session).unwrap();

        let completed = service.finish_session(&mut session, at(900)).unwrap();

        assert_eq!(completed.completed_sets(), 1);
        assert_eq!(*service.repository.session.borrow(), None);
        assert_eq!(service.get_history().unwrap(), vec![completed]);
        assert!(matches!(
            service.finish_session(&mut session, at(901)),
            Err(WorkoutSessionError::Session(_))
        ));
    }

    #[test]
    fn test_get_history_order() {
        let service = Service::new(FakeRepository::default());
        let mut finished = BTreeMap::new();
        for minutes in [30, 90, 60] {
            let mut session = session();
            let completed = service
                .finish_session(&mut session, at(minutes * 60))
                .unwrap();
            finished.insert(minutes, completed.finished);
        }

        assert_eq!(
            service
                .get_history()
                .unwrap()
                .iter()
                .map(|w| w.finished)
                .collect::<Vec<_>>(),
            vec![finished[&90], finished[&60], finished[&30]]
        );
    }
}
