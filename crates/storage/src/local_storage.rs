use std::collections::VecDeque;

use gloo_storage::{Storage as GlooStorage, errors::StorageError};
use liftlog_domain as domain;
use liftlog_web_app::{Settings, SettingsRepository, log};
use serde::{Serialize, de::DeserializeOwned};
use strum::AsRefStr;

#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    #[strum(serialize = "workout session")]
    WorkoutSession,
    #[strum(serialize = "workout history")]
    WorkoutHistory,
    #[strum(serialize = "settings")]
    Settings,
    #[strum(serialize = "log")]
    Log,
}

/// Persists the application state as JSON in the local storage of the browser.
#[derive(Clone, Copy, Default)]
pub struct LocalStorage;

impl domain::WorkoutSessionRepository for LocalStorage {
    fn read_workout_session(
        &self,
    ) -> Result<Option<domain::WorkoutSessionState>, domain::ReadError> {
        read(Key::WorkoutSession).map_err(read_error)
    }

    fn write_workout_session(
        &self,
        session: &domain::WorkoutSessionState,
    ) -> Result<(), domain::WriteError> {
        write(Key::WorkoutSession, session).map_err(write_error)
    }

    fn delete_workout_session(&self) -> Result<(), domain::DeleteError> {
        gloo_storage::LocalStorage::delete(Key::WorkoutSession);
        Ok(())
    }
}

impl domain::WorkoutHistoryRepository for LocalStorage {
    fn read_workout_history(&self) -> Result<Vec<domain::CompletedWorkout>, domain::ReadError> {
        read(Key::WorkoutHistory).map_err(read_error)
    }

    fn append_workout_history(
        &self,
        workout: domain::CompletedWorkout,
    ) -> Result<(), domain::WriteError> {
        let mut history: Vec<domain::CompletedWorkout> =
            read(Key::WorkoutHistory).map_err(write_error)?;
        history.push(workout);
        write(Key::WorkoutHistory, &history).map_err(write_error)
    }
}

impl SettingsRepository for LocalStorage {
    fn read_settings(&self) -> Result<Settings, domain::ReadError> {
        read(Key::Settings).map_err(read_error)
    }

    fn write_settings(&self, settings: &Settings) -> Result<(), domain::WriteError> {
        write(Key::Settings, settings).map_err(write_error)
    }
}

impl log::Repository for LocalStorage {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        read(Key::Log).map_err(|err| log::Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        log::prepend(&mut entries, entry);
        write(Key::Log, &entries).map_err(|err| log::Error::Unknown(err.to_string()))
    }
}

/// Reads the value stored under the key, or the default if the key does not exist.
fn read<T: DeserializeOwned + Default>(key: Key) -> Result<T, StorageError> {
    match gloo_storage::LocalStorage::get(key) {
        Ok(value) => Ok(value),
        Err(StorageError::KeyNotFound(_)) => Ok(T::default()),
        Err(err) => Err(err),
    }
}

fn write<T: Serialize>(key: Key, value: &T) -> Result<(), StorageError> {
    gloo_storage::LocalStorage::set(key, value)
}

fn read_error(err: StorageError) -> domain::ReadError {
    domain::ReadError::Other(Box::new(err))
}

fn write_error(err: StorageError) -> domain::WriteError {
    domain::WriteError::Other(Box::new(err))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Key::WorkoutSession, "workout session")]
    #[case(Key::WorkoutHistory, "workout history")]
    #[case(Key::Settings, "settings")]
    #[case(Key::Log, "log")]
    fn test_key(#[case] key: Key, #[case] expected: &str) {
        assert_eq!(key.as_ref(), expected);
    }

    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    mod wasm {
        use domain::{WorkoutHistoryRepository, WorkoutSessionRepository};
        use liftlog_web_app::{Theme, log::Repository};
        use pretty_assertions::assert_eq;
        use wasm_bindgen_test::wasm_bindgen_test;

        use super::*;
        use crate::tests::data::{completed_workout, workout_session};

        wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

        #[wasm_bindgen_test]
        fn test_workout_session() {
            gloo_storage::LocalStorage::clear();
            let session = workout_session();

            assert_eq!(LocalStorage.read_workout_session().unwrap(), None);

            LocalStorage.write_workout_session(&session).unwrap();

            assert_eq!(LocalStorage.read_workout_session().unwrap(), Some(session));

            LocalStorage.delete_workout_session().unwrap();

            assert_eq!(LocalStorage.read_workout_session().unwrap(), None);
        }

        #[wasm_bindgen_test]
        fn test_workout_history() {
            gloo_storage::LocalStorage::clear();
            let first = completed_workout(1);
            let second = completed_workout(2);

            assert_eq!(LocalStorage.read_workout_history().unwrap(), vec![]);

            LocalStorage.append_workout_history(first.clone()).unwrap();
            LocalStorage.append_workout_history(second.clone()).unwrap();

            assert_eq!(
                LocalStorage.read_workout_history().unwrap(),
                vec![first, second]
            );
        }

        #[wasm_bindgen_test]
        fn test_workout_history_corrupted() {
            gloo_storage::LocalStorage::clear();
            gloo_storage::LocalStorage::raw()
                .set_item("workout history", "{")
                .unwrap();

            assert!(LocalStorage.read_workout_history().is_err());
        }

        #[wasm_bindgen_test]
        fn test_settings() {
            gloo_storage::LocalStorage::clear();
            let settings = Settings {
                search_limit: 30,
                theme: Theme::Dark,
                ..Settings::default()
            };

            assert_eq!(LocalStorage.read_settings().unwrap(), Settings::default());

            LocalStorage.write_settings(&settings).unwrap();

            assert_eq!(LocalStorage.read_settings().unwrap(), settings);
        }

        #[wasm_bindgen_test]
        fn test_log() {
            gloo_storage::LocalStorage::clear();
            let entry = log::Entry {
                time: "2026-01-01 10:00:00".to_string(),
                level: ::log::Level::Warn,
                message: "foo".to_string(),
            };

            assert_eq!(LocalStorage.read_entries().unwrap(), VecDeque::new());

            for _ in 0..log::MAX_ENTRIES + 1 {
                LocalStorage.write_entry(entry.clone()).unwrap();
            }

            let entries = LocalStorage.read_entries().unwrap();
            assert_eq!(entries.len(), log::MAX_ENTRIES);
            assert_eq!(entries[0], entry);
        }
    }
}
