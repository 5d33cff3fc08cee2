use std::collections::VecDeque;

use ::log::{debug, error};
use liftlog_domain::{StorageError, WriteError};

use crate::{Settings, SettingsRepository, SettingsService, log};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

impl<R: log::Repository> log::Service for Service<R> {
    fn get_log_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        self.repository.read_entries()
    }

    fn add_log_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        self.repository.write_entry(entry)
    }
}

impl<R: SettingsRepository> SettingsService for Service<R> {
    fn get_settings(&self) -> Settings {
        match self.repository.read_settings() {
            Ok(settings) => settings.sanitized(),
            Err(err) => {
                error!("failed to get settings: {err}");
                Settings::default()
            }
        }
    }

    fn set_settings(&self, settings: Settings) -> Result<(), WriteError> {
        let result = self.repository.write_settings(&settings.sanitized());
        match result {
            Err(WriteError::Storage(StorageError::NoConnection)) => {
                debug!("failed to set settings: no connection");
            }
            Err(ref err) => error!("failed to set settings: {err}"),
            Ok(()) => {}
        }
        result
    }
}
