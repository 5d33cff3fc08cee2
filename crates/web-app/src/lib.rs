#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod log;
pub mod search;
mod service;
mod settings;

pub use search::SearchController;
pub use service::Service;
pub use settings::{Settings, SettingsRepository, SettingsService, Theme, WeightUnit};
