use chrono::Duration;
use liftlog_domain::{DEFAULT_DEBOUNCE_DELAY, DEFAULT_LIMIT, ReadError, Time, Weight, WriteError};
use log::error;

pub trait SettingsService {
    /// Stored settings, or the defaults if they cannot be read.
    fn get_settings(&self) -> Settings;
    fn set_settings(&self, settings: Settings) -> Result<(), WriteError>;
}

pub trait SettingsRepository {
    fn read_settings(&self) -> Result<Settings, ReadError>;
    fn write_settings(&self, settings: &Settings) -> Result<(), WriteError>;
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub search_limit: usize,
    pub search_debounce_ms: u32,
    pub weight_unit: WeightUnit,
    pub default_rest: Time,
    pub theme: Theme,
}

impl Settings {
    pub const MAX_SEARCH_LIMIT: usize = 100;
    pub const MAX_SEARCH_DEBOUNCE_MS: u32 = 2000;

    /// Replaces values out of range by the nearest valid value.
    #[must_use]
    pub fn sanitized(self) -> Self {
        Self {
            search_limit: self.search_limit.clamp(1, Self::MAX_SEARCH_LIMIT),
            search_debounce_ms: self.search_debounce_ms.min(Self::MAX_SEARCH_DEBOUNCE_MS),
            ..self
        }
    }

    #[must_use]
    pub fn search_debounce_delay(&self) -> Duration {
        Duration::milliseconds(i64::from(self.search_debounce_ms))
    }

    #[must_use]
    pub fn current_theme(&self) -> Theme {
        match self.theme {
            Theme::System => {
                let Some(window) = web_sys::window() else {
                    error!("failed to access window to determine preferred color scheme");
                    return Theme::Light;
                };
                match window.match_media("(prefers-color-scheme: dark)") {
                    Ok(Some(media_query_list)) => {
                        if media_query_list.matches() {
                            Theme::Dark
                        } else {
                            Theme::Light
                        }
                    }
                    Ok(None) => {
                        error!("failed to determine preferred color scheme");
                        Theme::Light
                    }
                    Err(_) => {
                        error!("failed to match media to determine preferred color scheme");
                        Theme::Light
                    }
                }
            }
            Theme::Light | Theme::Dark => self.theme,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let search_debounce_ms = DEFAULT_DEBOUNCE_DELAY.num_milliseconds() as u32;
        Self {
            search_limit: DEFAULT_LIMIT,
            search_debounce_ms,
            weight_unit: WeightUnit::Kilogram,
            default_rest: Time::new(90).unwrap_or_default(),
            theme: Theme::System,
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum WeightUnit {
    Kilogram,
    Pound,
}

impl WeightUnit {
    const POUNDS_PER_KILOGRAM: f32 = 2.204_622_6;

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            WeightUnit::Kilogram => "kg",
            WeightUnit::Pound => "lb",
        }
    }

    /// Weights are stored in kilograms and converted for display.
    #[must_use]
    pub fn format(self, weight: Weight) -> String {
        let kg = f32::from(weight);
        let value = match self {
            WeightUnit::Kilogram => kg,
            WeightUnit::Pound => (kg * Self::POUNDS_PER_KILOGRAM * 10.0).round() / 10.0,
        };
        format!("{value} {}", self.symbol())
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    System,
    Light,
    Dark,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_default() {
        let settings = Settings::default();

        assert_eq!(settings.search_limit, 15);
        assert_eq!(settings.search_debounce_ms, 300);
        assert_eq!(settings.search_debounce_delay(), Duration::milliseconds(300));
        assert_eq!(settings.default_rest, Time::new(90).unwrap());
    }

    #[test]
    fn test_deserialize_missing_fields() {
        let settings =
            serde_json::from_str::<Settings>(r#"{"search_limit": 30, "theme": "Dark"}"#).unwrap();

        assert_eq!(
            settings,
            Settings {
                search_limit: 30,
                theme: Theme::Dark,
                ..Settings::default()
            }
        );
    }

    #[rstest]
    #[case(0, 300, 1, 300)]
    #[case(15, 0, 15, 0)]
    #[case(500, 10_000, 100, 2000)]
    fn test_sanitized(
        #[case] search_limit: usize,
        #[case] search_debounce_ms: u32,
        #[case] expected_limit: usize,
        #[case] expected_debounce_ms: u32,
    ) {
        let settings = Settings {
            search_limit,
            search_debounce_ms,
            ..Settings::default()
        }
        .sanitized();

        assert_eq!(settings.search_limit, expected_limit);
        assert_eq!(settings.search_debounce_ms, expected_debounce_ms);
    }

    #[rstest]
    #[case(WeightUnit::Kilogram, 100.0, "100 kg")]
    #[case(WeightUnit::Kilogram, 62.5, "62.5 kg")]
    #[case(WeightUnit::Pound, 100.0, "220.5 lb")]
    #[case(WeightUnit::Pound, 20.0, "44.1 lb")]
    fn test_weight_unit_format(
        #[case] unit: WeightUnit,
        #[case] kg: f32,
        #[case] expected: &str,
    ) {
        assert_eq!(unit.format(Weight::new(kg).unwrap()), expected);
    }
}
