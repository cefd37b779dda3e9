use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_HISTORY: usize = 50;

/// User-facing settings shared by every context.
///
/// Deserialization fills omitted fields from [`Settings::default`], so a partial
/// object read from storage or received in `saveSettings` is merged over the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub enabled: bool,
    pub show_tooltip: bool,
    pub sound_enabled: bool,
    pub max_history_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            show_tooltip: true,
            sound_enabled: false,
            max_history_size: DEFAULT_MAX_HISTORY,
        }
    }
}

impl Settings {
    /// Merges a stored JSON value over the defaults. Anything that is not an object
    /// of the expected shape yields the defaults.
    pub fn from_stored(value: Option<&serde_json::Value>) -> Self {
        value
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_history_size == 0 {
            return Err(SettingsError::MaxHistoryNotPositive);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("maxHistorySize must be positive")]
    MaxHistoryNotPositive,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn partial_object_is_merged_over_defaults() {
        let stored = json!({ "soundEnabled": true });
        let settings = Settings::from_stored(Some(&stored));
        assert_eq!(
            settings,
            Settings {
                sound_enabled: true,
                ..Settings::default()
            }
        );
    }

    #[test]
    fn malformed_value_yields_defaults() {
        let stored = json!("not an object");
        assert_eq!(Settings::from_stored(Some(&stored)), Settings::default());
        assert_eq!(Settings::from_stored(None), Settings::default());
    }

    #[test]
    fn zero_history_size_is_rejected() {
        let settings = Settings {
            max_history_size: 0,
            ..Settings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::MaxHistoryNotPositive)
        );
    }
}
