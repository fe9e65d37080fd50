//! Card configuration: every recognised option, its default, and validation.
//!
//! Configs come from code (builder methods) or from JSON templates in the
//! layout catalog. Missing or `null` fields take their default; a field of the
//! wrong type, or a negative or non-finite number, rejects the whole config.

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::card::ActionHook;

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_GAIN_LABEL: &str = "Gain";
pub const DEFAULT_BUTTON_LABEL: &str = "Do It";
pub const DEFAULT_GAIN: f64 = 1.0;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("card config must be a JSON object")]
    NotAnObject,

    #[error("card config is malformed: {0}")]
    Malformed(String),

    #[error("field '{field}' must be a finite number >= 0, got {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Reject negative, NaN and infinite amounts.
pub fn validate_amount(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

pub struct CardConfig {
    /// `None` for anonymous cards. An empty id is treated as none.
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    /// Unit name of the accrued resource, e.g. "Twig".
    pub gain_label: String,
    pub show_button: bool,
    pub button_label: Option<String>,
    pub gain: f64,
    pub count: f64,
    pub active: bool,
    /// Replaces the default accrual on activation.
    pub on_action: Option<ActionHook>,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            id: None,
            title: DEFAULT_TITLE.to_string(),
            description: String::new(),
            gain_label: DEFAULT_GAIN_LABEL.to_string(),
            show_button: false,
            button_label: None,
            gain: DEFAULT_GAIN,
            count: 0.0,
            active: false,
            on_action: None,
        }
    }
}

impl CardConfig {
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Label of the action button, if the card has one.
    pub fn effective_button_label(&self) -> Option<&str> {
        if !self.show_button {
            return None;
        }
        Some(self.button_label.as_deref().unwrap_or(DEFAULT_BUTTON_LABEL))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_amount("gain", self.gain)?;
        validate_amount("count", self.count)?;
        Ok(())
    }

    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        if !value.is_object() {
            return Err(ConfigError::NotAnObject);
        }
        let fields = TemplateFields::deserialize(value)
            .map_err(|e| ConfigError::Malformed(e.to_string()))?;
        let config = fields.into_config();
        config.validate()?;
        Ok(config)
    }

    /// Build from a template object (camelCase keys). Unknown keys are ignored.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, ConfigError> {
        Self::from_value(&Value::Object(map.clone()))
    }
}

/// Builder used to set up cards in tests; the game builds cards from templates.
#[cfg(test)]
impl CardConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self::default().id(id)
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.id = if id.is_empty() { None } else { Some(id) };
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn gain_label(mut self, label: impl Into<String>) -> Self {
        self.gain_label = label.into();
        self
    }

    pub fn gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    pub fn count(mut self, count: f64) -> Self {
        self.count = count;
        self
    }

    /// Show the action button with the given label.
    pub fn button(mut self, label: impl Into<String>) -> Self {
        self.show_button = true;
        self.button_label = Some(label.into());
        self
    }

    pub fn on_action(mut self, hook: ActionHook) -> Self {
        self.on_action = Some(hook);
        self
    }
}

/// Template object as written in the layout catalog. `null` reads as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TemplateFields {
    id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    gain_label: Option<String>,
    show_button: Option<bool>,
    button_label: Option<String>,
    gain: Option<f64>,
    count: Option<f64>,
    active: Option<bool>,
}

impl TemplateFields {
    fn into_config(self) -> CardConfig {
        let defaults = CardConfig::default();
        CardConfig {
            id: self.id.filter(|id| !id.is_empty()),
            title: self.title.unwrap_or(defaults.title),
            description: self.description.unwrap_or(defaults.description),
            gain_label: self.gain_label.unwrap_or(defaults.gain_label),
            show_button: self.show_button.unwrap_or(defaults.show_button),
            button_label: self.button_label,
            gain: self.gain.unwrap_or(defaults.gain),
            count: self.count.unwrap_or(defaults.count),
            active: self.active.unwrap_or(defaults.active),
            on_action: None,
        }
    }
}

impl fmt::Debug for CardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardConfig")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("gain_label", &self.gain_label)
            .field("gain", &self.gain)
            .field("count", &self.count)
            .field("active", &self.active)
            .field("button", &self.effective_button_label())
            .field("on_action", &self.on_action.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = CardConfig::from_value(&json!({ "id": "twigs" })).unwrap();
        assert_eq!(config.id.as_deref(), Some("twigs"));
        assert_eq!(config.title, "Untitled");
        assert_eq!(config.description, "");
        assert_eq!(config.gain, 1.0);
        assert_eq!(config.count, 0.0);
        assert!(!config.active);
        assert_eq!(config.effective_button_label(), None);
    }

    #[test]
    fn null_fields_are_treated_as_absent() {
        let config =
            CardConfig::from_value(&json!({ "id": "twigs", "title": null, "gain": null })).unwrap();
        assert_eq!(config.title, "Untitled");
        assert_eq!(config.gain, 1.0);
    }

    #[test]
    fn full_template() {
        let config = CardConfig::from_value(&json!({
            "id": "pebbles",
            "title": "Gather Pebbles",
            "description": "Collect nearby pebbles.",
            "gain": 2,
            "gainLabel": "Pebble",
            "showButton": true,
            "buttonLabel": "Gather",
            "active": true,
            "someFutureField": [1, 2, 3]
        }))
        .unwrap();
        assert_eq!(config.title, "Gather Pebbles");
        assert_eq!(config.gain, 2.0);
        assert_eq!(config.gain_label, "Pebble");
        assert!(config.active);
        assert_eq!(config.effective_button_label(), Some("Gather"));
    }

    #[test]
    fn show_button_without_label_uses_default() {
        let config = CardConfig::from_value(&json!({ "showButton": true })).unwrap();
        assert_eq!(config.effective_button_label(), Some("Do It"));
    }

    #[test]
    fn non_numeric_gain_is_rejected() {
        let err = CardConfig::from_value(&json!({ "id": "twigs", "gain": "+2 Twigs" })).unwrap_err();
        assert!(matches!(&err, ConfigError::Malformed(msg) if msg.contains("invalid type")), "{err}");
    }

    #[test]
    fn negative_count_is_rejected() {
        let err = CardConfig::from_value(&json!({ "count": -1 })).unwrap_err();
        assert_eq!(
            err,
            ConfigError::OutOfRange {
                field: "count",
                value: -1.0
            }
        );
    }

    #[test]
    fn wrong_type_title_is_rejected() {
        let err = CardConfig::from_value(&json!({ "title": 5 })).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(_)));
        let err = CardConfig::from_value(&json!({ "showButton": "yes" })).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed(_)));
    }

    #[test]
    fn from_map_matches_from_value() {
        let value = json!({ "id": "reeds", "gain": 3, "gainLabel": "Reed", "active": null });
        let config = CardConfig::from_map(value.as_object().unwrap()).unwrap();
        assert_eq!(config.id.as_deref(), Some("reeds"));
        assert_eq!(config.gain, 3.0);
        assert_eq!(config.gain_label, "Reed");
        assert!(!config.active);
    }

    #[test]
    fn non_object_is_rejected() {
        assert_eq!(
            CardConfig::from_value(&json!(["twigs"])).unwrap_err(),
            ConfigError::NotAnObject
        );
    }

    #[test]
    fn empty_id_is_anonymous() {
        assert_eq!(CardConfig::new("").id, None);
        let config = CardConfig::from_value(&json!({ "id": "" })).unwrap();
        assert_eq!(config.id, None);
    }

    #[test]
    fn builder_validation() {
        assert!(CardConfig::new("a").gain(f64::NAN).validate().is_err());
        assert!(CardConfig::new("a").gain(f64::INFINITY).validate().is_err());
        assert!(CardConfig::new("a").gain(0.0).validate().is_ok());
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ConfigError::NotAnObject.to_string(),
            "card config must be a JSON object"
        );
        assert_eq!(
            ConfigError::OutOfRange {
                field: "gain",
                value: -2.0
            }
            .to_string(),
            "field 'gain' must be a finite number >= 0, got -2"
        );
    }
}
