//! Layout catalog: card templates grouped by section name.
//!
//! The catalog is a JSON object mapping section names to arrays of template
//! objects. Saved per-card overrides are merged over the templates field by
//! field when a section is selected.

use std::collections::HashMap;

use serde_json::{Map, Value};
use thiserror::Error;

use super::config::{CardConfig, ConfigError};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("layout catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("layout catalog must be an object of section arrays")]
    Shape,
}

#[derive(Debug, Default)]
pub struct TemplateCatalog {
    sections: HashMap<String, Vec<Map<String, Value>>>,
}

impl TemplateCatalog {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let Value::Object(root) = serde_json::from_str::<Value>(json)? else {
            return Err(CatalogError::Shape);
        };
        let mut sections = HashMap::new();
        for (name, entries) in root {
            let Value::Array(items) = entries else {
                log::warn!("catalog section '{name}' is not an array; skipped");
                continue;
            };
            let templates = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(obj) => Some(obj),
                    other => {
                        log::warn!("catalog section '{name}': non-object entry {other} skipped");
                        None
                    }
                })
                .collect();
            sections.insert(name, templates);
        }
        Ok(Self { sections })
    }

    #[cfg(test)]
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Templates of one section with `overrides` applied.
    pub fn section(&self, name: &str, overrides: &Map<String, Value>) -> Option<SectionTemplates> {
        let templates = self.sections.get(name)?;
        Some(SectionTemplates::from_templates(
            templates.iter().cloned(),
            overrides,
        ))
    }
}

/// Resolved templates of one section, keyed by card id and kept in file order.
#[derive(Debug, Clone, Default)]
pub struct SectionTemplates {
    order: Vec<String>,
    by_id: HashMap<String, Map<String, Value>>,
}

impl SectionTemplates {
    /// Templates without a string id, or repeating an earlier id, are skipped.
    pub fn from_templates(
        templates: impl IntoIterator<Item = Map<String, Value>>,
        overrides: &Map<String, Value>,
    ) -> Self {
        let mut section = Self::default();
        for mut template in templates {
            let Some(id) = template.get("id").and_then(Value::as_str).map(str::to_string) else {
                log::warn!("template without an id skipped");
                continue;
            };
            if id.is_empty() || section.by_id.contains_key(&id) {
                log::warn!("template id '{id}' is empty or duplicated; skipped");
                continue;
            }
            if let Some(Value::Object(patch)) = overrides.get(&id) {
                for (key, value) in patch {
                    // The id is the key of the override itself.
                    if key != "id" {
                        template.insert(key.clone(), value.clone());
                    }
                }
            }
            section.order.push(id.clone());
            section.by_id.insert(id, template);
        }
        section
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Template ids in file order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn template(&self, id: &str) -> Option<&Map<String, Value>> {
        self.by_id.get(id)
    }

    /// Whether the template itself marks the card active at startup.
    pub fn starts_active(&self, id: &str) -> bool {
        self.template(id)
            .and_then(|t| t.get("active"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// `None` when there is no template for `id`.
    pub fn config_for(&self, id: &str) -> Option<Result<CardConfig, ConfigError>> {
        self.template(id).map(CardConfig::from_map)
    }
}
