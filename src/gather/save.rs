//! Card progress persistence.
//!
//! Two keys in the key-value store:
//! - `gameState`: JSON array of `{active, id, gain, count}`, one per card.
//! - `savedOverrides`: JSON object mapping card id to partial template fields,
//!   merged over the layout catalog when templates are loaded.
//!
//! Reading is lenient. Unparseable data is ignored, and a field of the wrong
//! type counts as absent so the template value stays.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::scene::SceneHost;
use crate::storage::{KeyValueStore, StoreError};

use super::card::Card;
use super::inventory::RowHost;
use super::list::CardList;

pub const STATE_KEY: &str = "gameState";
pub const OVERRIDES_KEY: &str = "savedOverrides";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to encode save data: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What gets written for each card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardRecord {
    pub active: bool,
    pub id: String,
    pub gain: f64,
    pub count: f64,
}

/// One entry read back from storage. `None` fields were missing or malformed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SavedCard {
    pub id: String,
    pub active: Option<bool>,
    pub gain: Option<f64>,
    pub count: Option<f64>,
}

/// Records for every card with an id, in display order.
pub fn extract_records(list: &CardList) -> Vec<CardRecord> {
    list.cards()
        .filter_map(|card| {
            Some(CardRecord {
                active: card.is_active(),
                id: card.id()?.to_string(),
                gain: card.gain(),
                count: card.count(),
            })
        })
        .collect()
}

/// Write the list's progress. Returns the number of records written.
pub fn save_game(store: &mut dyn KeyValueStore, list: &CardList) -> Result<usize, SaveError> {
    let records = extract_records(list);
    let json = serde_json::to_string(&records)?;
    store.set(STATE_KEY, &json)?;
    log::info!("saved {} cards", records.len());
    Ok(records.len())
}

pub fn parse_records(json: &str) -> Vec<SavedCard> {
    let value: Value = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("save data is not valid JSON; ignored: {e}");
            return Vec::new();
        }
    };
    let Value::Array(items) = value else {
        log::warn!("save data is not a list; ignored");
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            let id = obj.get("id")?.as_str().filter(|id| !id.is_empty())?;
            Some(SavedCard {
                id: id.to_string(),
                active: obj.get("active").and_then(Value::as_bool),
                gain: obj.get("gain").and_then(Value::as_f64),
                count: obj.get("count").and_then(Value::as_f64),
            })
        })
        .collect()
}

pub fn read_records(store: &dyn KeyValueStore) -> Vec<SavedCard> {
    store
        .get(STATE_KEY)
        .map(|json| parse_records(&json))
        .unwrap_or_default()
}

pub fn has_save(store: &dyn KeyValueStore) -> bool {
    store.get(STATE_KEY).is_some()
}

pub fn delete_save(store: &mut dyn KeyValueStore) {
    store.remove(STATE_KEY);
}

/// Apply a saved record to a card. Rejected values are logged and skipped.
pub fn apply_record(card: &mut Card, scene: &mut dyn SceneHost, record: &SavedCard) {
    if let Some(gain) = record.gain {
        if let Err(e) = card.set_gain(scene, gain) {
            log::warn!("saved gain for '{}' ignored: {e}", record.id);
        }
    }
    if let Some(count) = record.count {
        if let Err(e) = card.set_count(count) {
            log::warn!("saved count for '{}' ignored: {e}", record.id);
        }
    }
    if record.active == Some(true) {
        card.set_active();
    }
}

/// Apply override fields that a live card can take: `gain`, `gainLabel` and
/// `count`. Anything else waits until templates are next loaded.
pub fn apply_changes(card: &mut Card, scene: &mut dyn SceneHost, changes: &Map<String, Value>) {
    if let Some(gain) = changes.get("gain").and_then(Value::as_f64) {
        if let Err(e) = card.set_gain(scene, gain) {
            log::warn!("gain change ignored: {e}");
        }
    }
    if let Some(label) = changes.get("gainLabel").and_then(Value::as_str) {
        card.set_gain_label(scene, label);
    }
    if let Some(count) = changes.get("count").and_then(Value::as_f64) {
        if let Err(e) = card.set_count(count) {
            log::warn!("count change ignored: {e}");
        }
    }
}

/// Rehydrate saved progress. Cards already in the list are updated; saved
/// active cards not yet in the list are activated from their templates.
/// Cards without a record are left untouched. Returns the records applied.
pub fn load_game(
    store: &dyn KeyValueStore,
    list: &mut CardList,
    scene: &mut dyn SceneHost,
    rows: &mut dyn RowHost,
) -> usize {
    let mut applied = 0;
    for record in read_records(store) {
        let found = if list.get_card_by_id(&record.id).is_some() {
            list.update_card_by_id(scene, &record.id, |card, scene| {
                apply_record(card, scene, &record)
            })
        } else if record.active == Some(true) {
            match list.activate_card(scene, &record.id, rows) {
                Some(card) => {
                    apply_record(card, scene, &record);
                    true
                }
                None => false,
            }
        } else {
            false
        };
        if found {
            applied += 1;
        }
    }
    applied
}

/// Startup restore. Walks the templates in catalog order and activates each
/// card the template or the save marks active, then applies its saved values.
pub fn restore_session(
    store: &dyn KeyValueStore,
    list: &mut CardList,
    scene: &mut dyn SceneHost,
    rows: &mut dyn RowHost,
) -> usize {
    let saved: HashMap<String, SavedCard> = read_records(store)
        .into_iter()
        .map(|r| (r.id.clone(), r))
        .collect();
    let Some(templates) = list.templates() else {
        log::error!("cannot restore session: templates not loaded");
        return 0;
    };
    let to_activate: Vec<String> = templates
        .ids()
        .filter(|id| {
            templates.starts_active(id)
                || saved.get(*id).is_some_and(|r| r.active == Some(true))
        })
        .map(str::to_string)
        .collect();

    let mut applied = 0;
    for id in to_activate {
        let Some(card) = list.activate_card(scene, &id, rows) else {
            continue;
        };
        if let Some(record) = saved.get(&id) {
            apply_record(card, scene, record);
            applied += 1;
        }
    }
    applied
}

/// Saved template overrides; empty when absent or malformed.
pub fn load_overrides(store: &dyn KeyValueStore) -> Map<String, Value> {
    let Some(json) = store.get(OVERRIDES_KEY) else {
        return Map::new();
    };
    match serde_json::from_str::<Value>(&json) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            log::warn!("saved overrides are not an object; ignored");
            Map::new()
        }
        Err(e) => {
            log::warn!("saved overrides are not valid JSON; ignored: {e}");
            Map::new()
        }
    }
}

/// Merge `changes` into the stored override for `id`; later writes win per field.
pub fn update_override(
    store: &mut dyn KeyValueStore,
    id: &str,
    changes: &Map<String, Value>,
) -> Result<(), SaveError> {
    let mut overrides = load_overrides(store);
    let entry = overrides
        .entry(id.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(fields) = entry {
        for (key, value) in changes {
            fields.insert(key.clone(), value.clone());
        }
    }
    let json = serde_json::to_string(&overrides)?;
    store.set(OVERRIDES_KEY, &json)?;
    Ok(())
}
