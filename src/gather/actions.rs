//! Semantic action IDs for gather-screen click targets.

use crate::scene::ActionId;

pub const TOGGLE_GATHER: ActionId = 1;
pub const SAVE_GAME: ActionId = 2;
pub const LOAD_GAME: ActionId = 3;
pub const UPGRADE_CARDS: ActionId = 4;
pub const START_OVER: ActionId = 5;

/// Card buttons: `ACTIVATE_CARD_BASE + slot`.
pub const ACTIVATE_CARD_BASE: ActionId = 1000;
