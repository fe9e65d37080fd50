//! A single card: title, description, gain text and an optional action button.
//!
//! The card owns its visuals (all under one root group) and the resource
//! counter it accrues. When bound to an inventory row, every count change is
//! mirrored into that row.

use std::cell::RefCell;
use std::fmt;
use std::rc::Weak;

use crate::scene::{ActionId, SceneHost, VisualId, VisualKind, VisualProps, VisualStyle};

use super::config::{validate_amount, CardConfig, ConfigError};
use super::inventory::InventoryRow;

/// Custom activation behaviour. Replaces the default `count += gain`.
pub type ActionHook = Box<dyn FnMut(&mut Card)>;

/// `"+{gain} {label}"`, pluralised with a trailing "s" when gain exceeds one.
pub fn format_gain_text(gain: f64, label: &str) -> String {
    if gain > 1.0 {
        format!("+{gain} {label}s")
    } else {
        format!("+{gain} {label}")
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CardVisuals {
    pub root: VisualId,
    pub background: VisualId,
    pub title: VisualId,
    pub description: VisualId,
    pub gain_text: VisualId,
    pub button: Option<VisualId>,
}

pub struct Card {
    id: Option<String>,
    title: String,
    description: String,
    gain_label: String,
    button_label: Option<String>,
    gain: f64,
    count: f64,
    active: bool,
    target_row: Option<Weak<RefCell<InventoryRow>>>,
    on_action: Option<ActionHook>,
    visuals: CardVisuals,
    x: f64,
    y: f64,
}

impl Card {
    /// Validate `config` and create the card's visuals under `parent`.
    /// The button, if any, dispatches `action` when tapped.
    pub fn build(
        scene: &mut dyn SceneHost,
        parent: VisualId,
        width: f64,
        height: f64,
        config: CardConfig,
        action: ActionId,
    ) -> Result<Card, ConfigError> {
        config.validate()?;
        let button_label = config.effective_button_label().map(str::to_string);

        let root = scene.create_visual(VisualKind::Group, VisualProps::at(Some(parent), 0.0, 0.0));
        let background = scene.create_visual(
            VisualKind::Rect,
            VisualProps::at(Some(root), 0.0, 0.0)
                .size(width, height)
                .style(VisualStyle::CardBackground),
        );
        let inner = (width - 4.0).max(1.0);
        let title = scene.create_visual(
            VisualKind::Text,
            VisualProps::at(Some(root), 1.0, 1.0)
                .size((width - 2.0).max(1.0), 1.0)
                .text(config.title.as_str())
                .style(VisualStyle::CardTitle)
                .centered(),
        );
        // Rows between the title and the gain line; the last two rows hold the
        // button and the bottom border.
        let desc_rows = (height - 5.0).max(1.0);
        let description = scene.create_visual(
            VisualKind::Text,
            VisualProps::at(Some(root), 2.0, 2.0)
                .size(inner, desc_rows)
                .text(config.description.as_str())
                .style(VisualStyle::Body),
        );
        let gain_text = scene.create_visual(
            VisualKind::Text,
            VisualProps::at(Some(root), 2.0, 2.0 + desc_rows)
                .size(inner, 1.0)
                .text(format_gain_text(config.gain, &config.gain_label))
                .style(VisualStyle::Gain),
        );
        let button = button_label.as_deref().map(|label| {
            let w = label.chars().count() as f64 + 2.0;
            let id = scene.create_visual(
                VisualKind::Button,
                VisualProps::at(Some(root), ((width - w) / 2.0).floor().max(1.0), height - 2.0)
                    .size(w, 1.0)
                    .text(label)
                    .style(VisualStyle::Button),
            );
            scene.on_pointer(id, action);
            id
        });

        Ok(Card {
            id: config.id,
            title: config.title,
            description: config.description,
            gain_label: config.gain_label,
            button_label,
            gain: config.gain,
            count: config.count,
            active: config.active,
            target_row: None,
            on_action: config.on_action,
            visuals: CardVisuals {
                root,
                background,
                title,
                description,
                gain_text,
                button,
            },
            x: 0.0,
            y: 0.0,
        })
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    #[cfg(test)]
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn count(&self) -> f64 {
        self.count
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn gain_label(&self) -> &str {
        &self.gain_label
    }

    #[cfg(test)]
    pub fn button_label(&self) -> Option<&str> {
        self.button_label.as_deref()
    }

    pub fn gain_text(&self) -> String {
        format_gain_text(self.gain, &self.gain_label)
    }

    #[cfg(test)]
    pub fn visuals(&self) -> &CardVisuals {
        &self.visuals
    }

    /// Position inside the list's scroll container.
    #[cfg(test)]
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn set_position(&mut self, scene: &mut dyn SceneHost, x: f64, y: f64) {
        self.x = x;
        self.y = y;
        scene.set_position(self.visuals.root, x, y);
    }

    /// Run the card's action: the custom hook when present, otherwise accrue
    /// `gain` into `count`.
    pub fn activate(&mut self) {
        match self.on_action.take() {
            Some(mut hook) => {
                hook(self);
                self.on_action = Some(hook);
            }
            None => {
                self.count += self.gain;
                self.mirror_count();
            }
        }
        log::debug!(
            "Gathering {} Count: {}",
            format_gain_text(self.gain, &self.gain_label),
            self.count
        );
    }

    pub fn set_gain(&mut self, scene: &mut dyn SceneHost, gain: f64) -> Result<(), ConfigError> {
        self.gain = validate_amount("gain", gain)?;
        scene.set_text(self.visuals.gain_text, &self.gain_text());
        Ok(())
    }

    pub fn set_gain_label(&mut self, scene: &mut dyn SceneHost, label: impl Into<String>) {
        self.gain_label = label.into();
        scene.set_text(self.visuals.gain_text, &self.gain_text());
    }

    pub fn set_count(&mut self, count: f64) -> Result<(), ConfigError> {
        self.count = validate_amount("count", count)?;
        self.mirror_count();
        Ok(())
    }

    /// Activation is one-way; a card never becomes inactive again.
    pub fn set_active(&mut self) {
        self.active = true;
    }

    /// Link an inventory row. The row immediately shows the current count.
    pub fn bind_row(&mut self, row: Weak<RefCell<InventoryRow>>) {
        self.target_row = Some(row);
        self.mirror_count();
    }

    /// True while a bound row is still alive.
    pub fn has_target_row(&self) -> bool {
        self.target_row
            .as_ref()
            .is_some_and(|row| row.strong_count() > 0)
    }

    fn mirror_count(&self) {
        if let Some(row) = self.target_row.as_ref().and_then(Weak::upgrade) {
            row.borrow_mut().set_count(self.count);
        }
    }

    /// Remove every visual the card created.
    pub fn destroy(self, scene: &mut dyn SceneHost) {
        scene.destroy(self.visuals.root);
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Card")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("gain", &self.gain)
            .field("count", &self.count)
            .field("active", &self.active)
            .field("position", &(self.x, self.y))
            .finish_non_exhaustive()
    }
}
