//! UI element reductions for ThreadState

use serde_json::Value;

use super::Applied;
use crate::events::{PropsMode, UiUpdate};
use crate::models::{Props, ThreadState, UiMetadata};

impl ThreadState {
    /// Upsert a UI element.
    ///
    /// An existing element keeps its position. Replace swaps the whole
    /// record except `id`; an update without a name leaves it empty. Merge
    /// overlays the update's props and metadata. Append concatenates string
    /// props.
    ///
    /// A merge for an unseen id inserts the update as a new element. An
    /// append for an unseen id is only inserted when it names the widget
    /// kind; a bare prop append has nothing to extend and is dropped.
    pub fn apply_ui_update(&mut self, update: UiUpdate) -> Applied {
        let Some(index) = self.ui.iter().position(|u| u.id == update.id) else {
            return self.insert_ui(update);
        };

        let existing = &mut self.ui[index];
        match update.mode {
            PropsMode::Replace => {
                let id = std::mem::take(&mut existing.id);
                *existing = UiUpdate { id, ..update }.into_element();
            }
            PropsMode::Merge => {
                if let Some(name) = update.name {
                    existing.name = name;
                }
                existing.props.extend(update.props);
                overlay_metadata(&mut existing.metadata, update.metadata);
            }
            PropsMode::Append => {
                if let Some(name) = update.name {
                    existing.name = name;
                }
                append_props(&mut existing.props, update.props);
                overlay_metadata(&mut existing.metadata, update.metadata);
            }
        }

        Applied::Ui {
            element: existing.clone(),
            created: false,
        }
    }

    fn insert_ui(&mut self, update: UiUpdate) -> Applied {
        match update.mode {
            PropsMode::Append if update.name.is_none() => {
                tracing::warn!(id = %update.id, "Prop append for unknown UI element, ignoring");
                return Applied::Ignored;
            }
            PropsMode::Merge => {
                tracing::debug!(id = %update.id, "Merge target missing, inserting as new element");
            }
            _ => {}
        }

        let element = update.into_element();
        self.ui.push(element.clone());
        Applied::Ui {
            element,
            created: true,
        }
    }
}

fn overlay_metadata(existing: &mut UiMetadata, update: UiMetadata) {
    if update.merge.is_some() {
        existing.merge = update.merge;
    }
    if update.message_id.is_some() {
        existing.message_id = update.message_id;
    }
    if update.complete.is_some() {
        existing.complete = update.complete;
    }
    existing.extra.extend(update.extra);
}

fn append_props(existing: &mut Props, update: Props) {
    for (key, value) in update {
        let Value::String(suffix) = value else {
            existing.insert(key, value);
            continue;
        };
        let combined = match existing.remove(&key) {
            Some(Value::String(mut current)) => {
                current.push_str(&suffix);
                current
            }
            Some(Value::Null) | None => suffix,
            Some(other) => format!("{}{}", other, suffix),
        };
        existing.insert(key, Value::String(combined));
    }
}
