use std::collections::BTreeSet;

use serde_derive::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
    Idle,
    Selecting,
}

/// Admin bulk-action selection: idle until something is toggled, back to idle once the
/// last id is deselected or the selection is cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SelectionMode {
    #[default]
    Idle,
    Selecting(BTreeSet<Uuid>),
}

impl SelectionMode {
    pub fn toggle(&mut self, image_id: Uuid) {
        match self {
            SelectionMode::Idle => {
                *self = SelectionMode::Selecting(BTreeSet::from([image_id]));
            }
            SelectionMode::Selecting(selected) => {
                if !selected.remove(&image_id) {
                    selected.insert(image_id);
                }
                if selected.is_empty() {
                    *self = SelectionMode::Idle;
                }
            }
        }
    }

    pub fn clear(&mut self) {
        *self = SelectionMode::Idle;
    }

    /// Drops ids that no longer exist locally.
    pub fn forget(&mut self, image_ids: &[Uuid]) {
        if let SelectionMode::Selecting(selected) = self {
            for image_id in image_ids {
                selected.remove(image_id);
            }
            if selected.is_empty() {
                *self = SelectionMode::Idle;
            }
        }
    }

    pub fn selected(&self) -> Vec<Uuid> {
        match self {
            SelectionMode::Idle => Vec::new(),
            SelectionMode::Selecting(selected) => selected.iter().copied().collect(),
        }
    }

    pub fn kind(&self) -> SelectionKind {
        match self {
            SelectionMode::Idle => SelectionKind::Idle,
            SelectionMode::Selecting(_) => SelectionKind::Selecting,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_moves_between_idle_and_selecting() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let mut mode = SelectionMode::default();
        assert_eq!(mode.kind(), SelectionKind::Idle);

        mode.toggle(a);
        mode.toggle(b);
        assert_eq!(mode.kind(), SelectionKind::Selecting);
        assert_eq!(mode.selected().len(), 2);

        mode.toggle(a);
        assert_eq!(mode.selected(), vec![b]);

        mode.toggle(b);
        assert_eq!(mode, SelectionMode::Idle);
    }

    #[test]
    fn forgetting_every_selected_id_returns_to_idle() {
        let a = Uuid::now_v7();
        let mut mode = SelectionMode::default();
        mode.toggle(a);
        mode.forget(&[a]);
        assert_eq!(mode, SelectionMode::Idle);
    }
}
