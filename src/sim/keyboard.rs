//! Keyboard path: discrete activation of items and containers
//!
//! Every outcome the pointer path can reach is reachable here. Container
//! activation goes through the same `RoundState::resolve` as a pointer drop;
//! only the motion differs (a feint instead of a revert on rejection).

use serde::{Deserialize, Serialize};

use super::container::ContainerId;
use super::item::ItemId;
use super::selection::SelectionChange;
use super::state::{AnnounceKind, GameEvent, Modality, Proposal, Resolution, RoundState};

/// Result of activating a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyboardOutcome {
    Resolved(Resolution),
    /// Empty selection; a distinct negative acknowledgment, not an error
    NothingSelected,
    /// Round checked, gesture active, unknown id, or selection still animating
    Ignored,
}

impl RoundState {
    /// Toggle an item in or out of the selection
    pub fn activate_item(&mut self, id: ItemId) -> SelectionChange {
        if !self.accepts_input() || !self.phase.is_idle() {
            log::debug!("Item activation {id} ignored: not idle");
            return SelectionChange::Ignored;
        }
        if self.item(id).is_none() {
            log::warn!("Item activation: unknown item {id}");
            return SelectionChange::Ignored;
        }

        let change = self.selection.toggle(&mut self.items, id, &self.policy);
        match change {
            SelectionChange::Selected(item) => {
                self.emit(GameEvent::ItemAcknowledged { item, selected: true });
                self.announce_selection();
            }
            SelectionChange::Deselected(item) => {
                self.emit(GameEvent::ItemAcknowledged { item, selected: false });
                self.announce_selection();
            }
            SelectionChange::Ignored => {}
        }
        change
    }

    /// Try to place the whole selection into `container`
    pub fn activate_container(&mut self, container: ContainerId) -> KeyboardOutcome {
        if !self.accepts_input() || !self.phase.is_idle() {
            log::debug!("Container activation {container} ignored: not idle");
            return KeyboardOutcome::Ignored;
        }
        if self.container(container).is_none() {
            log::warn!("Container activation: unknown container {container}");
            return KeyboardOutcome::Ignored;
        }
        if self.selection.is_empty() {
            self.emit(GameEvent::NothingSelected { container });
            self.announce(AnnounceKind::Selection, "Nothing selected");
            return KeyboardOutcome::NothingSelected;
        }

        let items = self.selection.items().to_vec();
        if items.iter().any(|&id| self.items[id.index()].dragging) {
            log::debug!("Container activation ignored: selection still animating");
            return KeyboardOutcome::Ignored;
        }

        let proposal = Proposal {
            items,
            container,
            modality: Modality::Keyboard,
        };
        match self.resolve(&proposal) {
            Some(resolution) => {
                if let Resolution::Rejected { .. } = resolution {
                    self.feint_group(&proposal.items, container);
                }
                KeyboardOutcome::Resolved(resolution)
            }
            None => KeyboardOutcome::Ignored,
        }
    }
}
