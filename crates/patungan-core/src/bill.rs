//! # Bill Editing
//!
//! Mutation operations on the [`Bill`] aggregate.
//!
//! ## Editing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Bill Editing Operations                              │
//! │                                                                         │
//! │  Frontend Action          Operation                Bill Change          │
//! │  ───────────────          ─────────                ───────────          │
//! │                                                                         │
//! │  Add person ─────────────► add_participant() ────► participants.push   │
//! │                                                                         │
//! │  Add dish ───────────────► add_item() ───────────► items.push          │
//! │                                                                         │
//! │  Change quantity ────────► update_item_quantity()► items[i].qty = n    │
//! │                            (0 removes the item)                         │
//! │                                                                         │
//! │  Tap avatar on item ─────► toggle_assignment() ──► participant_ids ±id │
//! │                                                                         │
//! │  Add tax/discount ───────► add_extra() ──────────► extras.push         │
//! │                                                                         │
//! │  Scan receipt ───────────► merge_receipt_lines() ► items.extend(new)   │
//! │                                                                         │
//! │  All operations leave the bill structurally valid; the engine never    │
//! │  sees a half-applied edit.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::types::{Bill, Extra, ExtraMode, ExtraSplitMode, ExtraType, Item, Participant, ReceiptLine};
use crate::validation::{
    validate_bill_title, validate_extra_value, validate_item_name, validate_participant_name,
    validate_price, validate_quantity,
};
use crate::{DEFAULT_CURRENCY, MAX_BILL_ITEMS, MAX_ITEM_QUANTITY};

impl Bill {
    /// Creates a new bill hosted by the first participant.
    ///
    /// The caller supplies the date; this crate never reads the clock.
    /// Currency defaults to [`DEFAULT_CURRENCY`] and can be changed on the
    /// returned value.
    pub fn new(
        title: impl Into<String>,
        date: DateTime<Utc>,
        participants: Vec<Participant>,
    ) -> CoreResult<Self> {
        let title = title.into();
        validate_bill_title(&title)?;

        let host_id = participants
            .first()
            .map(|p| p.id.clone())
            .ok_or_else(|| CoreError::ParticipantNotFound("(empty bill)".to_string()))?;

        Ok(Bill {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            date,
            host_id,
            participants,
            items: Vec::new(),
            extras: Vec::new(),
            currency: DEFAULT_CURRENCY.to_string(),
        })
    }

    // =========================================================================
    // Participants
    // =========================================================================

    /// Adds a participant, assigning the next avatar color in the palette.
    pub fn add_participant(&mut self, name: &str) -> CoreResult<&Participant> {
        validate_participant_name(name)?;

        let participant = Participant::new(name.trim(), self.participants.len());
        self.participants.push(participant);
        Ok(self.participants.last().expect("just pushed"))
    }

    /// Removes a participant and strips them from every item assignment.
    ///
    /// ## Behavior
    /// - The host cannot be removed while still marked as host
    /// - Items they shared stay on the bill; their share flows back to the
    ///   remaining assignees (or the item becomes unassigned)
    pub fn remove_participant(&mut self, participant_id: &str) -> CoreResult<()> {
        if participant_id == self.host_id {
            return Err(CoreError::HostRemoval(participant_id.to_string()));
        }

        let initial_len = self.participants.len();
        self.participants.retain(|p| p.id != participant_id);
        if self.participants.len() == initial_len {
            return Err(CoreError::ParticipantNotFound(participant_id.to_string()));
        }

        for item in &mut self.items {
            item.participant_ids.retain(|id| id != participant_id);
        }
        Ok(())
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Adds a manually entered item (unassigned until someone claims it).
    pub fn add_item(&mut self, name: &str, quantity: i64, price: f64) -> CoreResult<&Item> {
        validate_item_name(name)?;
        validate_quantity(quantity)?;
        validate_price(price)?;

        if self.items.len() >= MAX_BILL_ITEMS {
            return Err(CoreError::TooManyItems {
                max: MAX_BILL_ITEMS,
            });
        }

        self.items.push(Item::new(name.trim(), quantity, price));
        Ok(self.items.last().expect("just pushed"))
    }

    /// Updates the quantity of an item.
    ///
    /// ## Behavior
    /// - Quantity 0 removes the item
    /// - Item not found returns an error
    pub fn update_item_quantity(&mut self, item_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(item_id);
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }
        validate_quantity(quantity)?;

        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;
        item.quantity = quantity;
        Ok(())
    }

    /// Removes an item from the bill.
    pub fn remove_item(&mut self, item_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.id != item_id);

        if self.items.len() == initial_len {
            Err(CoreError::ItemNotFound(item_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Toggles whether a participant shares an item.
    ///
    /// Returns `true` when the participant now shares the item, `false`
    /// when the toggle removed them.
    pub fn toggle_assignment(&mut self, item_id: &str, participant_id: &str) -> CoreResult<bool> {
        if !self.has_participant(participant_id) {
            return Err(CoreError::ParticipantNotFound(participant_id.to_string()));
        }

        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;

        if let Some(pos) = item.participant_ids.iter().position(|id| id == participant_id) {
            item.participant_ids.remove(pos);
            Ok(false)
        } else {
            item.participant_ids.push(participant_id.to_string());
            Ok(true)
        }
    }

    /// Merges extracted receipt candidates into the bill as fresh,
    /// unassigned items.
    ///
    /// Returns the number of items appended. Either every line fits and is
    /// valid, or nothing is merged.
    pub fn merge_receipt_lines(&mut self, lines: Vec<ReceiptLine>) -> CoreResult<usize> {
        if self.items.len() + lines.len() > MAX_BILL_ITEMS {
            return Err(CoreError::TooManyItems {
                max: MAX_BILL_ITEMS,
            });
        }

        for line in &lines {
            validate_item_name(&line.name)?;
            validate_quantity(line.quantity)?;
            validate_price(line.price)?;
        }

        let appended = lines.len();
        self.items.extend(lines.into_iter().map(ReceiptLine::into_item));
        Ok(appended)
    }

    // =========================================================================
    // Extras
    // =========================================================================

    /// Adds a surcharge or discount.
    pub fn add_extra(
        &mut self,
        extra_type: ExtraType,
        mode: ExtraMode,
        value: f64,
        split_mode: ExtraSplitMode,
    ) -> CoreResult<&Extra> {
        validate_extra_value(value)?;

        self.extras.push(Extra::new(extra_type, mode, value, split_mode));
        Ok(self.extras.last().expect("just pushed"))
    }

    /// Removes an extra from the bill.
    pub fn remove_extra(&mut self, extra_id: &str) -> CoreResult<()> {
        let initial_len = self.extras.len();
        self.extras.retain(|e| e.id != extra_id);

        if self.extras.len() == initial_len {
            Err(CoreError::ExtraNotFound(extra_id.to_string()))
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
