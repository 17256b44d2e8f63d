//! # Domain Types
//!
//! Core domain types used throughout Patungan.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Bill       │   │      Item       │   │     Extra       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  title, date    │   │  name           │   │  type (Tax,..)  │       │
//! │  │  host_id        │──►│  quantity       │   │  mode (%/fixed) │       │
//! │  │  participants   │   │  price (unit)   │   │  value          │       │
//! │  │  items, extras  │   │  participant_ids│   │  split_mode     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Participant   │   │      User       │   │   ReceiptLine   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id, name       │   │  id, name       │   │  name           │       │
//! │  │  avatar_color   │   │  email          │   │  quantity       │       │
//! │  └─────────────────┘   └─────────────────┘   │  price (unit)   │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## JSON Compatibility
//! Field names serialize as camelCase and enum variants as their PascalCase
//! names, so stored bills and API payloads are byte-compatible with the
//! TypeScript frontend's data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

// =============================================================================
// Participant
// =============================================================================

/// A person taking part in a bill.
///
/// Immutable once referenced by items or extras, except for removal
/// (see [`crate::bill`] for the editing rules).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Participant {
    /// Unique identifier within the bill.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Avatar background color (hex), assigned from a fixed palette.
    pub avatar_color: String,
}

impl Participant {
    /// Creates a participant with a fresh id, picking an avatar color from
    /// the palette by position (the `index`-th participant on the bill).
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Participant {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            avatar_color: crate::AVATAR_COLORS[index % crate::AVATAR_COLORS.len()].to_string(),
        }
    }
}

// =============================================================================
// Item
// =============================================================================

/// A purchased line item on a bill.
///
/// `price` is always per-unit. `participant_ids` holds the participants the
/// item is shared between; an empty set means the item is not yet billed to
/// anyone and contributes nothing to any subtotal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Item {
    /// Unique identifier within the bill.
    pub id: String,

    /// Display name shown on the bill and in per-person breakdowns.
    pub name: String,

    /// Quantity purchased (>= 1).
    pub quantity: i64,

    /// Price per unit, in currency units.
    pub price: f64,

    /// Participants sharing this item. Order is irrelevant.
    pub participant_ids: Vec<String>,
}

impl Item {
    /// Creates an unassigned item with a fresh id.
    pub fn new(name: impl Into<String>, quantity: i64, price: f64) -> Self {
        Item {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            quantity,
            price,
            participant_ids: Vec::new(),
        }
    }

    /// The full line cost (`price * quantity`).
    #[inline]
    pub fn line_total(&self) -> f64 {
        self.price * self.quantity as f64
    }

    /// Whether the item has been assigned to at least one participant.
    #[inline]
    pub fn is_assigned(&self) -> bool {
        !self.participant_ids.is_empty()
    }

    /// Whether `participant_id` shares this item.
    pub fn is_shared_with(&self, participant_id: &str) -> bool {
        self.participant_ids.iter().any(|id| id == participant_id)
    }
}

// =============================================================================
// Extras
// =============================================================================

/// The kind of surcharge or discount applied on top of the item subtotal.
///
/// A closed set: the original product defines exactly these four and the
/// calculation only distinguishes `Discount` (subtractive) from the rest
/// (additive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ExtraType {
    Tax,
    Service,
    Delivery,
    Discount,
}

impl ExtraType {
    /// Whether this kind reduces the bill instead of adding to it.
    #[inline]
    pub fn is_discount(&self) -> bool {
        matches!(self, ExtraType::Discount)
    }
}

/// How an extra's `value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ExtraMode {
    /// `value` is a percentage of the bill subtotal.
    Percentage,
    /// `value` is a fixed amount in currency units.
    Fixed,
}

/// Policy for distributing an extra's amount across participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ExtraSplitMode {
    /// Every participant pays the same share.
    Equally,
    /// Shares are weighted by each participant's item subtotal.
    Proportionally,
    /// The bill host absorbs the whole amount.
    Host,
}

/// A surcharge or discount applied on top of the item subtotal.
///
/// `value` is always non-negative; whether the amount adds or subtracts is
/// derived from `extra_type == Discount`, never stored as a sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Extra {
    /// Unique identifier within the bill.
    pub id: String,

    /// Kind of extra (tax, service, delivery, discount).
    #[serde(rename = "type")]
    #[ts(rename = "type")]
    pub extra_type: ExtraType,

    /// Interpretation of `value` (percentage vs fixed amount).
    pub mode: ExtraMode,

    /// Non-negative magnitude (percent points or currency units).
    pub value: f64,

    /// Distribution policy across participants.
    pub split_mode: ExtraSplitMode,
}

impl Extra {
    /// Creates an extra with a fresh id.
    pub fn new(extra_type: ExtraType, mode: ExtraMode, value: f64, split_mode: ExtraSplitMode) -> Self {
        Extra {
            id: Uuid::new_v4().to_string(),
            extra_type,
            mode,
            value,
            split_mode,
        }
    }

    /// Resolves the signed amount this extra contributes to the bill.
    ///
    /// Percentage extras resolve against `bill_subtotal`; fixed extras are
    /// taken verbatim. Discounts come back negated.
    pub fn resolve_amount(&self, bill_subtotal: f64) -> f64 {
        let amount = match self.mode {
            ExtraMode::Percentage => bill_subtotal * (self.value / 100.0),
            ExtraMode::Fixed => self.value,
        };

        if self.extra_type.is_discount() {
            -amount
        } else {
            amount
        }
    }
}

// =============================================================================
// Bill
// =============================================================================

/// The aggregate of participants, items, and extras being split.
///
/// ## Invariants
/// - `host_id` matches one of `participants`
/// - participant ids are unique within the bill
/// - items/extras only reference participants on the bill
///
/// The persistence layer and API boundary uphold these (see
/// [`crate::validation::validate_bill`]); the calculation engine assumes
/// them and fails loudly when they don't hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Bill {
    /// Unique identifier. Unsaved bills carry a `temp_`-prefixed id until
    /// the store assigns a real one.
    pub id: String,

    /// Display title ("Dinner at Warung Makan").
    pub title: String,

    /// When the bill happened. Stored, displayed, never used in calculation.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    /// The participant who may absorb host-split extras.
    pub host_id: String,

    /// Ordered list of participants.
    pub participants: Vec<Participant>,

    /// Ordered list of items.
    pub items: Vec<Item>,

    /// Ordered list of extras.
    pub extras: Vec<Extra>,

    /// ISO currency code ("IDR", "USD", ...).
    pub currency: String,
}

impl Bill {
    /// Looks up a participant by id.
    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// The host participant, if `host_id` resolves.
    pub fn host(&self) -> Option<&Participant> {
        self.participant(&self.host_id)
    }

    /// Whether `id` belongs to a participant on this bill.
    pub fn has_participant(&self, id: &str) -> bool {
        self.participant(id).is_some()
    }

    /// Whether this bill has been persisted yet (store-assigned id).
    pub fn is_saved(&self) -> bool {
        !self.id.starts_with("temp_")
    }
}

// =============================================================================
// User
// =============================================================================

/// An authenticated account, as produced by the identity layer.
///
/// Irrelevant to calculation; bills are owned by a user but the engine never
/// sees one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

// =============================================================================
// Receipt Line
// =============================================================================

/// A candidate line item produced by the receipt extractor.
///
/// `price` is per-unit; the extractor normalizes any "total for the line"
/// representation before building one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: i64,
    pub price: f64,
}

impl ReceiptLine {
    /// Converts the candidate into a bill item with a fresh id and no
    /// assignees, indistinguishable from a manually entered item.
    pub fn into_item(self) -> Item {
        Item {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            quantity: self.quantity,
            price: self.price,
            participant_ids: Vec::new(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
