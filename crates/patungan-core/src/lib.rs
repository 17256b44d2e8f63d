//! # patungan-core: Pure Business Logic for Patungan
//!
//! This crate is the **heart** of Patungan. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Patungan Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (TypeScript)                        │   │
//! │  │   Bill setup ──► Item entry ──► Extras ──► Per-person summary  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    API Server (axum)                            │   │
//! │  │    auth, bill CRUD, calculation, receipt extraction            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ patungan-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   calc    │  │   bill    │  │ validation│  │   │
//! │  │   │   Bill    │  │  engine   │  │  editing  │  │   rules   │  │   │
//! │  │   │   Item    │  │ breakdown │  │    ops    │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    patungan-db (Database Layer)                 │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Bill, Item, Extra, Participant, ...)
//! - [`calc`] - The bill calculation engine
//! - [`bill`] - Bill aggregate editing operations
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: the calculation is deterministic - same bill = same breakdown
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Float Money, No Hidden Rounding**: amounts are f64 currency units;
//!    fractional shares survive until the presentation layer rounds
//! 4. **Explicit Errors**: all errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use patungan_core::{calculate, Bill, Participant};
//!
//! let people = vec![Participant::new("Adi", 0), Participant::new("Budi", 1)];
//! let mut bill = Bill::new("Dinner", Utc::now(), people).unwrap();
//!
//! let item_id = bill.add_item("Pizza", 1, 100000.0).unwrap().id.clone();
//! for pid in bill.participants.iter().map(|p| p.id.clone()).collect::<Vec<_>>() {
//!     bill.toggle_assignment(&item_id, &pid).unwrap();
//! }
//!
//! let breakdown = calculate(&bill).unwrap();
//! assert_eq!(breakdown.grand_total, 100000.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bill;
pub mod calc;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use patungan_core::Bill` instead of
// `use patungan_core::types::Bill`

pub use calc::{calculate, BillCalculation, ItemShare, ParticipantTotal};
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default currency for new bills.
pub const DEFAULT_CURRENCY: &str = "IDR";

/// Minimum participants for a bill to be accepted at the API boundary.
///
/// ## Why here and not in the engine?
/// The engine happily computes one-person (or zero-person) bills; the
/// product rule that splitting needs two people is a boundary concern,
/// enforced by `validation::validate_bill`.
pub const MIN_PARTICIPANTS: usize = 2;

/// Maximum items allowed on a single bill.
///
/// ## Business Reason
/// Prevents runaway bills (and runaway receipt-extraction merges).
pub const MAX_BILL_ITEMS: usize = 100;

/// Maximum quantity of a single item.
///
/// ## Business Reason
/// Prevents accidental over-entry (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Avatar color palette, assigned round-robin as participants join.
pub const AVATAR_COLORS: [&str; 12] = [
    "#f94144", "#f3722c", "#f8961e", "#f9c74f", "#90be6d", "#43aa8b", "#577590", "#ef476f",
    "#ffd166", "#06d6a0", "#118ab2", "#073b4c",
];
