//! # Validation Module
//!
//! Input validation utilities for Patungan.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty title, < 2 participants)               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: API handler (Rust)                                           │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: field rules + whole-bill structural integrity        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Calculation engine                                           │
//! │  └── Assumes a validated bill; fails loudly on dangling references     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine deliberately does NOT re-run these checks; bills reach it
//! through this boundary or from the trusted store.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::Bill;
use crate::{MAX_BILL_ITEMS, MAX_ITEM_QUANTITY, MIN_PARTICIPANTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a bill title.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 120 characters
pub fn validate_bill_title(title: &str) -> ValidationResult<()> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ValidationError::Required {
            field: "title".to_string(),
        });
    }

    if title.len() > 120 {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: 120,
        });
    }

    Ok(())
}

/// Validates a participant display name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 80 characters
pub fn validate_participant_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 80 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 80,
        });
    }

    Ok(())
}

/// Validates an item name.
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "item name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "item name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates an ISO-style currency code ("IDR", "USD", ...).
pub fn validate_currency(currency: &str) -> ValidationResult<()> {
    let currency = currency.trim();

    if currency.is_empty() {
        return Err(ValidationError::Required {
            field: "currency".to_string(),
        });
    }

    if currency.len() > 8 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must be an alphabetic code of at most 8 characters".to_string(),
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// Deliberately loose: the identity provider is the authority; this only
/// rejects obvious garbage before a round-trip.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 254 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 254,
        });
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        });
    }

    Ok(())
}

/// Validates a password at registration time.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.len() < 6 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        });
    }

    if password.len() > 128 {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: 128,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a per-unit price.
///
/// ## Rules
/// - Must be a finite number (NaN/infinity never enter the engine)
/// - Must be non-negative; zero is allowed (free items)
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if price < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates an extra's magnitude.
///
/// The sign of an extra is derived from its type; a stored negative value
/// is always a producer bug.
pub fn validate_extra_value(value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "value".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if value < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "value".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Whole-Bill Validator
// =============================================================================

/// Validates the structural integrity of a bill before it is persisted.
///
/// ## Rules
/// - Title and currency are well-formed
/// - At least MIN_PARTICIPANTS participants, each with a unique id and a
///   valid name
/// - `host_id` resolves to a participant
/// - At most MAX_BILL_ITEMS items; each item well-formed, with every
///   assignee resolving to a participant and listed at most once
/// - Every extra's value is non-negative and finite
///
/// The calculation engine assumes all of this holds (see [`crate::calc`]).
pub fn validate_bill(bill: &Bill) -> ValidationResult<()> {
    validate_bill_title(&bill.title)?;
    validate_currency(&bill.currency)?;

    if bill.participants.len() < MIN_PARTICIPANTS {
        return Err(ValidationError::NotEnoughParticipants {
            min: MIN_PARTICIPANTS,
        });
    }

    let mut participant_ids: HashSet<&str> = HashSet::with_capacity(bill.participants.len());
    for participant in &bill.participants {
        validate_participant_name(&participant.name)?;
        if participant.id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "participant id".to_string(),
            });
        }
        if !participant_ids.insert(participant.id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "participant id".to_string(),
                value: participant.id.clone(),
            });
        }
    }

    if !participant_ids.contains(bill.host_id.as_str()) {
        return Err(ValidationError::UnknownReference {
            field: "hostId".to_string(),
            entity: "participant".to_string(),
            id: bill.host_id.clone(),
        });
    }

    if bill.items.len() > MAX_BILL_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 0,
            max: MAX_BILL_ITEMS as i64,
        });
    }

    for item in &bill.items {
        validate_item_name(&item.name)?;
        validate_quantity(item.quantity)?;
        validate_price(item.price)?;

        let mut seen: HashSet<&str> = HashSet::with_capacity(item.participant_ids.len());
        for assignee in &item.participant_ids {
            if !participant_ids.contains(assignee.as_str()) {
                return Err(ValidationError::UnknownReference {
                    field: "participantIds".to_string(),
                    entity: "participant".to_string(),
                    id: assignee.clone(),
                });
            }
            if !seen.insert(assignee.as_str()) {
                return Err(ValidationError::Duplicate {
                    field: "participantIds".to_string(),
                    value: assignee.clone(),
                });
            }
        }
    }

    for extra in &bill.extras {
        validate_extra_value(extra.value)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Extra, ExtraMode, ExtraSplitMode, ExtraType, Item, Participant};
    use chrono::Utc;

    fn valid_bill() -> Bill {
        let p1 = Participant {
            id: "p-1".to_string(),
            name: "Adi".to_string(),
            avatar_color: "#f94144".to_string(),
        };
        let p2 = Participant {
            id: "p-2".to_string(),
            name: "Budi".to_string(),
            avatar_color: "#f3722c".to_string(),
        };
        Bill {
            id: "bill-1".to_string(),
            title: "Dinner".to_string(),
            date: Utc::now(),
            host_id: "p-1".to_string(),
            participants: vec![p1, p2],
            items: vec![Item {
                id: "i-1".to_string(),
                name: "Pizza".to_string(),
                quantity: 1,
                price: 100000.0,
                participant_ids: vec!["p-1".to_string(), "p-2".to_string()],
            }],
            extras: vec![Extra {
                id: "e-1".to_string(),
                extra_type: ExtraType::Tax,
                mode: ExtraMode::Percentage,
                value: 10.0,
                split_mode: ExtraSplitMode::Proportionally,
            }],
            currency: "IDR".to_string(),
        }
    }

    #[test]
    fn test_validate_bill_title() {
        assert!(validate_bill_title("Dinner at Warung Makan").is_ok());
        assert!(validate_bill_title("").is_err());
        assert!(validate_bill_title("   ").is_err());
        assert!(validate_bill_title(&"A".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(25000.5).is_ok());
        assert!(validate_price(-1.0).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("adi@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("adi@nodot").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret1").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_currency() {
        assert!(validate_currency("IDR").is_ok());
        assert!(validate_currency("usd").is_ok());
        assert!(validate_currency("").is_err());
        assert!(validate_currency("ID-R").is_err());
    }

    #[test]
    fn test_valid_bill_passes() {
        assert!(validate_bill(&valid_bill()).is_ok());
    }

    #[test]
    fn test_bill_needs_two_participants() {
        let mut bill = valid_bill();
        bill.participants.truncate(1);
        bill.items.clear();
        assert!(matches!(
            validate_bill(&bill),
            Err(ValidationError::NotEnoughParticipants { min: 2 })
        ));
    }

    #[test]
    fn test_bill_host_must_exist() {
        let mut bill = valid_bill();
        bill.host_id = "ghost".to_string();
        assert!(matches!(
            validate_bill(&bill),
            Err(ValidationError::UnknownReference { .. })
        ));
    }

    #[test]
    fn test_bill_rejects_duplicate_participant_ids() {
        let mut bill = valid_bill();
        bill.participants[1].id = "p-1".to_string();
        assert!(matches!(
            validate_bill(&bill),
            Err(ValidationError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_bill_rejects_dangling_item_assignee() {
        let mut bill = valid_bill();
        bill.items[0].participant_ids.push("ghost".to_string());
        assert!(matches!(
            validate_bill(&bill),
            Err(ValidationError::UnknownReference { .. })
        ));
    }

    #[test]
    fn test_bill_rejects_negative_extra_value() {
        let mut bill = valid_bill();
        bill.extras[0].value = -5.0;
        assert!(matches!(
            validate_bill(&bill),
            Err(ValidationError::MustBeNonNegative { .. })
        ));
    }

    #[test]
    fn test_unassigned_items_are_structurally_fine() {
        let mut bill = valid_bill();
        bill.items[0].participant_ids.clear();
        assert!(validate_bill(&bill).is_ok());
    }
}
