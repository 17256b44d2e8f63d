//! # Error Types
//!
//! Domain-specific error types for patungan-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  patungan-core errors (this file)                                      │
//! │  ├── CoreError        - Domain errors (incl. engine lookup failures)   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  patungan-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  Server errors (in app)                                                │
//! │  └── ApiError         - What the frontend sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Frontend     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (participant id, item name, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An item's assignment references a participant that is not on the bill.
    ///
    /// ## When This Occurs
    /// - A bill was persisted with an item still pointing at a removed
    ///   participant
    /// - A caller bypassed bill validation and fed the engine a bill with
    ///   dangling references
    ///
    /// The calculation engine surfaces this instead of silently allocating
    /// the share to nobody, so data-integrity bugs show up at the source.
    #[error("Item '{item_name}' is assigned to unknown participant: {participant_id}")]
    UnknownItemParticipant {
        item_name: String,
        participant_id: String,
    },

    /// A host-split extra was applied but the bill's host id does not match
    /// any participant.
    #[error("Host participant not found: {host_id}")]
    HostNotFound { host_id: String },

    /// Participant cannot be found on the bill.
    #[error("Participant not found: {0}")]
    ParticipantNotFound(String),

    /// Item cannot be found on the bill.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Extra cannot be found on the bill.
    #[error("Extra not found: {0}")]
    ExtraNotFound(String),

    /// The bill's host cannot be removed while still marked as host.
    #[error("Participant {0} is the bill host and cannot be removed")]
    HostRemoval(String),

    /// Bill has exceeded maximum allowed items.
    #[error("Bill cannot have more than {max} items")]
    TooManyItems { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., invalid UUID, malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate participant id).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// A reference to another entity on the bill does not resolve.
    #[error("{field} references unknown {entity}: {id}")]
    UnknownReference {
        field: String,
        entity: String,
        id: String,
    },

    /// Not enough participants to split a bill.
    #[error("A bill needs at least {min} participants")]
    NotEnoughParticipants { min: usize },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::UnknownItemParticipant {
            item_name: "Pizza".to_string(),
            participant_id: "p-404".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Item 'Pizza' is assigned to unknown participant: p-404"
        );

        let err = CoreError::HostNotFound {
            host_id: "p-1".to_string(),
        };
        assert_eq!(err.to_string(), "Host participant not found: p-1");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "title".to_string(),
        };
        assert_eq!(err.to_string(), "title is required");

        let err = ValidationError::NotEnoughParticipants { min: 2 };
        assert_eq!(err.to_string(), "A bill needs at least 2 participants");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "title".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
