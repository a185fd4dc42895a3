//! # Error Types
//!
//! Domain-specific error types for kirana-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kirana-core errors (this file)                                        │
//! │  ├── CoreError        - Rejected cart/catalog/log operations           │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── StoreError       - Key-value store failures                       │
//! │                                                                         │
//! │  kirana-db errors (separate crate)                                     │
//! │  └── DbError          - SQLite operation failures                      │
//! │                                                                         │
//! │  Every CoreError is a rejected operation: state is left unchanged      │
//! │  and the presentation layer decides how to show it.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Each variant blocks one operation and leaves cart, catalog and log
/// exactly as they were.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product has zero stock at add time.
    #[error("{name} is out of stock")]
    OutOfStock { product_id: String, name: String },

    /// Requested quantity exceeds available stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart has 3 × Tea, stock is 3
    ///      │
    ///      ▼
    /// add_line("tea")
    ///      │
    ///      ▼
    /// InsufficientStock { available: 3, requested: 4 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 Tea - Premium 250g in stock"
    /// ```
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        name: String,
        available: i64,
        requested: i64,
    },

    /// Checkout attempted with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Stock dropped below a cart quantity between the edit and checkout.
    #[error("Stock for {name} changed: available {available}, in cart {requested}")]
    StockChanged {
        product_id: String,
        name: String,
        available: i64,
        requested: i64,
    },

    /// Product cannot be found in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Customer cannot be found in the directory.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// A transaction with this id or invoice number is already in the log.
    #[error("Duplicate transaction: {0}")]
    DuplicateTransaction(String),

    /// The stored transaction log could not be read, so no sale may be
    /// appended over it.
    #[error("Transaction log is unreadable: {0}")]
    LogUnreadable(String),

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

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., non-digit barcode).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., duplicate barcode).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Store Error
// =============================================================================

/// Failures of the key-value store behind [`crate::store::KeyValueStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A value could not be encoded or decoded.
    #[error("Stored value for '{key}' is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for Results with StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
