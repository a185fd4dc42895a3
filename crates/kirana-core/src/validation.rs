//! # Validation Module
//!
//! Input validation for inventory edits and searches.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation (web UI)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Catalog (Rust)                                               │
//! │  ├── THIS MODULE: field rules                                          │
//! │  └── Barcode uniqueness (catalog.rs)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kirana_core::validation::{validate_barcode, validate_gst_rate_bps};
//!
//! validate_barcode("8901030875421").unwrap();
//! validate_gst_rate_bps(1800).unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::NewProduct;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_BARCODE_LEN: usize = 32;
const MAX_CATEGORY_LEN: usize = 50;
const MAX_QUERY_LEN: usize = 100;

/// Highest accepted unit price: ₹1,000,00,00,000.00.
pub const MAX_PRICE_PAISE: i64 = 1_000_000_000_000;

/// Highest accepted stock count or reorder threshold.
///
/// `MAX_PRICE_PAISE × MAX_STOCK_UNITS` stays within `i64`, so no line a
/// cart can hold overflows when priced.
pub const MAX_STOCK_UNITS: i64 = 1_000_000;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a barcode.
///
/// ## Rules
/// - Must not be empty
/// - At most 32 characters
/// - Only ASCII letters, digits and hyphens (EAN/UPC or in-store codes)
///
/// ```rust
/// use kirana_core::validation::validate_barcode;
///
/// assert!(validate_barcode("8901030875421").is_ok());
/// assert!(validate_barcode("LOOSE-RICE").is_ok());
/// assert!(validate_barcode("").is_err());
/// assert!(validate_barcode("89 01").is_err());
/// ```
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.len() > MAX_BARCODE_LEN {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: MAX_BARCODE_LEN,
        });
    }

    if !barcode.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only letters, digits and hyphens".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name: non-empty, at most 200 characters.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a category: non-empty, at most 50 characters.
pub fn validate_category(category: &str) -> ValidationResult<()> {
    let category = category.trim();

    if category.is_empty() {
        return Err(ValidationError::Required {
            field: "category".to_string(),
        });
    }

    if category.chars().count() > MAX_CATEGORY_LEN {
        return Err(ValidationError::TooLong {
            field: "category".to_string(),
            max: MAX_CATEGORY_LEN,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns everything)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_QUERY_LEN,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in paise: `0..=MAX_PRICE_PAISE`. Zero is allowed (free items).
///
/// ```rust
/// use kirana_core::validation::validate_price_paise;
///
/// assert!(validate_price_paise(12000).is_ok());
/// assert!(validate_price_paise(0).is_ok());
/// assert!(validate_price_paise(-100).is_err());
/// assert!(validate_price_paise(i64::MAX).is_err());
/// ```
pub fn validate_price_paise(paise: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_PAISE).contains(&paise) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_PAISE,
        });
    }

    Ok(())
}

/// Validates a stock count or reorder threshold: `0..=MAX_STOCK_UNITS`.
pub fn validate_stock_level(field: &str, units: i64) -> ValidationResult<()> {
    if !(0..=MAX_STOCK_UNITS).contains(&units) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_STOCK_UNITS,
        });
    }

    Ok(())
}

/// Validates a GST rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
/// - Indian slabs are 0, 500, 1200, 1800, 2800 but any rate is accepted
pub fn validate_gst_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "gst_rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates every field of a product form.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    validate_barcode(&product.barcode)?;
    validate_category(&product.category)?;
    validate_price_paise(product.price_paise)?;
    validate_stock_level("stock", product.stock)?;
    validate_stock_level("min_stock", product.min_stock)?;
    validate_gst_rate_bps(product.gst_rate_bps)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> NewProduct {
        NewProduct {
            name: "Milk - Full Cream 1L".to_string(),
            barcode: "8901030875422".to_string(),
            price_paise: 6500,
            stock: 30,
            category: "Dairy".to_string(),
            gst_rate_bps: 500,
            min_stock: 5,
        }
    }

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("8901030875421").is_ok());
        assert!(validate_barcode("   ").is_err());
        assert!(validate_barcode("abc!").is_err());
        assert!(validate_barcode(&"1".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Sugar - White 1kg").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_search_query_trims() {
        assert_eq!(validate_search_query("  rice ").unwrap(), "rice");
        assert!(validate_search_query(&"q".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_gst_rate_bps() {
        assert!(validate_gst_rate_bps(0).is_ok());
        assert!(validate_gst_rate_bps(2800).is_ok());
        assert!(validate_gst_rate_bps(10_000).is_ok());
        assert!(validate_gst_rate_bps(10_001).is_err());
    }

    #[test]
    fn test_validate_new_product() {
        assert!(validate_new_product(&form()).is_ok());

        let mut negative_stock = form();
        negative_stock.stock = -1;
        assert!(matches!(
            validate_new_product(&negative_stock),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "stock"
        ));

        let mut huge_price = form();
        huge_price.price_paise = i64::MAX / 2 + 1;
        assert!(matches!(
            validate_new_product(&huge_price),
            Err(ValidationError::OutOfRange { ref field, max: MAX_PRICE_PAISE, .. }) if field == "price"
        ));

        let mut huge_stock = form();
        huge_stock.stock = MAX_STOCK_UNITS + 1;
        assert!(validate_new_product(&huge_stock).is_err());

        let mut at_limits = form();
        at_limits.price_paise = MAX_PRICE_PAISE;
        at_limits.stock = MAX_STOCK_UNITS;
        assert!(validate_new_product(&at_limits).is_ok());

        let mut no_category = form();
        no_category.category = String::new();
        assert!(validate_new_product(&no_category).is_err());
    }
}
