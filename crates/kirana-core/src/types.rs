//! # Domain Types
//!
//! Core domain types used throughout Kirana POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  Transaction    │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id (UUID)      │   │  id             │       │
//! │  │  barcode        │   │  invoice_number │   │  name, phone    │       │
//! │  │  price_paise    │   │  lines (frozen) │   │  loyalty_points │       │
//! │  │  stock          │   │  totals         │   └─────────────────┘       │
//! │  │  gst_rate_bps   │   └─────────────────┘                             │
//! │  │  min_stock      │                                                    │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    TaxRate      │   │  DiscountRate   │   │ PaymentMethod   │       │
//! │  │  bps (u32)      │   │  bps, clamped   │   │  Cash           │       │
//! │  │  500 = 5% GST   │   │  to 0..=10000   │   │  Card           │       │
//! │  └─────────────────┘   └─────────────────┘   │  Upi            │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A [`Transaction`] copies name, price and GST rate of every product it
//! sells into its [`TransactionLine`]s. Editing a product later never
//! changes a historical invoice.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{Money, PreciseMoney, BPS_SCALE};

// =============================================================================
// Tax Rate
// =============================================================================

/// GST rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 500 bps = 5% and 1800 bps = 18%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Discount Rate
// =============================================================================

/// A per-line discount in basis points, always within 0..=10000.
///
/// Out-of-range input is clamped, never rejected: `-10%` becomes `0%` and
/// `150%` becomes `100%`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// No discount.
    pub const NONE: DiscountRate = DiscountRate(0);

    /// Clamps a percentage into [0, 100] and stores it in basis points.
    /// `NaN` is treated as no discount.
    ///
    /// ```rust
    /// use kirana_core::DiscountRate;
    ///
    /// assert_eq!(DiscountRate::from_percentage_clamped(-10.0).bps(), 0);
    /// assert_eq!(DiscountRate::from_percentage_clamped(12.5).bps(), 1250);
    /// assert_eq!(DiscountRate::from_percentage_clamped(150.0).bps(), 10_000);
    /// ```
    pub fn from_percentage_clamped(pct: f64) -> Self {
        if pct.is_nan() {
            return DiscountRate::NONE;
        }
        let clamped = pct.clamp(0.0, 100.0);
        DiscountRate((clamped * 100.0).round() as u32)
    }

    /// Clamps basis points to at most 10000.
    pub fn from_bps_clamped(bps: u32) -> Self {
        DiscountRate(bps.min(BPS_SCALE as u32))
    }

    /// Returns the discount in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the discount as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Line Pricing
// =============================================================================

/// Exact pricing of one line: `gross → discount → taxable → tax`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineAmounts {
    /// `unit_price × quantity`.
    pub gross: Money,
    /// `gross × discount / 100`.
    pub discount: PreciseMoney,
    /// `gross − discount`.
    pub taxable: PreciseMoney,
    /// `taxable × gst / 100`.
    pub tax: PreciseMoney,
}

impl LineAmounts {
    /// Prices a line.
    ///
    /// ```rust
    /// use kirana_core::{DiscountRate, LineAmounts, Money, TaxRate};
    ///
    /// // 2 × Basmati ₹120 at 5% GST, no discount
    /// let line = LineAmounts::compute(Money::from_paise(12000), 2, DiscountRate::NONE, TaxRate::from_bps(500));
    /// assert_eq!(line.gross.paise(), 24000);
    /// assert_eq!(line.tax.round_to_paise().paise(), 1200);
    /// ```
    pub fn compute(unit_price: Money, quantity: i64, discount: DiscountRate, gst: TaxRate) -> Self {
        let gross = unit_price.multiply_quantity(quantity);
        let gross_precise = PreciseMoney::from_money(gross);
        let discount_amount = gross_precise.apply_bps(discount.bps());
        let taxable = gross_precise - discount_amount;
        let tax = taxable.apply_bps(gst.bps());

        LineAmounts {
            gross,
            discount: discount_amount,
            taxable,
            tax,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier.
    pub id: String,

    /// Display name shown to cashier and on the invoice.
    pub name: String,

    /// Barcode (EAN-13 etc.), unique across the catalog.
    pub barcode: String,

    /// Price in paise.
    pub price_paise: i64,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// Free-form category ("Groceries", "Dairy", ...).
    pub category: String,

    /// GST rate in basis points (500 = 5%).
    pub gst_rate_bps: u32,

    /// Reorder threshold; at or below this the product is low on stock.
    pub min_stock: i64,
}

impl Product {
    /// Returns the price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_paise(self.price_paise)
    }

    /// Returns the GST rate.
    #[inline]
    pub fn gst_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.gst_rate_bps)
    }

    /// No units left to sell.
    #[inline]
    pub fn is_out_of_stock(&self) -> bool {
        self.stock <= 0
    }

    /// Stock is at or below the reorder threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }

    /// Checks whether `quantity` units can be sold from current stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity <= self.stock
    }
}

/// Input for creating a product; the catalog assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub barcode: String,
    pub price_paise: i64,
    pub stock: i64,
    pub category: String,
    pub gst_rate_bps: u32,
    pub min_stock: i64,
}

impl NewProduct {
    /// Attaches an id.
    pub fn into_product(self, id: String) -> Product {
        Product {
            id,
            name: self.name,
            barcode: self.barcode,
            price_paise: self.price_paise,
            stock: self.stock,
            category: self.category,
            gst_rate_bps: self.gst_rate_bps,
            min_stock: self.min_stock,
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer known to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub loyalty_points: u32,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a transaction was paid. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash payment.
    #[default]
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// UPI transfer.
    Upi,
}

impl PaymentMethod {
    /// Every method, in display order.
    pub const ALL: [PaymentMethod; 3] = [PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::Upi];

    /// Wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "upi" => Ok(PaymentMethod::Upi),
            _ => Err(ValidationError::NotAllowed {
                field: "payment method".to_string(),
                allowed: PaymentMethod::ALL.iter().map(|m| m.as_str().to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A line of a committed transaction.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionLine {
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Barcode at time of sale (frozen).
    pub barcode_snapshot: String,
    /// Unit price at time of sale (frozen).
    pub unit_price: Money,
    /// GST rate at time of sale (frozen).
    pub gst_rate: TaxRate,
    pub quantity: i64,
    pub discount: DiscountRate,
    pub amounts: LineAmounts,
}

impl TransactionLine {
    /// Revenue for reporting: snapshot price × quantity.
    #[inline]
    pub fn revenue(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// A committed sale. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transaction {
    /// Internal identifier (UUID v4).
    pub id: String,
    /// Human-facing unique number, e.g. `INV-20261015-00001`.
    pub invoice_number: String,
    pub lines: Vec<TransactionLine>,
    /// `None` is the walk-in customer.
    pub customer: Option<Customer>,
    /// Σ taxable amounts.
    pub subtotal: PreciseMoney,
    /// Σ line GST.
    pub gst_amount: PreciseMoney,
    /// Σ line discounts.
    pub discount_amount: PreciseMoney,
    /// `subtotal + gst_amount`.
    pub total: PreciseMoney,
    pub payment_method: PaymentMethod,
    /// Cashier who rang the sale.
    pub cashier: String,
    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Total units sold.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Display name of the customer, "Walk-in" when none was selected.
    pub fn customer_name(&self) -> &str {
        self.customer.as_ref().map_or("Walk-in", |c| c.name.as_str())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
