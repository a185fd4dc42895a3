//! # Configuration
//!
//! Store settings loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`KIRANA_*`)
//! 2. Defaults (this file)
//!
//! Read-only after load; the context keeps its own copy.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::money::{Money, PreciseMoney};
use crate::report::DEFAULT_TOP_PRODUCTS;
use crate::types::PaymentMethod;

/// Point-of-sale configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosConfig {
    /// Store name (shown on invoices)
    pub store_name: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Minor-unit digits of the currency; 2 for paise.
    pub currency_decimals: u8,

    /// Invoice number prefix, e.g. `INV` → `INV-20261015-00001`
    pub invoice_prefix: String,

    /// Payment method a fresh cart starts with
    pub default_payment_method: PaymentMethod,

    /// Length of the top-products list in reports
    pub top_products_limit: usize,

    /// Cashier recorded on every transaction
    pub cashier_name: String,
}

impl Default for PosConfig {
    /// ## Default Values
    /// - Store: "Kirana Store"
    /// - Currency: INR (₹), 2 decimals
    /// - Invoices: `INV-...`
    /// - Payment: cash
    /// - Cashier: "John Doe"
    fn default() -> Self {
        PosConfig {
            store_name: "Kirana Store".to_string(),
            currency_code: "INR".to_string(),
            currency_symbol: "₹".to_string(),
            currency_decimals: 2,
            invoice_prefix: "INV".to_string(),
            default_payment_method: PaymentMethod::Cash,
            top_products_limit: DEFAULT_TOP_PRODUCTS,
            cashier_name: "John Doe".to_string(),
        }
    }
}

impl PosConfig {
    /// Creates a config from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `KIRANA_STORE_NAME`
    /// - `KIRANA_INVOICE_PREFIX`
    /// - `KIRANA_CASHIER`
    /// - `KIRANA_PAYMENT_METHOD` (`cash`, `card`, `upi`)
    /// - `KIRANA_TOP_PRODUCTS` (positive integer)
    pub fn from_env() -> Self {
        PosConfig::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`PosConfig::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = PosConfig::default();

        if let Some(store_name) = lookup("KIRANA_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Some(prefix) = lookup("KIRANA_INVOICE_PREFIX") {
            config.invoice_prefix = prefix;
        }

        if let Some(cashier) = lookup("KIRANA_CASHIER") {
            config.cashier_name = cashier;
        }

        if let Some(method) = lookup("KIRANA_PAYMENT_METHOD") {
            match method.parse::<PaymentMethod>() {
                Ok(method) => config.default_payment_method = method,
                Err(e) => warn!(value = %method, error = %e, "Ignoring KIRANA_PAYMENT_METHOD"),
            }
        }

        if let Some(limit) = lookup("KIRANA_TOP_PRODUCTS") {
            match limit.parse::<usize>() {
                Ok(n) if n > 0 => config.top_products_limit = n,
                _ => warn!(value = %limit, "Ignoring KIRANA_TOP_PRODUCTS"),
            }
        }

        config
    }

    /// Formats an amount with the configured symbol.
    ///
    /// ```rust
    /// use kirana_core::{Money, PosConfig};
    ///
    /// let config = PosConfig::default();
    /// assert_eq!(config.format_currency(Money::from_paise(25200)), "₹252.00");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let minor = amount.paise();
        let divisor = 10_i64.pow(self.currency_decimals as u32);
        let whole = minor / divisor;
        let frac = (minor % divisor).abs();

        format!(
            "{}{}{}",
            if minor < 0 { "-" } else { "" },
            self.currency_symbol,
            if self.currency_decimals > 0 {
                format!(
                    "{}.{:0width$}",
                    whole.abs(),
                    frac,
                    width = self.currency_decimals as usize
                )
            } else {
                whole.abs().to_string()
            }
        )
    }

    /// Rounds to paise, then formats.
    pub fn format_precise(&self, amount: PreciseMoney) -> String {
        self.format_currency(amount.round_to_paise())
    }
}
