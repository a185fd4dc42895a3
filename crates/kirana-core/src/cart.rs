//! # Cart Engine
//!
//! Owns the in-progress sale: line edits, stock checks, totals and checkout.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Engine Operations                               │
//! │                                                                         │
//! │  User Intent              Operation              Cart State Change      │
//! │  ───────────              ─────────              ─────────────────      │
//! │                                                                         │
//! │  Click product ──────────► add_line() ─────────► push / qty += 1       │
//! │  Scan barcode ───────────► scan() ─────────────► add_line() alias      │
//! │  Change quantity ────────► set_quantity() ─────► qty = n (0 removes)   │
//! │  Change discount % ──────► set_discount() ─────► clamp to 0..=100      │
//! │  Click remove ───────────► remove_line() ──────► retain others         │
//! │  Pay ────────────────────► checkout() ─────────► Transaction + clear   │
//! │                                                                         │
//! │  Every stock check reads the catalog at the moment of the operation.   │
//! │  A failed operation leaves the cart exactly as it was.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::ledger::TransactionLog;
use crate::money::PreciseMoney;
use crate::types::{
    Customer, DiscountRate, LineAmounts, PaymentMethod, Product, Transaction, TransactionLine,
};

/// A line in the cart.
///
/// Holds the product id only; price, GST and stock are always read from
/// the catalog so edits made there are seen immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    /// Always ≥ 1 and ≤ the product's current stock.
    pub quantity: i64,
    pub discount: DiscountRate,
}

/// Cart totals. Exact values; round with `round_to_paise` for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub subtotal: PreciseMoney,
    pub gst_amount: PreciseMoney,
    pub total_discount: PreciseMoney,
    pub total: PreciseMoney,
}

/// What a scan did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Barcode matched; the product was added and the search field should be cleared.
    Added { product_id: String },
    /// No barcode matched; keep the input as a search term.
    NoMatch,
}

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by `product_id`
/// - Every quantity is ≥ 1 and never above the product's stock
/// - Discounts are within 0..=100%
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
    selected_customer: Option<Customer>,
    payment_method: PaymentMethod,
}

impl Cart {
    /// Creates an empty cart paying by cash.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Creates an empty cart with a given default payment method.
    pub fn with_payment_method(payment_method: PaymentMethod) -> Self {
        Cart {
            payment_method,
            ..Cart::default()
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn selected_customer(&self) -> Option<&Customer> {
        self.selected_customer.as_ref()
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Selects the customer for this sale; `None` is walk-in.
    pub fn select_customer(&mut self, customer: Option<Customer>) {
        self.selected_customer = customer;
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    // =========================================================================
    // Line Edits
    // =========================================================================

    /// Adds one unit of a product.
    ///
    /// ## Behavior
    /// - Stock ≤ 0: `OutOfStock`
    /// - Not in cart: new line, quantity 1, no discount
    /// - In cart: `InsufficientStock` if one more would exceed stock,
    ///   otherwise quantity += 1
    pub fn add_line(&mut self, catalog: &Catalog, product_id: &str) -> CoreResult<()> {
        let product = catalog.require(product_id)?;

        if product.is_out_of_stock() {
            return Err(CoreError::OutOfStock {
                product_id: product.id.clone(),
                name: product.name.clone(),
            });
        }

        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                let requested = line.quantity + 1;
                if !product.can_sell(requested) {
                    return Err(insufficient(product, requested));
                }
                line.quantity = requested;
                debug!(product_id = %product_id, quantity = requested, "Cart line incremented");
            }
            None => {
                self.lines.push(CartLine {
                    product_id: product.id.clone(),
                    quantity: 1,
                    discount: DiscountRate::NONE,
                });
                debug!(product_id = %product_id, "Cart line added");
            }
        }

        Ok(())
    }

    /// Barcode-scan shortcut: exact barcode match is an `add_line`.
    ///
    /// Surrounding whitespace is ignored, since scanners terminate each read
    /// with a newline. The barcode itself must match exactly.
    pub fn scan(&mut self, catalog: &Catalog, input: &str) -> CoreResult<ScanOutcome> {
        let Some(product) = catalog.find_by_barcode(input.trim()) else {
            return Ok(ScanOutcome::NoMatch);
        };

        let product_id = product.id.clone();
        self.add_line(catalog, &product_id)?;
        Ok(ScanOutcome::Added { product_id })
    }

    /// Sets a line's quantity exactly.
    ///
    /// ## Behavior
    /// - `quantity ≤ 0`: same as `remove_line`
    /// - `quantity > stock`: `InsufficientStock`
    /// - Product not in cart: nothing to update
    pub fn set_quantity(&mut self, catalog: &Catalog, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            self.remove_line(product_id);
            return Ok(());
        }

        let product = catalog.require(product_id)?;
        if !product.can_sell(quantity) {
            return Err(insufficient(product, quantity));
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity;
            debug!(product_id = %product_id, quantity, "Cart quantity set");
        }
        Ok(())
    }

    /// Removes a line. Absent lines are ignored.
    pub fn remove_line(&mut self, product_id: &str) {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        if self.lines.len() != before {
            debug!(product_id = %product_id, "Cart line removed");
        }
    }

    /// Sets a line's discount, clamping into [0, 100].
    ///
    /// Returns the stored rate, or `None` if the product is not in the cart.
    pub fn set_discount(&mut self, product_id: &str, percent: f64) -> Option<DiscountRate> {
        let line = self.lines.iter_mut().find(|l| l.product_id == product_id)?;
        line.discount = DiscountRate::from_percentage_clamped(percent);
        debug!(product_id = %product_id, discount_bps = line.discount.bps(), "Cart discount set");
        Some(line.discount)
    }

    /// Empties the cart and resets the sale selections.
    pub fn clear(&mut self, default_method: PaymentMethod) {
        self.lines.clear();
        self.selected_customer = None;
        self.payment_method = default_method;
    }

    // =========================================================================
    // Totals
    // =========================================================================

    /// Prices every line against the current catalog.
    ///
    /// Pure: calling it twice without a mutation in between gives equal results.
    pub fn compute_totals(&self, catalog: &Catalog) -> CoreResult<CartTotals> {
        let mut totals = CartTotals::default();

        for line in &self.lines {
            let product = catalog.require(&line.product_id)?;
            let amounts = price_line(product, line);

            totals.line_count += 1;
            totals.total_quantity += line.quantity;
            totals.subtotal += amounts.taxable;
            totals.gst_amount += amounts.tax;
            totals.total_discount += amounts.discount;
        }

        totals.total = totals.subtotal + totals.gst_amount;
        Ok(totals)
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Commits the cart as a transaction.
    ///
    /// ## What This Does
    /// 1. `EmptyCart` if there are no lines
    /// 2. Re-checks every line against current stock (`StockChanged`)
    /// 3. Snapshots lines and totals into a new Transaction
    /// 4. Decrements stock for every line
    /// 5. Appends the Transaction to the log
    /// 6. Clears lines and customer; payment method returns to `default_method`
    ///
    /// Nothing is mutated unless every step can succeed.
    pub fn checkout(
        &mut self,
        catalog: &mut Catalog,
        log: &mut TransactionLog,
        request: CheckoutRequest<'_>,
    ) -> CoreResult<Transaction> {
        if self.lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let mut snapshot = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            let product = catalog.require(&line.product_id)?;
            if !product.can_sell(line.quantity) {
                return Err(CoreError::StockChanged {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    available: product.stock,
                    requested: line.quantity,
                });
            }
            snapshot.push(TransactionLine {
                product_id: product.id.clone(),
                name_snapshot: product.name.clone(),
                barcode_snapshot: product.barcode.clone(),
                unit_price: product.price(),
                gst_rate: product.gst_rate(),
                quantity: line.quantity,
                discount: line.discount,
                amounts: price_line(product, line),
            });
        }

        let subtotal: PreciseMoney = snapshot.iter().map(|l| l.amounts.taxable).sum();
        let gst_amount: PreciseMoney = snapshot.iter().map(|l| l.amounts.tax).sum();
        let discount_amount: PreciseMoney = snapshot.iter().map(|l| l.amounts.discount).sum();

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            invoice_number: log.next_invoice_number(request.invoice_prefix, request.now),
            lines: snapshot,
            customer: request.customer,
            subtotal,
            gst_amount,
            discount_amount,
            total: subtotal + gst_amount,
            payment_method: request.payment_method,
            cashier: request.cashier.to_string(),
            timestamp: request.now,
        };

        log.check_unique(&transaction)?;
        for line in &self.lines {
            catalog.decrement_stock(&line.product_id, line.quantity)?;
        }
        log.append(transaction.clone())?;

        info!(
            invoice = %transaction.invoice_number,
            lines = transaction.lines.len(),
            total = %transaction.total,
            "Checkout complete"
        );

        self.clear(request.default_method);
        Ok(transaction)
    }
}

/// Everything checkout needs besides the cart, catalog and log.
#[derive(Debug, Clone)]
pub struct CheckoutRequest<'a> {
    pub payment_method: PaymentMethod,
    pub customer: Option<Customer>,
    pub cashier: &'a str,
    pub invoice_prefix: &'a str,
    /// Payment method the cleared cart falls back to.
    pub default_method: PaymentMethod,
    pub now: DateTime<Utc>,
}

fn price_line(product: &Product, line: &CartLine) -> LineAmounts {
    LineAmounts::compute(product.price(), line.quantity, line.discount, product.gst_rate())
}

fn insufficient(product: &Product, requested: i64) -> CoreError {
    CoreError::InsufficientStock {
        product_id: product.id.clone(),
        name: product.name.clone(),
        available: product.stock,
        requested,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
