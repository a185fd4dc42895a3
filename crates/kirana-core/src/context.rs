//! # POS Context
//!
//! Owns every piece of state the point of sale works with and writes
//! changes through to the key-value store.
//!
//! ## State Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         PosContext<S>                                   │
//! │                                                                         │
//! │  ┌──────────┐ ┌────────────┐ ┌──────────────┐ ┌──────┐ ┌───────────┐  │
//! │  │ Catalog  │ │ Customer   │ │ Transaction  │ │ Cart │ │ PosConfig │  │
//! │  │          │ │ Directory  │ │ Log          │ │      │ │           │  │
//! │  └────┬─────┘ └─────┬──────┘ └──────┬───────┘ └──────┘ └───────────┘  │
//! │       │ "products"  │ "customers"   │ "transactions"                   │
//! │       └─────────────┴───────────────┴──────► S: KeyValueStore          │
//! │                                                                         │
//! │  Mutation ──► state change ──► persist ──► PosEvent to subscribers     │
//! │                                   │                                     │
//! │                                   └── failure: error! + needs_flush    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart itself is not persisted; an unfinished sale is lost on restart.
//!
//! Products and customers that fail to decode start out empty. A transaction
//! log that fails to decode is never overwritten: the context keeps running
//! for inventory and lookups, but checkout is refused until the stored log is
//! repaired.

use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, error, info};

use crate::cart::{Cart, CartTotals, CheckoutRequest, ScanOutcome};
use crate::catalog::Catalog;
use crate::config::PosConfig;
use crate::customer::CustomerDirectory;
use crate::error::{CoreError, CoreResult, StoreResult};
use crate::ledger::TransactionLog;
use crate::money::PreciseMoney;
use crate::report::{ReportRange, SalesReport};
use crate::store::{load, load_or_default, save, KeyValueStore, StoreKey};
use crate::types::{Customer, DiscountRate, NewProduct, PaymentMethod, Product, Transaction};

// =============================================================================
// Events
// =============================================================================

/// Notifications delivered to subscribers after a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PosEvent {
    /// Lines, customer or payment method changed.
    CartChanged,
    TransactionCommitted {
        transaction_id: String,
        invoice_number: String,
        total: PreciseMoney,
    },
    /// Stock moved because of a sale.
    StockAdjusted { product_id: String, stock: i64 },
    /// A product was added or edited in inventory.
    ProductSaved { product_id: String },
    /// A product is at or below its reorder threshold.
    LowStock {
        product_id: String,
        name: String,
        stock: i64,
        min_stock: i64,
    },
}

type Subscriber = Box<dyn FnMut(&PosEvent)>;

// =============================================================================
// Context
// =============================================================================

pub struct PosContext<S: KeyValueStore> {
    store: S,
    config: PosConfig,
    catalog: Catalog,
    customers: CustomerDirectory,
    log: TransactionLog,
    cart: Cart,
    subscribers: Vec<Subscriber>,
    needs_flush: bool,
    /// Why the stored log could not be read; writes to it are blocked.
    log_error: Option<String>,
}

impl<S: KeyValueStore> PosContext<S> {
    /// Loads catalog, customers and log from `store`.
    ///
    /// Missing or malformed values start out empty. An unreadable log also
    /// blocks checkout, see [`PosContext::log_error`].
    pub fn load(store: S, config: PosConfig) -> Self {
        let catalog: Catalog = load_or_default(&store, StoreKey::Products);
        let customers: CustomerDirectory = load_or_default(&store, StoreKey::Customers);
        let (log, log_error) = match load::<_, TransactionLog>(&store, StoreKey::Transactions) {
            Ok(log) => (log, None),
            Err(e) => {
                error!(error = %e, "Transaction log unreadable, checkout disabled");
                (TransactionLog::new(), Some(e.to_string()))
            }
        };

        info!(
            products = catalog.len(),
            customers = customers.len(),
            transactions = log.len(),
            "POS context loaded"
        );

        PosContext {
            store,
            cart: Cart::with_payment_method(config.default_payment_method),
            config,
            catalog,
            customers,
            log,
            subscribers: Vec::new(),
            needs_flush: false,
            log_error,
        }
    }

    pub fn config(&self) -> &PosConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn customers(&self) -> &CustomerDirectory {
        &self.customers
    }

    pub fn transactions(&self) -> &TransactionLog {
        &self.log
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Registers a callback for every future [`PosEvent`].
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&PosEvent) + 'static,
    {
        self.subscribers.push(Box::new(callback));
    }

    // =========================================================================
    // Cart
    // =========================================================================

    pub fn add_to_cart(&mut self, product_id: &str) -> CoreResult<()> {
        self.cart.add_line(&self.catalog, product_id)?;
        self.emit(PosEvent::CartChanged);
        Ok(())
    }

    /// Scanner input. On [`ScanOutcome::NoMatch`] the input should be kept as a search term.
    pub fn scan(&mut self, input: &str) -> CoreResult<ScanOutcome> {
        let outcome = self.cart.scan(&self.catalog, input)?;
        if let ScanOutcome::Added { .. } = outcome {
            self.emit(PosEvent::CartChanged);
        }
        Ok(outcome)
    }

    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        self.cart.set_quantity(&self.catalog, product_id, quantity)?;
        self.emit(PosEvent::CartChanged);
        Ok(())
    }

    pub fn remove_line(&mut self, product_id: &str) {
        self.cart.remove_line(product_id);
        self.emit(PosEvent::CartChanged);
    }

    pub fn set_discount(&mut self, product_id: &str, percent: f64) -> Option<DiscountRate> {
        let stored = self.cart.set_discount(product_id, percent)?;
        self.emit(PosEvent::CartChanged);
        Some(stored)
    }

    /// Picks the customer for the sale by id; `None` is walk-in.
    pub fn select_customer(&mut self, customer_id: Option<&str>) -> CoreResult<()> {
        let customer: Option<Customer> = match customer_id {
            Some(id) => Some(self.customers.require(id)?.clone()),
            None => None,
        };
        self.cart.select_customer(customer);
        self.emit(PosEvent::CartChanged);
        Ok(())
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.cart.set_payment_method(method);
        self.emit(PosEvent::CartChanged);
    }

    pub fn totals(&self) -> CoreResult<CartTotals> {
        self.cart.compute_totals(&self.catalog)
    }

    /// Discards the sale in progress.
    pub fn abandon_cart(&mut self) {
        debug!(lines = self.cart.lines().len(), "Cart abandoned");
        self.cart.clear(self.config.default_payment_method);
        self.emit(PosEvent::CartChanged);
    }

    /// Commits the cart at `now` and persists stock and log.
    pub fn checkout(&mut self, now: DateTime<Utc>) -> CoreResult<Transaction> {
        if let Some(reason) = &self.log_error {
            return Err(CoreError::LogUnreadable(reason.clone()));
        }
        let request = CheckoutRequest {
            payment_method: self.cart.payment_method(),
            customer: self.cart.selected_customer().cloned(),
            cashier: &self.config.cashier_name,
            invoice_prefix: &self.config.invoice_prefix,
            default_method: self.config.default_payment_method,
            now,
        };
        let transaction = self.cart.checkout(&mut self.catalog, &mut self.log, request)?;

        self.persist(StoreKey::Products);
        self.persist(StoreKey::Transactions);

        for line in &transaction.lines {
            if let Some(product) = self.catalog.get(&line.product_id) {
                let stock_event = PosEvent::StockAdjusted {
                    product_id: product.id.clone(),
                    stock: product.stock,
                };
                let low = product.is_low_stock().then(|| low_stock_event(product));
                self.emit(stock_event);
                if let Some(event) = low {
                    self.emit(event);
                }
            }
        }

        self.emit(PosEvent::TransactionCommitted {
            transaction_id: transaction.id.clone(),
            invoice_number: transaction.invoice_number.clone(),
            total: transaction.total,
        });
        self.emit(PosEvent::CartChanged);
        Ok(transaction)
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    pub fn add_product(&mut self, new_product: NewProduct) -> CoreResult<Product> {
        let product = self.catalog.add_product(new_product)?.clone();
        self.persist(StoreKey::Products);
        self.after_product_saved(&product);
        Ok(product)
    }

    pub fn update_product(&mut self, product: Product) -> CoreResult<()> {
        self.catalog.update_product(product.clone())?;
        self.persist(StoreKey::Products);
        self.after_product_saved(&product);
        Ok(())
    }

    pub fn low_stock(&self) -> Vec<&Product> {
        self.catalog.low_stock()
    }

    pub fn search_products(&self, term: &str) -> CoreResult<Vec<&Product>> {
        self.catalog.search(term)
    }

    pub fn search_customers(&self, term: &str) -> CoreResult<Vec<&Customer>> {
        self.customers.search(term)
    }

    // =========================================================================
    // Reports
    // =========================================================================

    /// Report for `range` with midnights taken in `now`'s timezone.
    pub fn report<Tz: TimeZone>(&self, range: ReportRange, now: &DateTime<Tz>) -> SalesReport {
        SalesReport::build(
            self.log.transactions(),
            range,
            now,
            self.config.top_products_limit,
        )
    }

    pub fn recent_transactions(&self, limit: usize) -> &[Transaction] {
        self.log.recent(limit)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Whether a previous write failed and the store is behind memory.
    pub fn needs_flush(&self) -> bool {
        self.needs_flush
    }

    /// Reason the stored transaction log could not be loaded, if any.
    pub fn log_error(&self) -> Option<&str> {
        self.log_error.as_deref()
    }

    /// Writes every collection to the store. An unreadable log is left as stored.
    pub fn flush(&mut self) -> StoreResult<()> {
        save(&mut self.store, StoreKey::Products, &self.catalog)?;
        save(&mut self.store, StoreKey::Customers, &self.customers)?;
        if self.log_error.is_none() {
            save(&mut self.store, StoreKey::Transactions, &self.log)?;
        }
        self.needs_flush = false;
        debug!("POS context flushed");
        Ok(())
    }

    fn persist(&mut self, key: StoreKey) {
        if key == StoreKey::Transactions && self.log_error.is_some() {
            return;
        }

        let result = match key {
            StoreKey::Products => save(&mut self.store, key, &self.catalog),
            StoreKey::Customers => save(&mut self.store, key, &self.customers),
            StoreKey::Transactions => save(&mut self.store, key, &self.log),
        };

        if let Err(e) = result {
            error!(key = %key, error = %e, "Failed to persist, will retry on flush");
            self.needs_flush = true;
        }
    }

    fn after_product_saved(&mut self, product: &Product) {
        self.emit(PosEvent::ProductSaved {
            product_id: product.id.clone(),
        });
        if product.is_low_stock() {
            self.emit(low_stock_event(product));
        }
    }

    fn emit(&mut self, event: PosEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
    }
}

fn low_stock_event(product: &Product) -> PosEvent {
    PosEvent::LowStock {
        product_id: product.id.clone(),
        name: product.name.clone(),
        stock: product.stock,
        min_stock: product.min_stock,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::product;
    use crate::error::StoreError;
    use crate::store::MemoryStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn seeded_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        let catalog = Catalog::from_products(vec![
            product("1", 12000, 50, 500),
            product("2", 6500, 6, 500),
        ]);
        let customers = CustomerDirectory::from_customers(vec![Customer {
            id: "1".to_string(),
            name: "Rajesh Kumar".to_string(),
            phone: "9876543210".to_string(),
            email: None,
            address: None,
            loyalty_points: 150,
        }]);
        save(&mut store, StoreKey::Products, &catalog).unwrap();
        save(&mut store, StoreKey::Customers, &customers).unwrap();
        store.take_dirty();
        store
    }

    fn recorder(ctx: &mut PosContext<impl KeyValueStore>) -> Rc<RefCell<Vec<PosEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        ctx.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        events
    }

    /// Accepts reads, rejects writes until `accept` is flipped.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        accept: bool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> StoreResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: String) -> StoreResult<()> {
            if !self.accept {
                return Err(StoreError::Unavailable("disk full".to_string()));
            }
            self.inner.set(key, value)
        }
    }

    #[test]
    fn test_load_from_empty_store() {
        let ctx = PosContext::load(MemoryStore::new(), PosConfig::default());
        assert!(ctx.catalog().is_empty());
        assert!(ctx.customers().is_empty());
        assert!(ctx.transactions().is_empty());
    }

    #[test]
    fn test_checkout_persists_and_notifies() {
        let mut ctx = PosContext::load(seeded_store(), PosConfig::default());
        let events = recorder(&mut ctx);

        ctx.add_to_cart("1").unwrap();
        ctx.set_quantity("1", 2).unwrap();
        ctx.select_customer(Some("1")).unwrap();
        ctx.set_payment_method(PaymentMethod::Card);

        let tx = ctx.checkout(Utc::now()).unwrap();
        assert_eq!(tx.total.round_to_paise().paise(), 25200);
        assert_eq!(tx.cashier, "John Doe");
        assert!(tx.invoice_number.starts_with("INV-"));

        let reloaded = PosContext::load(ctx.into_store(), PosConfig::default());
        assert_eq!(reloaded.catalog().get("1").unwrap().stock, 48);
        assert_eq!(reloaded.transactions().len(), 1);
        assert_eq!(reloaded.recent_transactions(5)[0].payment_method, PaymentMethod::Card);

        let events = events.borrow();
        assert!(events.contains(&PosEvent::StockAdjusted {
            product_id: "1".to_string(),
            stock: 48
        }));
        assert!(events
            .iter()
            .any(|e| matches!(e, PosEvent::TransactionCommitted { .. })));
        assert_eq!(events.last(), Some(&PosEvent::CartChanged));
    }

    #[test]
    fn test_checkout_emits_low_stock() {
        let mut ctx = PosContext::load(seeded_store(), PosConfig::default());
        let events = recorder(&mut ctx);

        ctx.add_to_cart("2").unwrap();
        ctx.checkout(Utc::now()).unwrap();

        assert!(events
            .borrow()
            .iter()
            .any(|e| matches!(e, PosEvent::LowStock { stock: 5, min_stock: 5, .. })));
    }

    #[test]
    fn test_rejected_mutation_emits_nothing() {
        let mut ctx = PosContext::load(seeded_store(), PosConfig::default());
        let events = recorder(&mut ctx);

        assert!(matches!(ctx.checkout(Utc::now()), Err(CoreError::EmptyCart)));
        assert!(matches!(ctx.select_customer(Some("99")), Err(CoreError::CustomerNotFound(_))));
        assert!(ctx.set_discount("1", 10.0).is_none());
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_store_failure_keeps_memory_and_flushes_later() {
        let mut ctx = PosContext::load(FlakyStore::default(), PosConfig::default());
        let saved = ctx
            .add_product(NewProduct {
                name: "Tea - Premium 250g".to_string(),
                barcode: "8901030875426".to_string(),
                price_paise: 18000,
                stock: 15,
                category: "Beverages".to_string(),
                gst_rate_bps: 1200,
                min_stock: 5,
            })
            .unwrap();

        assert!(ctx.needs_flush());
        assert!(ctx.catalog().get(&saved.id).is_some());
        assert!(ctx.flush().is_err());

        ctx.store_mut().accept = true;
        ctx.flush().unwrap();
        assert!(!ctx.needs_flush());
        assert!(ctx.store().inner.get("products").unwrap().is_some());
    }

    #[test]
    fn test_unreadable_log_is_never_overwritten() {
        let mut ctx = PosContext::load(seeded_store(), PosConfig::default());
        ctx.add_to_cart("1").unwrap();
        ctx.checkout(Utc::now()).unwrap();
        ctx.add_to_cart("2").unwrap();
        ctx.checkout(Utc::now()).unwrap();

        let mut store = ctx.into_store();
        let stored = store.get("transactions").unwrap().unwrap();
        let damaged = stored.replacen("\"cash\"", "\"cheque\"", 1);
        assert_ne!(damaged, stored);
        store.set("transactions", damaged.clone()).unwrap();

        let mut ctx = PosContext::load(store, PosConfig::default());
        assert!(ctx.log_error().is_some());
        assert!(ctx.transactions().is_empty());

        ctx.add_to_cart("1").unwrap();
        assert!(matches!(ctx.checkout(Utc::now()), Err(CoreError::LogUnreadable(_))));
        assert_eq!(ctx.catalog().get("1").unwrap().stock, 49);
        assert_eq!(ctx.cart().lines().len(), 1);

        ctx.flush().unwrap();
        assert_eq!(ctx.store().get("transactions").unwrap(), Some(damaged));
    }

    #[test]
    fn test_abandon_cart_resets_selection() {
        let mut config = PosConfig::default();
        config.default_payment_method = PaymentMethod::Upi;
        let mut ctx = PosContext::load(seeded_store(), config);

        ctx.add_to_cart("1").unwrap();
        ctx.set_payment_method(PaymentMethod::Cash);
        ctx.abandon_cart();

        assert!(ctx.cart().is_empty());
        assert_eq!(ctx.cart().payment_method(), PaymentMethod::Upi);
    }

    #[test]
    fn test_report_uses_configured_limit() {
        let mut config = PosConfig::default();
        config.top_products_limit = 1;
        let mut ctx = PosContext::load(seeded_store(), config);

        ctx.add_to_cart("1").unwrap();
        ctx.add_to_cart("2").unwrap();
        let now = Utc::now();
        ctx.checkout(now).unwrap();

        let report = ctx.report(ReportRange::All, &now);
        assert_eq!(report.metrics.transaction_count, 1);
        assert_eq!(report.top_products.len(), 1);
        assert_eq!(report.top_products[0].product_id, "1");
    }

    #[test]
    fn test_scan_no_match_leaves_cart() {
        let mut ctx = PosContext::load(seeded_store(), PosConfig::default());
        assert_eq!(ctx.scan("rice").unwrap(), ScanOutcome::NoMatch);
        assert!(ctx.cart().is_empty());
        assert_eq!(ctx.search_products("Product 2").unwrap().len(), 1);
    }
}
