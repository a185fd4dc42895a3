//! # kirana-core: Pure Business Logic for Kirana POS
//!
//! Cart pricing with Indian GST, the product catalog, the transaction log
//! and sales reports. No database, network or file access happens here;
//! persistence goes through the [`store::KeyValueStore`] trait.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kirana POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Presentation (web UI, two skins)                │   │
//! │  │    Product grid ──► Cart ──► Checkout ──► Reports ──► Inventory │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ PosContext operations + PosEvent       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kirana-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  money  │ │  cart   │ │ catalog │ │ ledger  │ │ report  │  │   │
//! │  │   │ paise,  │ │ lines,  │ │ stock,  │ │ invoice │ │ ranges, │  │   │
//! │  │   │  GST    │ │checkout │ │ search  │ │ numbers │ │ top-N   │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • KeyValueStore trait at the boundary                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 kirana-db (SQLite key-value store)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer paise and exact sub-paisa amounts
//! - [`types`] - Domain types (Product, Customer, Transaction, rates)
//! - [`error`] - Domain error types
//! - [`validation`] - Inventory and search input rules
//! - [`catalog`] - Products and stock
//! - [`customer`] - Customer directory
//! - [`cart`] - Cart engine and checkout
//! - [`ledger`] - Transaction log and invoice numbers
//! - [`report`] - Date-range sales reports
//! - [`store`] - Key-value persistence seam
//! - [`config`] - Store configuration
//! - [`context`] - Application state owner
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use kirana_core::{MemoryStore, NewProduct, PosConfig, PosContext};
//!
//! let mut pos = PosContext::load(MemoryStore::new(), PosConfig::default());
//! let rice = pos
//!     .add_product(NewProduct {
//!         name: "Rice - Basmati 1kg".to_string(),
//!         barcode: "8901030875421".to_string(),
//!         price_paise: 12000,
//!         stock: 50,
//!         category: "Groceries".to_string(),
//!         gst_rate_bps: 500,
//!         min_stock: 10,
//!     })
//!     .unwrap();
//!
//! pos.add_to_cart(&rice.id).unwrap();
//! pos.set_quantity(&rice.id, 2).unwrap();
//!
//! // ₹240.00 + 5% GST
//! let sale = pos.checkout(Utc::now()).unwrap();
//! assert_eq!(pos.config().format_precise(sale.total), "₹252.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod config;
pub mod context;
pub mod customer;
pub mod error;
pub mod ledger;
pub mod money;
pub mod report;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartTotals, CheckoutRequest, ScanOutcome};
pub use catalog::Catalog;
pub use config::PosConfig;
pub use context::{PosContext, PosEvent};
pub use customer::CustomerDirectory;
pub use error::{CoreError, CoreResult, StoreError, StoreResult, ValidationError};
pub use ledger::TransactionLog;
pub use money::{Money, PreciseMoney};
pub use report::{ReportRange, SalesReport};
pub use store::{KeyValueStore, MemoryStore, StoreKey};
pub use types::*;
