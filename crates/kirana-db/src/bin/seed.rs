//! # Seed Data Generator
//!
//! Populates the database with the sample kirana catalog and customers.
//!
//! ## Usage
//! ```bash
//! # Seed ./kirana.db (or $KIRANA_DB_PATH)
//! cargo run -p kirana-db --bin seed
//!
//! # Specify database path and record one demo sale
//! cargo run -p kirana-db --bin seed -- --db ./data/kirana.db --demo-sale
//! ```
//!
//! Logging follows `RUST_LOG`, defaulting to `info,kirana=debug,sqlx=warn`.

use chrono::Utc;
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kirana_core::store::{load_or_default, save};
use kirana_core::{
    Catalog, Customer, CustomerDirectory, NewProduct, PaymentMethod, PosConfig, PosContext,
    StoreKey,
};
use kirana_db::{mirror, Database, DbConfig};

const DEFAULT_LOG_FILTER: &str = "info,kirana=debug,sqlx=warn";

/// (name, barcode, price in paise, stock, category, GST bps, reorder level)
const PRODUCTS: &[(&str, &str, i64, i64, &str, u32, i64)] = &[
    ("Rice - Basmati 1kg", "8901030875421", 12000, 50, "Groceries", 500, 10),
    ("Milk - Full Cream 1L", "8901030875422", 6500, 30, "Dairy", 500, 5),
    ("Bread - White Loaf", "8901030875423", 3500, 25, "Bakery", 500, 5),
    ("Cooking Oil - Sunflower 1L", "8901030875424", 14000, 20, "Groceries", 500, 8),
    ("Sugar - White 1kg", "8901030875425", 4500, 40, "Groceries", 500, 10),
    ("Tea - Premium 250g", "8901030875426", 18000, 15, "Beverages", 1200, 5),
    ("Soap - Bathing Bar", "8901030875427", 2500, 60, "Personal Care", 1800, 15),
    ("Biscuits - Digestive 200g", "8901030875428", 5500, 35, "Snacks", 1200, 10),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_config = DbConfig::from_env();
    let mut demo_sale = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--demo-sale" => demo_sale = true,
            "--help" | "-h" => {
                println!("Kirana POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $KIRANA_DB_PATH or ./kirana.db)");
                println!("      --demo-sale    Record one sample checkout after seeding");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let db = Database::new(db_config).await?;
    let mut store = mirror::hydrate(&db).await?;

    let existing: Catalog = load_or_default(&store, StoreKey::Products);
    if !existing.is_empty() {
        warn!(
            products = existing.len(),
            "Database already has products, skipping seed (delete the file to regenerate)"
        );
        return Ok(());
    }

    save(&mut store, StoreKey::Customers, &CustomerDirectory::from_customers(customers()))?;
    let mut pos = PosContext::load(store, PosConfig::from_env());

    let mut first_id = None;
    for &(name, barcode, price_paise, stock, category, gst_rate_bps, min_stock) in PRODUCTS {
        let product = pos.add_product(NewProduct {
            name: name.to_string(),
            barcode: barcode.to_string(),
            price_paise,
            stock,
            category: category.to_string(),
            gst_rate_bps,
            min_stock,
        })?;
        first_id.get_or_insert(product.id);
    }
    info!(products = pos.catalog().len(), customers = pos.customers().len(), "Catalog seeded");

    if let (true, Some(rice)) = (demo_sale, first_id) {
        pos.add_to_cart(&rice)?;
        pos.set_quantity(&rice, 2)?;
        pos.select_customer(Some("1"))?;
        pos.set_payment_method(PaymentMethod::Upi);
        let sale = pos.checkout(Utc::now())?;
        info!(
            invoice = %sale.invoice_number,
            total = %pos.config().format_precise(sale.total),
            "Demo sale recorded"
        );
    }

    let written = mirror::flush_context(&db, &mut pos).await?;
    info!(keys = written, "Seed complete");

    db.close().await;
    Ok(())
}

fn customers() -> Vec<Customer> {
    vec![
        Customer {
            id: "1".to_string(),
            name: "Rajesh Kumar".to_string(),
            phone: "9876543210".to_string(),
            email: Some("rajesh@email.com".to_string()),
            address: Some("123 MG Road, Bangalore".to_string()),
            loyalty_points: 150,
        },
        Customer {
            id: "2".to_string(),
            name: "Priya Sharma".to_string(),
            phone: "9876543211".to_string(),
            email: Some("priya@email.com".to_string()),
            address: Some("456 Park Street, Mumbai".to_string()),
            loyalty_points: 75,
        },
        Customer {
            id: "3".to_string(),
            name: "Amit Patel".to_string(),
            phone: "9876543212".to_string(),
            email: None,
            address: None,
            loyalty_points: 200,
        },
    ]
}
