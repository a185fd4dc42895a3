//! # SQLite Mirror
//!
//! Bridges the synchronous `KeyValueStore` the core uses and the async
//! SQLite pool: the context works against a [`MemoryStore`], which is
//! hydrated from `kv_store` at startup and flushed back after mutations.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   SQLite kv_store ──hydrate()──► MemoryStore ──► PosContext::load()    │
//! │         ▲                             │                                 │
//! │         │                             │ set() marks key dirty           │
//! │         └───────flush()───────────────┘                                 │
//! │           one transaction per flush; keys stay dirty on failure        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kirana_core::{MemoryStore, PosConfig, PosContext};
use tracing::{debug, info, warn};

use crate::error::DbResult;
use crate::pool::Database;

/// Loads every stored key into a clean [`MemoryStore`].
pub async fn hydrate(db: &Database) -> DbResult<MemoryStore> {
    let entries = db.kv().load_all().await?;
    debug!(keys = entries.len(), "Hydrating memory store");
    Ok(MemoryStore::from_entries(entries))
}

/// Writes the store's dirty keys to SQLite.
///
/// Returns the number of keys written. On failure the keys are marked
/// dirty again so the next flush retries them.
pub async fn flush(db: &Database, store: &mut MemoryStore) -> DbResult<usize> {
    let dirty = store.take_dirty();
    if dirty.is_empty() {
        return Ok(0);
    }

    match db.kv().set_many(&dirty).await {
        Ok(written) => {
            debug!(keys = written, "Flushed memory store");
            Ok(written)
        }
        Err(e) => {
            warn!(error = %e, keys = dirty.len(), "Flush failed, keeping keys dirty");
            store.mark_dirty(dirty.into_iter().map(|(key, _)| key));
            Err(e)
        }
    }
}

/// Opens a [`PosContext`] over the database contents.
pub async fn open_context(db: &Database, config: PosConfig) -> DbResult<PosContext<MemoryStore>> {
    let store = hydrate(db).await?;
    let context = PosContext::load(store, config);
    info!("POS context opened from database");
    Ok(context)
}

/// Persists a context's pending changes to SQLite.
///
/// If the context itself missed a write it is re-saved in full first.
pub async fn flush_context(db: &Database, context: &mut PosContext<MemoryStore>) -> DbResult<usize> {
    if context.needs_flush() {
        context.flush()?;
    }
    flush(db, context.store_mut()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use chrono::Utc;
    use kirana_core::{CoreError, KeyValueStore, NewProduct, StoreKey};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn milk() -> NewProduct {
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

    #[tokio::test]
    async fn test_empty_database_gives_empty_context() {
        let db = db().await;
        let ctx = open_context(&db, PosConfig::default()).await.unwrap();

        assert!(ctx.catalog().is_empty());
        assert!(ctx.transactions().is_empty());
    }

    #[tokio::test]
    async fn test_sale_survives_reopen() {
        let db = db().await;
        let mut ctx = open_context(&db, PosConfig::default()).await.unwrap();

        let milk = ctx.add_product(milk()).unwrap();
        ctx.add_to_cart(&milk.id).unwrap();
        ctx.set_quantity(&milk.id, 3).unwrap();
        let sale = ctx.checkout(Utc::now()).unwrap();

        assert_eq!(flush_context(&db, &mut ctx).await.unwrap(), 2);
        assert_eq!(flush_context(&db, &mut ctx).await.unwrap(), 0);

        let reopened = open_context(&db, PosConfig::default()).await.unwrap();
        assert_eq!(reopened.catalog().get(&milk.id).unwrap().stock, 27);
        assert_eq!(
            reopened.transactions().find_by_invoice(&sale.invoice_number).unwrap().id,
            sale.id
        );
    }

    #[tokio::test]
    async fn test_failed_flush_keeps_keys_dirty() {
        let db = db().await;
        let mut store = hydrate(&db).await.unwrap();
        store.set(StoreKey::Customers.as_str(), "[]".to_string()).unwrap();

        db.close().await;
        assert!(flush(&db, &mut store).await.is_err());
        assert!(store.is_dirty());
    }

    #[tokio::test]
    async fn test_unreadable_log_row_is_kept() {
        let db = db().await;
        let mut ctx = open_context(&db, PosConfig::default()).await.unwrap();
        let milk = ctx.add_product(milk()).unwrap();
        ctx.add_to_cart(&milk.id).unwrap();
        ctx.checkout(Utc::now()).unwrap();
        flush_context(&db, &mut ctx).await.unwrap();

        let stored = db.kv().get("transactions").await.unwrap().unwrap();
        let damaged = stored.replacen("\"cash\"", "\"cheque\"", 1);
        db.kv().set("transactions", &damaged).await.unwrap();

        let mut ctx = open_context(&db, PosConfig::default()).await.unwrap();
        assert!(ctx.log_error().is_some());
        ctx.add_to_cart(&milk.id).unwrap();
        assert!(matches!(ctx.checkout(Utc::now()), Err(CoreError::LogUnreadable(_))));

        let mut restocked = ctx.catalog().get(&milk.id).unwrap().clone();
        restocked.stock += 10;
        ctx.update_product(restocked).unwrap();
        flush_context(&db, &mut ctx).await.unwrap();
        assert_eq!(db.kv().get("transactions").await.unwrap(), Some(damaged));
    }

    #[tokio::test]
    async fn test_malformed_row_falls_back_to_empty() {
        let db = db().await;
        db.kv().set("products", "not json").await.unwrap();
        db.kv().set("customers", r#"[{"id":"1","name":"Amit Patel","phone":"9876543212"}]"#)
            .await
            .unwrap();

        let ctx = open_context(&db, PosConfig::default()).await.unwrap();
        assert!(ctx.catalog().is_empty());
        assert_eq!(ctx.customers().len(), 1);
    }
}
