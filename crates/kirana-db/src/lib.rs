//! # kirana-db: SQLite Persistence for Kirana POS
//!
//! Stores the core's key-value documents in SQLite using sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kirana POS Data Flow                             │
//! │                                                                         │
//! │  PosContext<MemoryStore> (kirana-core)                                 │
//! │       │  ▲                                                              │
//! │       │  │ hydrate at startup                                           │
//! │       ▼  │                                                              │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kirana-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │ KvRepository  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ (repository/) │    │  (embedded)  │  │   │
//! │  │   └───────────────┘    └───────▲───────┘    └──────────────┘  │   │
//! │  │                                │                               │   │
//! │  │                        ┌───────┴───────┐                       │   │
//! │  │                        │    mirror     │ hydrate / flush       │   │
//! │  │                        └───────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (KIRANA_DB_PATH, default ./kirana.db)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - The `kv_store` repository
//! - [`mirror`] - MemoryStore hydration and flushing
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kirana_core::PosConfig;
//! use kirana_db::{mirror, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()).await?;
//! let mut pos = mirror::open_context(&db, PosConfig::from_env()).await?;
//!
//! pos.scan("8901030875421")?;
//! pos.checkout(chrono::Utc::now())?;
//! mirror::flush_context(&db, &mut pos).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod mirror;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::kv::KvRepository;
