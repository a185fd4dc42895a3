//! # Repository Module
//!
//! Database repository implementations for Kirana POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  mirror::hydrate / mirror::flush                                       │
//! │       │                                                                 │
//! │       │  db.kv().load_all() / db.kv().set_many(..)                      │
//! │       ▼                                                                 │
//! │  KvRepository                                                          │
//! │  ├── get / require                                                     │
//! │  ├── set / set_many                                                    │
//! │  ├── delete                                                            │
//! │  └── keys / load_all / updated_at                                      │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database (kv_store)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`kv::KvRepository`] - Key-value documents

pub mod kv;
