//! Core of the `PostKit` app: local credential authentication, persistence of
//! user-authored posts and the incremental feed loader.
//!
//! Everything persists through a [`storage::KeyValueStore`]. Hosts provide the
//! backend (secure storage for credentials, plain storage for posts); this
//! crate ships in-memory, file and sealed (encrypted at rest) implementations.
//!
//! ```
//! use std::sync::Arc;
//!
//! use postkit_core::auth::AuthService;
//! use postkit_core::storage::MemoryStore;
//!
//! tokio_test::block_on(async {
//!     let auth = AuthService::new(Arc::new(MemoryStore::new()));
//!     let outcome = auth.signup("alice@example.com", "hunter2").await.unwrap();
//!     assert!(outcome.success);
//!     assert!(auth.check_auth_status().await.is_authenticated);
//! });
//! ```

pub mod auth;
pub mod feed;
pub mod logger;
pub mod storage;

mod error;
pub use error::*;

mod post;
pub use post::*;

mod post_store;
pub use post_store::*;
