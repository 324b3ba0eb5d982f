//! iavldump: read-only inspector for versioned Merkle-tree application stores.
//!
//! The crate provides:
//! - Binary decoders for tree nodes and commit metadata (`codec`, `tree`)
//! - The record key grammar and per-record rendering (`record`)
//! - Store access behind a small trait (`store`)
//! - A full-scan driver (`inspect`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use iavldump::inspect;
//! use iavldump::store::MemoryStore;
//!
//! let mut store = MemoryStore::new();
//! store.insert("s/k:bank/r", vec![0xAB, 0xCD]);
//!
//! let mut out = Vec::new();
//! inspect::dump(&mut store, &mut out).unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "bank:root:\n  root hash : ABCD\n\n");
//! ```

pub mod codec;
pub mod hexfmt;
pub mod inspect;
pub mod record;
pub mod store;
pub mod tree;

#[cfg(feature = "cli")]
pub mod cli;
