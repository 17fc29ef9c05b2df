//! The package catalog database.
//!
//! A catalog is a single SQLite file with three tables:
//!
//! - **packages**: one row per package, keyed by origin
//! - **deps**: declared dependencies, keyed by `(package_id, origin)`
//! - **files**: installed files, keyed by `(package_id, path)`
//!
//! [`CatalogWriter`] builds a catalog from scratch inside a single transaction, and
//! [`Catalog`] reads a committed one.

pub mod catalog;
pub mod error;
pub mod models;
pub mod schema;
pub mod statements;
pub mod writer;

pub use catalog::Catalog;
pub use error::{DbError, Result};
pub use models::{DependencyRow, FileRow, FromRow, PackageRow};
pub use writer::{CatalogStats, CatalogTransaction, CatalogWriter, InsertOutcome};
