//! hearth-store - The migrated local database for Hearth
//!
//! Holds the application's compiled-in schema catalog and the startup gate
//! around it: [`Store::open`] is the only way to obtain a database handle,
//! and it runs schema migrations before handing one out.

pub mod ddl;
pub mod error;
pub mod store;

pub use ddl::catalog;
pub use error::{StoreError, StoreResult};
pub use store::{history, inspect, Store};
