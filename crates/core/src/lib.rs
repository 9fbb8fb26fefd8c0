//! Pure building blocks of the Northwind single-table store.
//!
//! Nothing in this crate performs I/O: it defines the entity catalog, the
//! key layout that maps every entity onto one `pk`/`sk`/`data` row, and the
//! storage contract implemented by the `northwind` crate.

pub mod catalog;
pub mod keys;
pub mod storage;
