//! Catalog readers backed by live databases.

pub mod postgres;

pub use postgres::PostgresCatalog;
