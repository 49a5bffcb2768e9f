//! Estate Database Library
//!
//! Postgres repositories and the row-locking unit of work used by purchases.

pub mod db;

pub use db::*;
