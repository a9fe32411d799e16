//! Shared types and planning engine for the Kitforge operations platform
//!
//! This crate contains the domain models and the pure material-planning
//! logic (packing-structure parsing, requirement aggregation, BOM
//! explosion, shortage netting and stock-transition math) shared between
//! the backend and other components of the system. It performs no I/O.

pub mod models;
pub mod planning;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
