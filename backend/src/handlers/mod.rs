//! HTTP request handlers

pub mod assignments;
pub mod batches;
pub mod clients;
pub mod deletion;
pub mod health;
pub mod inventory;
pub mod kits;
pub mod processing;
pub mod procurement;
pub mod programs;
pub mod vendors;

pub use assignments::*;
pub use batches::*;
pub use clients::*;
pub use deletion::*;
pub use health::*;
pub use inventory::*;
pub use kits::*;
pub use processing::*;
pub use procurement::*;
pub use programs::*;
pub use vendors::*;
