//! Domain models for the Kitforge operations platform

pub mod assignment;
pub mod inventory;
pub mod kit;
pub mod processing;
pub mod shortage;
pub mod vendor;

pub use assignment::*;
pub use inventory::*;
pub use kit::*;
pub use processing::*;
pub use shortage::*;
pub use vendor::*;
