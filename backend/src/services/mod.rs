//! Business logic services

pub mod assignments;
pub mod batches;
pub mod clients;
pub mod deletion;
pub mod inventory;
pub mod kits;
pub mod processing;
pub mod procurement;
pub mod programs;
pub mod vendors;

pub use assignments::AssignmentService;
pub use batches::BatchService;
pub use clients::ClientService;
pub use deletion::DeletionService;
pub use inventory::InventoryService;
pub use kits::KitService;
pub use processing::ProcessingService;
pub use procurement::ProcurementService;
pub use programs::ProgramService;
pub use vendors::VendorService;
