//! Pure material-planning engine
//!
//! Everything in this module is a function of in-memory snapshots: the
//! backend loads assignments, kits, inventory, vendors and jobs, calls
//! in here, and persists whatever comes back. Shortage aggregation is
//! cheaply re-derivable on every read, so nothing is cached.

pub mod accumulator;
pub mod explosion;
pub mod jobs;
pub mod requirements;
pub mod shortage;

pub use accumulator::{RequirementAccumulator, ShortageEntry};
pub use explosion::{explode, InventoryIndex};
pub use jobs::{source_shortfalls, SourceShortfall};
pub use requirements::{
    aggregate_by_name, dispatch_components_for_kit, requirements_for_kit_instance,
    RequiredMaterial,
};
pub use shortage::{aggregate_shortages, ShortageInputs};
