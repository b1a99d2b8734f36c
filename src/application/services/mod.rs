//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem)
//! but are themselves concrete structs, not traits.

mod assets;
mod split;

pub use assets::{AssetPlan, AssetService, FileCopy, EXCLUDED_EXTENSIONS};
pub use split::{SplitOutcome, SplitService};
