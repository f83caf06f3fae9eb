//! Procedural floor generation split into coherent submodules.

pub mod model;
pub mod tree;

mod connect;
mod generator;
mod grid;
mod rooms;
mod seed;

pub use connect::representative_point;
pub use generator::MapGenerator;
pub use grid::{CellCountMismatch, WalkGrid};
pub use model::{Connector, GeneratedFloor};
pub use rooms::carve_room;
pub use seed::{FloorRng, derive_floor_seed};
pub use tree::{PartitionTree, Region, RegionId, SplitAxis};

use crate::config::{ConfigError, FloorConfig};

pub fn generate_floor(config: &FloorConfig, seed: u64) -> Result<GeneratedFloor, ConfigError> {
    Ok(MapGenerator::new(config.clone())?.generate(seed))
}
