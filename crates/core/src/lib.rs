//! Procedural floor generation by binary space partition, plus grid A* for navigating
//! the result.
//!
//! [`generate_floor`] partitions the map, carves a room per leaf, links sibling
//! subtrees and derives a [`WalkGrid`]. [`find_path`] answers start/goal queries on
//! any grid. Both are deterministic for a given seed.

pub mod config;
pub mod mapgen;
pub mod pathfinding;
pub mod snapshot;
pub mod types;

pub use config::{ConfigError, ConnectionStyle, FloorConfig, FloorConfigFile};
pub use mapgen::{
    Connector, FloorRng, GeneratedFloor, MapGenerator, PartitionTree, RegionId, WalkGrid,
    derive_floor_seed, generate_floor,
};
pub use pathfinding::{PathError, find_path, reachable_cells};
pub use snapshot::CurrentFloor;
pub use types::{Pos, Rect};
