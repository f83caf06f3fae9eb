//! Shared handle on the floor currently in play.
//!
//! Path queries hold an `Arc` to the floor they started on, so replacing the floor
//! mid-query never exposes a partially rebuilt grid.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::mapgen::GeneratedFloor;
use crate::pathfinding::{PathError, find_path};
use crate::types::Pos;

struct Slot {
    version: u64,
    floor: Arc<GeneratedFloor>,
}

pub struct CurrentFloor {
    slot: RwLock<Slot>,
}

impl CurrentFloor {
    pub fn new(floor: GeneratedFloor) -> Self {
        Self { slot: RwLock::new(Slot { version: 0, floor: Arc::new(floor) }) }
    }

    pub fn snapshot(&self) -> Arc<GeneratedFloor> {
        Arc::clone(&self.slot.read().unwrap_or_else(PoisonError::into_inner).floor)
    }

    /// Bumped once per [`CurrentFloor::replace`].
    pub fn version(&self) -> u64 {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).version
    }

    /// Swaps in a fully generated floor and returns the new version.
    pub fn replace(&self, floor: GeneratedFloor) -> u64 {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        slot.version += 1;
        slot.floor = Arc::new(floor);
        debug!(version = slot.version, seed = slot.floor.seed, "current floor replaced");
        slot.version
    }

    /// Runs [`find_path`] against whichever floor is current when the call starts.
    pub fn find_path(&self, start: Pos, goal: Pos) -> Result<Option<Vec<Pos>>, PathError> {
        let floor = self.snapshot();
        find_path(&floor.grid, start, goal)
    }
}
