//! Public data models for generated floors and the links between their rooms.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::config::ConnectionStyle;
use crate::pathfinding::reachable_cells;
use crate::types::{Pos, Rect};

use super::grid::WalkGrid;
use super::seed::FloorRng;
use super::tree::{PartitionTree, RegionId};

/// Walkable link created when an internal region's two children were joined.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    pub owner: RegionId,
    pub style: ConnectionStyle,
    /// Inside a room of the owner's first child.
    pub from: Pos,
    /// Inside a room of the owner's second child.
    pub to: Pos,
    /// The arc cell, or the bend of a corridor.
    pub anchor: Pos,
    /// 4-connected run from `from` to `to`, both included.
    pub cells: Vec<Pos>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFloor {
    pub width: usize,
    pub height: usize,
    pub seed: u64,
    pub tree: PartitionTree,
    /// One room per leaf, in the order of [`PartitionTree::leaves`].
    pub rooms: Vec<Rect>,
    pub connectors: Vec<Connector>,
    pub grid: WalkGrid,
}

impl GeneratedFloor {
    pub fn leaf_count(&self) -> usize {
        self.tree.leaves().len()
    }

    /// Index of the room containing `pos`.
    pub fn room_at(&self, pos: Pos) -> Option<usize> {
        self.rooms.iter().position(|room| room.contains(pos))
    }

    /// Random cell of room `room_index` at least one cell away from its walls. Rooms too
    /// thin for that margin yield their centre.
    pub fn spawn_point(&self, room_index: usize, rng: &mut FloorRng) -> Option<Pos> {
        let room = self.rooms.get(room_index)?;
        let x = if room.width >= 3 {
            rng.range_inclusive(room.x + 1, room.right() - 1)
        } else {
            room.center().x
        };
        let y = if room.height >= 3 {
            rng.range_inclusive(room.y + 1, room.bottom() - 1)
        } else {
            room.center().y
        };
        Some(Pos { y, x })
    }

    /// True when every walkable cell can reach every other one.
    pub fn is_fully_connected(&self) -> bool {
        let Some(start) = self.rooms.first().map(|room| room.center()) else {
            return true;
        };
        reachable_cells(&self.grid, start).len() == self.grid.walkable_count()
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.width as u32).to_le_bytes());
        bytes.extend((self.height as u32).to_le_bytes());
        bytes.extend(self.seed.to_le_bytes());

        bytes.extend((self.rooms.len() as u32).to_le_bytes());
        for room in &self.rooms {
            for value in [room.x, room.y, room.width, room.height] {
                bytes.extend(value.to_le_bytes());
            }
        }

        bytes.extend((self.connectors.len() as u32).to_le_bytes());
        for connector in &self.connectors {
            bytes.extend(connector.owner.0.to_le_bytes());
            bytes.push(match connector.style {
                ConnectionStyle::Corridor => 0,
                ConnectionStyle::Arc => 1,
            });
            bytes.extend(connector.anchor.y.to_le_bytes());
            bytes.extend(connector.anchor.x.to_le_bytes());
            bytes.extend((connector.cells.len() as u32).to_le_bytes());
            for cell in &connector.cells {
                bytes.extend(cell.y.to_le_bytes());
                bytes.extend(cell.x.to_le_bytes());
            }
        }

        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                bytes.push(u8::from(self.grid.is_walkable(Pos { y, x })));
            }
        }
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}
