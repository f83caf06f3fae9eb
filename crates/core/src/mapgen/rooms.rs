//! Inscribes one room inside every leaf of the partition tree.

use crate::types::Rect;

use super::seed::FloorRng;
use super::tree::{PartitionTree, RegionId};

/// Picks a room inside `leaf` leaving at least one cell of margin on every side.
///
/// Sizes are drawn from `[room_min_dim, side - 2]`, then the origin is drawn so
/// the margin holds. Leaves too small for `room_min_dim` get a room that fills
/// their interior; leaves with no interior at all get a single centred cell.
pub fn carve_room(leaf: Rect, room_min_dim: i32, rng: &mut FloorRng) -> Rect {
    let width = room_side(leaf.width, room_min_dim, rng);
    let height = room_side(leaf.height, room_min_dim, rng);
    let x = room_origin(leaf.x, leaf.width, width, rng);
    let y = room_origin(leaf.y, leaf.height, height, rng);
    Rect { x, y, width, height }
}

fn room_side(leaf_side: i32, room_min_dim: i32, rng: &mut FloorRng) -> i32 {
    let interior = leaf_side - 2;
    if interior < 1 {
        return 1;
    }
    if interior <= room_min_dim {
        return interior;
    }
    rng.range_inclusive(room_min_dim, interior)
}

fn room_origin(leaf_start: i32, leaf_side: i32, room_side: i32, rng: &mut FloorRng) -> i32 {
    if leaf_side - 2 < 1 {
        return leaf_start + (leaf_side - 1).max(0) / 2;
    }
    rng.range_inclusive(leaf_start + 1, leaf_start + leaf_side - room_side - 1)
}

/// Descends from `id`, carving a room in every leaf. Internal regions never hold a room.
pub fn carve_rooms(tree: &mut PartitionTree, id: RegionId, room_min_dim: i32, rng: &mut FloorRng) {
    match tree.region(id).children {
        Some((first, second)) => {
            carve_rooms(tree, first, room_min_dim, rng);
            carve_rooms(tree, second, room_min_dim, rng);
        }
        None => {
            let room = carve_room(tree.region(id).bounds, room_min_dim, rng);
            tree.region_mut(id).room = Some(room);
        }
    }
}
