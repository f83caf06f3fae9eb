//! Arena-backed binary space partition over the floor rectangle.
//!
//! Regions live in one `Vec` and refer to each other by [`RegionId`]. A region
//! with children is exactly tiled by them; a region without children is a leaf
//! and is the only kind of region that ever receives a room.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::types::{Pos, Rect};

use super::seed::FloorRng;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionId(pub u32);

impl RegionId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Orientation of the cut that produced a region's children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitAxis {
    /// Vertical cut line: the width is divided, first child is on the left.
    Vertical,
    /// Horizontal cut line: the height is divided, first child is on top.
    Horizontal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub bounds: Rect,
    pub parent: Option<RegionId>,
    pub children: Option<(RegionId, RegionId)>,
    pub split: Option<SplitAxis>,
    pub room: Option<Rect>,
    /// Arc cells recorded when this region's two children were linked.
    pub arcs: Vec<Pos>,
}

impl Region {
    fn leaf(bounds: Rect, parent: Option<RegionId>) -> Self {
        Self { bounds, parent, children: None, split: None, room: None, arcs: Vec::new() }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionTree {
    regions: Vec<Region>,
}

impl PartitionTree {
    pub fn new(bounds: Rect) -> Self {
        Self { regions: vec![Region::leaf(bounds, None)] }
    }

    pub fn root(&self) -> RegionId {
        RegionId(0)
    }

    pub fn region(&self, id: RegionId) -> &Region {
        &self.regions[id.index()]
    }

    pub(super) fn region_mut(&mut self, id: RegionId) -> &mut Region {
        &mut self.regions[id.index()]
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn is_leaf(&self, id: RegionId) -> bool {
        self.region(id).is_leaf()
    }

    /// Leaves in pre-order, first child before second.
    pub fn leaves(&self) -> Vec<RegionId> {
        self.leaves_within(self.root())
    }

    pub fn leaves_within(&self, id: RegionId) -> Vec<RegionId> {
        let mut leaves = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            match self.region(current).children {
                Some((first, second)) => {
                    stack.push(second);
                    stack.push(first);
                }
                None => leaves.push(current),
            }
        }
        leaves
    }

    /// Rooms carved under `id`, in leaf pre-order.
    pub fn rooms_within(&self, id: RegionId) -> Vec<Rect> {
        self.leaves_within(id).into_iter().filter_map(|leaf| self.region(leaf).room).collect()
    }

    /// Arc cells owned by `id` and every region below it, parents before children.
    pub fn arcs_within(&self, id: RegionId) -> Vec<Pos> {
        let mut arcs = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let region = self.region(current);
            arcs.extend(region.arcs.iter().copied());
            if let Some((first, second)) = region.children {
                stack.push(second);
                stack.push(first);
            }
        }
        arcs
    }

    /// Smallest region whose bounds contain `pos`.
    pub fn leaf_at(&self, pos: Pos) -> Option<RegionId> {
        let mut current = self.root();
        if !self.region(current).bounds.contains(pos) {
            return None;
        }
        while let Some((first, second)) = self.region(current).children {
            current = if self.region(first).bounds.contains(pos) { first } else { second };
        }
        Some(current)
    }

    /// Splits leaf `id` in two. Returns `None` when `id` already has children or when
    /// the chosen axis is too short to leave `min_size` on both sides.
    pub fn split(
        &mut self,
        id: RegionId,
        min_size: i32,
        rng: &mut FloorRng,
    ) -> Option<(RegionId, RegionId)> {
        if !self.is_leaf(id) {
            return None;
        }
        let min_size = min_size.max(1);
        let bounds = self.region(id).bounds;
        let axis = choose_split_axis(bounds, rng);
        let extent = match axis {
            SplitAxis::Vertical => bounds.width,
            SplitAxis::Horizontal => bounds.height,
        };
        if extent - min_size <= min_size {
            return None;
        }

        let offset = rng.range(min_size, extent - min_size);
        let children = self.divide(id, axis, offset);
        trace!(region = id.0, ?axis, offset, "split region");
        Some(children)
    }

    /// Cuts leaf `id` at `offset` cells from its origin along `axis`.
    pub(super) fn divide(
        &mut self,
        id: RegionId,
        axis: SplitAxis,
        offset: i32,
    ) -> (RegionId, RegionId) {
        let bounds = self.region(id).bounds;
        let (first_bounds, second_bounds) = match axis {
            SplitAxis::Vertical => (
                Rect::new(bounds.x, bounds.y, offset, bounds.height),
                Rect::new(bounds.x + offset, bounds.y, bounds.width - offset, bounds.height),
            ),
            SplitAxis::Horizontal => (
                Rect::new(bounds.x, bounds.y, bounds.width, offset),
                Rect::new(bounds.x, bounds.y + offset, bounds.width, bounds.height - offset),
            ),
        };

        let first = self.push(Region::leaf(first_bounds, Some(id)));
        let second = self.push(Region::leaf(second_bounds, Some(id)));
        let region = self.region_mut(id);
        region.children = Some((first, second));
        region.split = Some(axis);
        (first, second)
    }

    /// Repeats passes over the current leaves until a pass performs no split.
    ///
    /// Leaves larger than `max_leaf_size` on either axis are always offered a split;
    /// the rest are offered one unless the `decline_percent` gate turns them down.
    /// Returns the number of splits performed.
    pub fn partition(
        &mut self,
        min_leaf_size: i32,
        max_leaf_size: i32,
        decline_percent: u8,
        rng: &mut FloorRng,
    ) -> usize {
        let mut splits = 0;
        loop {
            let mut did_split = false;
            for leaf in self.leaves() {
                let bounds = self.region(leaf).bounds;
                let oversized = bounds.width > max_leaf_size || bounds.height > max_leaf_size;
                if (oversized || !rng.percent(decline_percent))
                    && self.split(leaf, min_leaf_size, rng).is_some()
                {
                    did_split = true;
                    splits += 1;
                }
            }
            if !did_split {
                return splits;
            }
        }
    }

    fn push(&mut self, region: Region) -> RegionId {
        let id = RegionId(self.regions.len() as u32);
        self.regions.push(region);
        id
    }
}

/// Coin flip, overridden when one side is at least 1.25 times the other so the cut
/// runs across the long side.
fn choose_split_axis(bounds: Rect, rng: &mut FloorRng) -> SplitAxis {
    let coin = rng.coin();
    let width = i64::from(bounds.width);
    let height = i64::from(bounds.height);
    if width * 4 >= height * 5 {
        SplitAxis::Vertical
    } else if height * 4 >= width * 5 {
        SplitAxis::Horizontal
    } else if coin {
        SplitAxis::Horizontal
    } else {
        SplitAxis::Vertical
    }
}
