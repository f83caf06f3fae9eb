//! Links sibling subtrees bottom-up so every room is reachable from every other.

use tracing::trace;

use crate::config::ConnectionStyle;
use crate::types::{Pos, Rect};

use super::model::Connector;
use super::seed::FloorRng;
use super::tree::{PartitionTree, RegionId, SplitAxis};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    /// Left of a vertical cut, above a horizontal one.
    Near,
    Far,
}

/// Post-order walk from `id`: children are linked internally before the node links them
/// to each other. Arc cells are also recorded on the owning region.
pub fn connect_tree(
    tree: &mut PartitionTree,
    id: RegionId,
    style: ConnectionStyle,
    rng: &mut FloorRng,
    connectors: &mut Vec<Connector>,
) {
    let region = tree.region(id);
    let (Some((first, second)), Some(axis)) = (region.children, region.split) else {
        return;
    };

    connect_tree(tree, first, style, rng, connectors);
    connect_tree(tree, second, style, rng, connectors);

    let connector = match style {
        ConnectionStyle::Corridor => corridor_between(tree, id, (first, second), axis, rng),
        ConnectionStyle::Arc => arc_between(tree, id, (first, second), axis, rng),
    };
    if style == ConnectionStyle::Arc {
        tree.region_mut(id).arcs.push(connector.anchor);
    }
    trace!(
        region = id.0,
        ?style,
        anchor = ?connector.anchor,
        cells = connector.cells.len(),
        "linked sibling subtrees"
    );
    connectors.push(connector);
}

/// The room under `id` closest to the cut, first in leaf order on ties.
fn facing_room(tree: &PartitionTree, id: RegionId, axis: SplitAxis, side: Side) -> Option<Rect> {
    let mut best: Option<(i32, Rect)> = None;
    for room in tree.rooms_within(id) {
        // Smaller score means closer to the cut.
        let score = match (axis, side) {
            (SplitAxis::Vertical, Side::Near) => -room.right(),
            (SplitAxis::Vertical, Side::Far) => room.x,
            (SplitAxis::Horizontal, Side::Near) => -room.bottom(),
            (SplitAxis::Horizontal, Side::Far) => room.y,
        };
        if best.is_none_or(|(best_score, _)| score < best_score) {
            best = Some((score, room));
        }
    }
    best.map(|(_, room)| room)
}

/// Facing room, or a single-cell stand-in at the region centre while the subtree has no room.
fn representative_rect(tree: &PartitionTree, id: RegionId, axis: SplitAxis, side: Side) -> Rect {
    facing_room(tree, id, axis, side).unwrap_or_else(|| {
        let center = tree.region(id).bounds.center();
        Rect::new(center.x, center.y, 1, 1)
    })
}

/// Centre of the subtree's facing room, or of the region itself before any room exists.
pub fn representative_point(tree: &PartitionTree, id: RegionId) -> Pos {
    let parent_axis = tree
        .region(id)
        .parent
        .and_then(|parent| {
            let (first, _) = tree.region(parent).children?;
            let axis = tree.region(parent).split?;
            Some((axis, if first == id { Side::Near } else { Side::Far }))
        })
        .unwrap_or((SplitAxis::Vertical, Side::Near));
    representative_rect(tree, id, parent_axis.0, parent_axis.1).center()
}

fn corridor_between(
    tree: &PartitionTree,
    owner: RegionId,
    (first, second): (RegionId, RegionId),
    axis: SplitAxis,
    rng: &mut FloorRng,
) -> Connector {
    let from = representative_rect(tree, first, axis, Side::Near).center();
    let to = representative_rect(tree, second, axis, Side::Far).center();
    let bend = if rng.coin() { Pos { y: from.y, x: to.x } } else { Pos { y: to.y, x: from.x } };

    let mut cells = Vec::new();
    push_line(&mut cells, from, bend);
    push_line(&mut cells, bend, to);
    Connector { owner, style: ConnectionStyle::Corridor, from, to, anchor: bend, cells }
}

/// Places the arc cell halfway between the two facing rooms along the cut axis, on a
/// perpendicular coordinate both rooms share. When the rooms share none the coordinate
/// clamps to the middle of the smaller room and the run bends at the arc cell.
fn arc_between(
    tree: &PartitionTree,
    owner: RegionId,
    (first, second): (RegionId, RegionId),
    axis: SplitAxis,
    rng: &mut FloorRng,
) -> Connector {
    let near = representative_rect(tree, first, axis, Side::Near);
    let far = representative_rect(tree, second, axis, Side::Far);
    let (near_across, far_across) = (across_span(near, axis), across_span(far, axis));

    let overlap_start = near_across.0.max(far_across.0);
    let overlap_end = near_across.1.min(far_across.1);
    let across = if overlap_start <= overlap_end {
        rng.range_inclusive(overlap_start, overlap_end)
    } else {
        let smaller = if span_len(near_across) <= span_len(far_across) {
            near_across
        } else {
            far_across
        };
        smaller.0 + (smaller.1 - smaller.0) / 2
    };

    let near_along = along(near.center(), axis);
    let far_along = along(far.center(), axis);
    let mid_along = near_along + (far_along - near_along) / 2;
    let near_cross = across.clamp(near_across.0, near_across.1);
    let far_cross = across.clamp(far_across.0, far_across.1);

    let from = compose(axis, near_along, near_cross);
    let to = compose(axis, far_along, far_cross);
    let anchor = compose(axis, mid_along, across);

    let mut cells = Vec::new();
    push_line(&mut cells, from, compose(axis, mid_along, near_cross));
    push_line(&mut cells, compose(axis, mid_along, near_cross), compose(axis, mid_along, far_cross));
    push_line(&mut cells, compose(axis, mid_along, far_cross), to);
    Connector { owner, style: ConnectionStyle::Arc, from, to, anchor, cells }
}

/// Inclusive range of `rect` perpendicular to the cut's direction of travel.
fn across_span(rect: Rect, axis: SplitAxis) -> (i32, i32) {
    match axis {
        SplitAxis::Vertical => (rect.y, rect.bottom()),
        SplitAxis::Horizontal => (rect.x, rect.right()),
    }
}

fn span_len(span: (i32, i32)) -> i32 {
    span.1 - span.0 + 1
}

fn along(pos: Pos, axis: SplitAxis) -> i32 {
    match axis {
        SplitAxis::Vertical => pos.x,
        SplitAxis::Horizontal => pos.y,
    }
}

fn compose(axis: SplitAxis, along: i32, across: i32) -> Pos {
    match axis {
        SplitAxis::Vertical => Pos { y: across, x: along },
        SplitAxis::Horizontal => Pos { y: along, x: across },
    }
}

/// Appends the axis-aligned run `start..=end`, skipping `start` when it repeats the last cell.
fn push_line(cells: &mut Vec<Pos>, start: Pos, end: Pos) {
    debug_assert!(start.x == end.x || start.y == end.y, "runs must be axis-aligned");
    let step = Pos { y: (end.y - start.y).signum(), x: (end.x - start.x).signum() };
    let mut current = start;
    loop {
        if cells.last() != Some(&current) {
            cells.push(current);
        }
        if current == end {
            return;
        }
        current = Pos { y: current.y + step.y, x: current.x + step.x };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::rooms::carve_rooms;

    fn two_leaf_tree(bounds: Rect, axis: SplitAxis, offset: i32, rooms: (Rect, Rect)) -> PartitionTree {
        let mut tree = PartitionTree::new(bounds);
        let root = tree.root();
        let (first, second) = tree.divide(root, axis, offset);
        tree.region_mut(first).room = Some(rooms.0);
        tree.region_mut(second).room = Some(rooms.1);
        tree
    }

    fn assert_four_connected(cells: &[Pos]) {
        for pair in cells.windows(2) {
            let step = pair[0].x.abs_diff(pair[1].x) + pair[0].y.abs_diff(pair[1].y);
            assert_eq!(step, 1, "connector cells must form a 4-connected run: {cells:?}");
        }
    }

    #[test]
    fn arc_between_overlapping_rooms_is_a_straight_run() {
        let near = Rect::new(1, 2, 4, 5);
        let far = Rect::new(9, 4, 4, 6);
        let mut tree =
            two_leaf_tree(Rect::new(0, 0, 14, 11), SplitAxis::Vertical, 6, (near, far));
        let mut rng = FloorRng::from_seed(11);
        let mut connectors = Vec::new();
        let root = tree.root();
        connect_tree(&mut tree, root, ConnectionStyle::Arc, &mut rng, &mut connectors);

        assert_eq!(connectors.len(), 1);
        let arc = &connectors[0];
        assert!((4..=6).contains(&arc.anchor.y), "arc row must lie in the shared rows");
        assert_eq!(arc.anchor.x, 7);
        assert!(arc.cells.iter().all(|cell| cell.y == arc.anchor.y));
        assert!(near.contains(arc.from) && far.contains(arc.to));
        assert_four_connected(&arc.cells);
        assert_eq!(tree.region(root).arcs, vec![arc.anchor]);
    }

    #[test]
    fn arc_between_disjoint_ranges_clamps_to_smaller_room_middle() {
        let near = Rect::new(1, 1, 3, 3);
        let far = Rect::new(6, 7, 4, 2);
        let mut tree =
            two_leaf_tree(Rect::new(0, 0, 12, 11), SplitAxis::Horizontal, 5, (near, far));
        let mut rng = FloorRng::from_seed(3);
        let mut connectors = Vec::new();
        let root = tree.root();
        connect_tree(&mut tree, root, ConnectionStyle::Arc, &mut rng, &mut connectors);

        let arc = &connectors[0];
        // Columns 1..=3 and 6..=9 share nothing; the smaller span is 1..=3.
        assert_eq!(arc.anchor, Pos { y: 5, x: 2 });
        assert_eq!(arc.from, Pos { y: 2, x: 2 });
        assert_eq!(arc.to, Pos { y: 8, x: 6 });
        assert!(arc.cells.contains(&arc.anchor));
        assert_four_connected(&arc.cells);
    }

    #[test]
    fn corridor_joins_room_centres_with_one_bend() {
        let mut tree = PartitionTree::new(Rect::new(0, 0, 40, 30));
        let mut rng = FloorRng::from_seed(8);
        tree.partition(8, 14, 20, &mut rng);
        let root = tree.root();
        carve_rooms(&mut tree, root, 4, &mut rng);
        let mut connectors = Vec::new();
        connect_tree(&mut tree, root, ConnectionStyle::Corridor, &mut rng, &mut connectors);

        assert_eq!(connectors.len(), tree.leaves().len() - 1);
        let rooms = tree.rooms_within(root);
        let is_room_center = |pos: Pos| rooms.iter().any(|room| room.center() == pos);
        for corridor in &connectors {
            assert!(is_room_center(corridor.from));
            assert!(is_room_center(corridor.to));
            assert_eq!(corridor.cells.first(), Some(&corridor.from));
            assert_eq!(corridor.cells.last(), Some(&corridor.to));
            assert!(corridor.cells.contains(&corridor.anchor));
            assert_four_connected(&corridor.cells);
        }
        assert!(tree.arcs_within(root).is_empty(), "corridors record no arcs");
    }

    #[test]
    fn arcs_are_owned_by_every_internal_region() {
        let mut tree = PartitionTree::new(Rect::new(0, 0, 48, 32));
        let mut rng = FloorRng::from_seed(99);
        tree.partition(8, 14, 20, &mut rng);
        let root = tree.root();
        carve_rooms(&mut tree, root, 4, &mut rng);
        let mut connectors = Vec::new();
        connect_tree(&mut tree, root, ConnectionStyle::Arc, &mut rng, &mut connectors);

        for index in 0..tree.len() {
            let region = tree.region(RegionId(index as u32));
            assert_eq!(region.arcs.len(), usize::from(!region.is_leaf()));
        }
        assert_eq!(tree.arcs_within(root).len(), connectors.len());
    }

    #[test]
    fn representative_point_falls_back_to_region_centre_without_rooms() {
        let mut tree = PartitionTree::new(Rect::new(0, 0, 30, 10));
        let root = tree.root();
        let (first, _) = tree.divide(root, SplitAxis::Vertical, 14);
        assert_eq!(representative_point(&tree, first), tree.region(first).bounds.center());

        let mut rng = FloorRng::from_seed(1);
        carve_rooms(&mut tree, root, 2, &mut rng);
        let room = tree.region(first).room.expect("room");
        assert_eq!(representative_point(&tree, first), room.center());
    }
}
