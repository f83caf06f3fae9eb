//! High-level floor generation that composes partitioning, carving, and connectivity.

use tracing::debug;

use crate::config::{ConfigError, FloorConfig};
use crate::types::Rect;

use super::connect::connect_tree;
use super::grid::WalkGrid;
use super::model::GeneratedFloor;
use super::rooms::carve_rooms;
use super::seed::{FloorRng, derive_floor_seed};
use super::tree::PartitionTree;

pub struct MapGenerator {
    config: FloorConfig,
}

impl MapGenerator {
    /// Validates `config` up front so `generate` cannot fail.
    pub fn new(config: FloorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FloorConfig {
        &self.config
    }

    pub fn generate(&self, seed: u64) -> GeneratedFloor {
        let config = &self.config;
        let mut rng = FloorRng::from_seed(seed);

        let mut tree = PartitionTree::new(Rect::new(0, 0, config.width, config.height));
        let splits = tree.partition(
            config.min_leaf_size,
            config.max_leaf_size,
            config.split_decline_percent,
            &mut rng,
        );

        let root = tree.root();
        carve_rooms(&mut tree, root, config.room_min_dim, &mut rng);

        let mut connectors = Vec::new();
        connect_tree(&mut tree, root, config.connection_style, &mut rng, &mut connectors);

        let rooms = tree.rooms_within(root);
        let width = config.width as usize;
        let height = config.height as usize;
        let grid = WalkGrid::build(&rooms, &connectors, width, height);

        debug!(
            seed,
            splits,
            rooms = rooms.len(),
            connectors = connectors.len(),
            walkable = grid.walkable_count(),
            "generated floor"
        );

        GeneratedFloor { width, height, seed, tree, rooms, connectors, grid }
    }

    /// Generates floor `floor_index` of the run identified by `run_seed`.
    pub fn generate_level(&self, run_seed: u64, floor_index: u32) -> GeneratedFloor {
        self.generate(derive_floor_seed(run_seed, floor_index))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::config::ConnectionStyle;
    use crate::pathfinding::find_path;

    fn generator(style: ConnectionStyle) -> MapGenerator {
        MapGenerator::new(FloorConfig { connection_style: style, ..FloorConfig::default() })
            .expect("default config is valid")
    }

    fn assert_floor_invariants(floor: &GeneratedFloor) {
        let leaves = floor.tree.leaves();
        assert_eq!(leaves.len(), floor.rooms.len(), "every leaf gets exactly one room");
        for (leaf, room) in leaves.iter().zip(&floor.rooms) {
            let region = floor.tree.region(*leaf);
            assert_eq!(region.room, Some(*room));
            assert!(
                room.inside_with_margin(&region.bounds, 1),
                "room {room:?} must sit strictly inside leaf {:?}",
                region.bounds
            );
        }
        assert_eq!(floor.connectors.len(), leaves.len() - 1);
        assert!(floor.is_fully_connected(), "seed={} left an isolated cell", floor.seed);
    }

    #[test]
    fn invalid_config_is_rejected_before_generation() {
        let config = FloorConfig { min_leaf_size: 20, max_leaf_size: 10, ..FloorConfig::default() };
        assert!(matches!(
            MapGenerator::new(config),
            Err(ConfigError::LeafBoundsInverted { .. })
        ));
    }

    #[test]
    fn generator_keeps_the_validated_config() {
        let config = FloorConfig { width: 30, height: 20, ..FloorConfig::default() };
        let generator = MapGenerator::new(config.clone()).expect("valid config");
        assert_eq!(generator.config(), &config);

        let floor = generator.generate(8);
        assert_eq!((floor.width, floor.height), (30, 20));
    }

    #[test]
    fn same_seed_produces_byte_identical_floor() {
        for style in [ConnectionStyle::Arc, ConnectionStyle::Corridor] {
            let a = generator(style).generate(123_456);
            let b = generator(style).generate(123_456);
            assert_eq!(a, b);
            assert_eq!(a.canonical_bytes(), b.canonical_bytes());
            assert_eq!(a.fingerprint(), b.fingerprint());
        }
    }

    #[test]
    fn different_floor_index_changes_layout() {
        let generator = generator(ConnectionStyle::Arc);
        let floor_1 = generator.generate_level(9_001, 1);
        let floor_2 = generator.generate_level(9_001, 2);
        assert_ne!(floor_1.fingerprint(), floor_2.fingerprint());
    }

    #[test]
    fn every_room_centre_pair_has_a_path() {
        for style in [ConnectionStyle::Arc, ConnectionStyle::Corridor] {
            let floor = generator(style).generate(4_242);
            for from in &floor.rooms {
                for to in &floor.rooms {
                    let path = find_path(&floor.grid, from.center(), to.center())
                        .expect("room centres are in bounds");
                    assert!(path.is_some(), "{style:?}: no path {from:?} -> {to:?}");
                }
            }
        }
    }

    #[test]
    fn room_lookup_and_spawn_points_stay_inside_rooms() {
        let floor = generator(ConnectionStyle::Arc).generate(31);
        let mut rng = FloorRng::from_seed(5);
        for (index, room) in floor.rooms.iter().enumerate() {
            assert_eq!(floor.room_at(room.center()), Some(index));
            for _ in 0..20 {
                let spawn = floor.spawn_point(index, &mut rng).expect("room exists");
                assert!(room.contains(spawn));
                assert!(spawn.x > room.x && spawn.x < room.right());
                assert!(spawn.y > room.y && spawn.y < room.bottom());
            }
        }
        assert_eq!(floor.spawn_point(floor.rooms.len(), &mut rng), None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]
        #[test]
        fn generated_floors_hold_structural_invariants(
            seed in any::<u64>(),
            width in 12_i32..72,
            height in 12_i32..72,
            min_leaf_size in 6_i32..12,
            spread in 1_i32..12,
            corridor in any::<bool>(),
        ) {
            let config = FloorConfig {
                width,
                height,
                min_leaf_size,
                max_leaf_size: min_leaf_size + spread,
                room_min_dim: 4,
                connection_style: if corridor {
                    ConnectionStyle::Corridor
                } else {
                    ConnectionStyle::Arc
                },
                split_decline_percent: 20,
            };
            let floor = MapGenerator::new(config).expect("valid config").generate(seed);
            assert_floor_invariants(&floor);
        }
    }
}
