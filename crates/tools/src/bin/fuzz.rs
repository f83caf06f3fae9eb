use anyhow::{Result, bail};
use clap::Parser;
use floorgen::{
    ConnectionStyle, FloorConfig, FloorRng, GeneratedFloor, MapGenerator, Pos, derive_floor_seed,
    find_path,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 200)]
    cases: u32,
}

fn random_config(rng: &mut FloorRng) -> FloorConfig {
    let room_min_dim = rng.range_inclusive(3, 6);
    let min_leaf_size = room_min_dim + 2 + rng.range_inclusive(0, 4);
    let max_leaf_size = min_leaf_size + rng.range_inclusive(1, 10);
    FloorConfig {
        width: rng.range_inclusive(min_leaf_size, 96),
        height: rng.range_inclusive(min_leaf_size, 64),
        min_leaf_size,
        max_leaf_size,
        room_min_dim,
        connection_style: if rng.coin() { ConnectionStyle::Arc } else { ConnectionStyle::Corridor },
        split_decline_percent: rng.range_inclusive(0, 100) as u8,
    }
}

fn random_cell(rng: &mut FloorRng, floor: &GeneratedFloor) -> Pos {
    Pos::new(rng.range(0, floor.width as i32), rng.range(0, floor.height as i32))
}

fn check_floor(floor: &GeneratedFloor, rng: &mut FloorRng) -> Result<()> {
    let leaves = floor.tree.leaves();
    if leaves.len() != floor.rooms.len() {
        bail!("Invariant failed: {} leaves but {} rooms", leaves.len(), floor.rooms.len());
    }
    for (leaf, room) in leaves.iter().zip(&floor.rooms) {
        let bounds = floor.tree.region(*leaf).bounds;
        if !room.inside_with_margin(&bounds, 1) {
            bail!("Invariant failed: room {room:?} touches leaf edge {bounds:?}");
        }
    }
    if !floor.is_fully_connected() {
        bail!("Invariant failed: walkable cells split into several components");
    }

    for _ in 0..16 {
        let start = random_cell(rng, floor);
        let goal = random_cell(rng, floor);
        let path = find_path(&floor.grid, start, goal)?;
        let both_walkable = floor.grid.is_walkable(start) && floor.grid.is_walkable(goal);
        match path {
            Some(path) if !both_walkable => {
                bail!("Invariant failed: path {path:?} found between blocked cells")
            }
            None if both_walkable => {
                bail!("Invariant failed: no path between connected cells {start:?} -> {goal:?}")
            }
            _ => {}
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fuzz=info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    info!(seed = args.seed, cases = args.cases, "starting floor fuzz harness");
    let mut rng = FloorRng::from_seed(args.seed);

    for case in 0..args.cases {
        let config = random_config(&mut rng);
        let floor_seed = derive_floor_seed(args.seed, case);
        let floor = MapGenerator::new(config.clone())?.generate(floor_seed);
        if let Err(err) = check_floor(&floor, &mut rng) {
            warn!(case, floor_seed, ?config, "invariant violated");
            return Err(err);
        }
    }

    info!("fuzzing completed successfully");
    Ok(())
}
