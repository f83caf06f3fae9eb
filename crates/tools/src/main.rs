use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use floorgen::{
    ConnectionStyle, FloorConfig, FloorConfigFile, GeneratedFloor, MapGenerator, Pos, find_path,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StyleArg {
    Arc,
    Corridor,
}

impl From<StyleArg> for ConnectionStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Arc => Self::Arc,
            StyleArg::Corridor => Self::Corridor,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about = "Generate a BSP floor and optionally query a path on it", long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// JSON floor config; command-line size flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    width: Option<i32>,
    #[arg(long)]
    height: Option<i32>,
    #[arg(long)]
    min_leaf: Option<i32>,
    #[arg(long)]
    max_leaf: Option<i32>,
    #[arg(long)]
    room_min: Option<i32>,
    #[arg(long, value_enum)]
    style: Option<StyleArg>,
    /// Path query as `x,y:x,y`
    #[arg(short, long)]
    path: Option<String>,
    /// Print the floor as JSON instead of a map
    #[arg(long)]
    json: bool,
    /// Save the resolved config to this file
    #[arg(long)]
    write_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("floorgen=info,floorgen_cli=info")
        }))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = resolve_config(&args)?;

    if let Some(path) = &args.write_config {
        FloorConfigFile::new(config.clone())
            .write_atomic(path)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        info!(path = %path.display(), "config written");
    }

    let generator = MapGenerator::new(config).with_context(|| "Floor configuration rejected")?;
    let floor = generator.generate(args.seed);
    info!(
        seed = args.seed,
        width = generator.config().width,
        height = generator.config().height,
        style = ?generator.config().connection_style,
        leaves = floor.leaf_count(),
        fingerprint = floor.fingerprint(),
        "floor generated"
    );

    let route = match args.path.as_deref() {
        Some(raw) => {
            let (start, goal) = parse_query(raw)?;
            let route = find_path(&floor.grid, start, goal)
                .with_context(|| format!("Path query {raw} is outside the floor"))?;
            match &route {
                Some(path) => info!(steps = path.len() - 1, "path found"),
                None => info!("no path"),
            }
            route
        }
        None => None,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&floor)?);
    } else {
        print!("{}", render(&floor, route.as_deref().unwrap_or_default()));
    }
    Ok(())
}

fn resolve_config(args: &Args) -> Result<FloorConfig> {
    let mut config = match &args.config {
        Some(path) => {
            FloorConfigFile::load(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?
                .floor
        }
        None => FloorConfig::default(),
    };
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(min_leaf) = args.min_leaf {
        config.min_leaf_size = min_leaf;
    }
    if let Some(max_leaf) = args.max_leaf {
        config.max_leaf_size = max_leaf;
    }
    if let Some(room_min) = args.room_min {
        config.room_min_dim = room_min;
    }
    if let Some(style) = args.style {
        config.connection_style = style.into();
    }
    Ok(config)
}

fn parse_query(raw: &str) -> Result<(Pos, Pos)> {
    let Some((start, goal)) = raw.split_once(':') else {
        bail!("path query '{raw}' must look like x,y:x,y");
    };
    Ok((parse_pos(start)?, parse_pos(goal)?))
}

fn parse_pos(raw: &str) -> Result<Pos> {
    let Some((x, y)) = raw.split_once(',') else {
        bail!("cell '{raw}' must look like x,y");
    };
    let x = x.trim().parse().with_context(|| format!("x in '{raw}' must be a number"))?;
    let y = y.trim().parse().with_context(|| format!("y in '{raw}' must be a number"))?;
    Ok(Pos::new(x, y))
}

/// `#` blocked, `.` room floor, `,` connector, `o` arc or bend, `*` path.
fn render(floor: &GeneratedFloor, route: &[Pos]) -> String {
    let mut out = String::with_capacity((floor.width + 1) * floor.height);
    for y in 0..floor.height as i32 {
        for x in 0..floor.width as i32 {
            let pos = Pos { y, x };
            let glyph = if route.contains(&pos) {
                '*'
            } else if floor.connectors.iter().any(|link| link.anchor == pos) {
                'o'
            } else if floor.room_at(pos).is_some() {
                '.'
            } else if floor.grid.is_walkable(pos) {
                ','
            } else {
                '#'
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}
