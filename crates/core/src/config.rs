//! Generation parameters, their validation, and the JSON file form used by the tools.

use std::error::Error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// How sibling subtrees are linked once rooms are carved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStyle {
    /// L-shaped run of floor cells between the two representative room centres.
    Corridor,
    /// A single recorded arc cell between facing rooms, with the run that passes through it.
    #[default]
    Arc,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorConfig {
    pub width: i32,
    pub height: i32,
    pub min_leaf_size: i32,
    pub max_leaf_size: i32,
    pub room_min_dim: i32,
    #[serde(default)]
    pub connection_style: ConnectionStyle,
    /// Chance (0..=100) that a leaf already within `max_leaf_size` declines another split per pass.
    #[serde(default = "default_split_decline_percent")]
    pub split_decline_percent: u8,
}

pub const DEFAULT_ROOM_MIN_DIM: i32 = 4;

fn default_split_decline_percent() -> u8 {
    20
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            width: 48,
            height: 32,
            min_leaf_size: 8,
            max_leaf_size: 16,
            room_min_dim: DEFAULT_ROOM_MIN_DIM,
            connection_style: ConnectionStyle::default(),
            split_decline_percent: default_split_decline_percent(),
        }
    }
}

/// Describes why a configuration was rejected before generation started.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Width or height is zero or negative.
    EmptyMap { width: i32, height: i32 },
    /// `min_leaf_size` must be strictly below `max_leaf_size`.
    LeafBoundsInverted { min_leaf_size: i32, max_leaf_size: i32 },
    /// Room side must be at least one cell.
    ZeroRoomDim { room_min_dim: i32 },
    /// A minimum-size leaf cannot hold a minimum-size room plus its margin.
    RoomDoesNotFitLeaf { room_min_dim: i32, min_leaf_size: i32 },
    /// The map cannot hold even a single minimum-size leaf.
    MapSmallerThanLeaf { width: i32, height: i32, min_leaf_size: i32 },
    GatePercentOutOfRange { percent: u8 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMap { width, height } => {
                write!(f, "map dimensions must be positive, got {width}x{height}")
            }
            Self::LeafBoundsInverted { min_leaf_size, max_leaf_size } => write!(
                f,
                "min leaf size {min_leaf_size} must be below max leaf size {max_leaf_size}"
            ),
            Self::ZeroRoomDim { room_min_dim } => {
                write!(f, "room minimum dimension must be at least 1, got {room_min_dim}")
            }
            Self::RoomDoesNotFitLeaf { room_min_dim, min_leaf_size } => write!(
                f,
                "room minimum dimension {room_min_dim} plus a 1-cell margin does not fit \
                 in min leaf size {min_leaf_size}"
            ),
            Self::MapSmallerThanLeaf { width, height, min_leaf_size } => write!(
                f,
                "map {width}x{height} is smaller than the min leaf size {min_leaf_size}"
            ),
            Self::GatePercentOutOfRange { percent } => {
                write!(f, "split decline percent must be within 0..=100, got {percent}")
            }
        }
    }
}

impl Error for ConfigError {}

impl FloorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::EmptyMap { width: self.width, height: self.height });
        }
        if self.min_leaf_size >= self.max_leaf_size {
            return Err(ConfigError::LeafBoundsInverted {
                min_leaf_size: self.min_leaf_size,
                max_leaf_size: self.max_leaf_size,
            });
        }
        if self.room_min_dim < 1 {
            return Err(ConfigError::ZeroRoomDim { room_min_dim: self.room_min_dim });
        }
        if self.room_min_dim + 2 > self.min_leaf_size {
            return Err(ConfigError::RoomDoesNotFitLeaf {
                room_min_dim: self.room_min_dim,
                min_leaf_size: self.min_leaf_size,
            });
        }
        if self.width < self.min_leaf_size || self.height < self.min_leaf_size {
            return Err(ConfigError::MapSmallerThanLeaf {
                width: self.width,
                height: self.height,
                min_leaf_size: self.min_leaf_size,
            });
        }
        if self.split_decline_percent > 100 {
            return Err(ConfigError::GatePercentOutOfRange { percent: self.split_decline_percent });
        }
        Ok(())
    }
}

/// On-disk form of a [`FloorConfig`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FloorConfigFile {
    pub format_version: u32,
    pub floor: FloorConfig,
}

impl FloorConfigFile {
    pub const FORMAT_VERSION: u32 = 1;

    pub fn new(floor: FloorConfig) -> Self {
        Self { format_version: Self::FORMAT_VERSION, floor }
    }

    pub fn write_atomic(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        let file: Self = serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if file.format_version != Self::FORMAT_VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unsupported floor config format version {}", file.format_version),
            ));
        }
        Ok(file)
    }
}
