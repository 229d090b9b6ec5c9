use std::fmt;

use derive_more::Constructor;
use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

use crate::geom::Coordinates;

/// Categorical axes of a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    Round,
    Channel,
}

impl Dimension {
    pub fn iter() -> impl Iterator<Item = Dimension> {
        [Dimension::Round, Dimension::Channel].into_iter()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dimension::Round => "round",
            Dimension::Channel => "channel",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Constructor, Serialize, Deserialize,
)]
pub struct TileIndices {
    pub round: usize,
    pub channel: usize,
}

impl fmt::Display for TileIndices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(round {}, channel {})", self.round, self.channel)
    }
}

/// A single stored image: its categorical slot, its physical placement and its pixels.
#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct Tile {
    pub indices: TileIndices,
    pub coordinates: Coordinates,
    pub data: ArrayD<f32>,
}

impl Tile {
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }
}

/// The storage-side view of a stack.
///
/// Implementations own their tiles and must keep the order of [`tiles`](Self::tiles)
/// and [`tiles_mut`](Self::tiles_mut) stable; the stack remembers tiles by position.
pub trait TileCollection {
    /// Declared extent of a categorical axis. This can exceed the number of tiles present.
    fn dimension_size(&self, dim: Dimension) -> Option<usize>;

    fn default_tile_shape(&self) -> &[usize];

    fn tiles(&self) -> &[Tile];

    fn tiles_mut(&mut self) -> &mut [Tile];

    /// Same declared geometry and tile identities, but every payload zeroed.
    fn clone_with_same_shape(&self) -> Self
    where
        Self: Sized;

    /// Free-form metadata carried along with the collection.
    fn extras(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        None
    }
}

/// Tile collection that lives entirely in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct TileSet {
    num_rounds: usize,
    num_channels: usize,
    default_tile_shape: Vec<usize>,
    tiles: Vec<Tile>,
    extras: serde_json::Map<String, serde_json::Value>,
}

impl TileSet {
    pub fn new(num_rounds: usize, num_channels: usize, default_tile_shape: Vec<usize>) -> Self {
        Self {
            num_rounds,
            num_channels,
            default_tile_shape,
            tiles: Vec::new(),
            extras: serde_json::Map::new(),
        }
    }

    pub fn with_extras(mut self, extras: serde_json::Map<String, serde_json::Value>) -> Self {
        self.extras = extras;
        self
    }

    pub fn push_tile(&mut self, tile: Tile) {
        self.tiles.push(tile);
    }

    pub fn with_tile(mut self, tile: Tile) -> Self {
        self.push_tile(tile);
        self
    }
}

impl TileCollection for TileSet {
    fn dimension_size(&self, dim: Dimension) -> Option<usize> {
        Some(match dim {
            Dimension::Round => self.num_rounds,
            Dimension::Channel => self.num_channels,
        })
    }

    fn default_tile_shape(&self) -> &[usize] {
        &self.default_tile_shape
    }

    fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    fn clone_with_same_shape(&self) -> Self {
        let tiles = self
            .tiles
            .iter()
            .map(|tile| Tile {
                indices: tile.indices,
                coordinates: tile.coordinates,
                data: ArrayD::zeros(IxDyn(tile.shape())),
            })
            .collect();

        Self {
            num_rounds: self.num_rounds,
            num_channels: self.num_channels,
            default_tile_shape: self.default_tile_shape.clone(),
            tiles,
            extras: self.extras.clone(),
        }
    }

    fn extras(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        Some(&self.extras)
    }
}
