use std::collections::{hash_map::Entry, HashMap};

use super::Error;
use crate::collection::{Tile, TileIndices};

/// Maps each populated `(round, channel)` slot to the position of its tile in the collection.
///
/// Built once when the stack is assembled so scattering data back into the tiles
/// doesn't need to search the collection.
#[derive(Debug, Clone, Default)]
pub struct TileIndex {
    index: HashMap<TileIndices, usize>,
}

impl TileIndex {
    /// Fails if a tile lies outside the declared extent or shares its slot with another tile.
    pub fn build(tiles: &[Tile], num_rounds: usize, num_channels: usize) -> Result<Self, Error> {
        let mut index = HashMap::with_capacity(tiles.len());

        for (pos, tile) in tiles.iter().enumerate() {
            let indices = tile.indices;
            if indices.round >= num_rounds || indices.channel >= num_channels {
                return Err(Error::IndexOutOfRange {
                    indices,
                    num_rounds,
                    num_channels,
                });
            }

            match index.entry(indices) {
                Entry::Occupied(_) => return Err(Error::DuplicateTile(indices)),
                Entry::Vacant(slot) => {
                    slot.insert(pos);
                }
            }
        }

        Ok(Self { index })
    }

    pub fn get(&self, indices: &TileIndices) -> Option<usize> {
        self.index.get(indices).copied()
    }

    /// Populated slots in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (TileIndices, usize)> + '_ {
        self.index.iter().map(|(&indices, &pos)| (indices, pos))
    }

    /// Number of slots backed by a tile.
    pub fn num_populated(&self) -> usize {
        self.index.len()
    }
}
