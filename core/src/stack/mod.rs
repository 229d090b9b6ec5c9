//! Dense `(round, channel, ..tile)` view over a [`TileCollection`].

mod err;
mod export;
mod index;
mod projection;

#[cfg(test)]
mod tests;

pub use err::Error;
pub use export::{default_tile_path, CoordinateGrid};
pub use index::TileIndex;
pub use projection::{max_over, ProjectionAxis};

use std::path::Path;

use ndarray::{ArrayD, ArrayViewD, ArrayViewMutD, Axis, IxDyn};
use tracing::{debug, instrument};

use crate::{
    collection::{Dimension, Tile, TileCollection, TileIndices, TileSet},
    file::{FileSystem, OsFs},
    formats::descriptor::{Reader, TileOpener, Writer},
};

/// A stack of 2D or 3D tiles materialized as one array.
///
/// The array has shape `(num_rounds, num_channels) + tile_shape`. Slots without a
/// tile stay zero. The collection remains the owner of tile identity (coordinates,
/// naming), the array is the owner of pixel data.
///
/// # Aliasing
///
/// [`array_mut`](Self::array_mut) hands out a borrow of the live array. Writes
/// through it are *not* copied into the tiles until [`sync_tiles`](Self::sync_tiles)
/// is called. [`set_array`](Self::set_array) replaces the array and syncs in one go.
#[derive(Debug, Clone)]
pub struct ImageStack<C: TileCollection = TileSet> {
    collection: C,
    index: TileIndex,
    tile_shape: Vec<usize>,
    data: ArrayD<f32>,
}

impl ImageStack<TileSet> {
    /// Reads the descriptor at `name_or_path` (relative to `base_dir` if given) and assembles it.
    pub fn from_descriptor(name_or_path: &str, base_dir: Option<&Path>) -> Result<Self, Error> {
        Self::from_descriptor_with_fs(OsFs, name_or_path, base_dir)
    }

    pub fn from_descriptor_with_fs<Fs: FileSystem>(
        fs: Fs,
        name_or_path: &str,
        base_dir: Option<&Path>,
    ) -> Result<Self, Error> {
        let collection = Reader::new(fs).parse_doc(name_or_path, base_dir)?;
        Self::new(collection)
    }
}

impl<C: TileCollection> ImageStack<C> {
    /// Copies every tile's payload into its `(round, channel)` slot of a zeroed array.
    #[instrument(skip(collection))]
    pub fn new(collection: C) -> Result<Self, Error> {
        let num_rounds = declared_size(&collection, Dimension::Round)?;
        let num_channels = declared_size(&collection, Dimension::Channel)?;

        let tile_shape = collection.default_tile_shape().to_vec();
        if !(2..=3).contains(&tile_shape.len()) {
            return Err(Error::UnsupportedTileShape(tile_shape));
        }

        let index = TileIndex::build(collection.tiles(), num_rounds, num_channels)?;

        let mut shape = vec![num_rounds, num_channels];
        shape.extend_from_slice(&tile_shape);
        let mut data = ArrayD::zeros(IxDyn(&shape));

        for (indices, pos) in index.iter() {
            let tile = &collection.tiles()[pos];
            if tile.shape() != tile_shape.as_slice() {
                return Err(Error::MalformedTile {
                    indices,
                    expected: tile_shape,
                    found: tile.shape().to_vec(),
                });
            }
            slot_mut(&mut data, indices).assign(&tile.data);
        }

        debug!(
            populated = index.num_populated(),
            slots = num_rounds * num_channels,
            ?shape,
            "Assembled stack"
        );

        Ok(Self {
            collection,
            index,
            tile_shape,
            data,
        })
    }

    /// The live array.
    pub fn array(&self) -> ArrayViewD<'_, f32> {
        self.data.view()
    }

    /// Mutable borrow of the live array. Changes are not propagated to the tiles.
    pub fn array_mut(&mut self) -> ArrayViewMutD<'_, f32> {
        self.data.view_mut()
    }

    /// Replaces the whole array and writes each populated slot back into its tile.
    ///
    /// Only slots that had a tile when the stack was assembled are written back;
    /// data in the other slots is kept in the array but has nowhere to go in the
    /// collection. No tiles are created.
    #[instrument(skip(self, data), fields(shape = ?data.shape()))]
    pub fn set_array(&mut self, data: ArrayD<f32>) -> Result<(), Error> {
        if data.shape() != self.data.shape() {
            return Err(Error::ShapeMismatch {
                expected: self.data.shape().to_vec(),
                found: data.shape().to_vec(),
            });
        }

        self.data = data;
        self.sync_tiles();
        Ok(())
    }

    /// Copies the current array into the tiles of the collection.
    pub fn sync_tiles(&mut self) {
        let tiles = self.collection.tiles_mut();
        for (indices, pos) in self.index.iter() {
            if let Some(tile) = tiles.get_mut(pos) {
                tile.data = slot(&self.data, indices).to_owned();
            }
        }
        debug!(tiles = self.index.num_populated(), "Synced tiles");
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn num_rounds(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn num_channels(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn tile_shape(&self) -> &[usize] {
        &self.tile_shape
    }

    pub fn is_volumetric(&self) -> bool {
        self.tile_shape.len() == 3
    }

    /// The backing tile, if the slot is populated.
    pub fn tile(&self, round: usize, channel: usize) -> Option<&Tile> {
        self.index
            .get(&TileIndices::new(round, channel))
            .and_then(|pos| self.collection.tiles().get(pos))
    }

    pub fn tile_index(&self) -> &TileIndex {
        &self.index
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }

    pub fn into_collection(self) -> C {
        self.collection
    }

    /// An all-zero stack with the same geometry and tile identities.
    pub fn clone_with_same_shape(&self) -> Result<Self, Error> {
        Self::new(self.collection.clone_with_same_shape())
    }

    /// Writes the collection as a descriptor at `destination` plus one payload file per tile.
    ///
    /// Without a `tile_namer`, tiles are written next to the descriptor and named
    /// from their grid position and indices, see [`default_tile_path`].
    pub fn write(
        &self,
        destination: &Path,
        tile_namer: Option<&mut TileOpener<'_>>,
    ) -> Result<(), Error> {
        self.write_with_fs(OsFs, destination, tile_namer)
    }

    #[instrument(skip(self, fs, tile_namer))]
    pub fn write_with_fs<Fs: FileSystem>(
        &self,
        fs: Fs,
        destination: &Path,
        tile_namer: Option<&mut TileOpener<'_>>,
    ) -> Result<(), Error> {
        let writer = Writer::new(fs);
        match tile_namer {
            Some(tile_namer) => {
                writer.write_to_path(&self.collection, destination, true, tile_namer)?;
            }
            None => {
                let grid = CoordinateGrid::from_tiles(self.collection.tiles());
                let mut namer = grid.namer();
                writer.write_to_path(&self.collection, destination, true, &mut namer)?;
            }
        }
        Ok(())
    }
}

fn declared_size<C: TileCollection>(collection: &C, dim: Dimension) -> Result<usize, Error> {
    match collection.dimension_size(dim) {
        None => Err(Error::MissingDimension(dim)),
        Some(0) => Err(Error::EmptyDimension(dim)),
        Some(size) => Ok(size),
    }
}

fn slot(data: &ArrayD<f32>, indices: TileIndices) -> ArrayViewD<'_, f32> {
    data.index_axis(Axis(0), indices.round)
        .index_axis_move(Axis(0), indices.channel)
}

fn slot_mut(data: &mut ArrayD<f32>, indices: TileIndices) -> ArrayViewMutD<'_, f32> {
    data.index_axis_mut(Axis(0), indices.round)
        .index_axis_move(Axis(0), indices.channel)
}
