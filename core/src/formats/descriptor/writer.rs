use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, instrument, trace};

use super::{Document, Error, Shape, TileEntry, VERSION};
use crate::{
    collection::{Dimension, Tile, TileCollection},
    file::{FileSystem, OsFs},
    formats::raw_tile,
};

/// Decides where a tile's payload goes.
///
/// Called once per tile with the descriptor path, the tile and the payload file extension.
pub type TileOpener<'a> = dyn FnMut(&Path, &Tile, &str) -> io::Result<PathBuf> + 'a;

#[derive(Debug, Clone, Default)]
pub struct Writer<Fs: FileSystem = OsFs> {
    fs: Fs,
}

impl<Fs: FileSystem> Writer<Fs> {
    pub fn new(fs: Fs) -> Self {
        Self { fs }
    }

    /// Writes every tile's payload, then the descriptor itself to `destination`.
    #[instrument(skip(self, collection, tile_opener))]
    pub fn write_to_path<C: TileCollection + ?Sized>(
        &self,
        collection: &C,
        destination: &Path,
        pretty: bool,
        tile_opener: &mut TileOpener<'_>,
    ) -> Result<(), Error> {
        let directory = destination.parent().unwrap_or_else(|| Path::new(""));
        let default_tile_shape = collection.default_tile_shape();

        let mut entries = Vec::with_capacity(collection.tiles().len());
        let mut has_z = false;

        for tile in collection.tiles() {
            let tile_path = tile_opener(destination, tile, raw_tile::EXTENSION)
                .map_err(Error::io(destination))?;
            let file_name = relative_file_name(directory, &tile_path)?;
            trace!(path = %tile_path.display(), indices = %tile.indices, "Writing tile");

            let mut file = self.fs.create(&tile_path).map_err(Error::io(&tile_path))?;
            raw_tile::write_tile(&mut file, &tile.data).map_err(Error::io(&tile_path))?;

            has_z |= tile.coordinates.z.is_some();
            entries.push(TileEntry {
                file: file_name,
                indices: tile.indices,
                coordinates: tile.coordinates,
                tile_shape: (tile.shape() != default_tile_shape).then(|| tile.shape().to_vec()),
                tile_format: None,
            });
        }

        let mut dimensions: Vec<String> = Dimension::iter()
            .map(|dim| dim.name().to_string())
            .chain(["x".to_string(), "y".to_string()])
            .collect();
        if has_z {
            dimensions.push("z".to_string());
        }

        let doc = Document {
            version: VERSION.to_string(),
            dimensions,
            shape: Shape {
                round: collection.dimension_size(Dimension::Round).unwrap_or(0),
                channel: collection.dimension_size(Dimension::Channel).unwrap_or(0),
            },
            default_tile_shape: default_tile_shape.to_vec(),
            default_tile_format: raw_tile::FORMAT_NAME.to_string(),
            extras: collection.extras().cloned().unwrap_or_default(),
            tiles: entries,
        };

        let mut file = self
            .fs
            .create(destination)
            .map_err(Error::io(destination))?;
        if pretty {
            serde_json::to_writer_pretty(&mut file, &doc)?;
        } else {
            serde_json::to_writer(&mut file, &doc)?;
        }
        file.flush().map_err(Error::io(destination))?;

        debug!(tiles = doc.tiles.len(), "Wrote descriptor");
        Ok(())
    }
}

/// Path of a tile as recorded in the descriptor.
///
/// Relative to the descriptor's directory when the tile lies below it, absolute otherwise.
/// A relative path outside that directory can't be resolved on read and is rejected.
fn relative_file_name(directory: &Path, tile_path: &Path) -> Result<String, Error> {
    let recorded = match tile_path.strip_prefix(directory) {
        Ok(relative) => relative,
        Err(_) if tile_path.is_absolute() => tile_path,
        Err(_) => {
            return Err(Error::TileOutsideDescriptor {
                path: tile_path.to_path_buf(),
                directory: directory.to_path_buf(),
            })
        }
    };
    recorded
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| Error::NonUtf8Path(tile_path.to_path_buf()))
}
