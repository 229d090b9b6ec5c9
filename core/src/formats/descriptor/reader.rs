use std::path::{Path, PathBuf};

use tracing::{debug, instrument, trace};

use super::{Document, Error};
use crate::{
    collection::{Tile, TileSet},
    file::{FileSystem, OsFs},
    formats::raw_tile,
};

#[derive(Debug, Clone, Default)]
pub struct Reader<Fs: FileSystem = OsFs> {
    fs: Fs,
}

impl<Fs: FileSystem> Reader<Fs> {
    pub fn new(fs: Fs) -> Self {
        Self { fs }
    }

    /// Parses the descriptor at `name_or_path`, resolved against `base_dir` if one is given.
    pub fn parse_doc(&self, name_or_path: &str, base_dir: Option<&Path>) -> Result<TileSet, Error> {
        let path = match base_dir {
            Some(base_dir) => self.fs.file_path(base_dir, name_or_path),
            None => PathBuf::from(name_or_path),
        };
        self.parse_path(&path)
    }

    /// Reads the descriptor and every tile payload it references.
    #[instrument(skip(self))]
    pub fn parse_path(&self, path: &Path) -> Result<TileSet, Error> {
        let file = self.fs.read(path).map_err(Error::io(path))?;
        let doc: Document = serde_json::from_reader(file)?;
        doc.check_version()?;

        debug!(
            rounds = doc.shape.round,
            channels = doc.shape.channel,
            tiles = doc.tiles.len(),
            "Parsed descriptor"
        );

        let directory = path.parent().unwrap_or_else(|| Path::new(""));

        let mut set = TileSet::new(
            doc.shape.round,
            doc.shape.channel,
            doc.default_tile_shape.clone(),
        );

        for entry in &doc.tiles {
            let format = doc.tile_format(entry);
            if format != raw_tile::FORMAT_NAME {
                return Err(Error::UnsupportedFormat(format.to_string()));
            }

            let tile_path = self.fs.file_path(directory, &entry.file);
            trace!(path = %tile_path.display(), indices = %entry.indices, "Reading tile");

            let file = self.fs.read(&tile_path).map_err(Error::io(&tile_path))?;
            let data = raw_tile::read_tile(file, doc.tile_shape(entry)).map_err(|source| {
                Error::Tile {
                    path: tile_path.clone(),
                    source,
                }
            })?;

            set.push_tile(Tile::new(entry.indices, entry.coordinates, data));
        }

        Ok(set.with_extras(doc.extras))
    }
}
