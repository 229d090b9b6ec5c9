use std::{
    collections::{BTreeSet, HashMap},
    ffi::OsString,
    io,
    path::{Path, PathBuf},
};

use crate::{
    collection::{Tile, TileIndices},
    geom::{Coordinate, Coordinates, Vec2U},
};

/// Ranks of the distinct x and y coordinates seen across a set of tiles.
///
/// Turns physical placement into dense integer grid positions for file naming.
/// `z` is not part of the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinateGrid {
    x: HashMap<Coordinate, usize>,
    y: HashMap<Coordinate, usize>,
}

impl CoordinateGrid {
    pub fn from_tiles<'a>(tiles: impl IntoIterator<Item = &'a Tile>) -> Self {
        let mut xs = BTreeSet::new();
        let mut ys = BTreeSet::new();
        for tile in tiles {
            xs.insert(tile.coordinates.x);
            ys.insert(tile.coordinates.y);
        }

        Self {
            x: ranks(xs),
            y: ranks(ys),
        }
    }

    pub fn position(&self, coordinates: &Coordinates) -> Option<Vec2U> {
        Some(Vec2U::new(
            *self.x.get(&coordinates.x)?,
            *self.y.get(&coordinates.y)?,
        ))
    }

    /// Number of distinct x and y coordinates.
    pub fn size(&self) -> Vec2U {
        Vec2U::new(self.x.len(), self.y.len())
    }

    /// Tile namer placing each tile next to the descriptor, see [`default_tile_path`].
    pub fn namer(&self) -> impl FnMut(&Path, &Tile, &str) -> io::Result<PathBuf> + '_ {
        move |toc_path: &Path, tile: &Tile, ext: &str| {
            let position = self.position(&tile.coordinates).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!(
                        "Tile {} at ({}, {}) is not part of the coordinate grid",
                        tile.indices, tile.coordinates.x, tile.coordinates.y
                    ),
                )
            })?;
            Ok(default_tile_path(toc_path, position, tile.indices, ext))
        }
    }
}

fn ranks(sorted: BTreeSet<Coordinate>) -> HashMap<Coordinate, usize> {
    sorted
        .into_iter()
        .enumerate()
        .map(|(rank, coordinate)| (coordinate, rank))
        .collect()
}

/// `<toc without extension>-X<x>-Y<y>-R<round>-C<channel>.<ext>`
pub fn default_tile_path(
    toc_path: &Path,
    position: Vec2U,
    indices: TileIndices,
    ext: &str,
) -> PathBuf {
    let mut name = OsString::from(toc_path.with_extension(""));
    name.push(format!(
        "-X{}-Y{}-R{}-C{}.{}",
        position.x, position.y, indices.round, indices.channel, ext
    ));
    PathBuf::from(name)
}
