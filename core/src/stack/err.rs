use miette::Diagnostic;
use thiserror::Error;

use crate::{
    collection::{Dimension, TileIndices},
    formats::descriptor,
};

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Axis {axis:?} not supported, expected one of {valid:?}")]
    #[diagnostic(code(tile_stack::stack::invalid_axis))]
    InvalidAxis {
        axis: String,
        valid: &'static [&'static str],
    },

    #[error("Array of shape {found:?} does not match stack shape {expected:?}")]
    #[diagnostic(code(tile_stack::stack::shape_mismatch))]
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Tile {indices} lies outside {num_rounds} rounds x {num_channels} channels")]
    #[diagnostic(code(tile_stack::stack::index_out_of_range))]
    IndexOutOfRange {
        indices: TileIndices,
        num_rounds: usize,
        num_channels: usize,
    },

    #[error("Tile {indices} has shape {found:?}, expected {expected:?}")]
    #[diagnostic(code(tile_stack::stack::malformed_tile))]
    MalformedTile {
        indices: TileIndices,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("More than one tile at {0}")]
    #[diagnostic(code(tile_stack::stack::duplicate_tile))]
    DuplicateTile(TileIndices),

    #[error("Collection does not declare a {0} dimension")]
    #[diagnostic(code(tile_stack::stack::missing_dimension))]
    MissingDimension(Dimension),

    #[error("Collection declares an empty {0} dimension")]
    #[diagnostic(code(tile_stack::stack::empty_dimension))]
    EmptyDimension(Dimension),

    #[error("Default tile shape {0:?} is neither 2D nor 3D")]
    #[diagnostic(code(tile_stack::stack::unsupported_tile_shape))]
    UnsupportedTileShape(Vec<usize>),

    #[error("Cannot project along z, tiles of shape {tile_shape:?} have no depth axis")]
    #[diagnostic(
        code(tile_stack::stack::not_volumetric),
        help("Only stacks of 3D tiles can be projected along z")
    )]
    NotVolumetric { tile_shape: Vec<usize> },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Descriptor(#[from] descriptor::Error),
}
