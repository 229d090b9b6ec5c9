//! Tile payloads as bare little-endian `f32` values in row-major order.

use std::io::{self, Read, Write};

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use miette::Diagnostic;
use ndarray::{ArrayBase, ArrayD, Data, Dimension, IxDyn, ShapeError};
use thiserror::Error;

pub const FORMAT_NAME: &str = "raw_f32_le";
pub const EXTENSION: &str = "raw";

const VALUE_SIZE: usize = std::mem::size_of::<f32>();

#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Bad tile length: read {read} bytes, expected {expected}")]
    #[diagnostic(code(tile_stack::raw_tile::bad_length))]
    BadLength { read: usize, expected: usize },

    #[error("Tile shape {0:?} is too large to address")]
    #[diagnostic(code(tile_stack::raw_tile::too_large))]
    TooLarge(Vec<usize>),

    #[error("Reshaping tile data resulted in shape error: {0}")]
    Shape(#[from] ShapeError),
}

/// Number of bytes a tile of `shape` occupies on disk.
pub fn byte_len(shape: &[usize]) -> Option<usize> {
    shape
        .iter()
        .try_fold(VALUE_SIZE, |acc, &len| acc.checked_mul(len))
}

pub fn read_tile(mut rdr: impl Read, shape: &[usize]) -> Result<ArrayD<f32>, Error> {
    let expected = byte_len(shape).ok_or_else(|| Error::TooLarge(shape.to_vec()))?;

    let mut bytes = Vec::with_capacity(expected);
    rdr.read_to_end(&mut bytes)?;
    if bytes.len() != expected {
        return Err(Error::BadLength {
            read: bytes.len(),
            expected,
        });
    }

    let mut values = vec![0f32; expected / VALUE_SIZE];
    LittleEndian::read_f32_into(&bytes, &mut values);

    Ok(ArrayD::from_shape_vec(IxDyn(shape), values)?)
}

/// Writes in logical (row-major) order regardless of the array's memory layout.
pub fn write_tile<S, D>(mut wtr: impl Write, data: &ArrayBase<S, D>) -> io::Result<()>
where
    S: Data<Elem = f32>,
    D: Dimension,
{
    for &value in data.iter() {
        wtr.write_f32::<LittleEndian>(value)?;
    }
    wtr.flush()
}
