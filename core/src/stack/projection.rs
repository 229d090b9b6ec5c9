use std::{fmt, str::FromStr};

use ndarray::{ArrayD, ArrayViewD, Axis};
use tracing::instrument;

use super::{Error, ImageStack};
use crate::collection::TileCollection;

const VALID_AXES: &[&str] = &["round", "channel", "z"];

/// Axes a stack can be max-projected along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionAxis {
    Round,
    Channel,
    Z,
}

impl ProjectionAxis {
    pub fn name(&self) -> &'static str {
        match self {
            ProjectionAxis::Round => "round",
            ProjectionAxis::Channel => "channel",
            ProjectionAxis::Z => "z",
        }
    }
}

impl fmt::Display for ProjectionAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProjectionAxis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "round" => Ok(ProjectionAxis::Round),
            "channel" => Ok(ProjectionAxis::Channel),
            "z" => Ok(ProjectionAxis::Z),
            _ => Err(Error::InvalidAxis {
                axis: s.to_string(),
                valid: VALID_AXES,
            }),
        }
    }
}

impl<C: TileCollection> ImageStack<C> {
    /// Max projection along the axis named `axis`, one of `round`, `channel` or `z`.
    pub fn max_projection(&self, axis: &str) -> Result<ArrayD<f32>, Error> {
        self.max_projection_along(axis.parse()?)
    }

    /// Elementwise maximum collapsing one axis of the stack.
    ///
    /// * `Round`: `(num_channels, ..tile_shape)`
    /// * `Channel`: `(num_rounds, ..tile_shape)`
    /// * `Z`: `(num_rounds, num_channels, height, width)`, volumetric stacks only
    #[instrument(skip(self))]
    pub fn max_projection_along(&self, axis: ProjectionAxis) -> Result<ArrayD<f32>, Error> {
        let array_axis = match axis {
            ProjectionAxis::Round => 0,
            ProjectionAxis::Channel => 1,
            ProjectionAxis::Z if self.is_volumetric() => 2,
            ProjectionAxis::Z => {
                return Err(Error::NotVolumetric {
                    tile_shape: self.tile_shape().to_vec(),
                })
            }
        };

        Ok(max_over(self.array(), array_axis))
    }
}

/// Elementwise maximum along `axis`. `NaN` wins over any number.
///
/// # Panics
///
/// If `axis` is out of bounds for `array`.
pub fn max_over(array: ArrayViewD<'_, f32>, axis: usize) -> ArrayD<f32> {
    array.fold_axis(Axis(axis), f32::NEG_INFINITY, |&acc, &value| {
        if acc.is_nan() || value.is_nan() {
            f32::NAN
        } else {
            acc.max(value)
        }
    })
}
