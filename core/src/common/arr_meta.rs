use ndarray::{ArrayBase, Data, Dimension};

use super::range::RangeIncl;

/// Summary statistics over a set of samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayStats {
    pub range: RangeIncl<f32>,
    pub mean: f32,
    /// Population variance
    pub variance: f32,
    pub std_dev: f32,
    pub count: usize,
}

impl ArrayStats {
    /// Single pass using Welford's algorithm, accumulating in `f64`.
    ///
    /// Returns `None` for an empty iterator.
    pub fn new(mut data: impl Iterator<Item = f32>) -> Option<Self> {
        let first = data.next()?;
        let mut range = RangeIncl::point(first);
        let mut mean = first as f64;
        let mut m2 = 0.0f64;
        let mut count = 1usize;

        for value in data {
            range = range.expand(value);
            count += 1;
            let value = value as f64;
            let delta = value - mean;
            mean += delta / count as f64;
            m2 += delta * (value - mean);
        }

        let variance = m2 / count as f64;
        Some(Self {
            range,
            mean: mean as f32,
            variance: variance as f32,
            std_dev: variance.sqrt() as f32,
            count,
        })
    }

    pub fn from_array<S, D>(array: &ArrayBase<S, D>) -> Option<Self>
    where
        S: Data<Elem = f32>,
        D: Dimension,
    {
        Self::new(array.iter().copied())
    }
}
