use std::path::Path;

use color_eyre::eyre;
use ndarray::{ArrayView2, Axis};
use plotters::{
    prelude::{BitMapBackend, IntoDrawingArea, Rectangle},
    style::{Color, HSLColor, BLACK},
};

use tile_stack_core::common::{arr_meta::ArrayStats, range::RangeIncl};

/// Draws `image` (rows = y) with each value as a `scale`-sized square, blue (low) to red (high).
pub fn heatmap(image: ArrayView2<f32>, path: &Path, scale: u32) -> eyre::Result<()> {
    let h = image.len_of(Axis(0));
    let w = image.len_of(Axis(1));
    let scale = scale.max(1);

    let range = ArrayStats::new(image.iter().copied().filter(|v| !v.is_nan()))
        .map(|stats| stats.range)
        .unwrap_or_default();

    let root = BitMapBackend::new(path, (w as u32 * scale, h as u32 * scale)).into_drawing_area();
    root.fill(&BLACK)?;

    for (y, x) in iter_2d(0..h, 0..w) {
        let v = image[[y, x]];
        if v.is_nan() {
            continue;
        }

        let x0 = (x as u32 * scale) as i32;
        let y0 = (y as u32 * scale) as i32;
        let s = scale as i32;
        root.draw(&Rectangle::new(
            [(x0, y0), (x0 + s, y0 + s)],
            heat(&range, v).filled(),
        ))?;
    }

    root.present()?;
    Ok(())
}

fn heat(range: &RangeIncl<f32>, v: f32) -> HSLColor {
    let t = if range.width() > 0.0 {
        range.map(v).clamp(0.0, 1.0) as f64
    } else {
        0.0
    };
    HSLColor((1.0 - t) * 240.0 / 360.0, 0.8, 0.15 + 0.4 * t)
}

fn iter_2d<X: Copy, Y>(
    x: impl IntoIterator<Item = X>,
    y: impl IntoIterator<Item = Y> + Clone,
) -> impl Iterator<Item = (X, Y)> {
    x.into_iter()
        .flat_map(move |x| y.clone().into_iter().map(move |y| (x, y)))
}
