mod gui;

use self::gui::{run_gui, PointAndColor};
use crate::{
    io::open_las,
    opts::Show,
    utils::{bounds_center, normalized_intensity, relative_position},
};
use anyhow::{ensure, Result};
use las_format::{Header, Point, PointReader};
use log::{info, warn};
use std::{
    io::{Read, Seek},
    iter,
};

pub fn show(args: Show) -> Result<()> {
    let Show { batch_size, input } = args;

    let decoder = open_las(&input)?;
    let header = decoder.header().clone();
    let center = bounds_center(&header);
    let mut points = decoder.into_points()?;
    let batch_size = batch_size.unwrap_or(usize::MAX).max(1);

    // The first batch is decoded before the window opens, so that a
    // broken file fails here.
    let first = next_batch(&mut points, &header, center, batch_size)?;
    ensure!(!first.is_empty(), "no points to show in '{}'", input.display());
    info!("showing {} points, press 'n' for the next batch", first.len());

    let rest = iter::from_fn(move || match next_batch(&mut points, &header, center, batch_size) {
        Ok(batch) if !batch.is_empty() => Some(batch),
        Ok(_) => None,
        Err(err) => {
            warn!("{err:#}");
            None
        }
    });

    run_gui(iter::once(first).chain(rest));

    Ok(())
}

fn next_batch<R>(
    points: &mut PointReader<R>,
    header: &Header,
    center: [f64; 3],
    batch_size: usize,
) -> Result<Vec<PointAndColor>>
where
    R: Read + Seek,
{
    let mut batch = Vec::with_capacity(batch_size.min(1 << 16));

    for point in points.by_ref().take(batch_size) {
        match point {
            Ok(point) => batch.push(PointAndColor {
                point: relative_position(&point, header, center),
                color: point_color(&point),
            }),
            Err(err) if err.is_recoverable() => {
                warn!("{err}");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(batch)
}

/// The stored colour if there is one, otherwise a grey level from the
/// intensity.
fn point_color(point: &Point) -> [f32; 3] {
    match point.color() {
        Some(color) => {
            let scale = u16::MAX as f32;
            [
                color.red as f32 / scale,
                color.green as f32 / scale,
                color.blue as f32 / scale,
            ]
        }
        None => {
            let level = 0.3 + 0.7 * normalized_intensity(point);
            [level; 3]
        }
    }
}
