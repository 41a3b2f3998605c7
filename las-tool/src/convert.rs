use crate::{
    io::{create_libpcl_pcd_writer, open_las, RawBinWriter},
    opts::Convert,
    types::{FileFormat, LibpclPoint},
    utils::{guess_file_format, normalized_intensity, relative_position},
};
use anyhow::{anyhow, bail, Context, Result};
use las_format::{Error, Header, Point, PointReader};
use log::{info, warn};
use std::{
    fs::{self, File},
    io::{prelude::*, BufReader, BufWriter},
    path::Path,
};

pub fn convert(args: Convert) -> Result<()> {
    let Convert {
        from,
        to,
        input,
        output,
    } = args;

    let from = match from {
        Some(format) => format,
        None => guess_file_format(&input)
            .ok_or_else(|| anyhow!("cannot guess format of input file '{}'", input.display()))?,
    };
    let to = match to {
        Some(format) => format,
        None => guess_file_format(&output).ok_or_else(|| {
            anyhow!("cannot guess format of output file '{}'", output.display())
        })?,
    };

    use FileFormat as F;
    match (from, to) {
        (F::Las, F::LibpclPcd) => las_to_libpcl_pcd(&input, &output)?,
        (F::Las, F::RawBin) => las_to_raw_bin(&input, &output)?,
        (F::Las, F::Las) => bail!("Nothing to be done"),
        (_, F::Las) => bail!("converting to LAS file is not supported"),
        (F::LibpclPcd | F::RawBin, _) => {
            bail!("only LAS files can be converted, but the input is {from:?}")
        }
    }

    Ok(())
}

/// Output point: position relative to the minimum bounds, intensity
/// scaled to 0..=1.
fn output_point(point: &Point, header: &Header) -> [f32; 4] {
    let [x, y, z] = relative_position(point, header, header.min_bounds());
    [x, y, z, normalized_intensity(point)]
}

/// Opens the input and its point stream. Fails before any output is
/// created when the points cannot be decoded at all.
fn open_points(input_path: &Path) -> Result<(Header, PointReader<BufReader<File>>)> {
    let decoder = open_las(input_path)?;
    let header = decoder.header().clone();

    if header.point_format().is_none() {
        let err = Error::UnrecognizedFormat(header.point_data_record_format);
        return Err(anyhow::Error::new(err).context(format!(
            "unable to convert the points of '{}'",
            input_path.display()
        )));
    }

    let points = decoder.into_points().with_context(|| {
        format!("unable to convert the points of '{}'", input_path.display())
    })?;
    Ok((header, points))
}

/// Removes the output of a failed conversion.
fn discard_incomplete<T>(output_path: &Path, result: Result<T>) -> Result<T> {
    if result.is_err() {
        match fs::remove_file(output_path) {
            Ok(()) => warn!("removed incomplete output '{}'", output_path.display()),
            Err(err) => warn!(
                "unable to remove incomplete output '{}': {err}",
                output_path.display()
            ),
        }
    }
    result
}

fn las_to_libpcl_pcd<PI, PO>(input_path: PI, output_path: PO) -> Result<()>
where
    PI: AsRef<Path>,
    PO: AsRef<Path>,
{
    let input_path = input_path.as_ref();
    let output_path = output_path.as_ref();
    let (header, points) = open_points(input_path)?;

    let width = usize::try_from(header.point_count())?;
    let writer = create_libpcl_pcd_writer(output_path, width)?;

    let result = write_libpcl_pcd(points, &header, writer).with_context(|| {
        format!("unable to convert all points of '{}'", input_path.display())
    });
    let count = discard_incomplete(output_path, result)?;
    info!("converted {count} points");

    Ok(())
}

fn write_libpcl_pcd<R>(
    points: PointReader<R>,
    header: &Header,
    mut writer: pcd_rs::Writer<LibpclPoint, BufWriter<File>>,
) -> Result<usize>
where
    R: Read + Seek,
{
    let mut count = 0;
    for point in points {
        let [x, y, z, intensity] = output_point(&point?, header);
        writer.push(&LibpclPoint { x, y, z, intensity })?;
        count += 1;
    }
    writer.finish()?;
    Ok(count)
}

fn las_to_raw_bin<PI, PO>(input_path: PI, output_path: PO) -> Result<()>
where
    PI: AsRef<Path>,
    PO: AsRef<Path>,
{
    let input_path = input_path.as_ref();
    let output_path = output_path.as_ref();
    let (header, points) = open_points(input_path)?;

    let writer = RawBinWriter::from_path(output_path)
        .with_context(|| format!("failed to create '{}'", output_path.display()))?;

    let result = write_raw_bin(points, &header, writer).with_context(|| {
        format!("unable to convert all points of '{}'", input_path.display())
    });
    let count = discard_incomplete(output_path, result)?;
    info!("converted {count} points");

    Ok(())
}

fn write_raw_bin<R, W>(
    points: PointReader<R>,
    header: &Header,
    mut writer: RawBinWriter<W>,
) -> Result<usize>
where
    R: Read + Seek,
    W: Write,
{
    for point in points {
        writer.push(output_point(&point?, header))?;
    }
    Ok(writer.finish()?)
}
