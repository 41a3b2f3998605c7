mod tui;

use self::tui::{run_tui, Record, Value};
use crate::{io::open_las, opts::Dump, utils::RowWindow};
use anyhow::Result;
use itertools::Itertools;
use las_format::{Color, Header, Point, PointFormat};
use log::{debug, warn};
use std::{
    io::{self, prelude::*, BufWriter},
    ops::ControlFlow,
};

pub fn dump(args: Dump) -> Result<()> {
    let Dump {
        first,
        last,
        raw,
        tui,
        input,
    } = args;

    let mut decoder = open_las(&input)?;
    let header = decoder.header().clone();
    let titles = column_titles(header.point_format());
    let mut points = decoder.points()?;

    let issue = if first.is_none() && last.is_none() && !tui {
        let mut output = BufWriter::new(io::stdout().lock());
        writeln!(output, "{}", titles.iter().join("\t"))?;

        let issue = for_each_point(&mut points, |index, point| {
            let record = point_record(index, &point, &header, raw);
            writeln!(output, "{}", record.0.iter().join("\t"))?;
            Ok(ControlFlow::Continue(()))
        })?;

        output.flush()?;
        issue
    } else {
        let first = first.unwrap_or(if last.is_none() { usize::MAX } else { 0 });
        let mut window = RowWindow::new(first, last.unwrap_or(0));

        let issue = for_each_point(&mut points, |index, point| {
            window.push(point_record(index, &point, &header, raw));
            let flow = if window.is_saturated() {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            };
            Ok(flow)
        })?;

        let (head, skipped, tail) = window.into_parts();
        let mut records = head;
        if skipped > 0 {
            records.push(Record(vec![Value::from(format!("... {skipped} points"))]));
        }
        records.extend(tail);

        if tui {
            let title = format!(
                " {} | format {} | {} points ",
                input.display(),
                header.point_data_record_format,
                header.point_count()
            );
            run_tui(title, titles, records)?;
        } else {
            let mut output = BufWriter::new(io::stdout().lock());
            writeln!(output, "{}", titles.iter().join("\t"))?;
            for record in &records {
                writeln!(output, "{}", record.0.iter().join("\t"))?;
            }
            output.flush()?;
        }

        issue
    };

    debug!("{} points decoded", points.points_read());
    if let Some(err) = issue {
        warn!("{}: {err}", input.display());
    }

    Ok(())
}

/// Feeds decoded points to `f` until the stream ends or `f` breaks.
///
/// Returns the truncation or unrecognized format condition that ended the
/// stream, if any.
fn for_each_point<I, F>(points: I, mut f: F) -> Result<Option<las_format::Error>>
where
    I: Iterator<Item = las_format::Result<Point>>,
    F: FnMut(u64, Point) -> Result<ControlFlow<()>>,
{
    for (index, point) in points.enumerate() {
        match point {
            Ok(point) => {
                if f(index as u64, point)?.is_break() {
                    break;
                }
            }
            Err(err) if err.is_recoverable() => return Ok(Some(err)),
            Err(err) => return Err(err.into()),
        }
    }

    Ok(None)
}

fn column_titles(format: Option<PointFormat>) -> Vec<String> {
    let mut titles = vec![
        "index",
        "x",
        "y",
        "z",
        "intensity",
        "return",
        "returns",
        "scan_dir",
        "edge",
        "class",
        "scan_angle",
        "user_data",
        "source_id",
    ];

    if let Some(format) = format {
        if format.has_gps_time() {
            titles.push("gps_time");
        }
        if format.has_color() {
            titles.extend(["red", "green", "blue"]);
        }
    }

    titles.into_iter().map(String::from).collect()
}

fn point_record(index: u64, point: &Point, header: &Header, raw: bool) -> Record {
    let mut values = vec![Value::from(index)];

    if raw {
        values.extend(point.raw_position().map(Value::from));
    } else {
        values.extend(point.position(header).map(Value::from));
    }

    let base = point.base();
    values.extend([
        Value::from(base.intensity),
        Value::from(base.flags.return_number()),
        Value::from(base.flags.number_of_returns()),
        Value::from(base.flags.scan_direction() as u8),
        Value::from(base.flags.edge_of_flight_line() as u8),
        Value::from(base.classification.class()),
        Value::from(base.scan_angle_rank),
        Value::from(base.user_data),
        Value::from(base.point_source_id),
    ]);

    if let Some(gps_time) = point.gps_time() {
        values.push(Value::from(gps_time));
    }
    if let Some(Color { red, green, blue }) = point.color() {
        values.extend([Value::from(red), Value::from(green), Value::from(blue)]);
    }

    Record(values)
}
