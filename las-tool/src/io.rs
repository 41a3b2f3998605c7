use crate::types::LibpclPoint;
use anyhow::{Context, Result};
use byteorder::{LittleEndian, WriteBytesExt};
use las_format::Decoder;
use std::{
    fs::File,
    io::{self, prelude::*, BufReader, BufWriter},
    path::Path,
};

/// Writes `[x, y, z, intensity]` quadruples as little-endian f32.
pub struct RawBinWriter<W>
where
    W: Write,
{
    writer: W,
    count: usize,
}

impl RawBinWriter<BufWriter<File>> {
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let writer = BufWriter::new(File::create(path)?);
        Ok(Self::new(writer))
    }
}

impl<W> RawBinWriter<W>
where
    W: Write,
{
    pub fn new(writer: W) -> Self {
        Self { writer, count: 0 }
    }

    pub fn push(&mut self, point: [f32; 4]) -> io::Result<()> {
        for val in point {
            self.writer.write_f32::<LittleEndian>(val)?;
        }
        self.count += 1;
        Ok(())
    }

    /// Flushes the output and returns the number of points written.
    pub fn finish(mut self) -> io::Result<usize> {
        self.writer.flush()?;
        Ok(self.count)
    }
}

pub fn open_las<P>(path: P) -> Result<Decoder<BufReader<File>>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    Decoder::open(path).with_context(|| format!("failed to open LAS file '{}'", path.display()))
}

pub fn create_libpcl_pcd_writer<P>(
    pcd_file: P,
    width: usize,
) -> Result<pcd_rs::Writer<LibpclPoint, BufWriter<File>>>
where
    P: AsRef<Path>,
{
    let pcd_file = pcd_file.as_ref();
    let writer = pcd_rs::WriterInit {
        width: width as u64,
        height: 1,
        viewpoint: Default::default(),
        data_kind: pcd_rs::DataKind::Binary,
        schema: None,
    }
    .create(pcd_file)
    .with_context(|| format!("failed to create the pcd file '{}'", pcd_file.display()))?;
    Ok(writer)
}
