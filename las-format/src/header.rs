use crate::{
    error::{Error, Result},
    point::PointFormat,
};
use byteorder::{LittleEndian, ReadBytesExt};
use log::debug;
use serde::Serialize;
use std::io::{self, prelude::*};

/// The magic bytes every LAS file starts with.
pub const FILE_SIGNATURE: [u8; 4] = *b"LASF";

/// Byte length of the fixed header block up to and including the bounds.
///
/// This is the LAS 1.0-1.2 public header. Later revisions append fields
/// (waveform packets, extended point counts) which are not modeled; they
/// are stepped over by seeking to [`Header::offset_to_point_data`].
pub const HEADER_SIZE: usize = 227;

/// Project identifier, stored as four sub-fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Guid {
    #[serde(rename = "GUID1")]
    pub data1: u32,
    #[serde(rename = "GUID2")]
    pub data2: u16,
    #[serde(rename = "GUID3")]
    pub data3: u16,
    #[serde(rename = "GUID4")]
    pub data4: [u8; 8],
}

/// The public header block of a LAS file.
///
/// Field order and widths follow the on-disk layout. Nothing is
/// normalized: character arrays keep their padding bytes and the
/// scale/offset/bounds values are transcribed as stored.
///
/// Serializes as one flat object keyed by the LAS field names
/// (`FileSignature`, `GUID1`, `NumberOfVLRs`, `XScale`, `MaxX`, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Header {
    pub file_signature: [u8; 4],
    #[serde(rename = "FileSourceID")]
    pub file_source_id: u16,
    pub global_encoding: u16,
    #[serde(flatten)]
    pub guid: Guid,
    pub version_major: u8,
    pub version_minor: u8,
    pub system_identifier: [u8; 32],
    pub generating_software: [u8; 32],
    pub file_creation_day_of_year: u16,
    pub file_creation_year: u16,
    pub header_size: u16,
    pub offset_to_point_data: u32,
    #[serde(rename = "NumberOfVLRs")]
    pub number_of_vlrs: u32,
    pub point_data_record_format: u8,
    pub point_data_record_length: u16,
    pub legacy_number_of_point_records: u32,
    pub legacy_number_of_points_by_return: [u32; 5],
    pub x_scale: f64,
    pub y_scale: f64,
    pub z_scale: f64,
    pub x_offset: f64,
    pub y_offset: f64,
    pub z_offset: f64,
    pub max_x: f64,
    pub min_x: f64,
    pub max_y: f64,
    pub min_y: f64,
    pub max_z: f64,
    pub min_z: f64,
}

impl Header {
    /// Reads the header from the current position of `reader`.
    ///
    /// Consumes exactly [`HEADER_SIZE`] bytes. Fails with
    /// [`Error::TruncatedHeader`] if the source ends early and with
    /// [`Error::InvalidSignature`] if the magic bytes do not match.
    pub fn read_from<R>(mut reader: R) -> Result<Self>
    where
        R: Read,
    {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        reader
            .by_ref()
            .take(HEADER_SIZE as u64)
            .read_to_end(&mut bytes)?;

        let header = Self::parse(&bytes)?;
        header.check_signature()?;

        debug!(
            "decoded LAS {}.{} header: format {}, {} points of {} bytes at offset {}",
            header.version_major,
            header.version_minor,
            header.point_data_record_format,
            header.legacy_number_of_point_records,
            header.point_data_record_length,
            header.offset_to_point_data
        );

        Ok(header)
    }

    /// Transcribes an in-memory header block without checking the
    /// signature. Bytes past [`HEADER_SIZE`] are ignored.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let Some(mut bytes) = bytes.get(..HEADER_SIZE) else {
            return Err(Error::TruncatedHeader {
                expected: HEADER_SIZE,
                available: bytes.len(),
            });
        };

        let header = Self::read_fields(&mut bytes)?;
        Ok(header)
    }

    fn read_fields(input: &mut &[u8]) -> io::Result<Self> {
        let mut file_signature = [0; 4];
        input.read_exact(&mut file_signature)?;
        let file_source_id = input.read_u16::<LittleEndian>()?;
        let global_encoding = input.read_u16::<LittleEndian>()?;

        let guid = {
            let data1 = input.read_u32::<LittleEndian>()?;
            let data2 = input.read_u16::<LittleEndian>()?;
            let data3 = input.read_u16::<LittleEndian>()?;
            let mut data4 = [0; 8];
            input.read_exact(&mut data4)?;
            Guid {
                data1,
                data2,
                data3,
                data4,
            }
        };

        let version_major = input.read_u8()?;
        let version_minor = input.read_u8()?;
        let mut system_identifier = [0; 32];
        input.read_exact(&mut system_identifier)?;
        let mut generating_software = [0; 32];
        input.read_exact(&mut generating_software)?;
        let file_creation_day_of_year = input.read_u16::<LittleEndian>()?;
        let file_creation_year = input.read_u16::<LittleEndian>()?;
        let header_size = input.read_u16::<LittleEndian>()?;
        let offset_to_point_data = input.read_u32::<LittleEndian>()?;
        let number_of_vlrs = input.read_u32::<LittleEndian>()?;
        let point_data_record_format = input.read_u8()?;
        let point_data_record_length = input.read_u16::<LittleEndian>()?;
        let legacy_number_of_point_records = input.read_u32::<LittleEndian>()?;
        let mut legacy_number_of_points_by_return = [0; 5];
        input.read_u32_into::<LittleEndian>(&mut legacy_number_of_points_by_return)?;

        Ok(Self {
            file_signature,
            file_source_id,
            global_encoding,
            guid,
            version_major,
            version_minor,
            system_identifier,
            generating_software,
            file_creation_day_of_year,
            file_creation_year,
            header_size,
            offset_to_point_data,
            number_of_vlrs,
            point_data_record_format,
            point_data_record_length,
            legacy_number_of_point_records,
            legacy_number_of_points_by_return,
            x_scale: input.read_f64::<LittleEndian>()?,
            y_scale: input.read_f64::<LittleEndian>()?,
            z_scale: input.read_f64::<LittleEndian>()?,
            x_offset: input.read_f64::<LittleEndian>()?,
            y_offset: input.read_f64::<LittleEndian>()?,
            z_offset: input.read_f64::<LittleEndian>()?,
            max_x: input.read_f64::<LittleEndian>()?,
            min_x: input.read_f64::<LittleEndian>()?,
            max_y: input.read_f64::<LittleEndian>()?,
            min_y: input.read_f64::<LittleEndian>()?,
            max_z: input.read_f64::<LittleEndian>()?,
            min_z: input.read_f64::<LittleEndian>()?,
        })
    }

    pub fn check_signature(&self) -> Result<()> {
        if self.file_signature != FILE_SIGNATURE {
            return Err(Error::InvalidSignature {
                found: self.file_signature,
            });
        }
        Ok(())
    }

    /// The point shape selected by the format code, if it is one of the
    /// supported legacy formats.
    pub fn point_format(&self) -> Option<PointFormat> {
        PointFormat::from_code(self.point_data_record_format)
    }

    pub fn point_count(&self) -> u64 {
        self.legacy_number_of_point_records as u64
    }

    pub fn version(&self) -> (u8, u8) {
        (self.version_major, self.version_minor)
    }

    pub fn scale(&self) -> [f64; 3] {
        [self.x_scale, self.y_scale, self.z_scale]
    }

    pub fn offset(&self) -> [f64; 3] {
        [self.x_offset, self.y_offset, self.z_offset]
    }

    pub fn min_bounds(&self) -> [f64; 3] {
        [self.min_x, self.min_y, self.min_z]
    }

    pub fn max_bounds(&self) -> [f64; 3] {
        [self.max_x, self.max_y, self.max_z]
    }

    /// Converts stored integer coordinates to real-world coordinates,
    /// `raw * scale + offset` per axis.
    pub fn to_real(&self, raw: [i32; 3]) -> [f64; 3] {
        let [x, y, z] = raw;
        [
            f64::from(x) * self.x_scale + self.x_offset,
            f64::from(y) * self.y_scale + self.y_offset,
            f64::from(z) * self.z_scale + self.z_offset,
        ]
    }

    pub fn system_identifier_str(&self) -> String {
        display_str(&self.system_identifier)
    }

    pub fn generating_software_str(&self) -> String {
        display_str(&self.generating_software)
    }
}

fn display_str(bytes: &[u8]) -> String {
    let end = bytes
        .iter()
        .rposition(|&byte| byte != 0)
        .map(|idx| idx + 1)
        .unwrap_or(0);
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
