use crate::{
    error::{Error, Result},
    header::Header,
};
use byteorder::{LittleEndian, ReadBytesExt};
use serde::Serialize;
use std::{fmt, io, io::prelude::*};

/// The point data record formats this crate can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PointFormat {
    Format0,
    Format1,
    Format3,
}

impl PointFormat {
    pub fn from_code(code: u8) -> Option<Self> {
        let format = match code {
            0 => Self::Format0,
            1 => Self::Format1,
            3 => Self::Format3,
            _ => return None,
        };
        Some(format)
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::Format0 => 0,
            Self::Format1 => 1,
            Self::Format3 => 3,
        }
    }

    /// Minimum bytes per record for this format.
    pub fn record_length(&self) -> u16 {
        let len = match self {
            Self::Format0 => Format0::LEN,
            Self::Format1 => Format1::LEN,
            Self::Format3 => Format3::LEN,
        };
        len as u16
    }

    pub fn has_gps_time(&self) -> bool {
        matches!(self, Self::Format1 | Self::Format3)
    }

    pub fn has_color(&self) -> bool {
        matches!(self, Self::Format3)
    }
}

impl TryFrom<u8> for PointFormat {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(Error::UnrecognizedFormat(code))
    }
}

impl fmt::Display for PointFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The packed return number / number of returns / scan direction /
/// edge of flight line byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct ReturnFlags(pub u8);

impl ReturnFlags {
    pub fn return_number(&self) -> u8 {
        self.0 & 0b111
    }

    pub fn number_of_returns(&self) -> u8 {
        (self.0 >> 3) & 0b111
    }

    pub fn scan_direction(&self) -> bool {
        (self.0 >> 6) & 1 == 1
    }

    pub fn edge_of_flight_line(&self) -> bool {
        (self.0 >> 7) & 1 == 1
    }
}

/// The classification byte. The low five bits hold the class, the upper
/// three bits are the synthetic, key-point and withheld flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Classification(pub u8);

impl Classification {
    pub fn class(&self) -> u8 {
        self.0 & 0b1_1111
    }

    pub fn is_synthetic(&self) -> bool {
        self.0 & 0b0010_0000 != 0
    }

    pub fn is_key_point(&self) -> bool {
        self.0 & 0b0100_0000 != 0
    }

    pub fn is_withheld(&self) -> bool {
        self.0 & 0b1000_0000 != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Color {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

/// Point data record format 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Format0 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub intensity: u16,
    pub flags: ReturnFlags,
    pub classification: Classification,
    pub scan_angle_rank: i8,
    pub user_data: u8,
    pub point_source_id: u16,
}

impl Format0 {
    pub const LEN: usize = 20;

    pub fn read_from<R>(mut reader: R) -> io::Result<Self>
    where
        R: Read,
    {
        Ok(Self {
            x: reader.read_i32::<LittleEndian>()?,
            y: reader.read_i32::<LittleEndian>()?,
            z: reader.read_i32::<LittleEndian>()?,
            intensity: reader.read_u16::<LittleEndian>()?,
            flags: ReturnFlags(reader.read_u8()?),
            classification: Classification(reader.read_u8()?),
            scan_angle_rank: reader.read_i8()?,
            user_data: reader.read_u8()?,
            point_source_id: reader.read_u16::<LittleEndian>()?,
        })
    }
}

/// Point data record format 1: format 0 followed by the GPS time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Format1 {
    #[serde(flatten)]
    pub base: Format0,
    pub gps_time: f64,
}

impl Format1 {
    pub const LEN: usize = Format0::LEN + 8;

    pub fn read_from<R>(mut reader: R) -> io::Result<Self>
    where
        R: Read,
    {
        let base = Format0::read_from(&mut reader)?;
        let gps_time = reader.read_f64::<LittleEndian>()?;
        Ok(Self { base, gps_time })
    }
}

/// Point data record format 3: format 1 followed by the colour channels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Format3 {
    #[serde(flatten)]
    pub base: Format1,
    pub color: Color,
}

impl Format3 {
    pub const LEN: usize = Format1::LEN + 6;

    pub fn read_from<R>(mut reader: R) -> io::Result<Self>
    where
        R: Read,
    {
        let base = Format1::read_from(&mut reader)?;

        // stored as red, blue, green
        let red = reader.read_u16::<LittleEndian>()?;
        let blue = reader.read_u16::<LittleEndian>()?;
        let green = reader.read_u16::<LittleEndian>()?;

        Ok(Self {
            base,
            color: Color { red, green, blue },
        })
    }
}

/// A decoded point record. Coordinates are kept as the stored integers;
/// use [`Point::position`] for real-world values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "format")]
pub enum Point {
    #[serde(rename = "0")]
    Format0(Format0),
    #[serde(rename = "1")]
    Format1(Format1),
    #[serde(rename = "3")]
    Format3(Format3),
}

impl Point {
    /// Decodes one record of the given format from the front of `reader`.
    pub fn read_from<R>(format: PointFormat, reader: R) -> io::Result<Self>
    where
        R: Read,
    {
        let point = match format {
            PointFormat::Format0 => Self::Format0(Format0::read_from(reader)?),
            PointFormat::Format1 => Self::Format1(Format1::read_from(reader)?),
            PointFormat::Format3 => Self::Format3(Format3::read_from(reader)?),
        };
        Ok(point)
    }

    pub fn format(&self) -> PointFormat {
        match self {
            Self::Format0(_) => PointFormat::Format0,
            Self::Format1(_) => PointFormat::Format1,
            Self::Format3(_) => PointFormat::Format3,
        }
    }

    /// The fields shared by every format.
    pub fn base(&self) -> &Format0 {
        match self {
            Self::Format0(point) => point,
            Self::Format1(point) => &point.base,
            Self::Format3(point) => &point.base.base,
        }
    }

    pub fn raw_position(&self) -> [i32; 3] {
        let Format0 { x, y, z, .. } = *self.base();
        [x, y, z]
    }

    /// Real-world coordinates using the scale and offset of `header`.
    pub fn position(&self, header: &Header) -> [f64; 3] {
        header.to_real(self.raw_position())
    }

    pub fn intensity(&self) -> u16 {
        self.base().intensity
    }

    pub fn gps_time(&self) -> Option<f64> {
        match self {
            Self::Format0(_) => None,
            Self::Format1(point) => Some(point.gps_time),
            Self::Format3(point) => Some(point.base.gps_time),
        }
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            Self::Format3(point) => Some(point.color),
            _ => None,
        }
    }
}
