//! Decoder for LAS point cloud files with the legacy point data record
//! formats 0, 1 and 3.
//!
//! ```no_run
//! use las_format::Decoder;
//!
//! # fn main() -> las_format::Result<()> {
//! let mut decoder = Decoder::open("points.las")?;
//! let header = decoder.header().clone();
//!
//! for point in decoder.points()? {
//!     let [x, y, z] = point?.position(&header);
//!     println!("{x} {y} {z}");
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod header;
mod point;
mod reader;

pub use error::{Error, Result};
pub use header::{Guid, Header, FILE_SIGNATURE, HEADER_SIZE};
pub use point::{Classification, Color, Format0, Format1, Format3, Point, PointFormat, ReturnFlags};
pub use reader::{DecodeStatus, DecodedPoints, Decoder, PointReader};
