use crate::{
    error::{Error, Result},
    header::Header,
    point::{Point, PointFormat},
};
use log::{debug, warn};
use serde::Serialize;
use std::{
    fs::File,
    io::{self, prelude::*, BufReader, Cursor, SeekFrom},
    iter::FusedIterator,
    path::Path,
};

/// Upper bound on the number of points reserved up front by bulk decode,
/// so a bogus point count in the header cannot trigger a huge allocation.
const MAX_PREALLOC_POINTS: u64 = 1 << 20;

/// How a point decode run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DecodeStatus {
    /// Every record declared by the header was decoded.
    Complete,
    /// The source ended after `decoded` of `expected` records.
    Truncated { expected: u64, decoded: u64 },
    /// The header declares a point format that is not supported. No
    /// records were decoded.
    UnrecognizedFormat(u8),
}

/// Result of a bulk decode: the points in file order plus how the run ended.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPoints {
    pub points: Vec<Point>,
    pub status: DecodeStatus,
}

impl DecodedPoints {
    pub fn is_complete(&self) -> bool {
        self.status == DecodeStatus::Complete
    }

    /// Returns the points only if the run was complete.
    pub fn into_result(self) -> Result<Vec<Point>> {
        match self.status {
            DecodeStatus::Complete => Ok(self.points),
            DecodeStatus::Truncated { expected, decoded } => {
                Err(Error::Truncated { expected, decoded })
            }
            DecodeStatus::UnrecognizedFormat(code) => Err(Error::UnrecognizedFormat(code)),
        }
    }
}

/// Streaming decoder for the point data records.
///
/// Points are produced one at a time in file order, reusing a single
/// record buffer. A truncated source or an unsupported point format is
/// reported by one `Err` item, after which the iterator is exhausted.
pub struct PointReader<R> {
    source: R,
    header: Header,
    format: Option<PointFormat>,
    record: Vec<u8>,
    points_read: u64,
    finished: bool,
}

impl<R> PointReader<R>
where
    R: Read + Seek,
{
    /// Seeks `source` to the start of the point data declared by `header`.
    pub fn new(mut source: R, header: &Header) -> Result<Self> {
        let format = header.point_format();
        let record_length = header.point_data_record_length;

        if let Some(format) = format {
            let expected = format.record_length();

            if record_length < expected {
                return Err(Error::RecordLengthTooShort {
                    format: format.code(),
                    record_length,
                    expected,
                });
            }

            if record_length > expected {
                warn!(
                    "point format {format} records are {record_length} bytes long, \
                     skipping {} trailing bytes per record",
                    record_length - expected
                );
            }
        }

        source.seek(SeekFrom::Start(header.offset_to_point_data.into()))?;
        debug!(
            "reading {} point records at offset {}",
            header.point_count(),
            header.offset_to_point_data
        );

        Ok(Self {
            source,
            header: header.clone(),
            format,
            record: vec![0; record_length as usize],
            points_read: 0,
            finished: false,
        })
    }

    /// Decodes the next point, or returns `None` once the declared number
    /// of points has been read.
    pub fn read_point(&mut self) -> Result<Option<Point>> {
        if self.finished {
            return Ok(None);
        }

        let Some(format) = self.format else {
            self.finished = true;
            let code = self.header.point_data_record_format;
            warn!("unrecognized point data record format {code}, no points decoded");
            return Err(Error::UnrecognizedFormat(code));
        };

        if self.points_read >= self.header.point_count() {
            self.finished = true;
            return Ok(None);
        }

        let filled = match self.fill_record() {
            Ok(filled) => filled,
            Err(err) => {
                self.finished = true;
                return Err(err.into());
            }
        };

        if filled < self.record.len() {
            self.finished = true;
            warn!(
                "point data ends after {} of {} records, {filled} of {} bytes left for the next one",
                self.points_read,
                self.header.point_count(),
                self.record.len()
            );
            return Err(Error::Truncated {
                expected: self.header.point_count(),
                decoded: self.points_read,
            });
        }

        // trailing bytes past the format width are never looked at
        let point = Point::read_from(format, self.record.as_slice())?;
        self.points_read += 1;
        Ok(Some(point))
    }

    /// Decodes all remaining points into memory.
    ///
    /// Truncation and unrecognized formats are not errors here; they are
    /// reported in [`DecodedPoints::status`] alongside whatever points
    /// were decoded. I/O failures are still returned as `Err`.
    pub fn read_all(mut self) -> Result<DecodedPoints> {
        let capacity = self.remaining().min(MAX_PREALLOC_POINTS) as usize;
        let mut points = Vec::with_capacity(capacity);

        let status = loop {
            match self.read_point() {
                Ok(Some(point)) => points.push(point),
                Ok(None) => break DecodeStatus::Complete,
                Err(Error::Truncated { expected, decoded }) => {
                    break DecodeStatus::Truncated { expected, decoded }
                }
                Err(Error::UnrecognizedFormat(code)) => {
                    break DecodeStatus::UnrecognizedFormat(code)
                }
                Err(err) => return Err(err),
            }
        };

        Ok(DecodedPoints { points, status })
    }

    /// Reads one record into the buffer and returns how many bytes were
    /// available.
    fn fill_record(&mut self) -> io::Result<usize> {
        let mut filled = 0;

        while filled < self.record.len() {
            match self.source.read(&mut self.record[filled..]) {
                Ok(0) => break,
                Ok(count) => filled += count,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }

        Ok(filled)
    }
}

impl<R> PointReader<R> {
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn format(&self) -> Option<PointFormat> {
        self.format
    }

    pub fn points_read(&self) -> u64 {
        self.points_read
    }

    /// Number of points the header declares that have not been read yet.
    pub fn remaining(&self) -> u64 {
        self.header.point_count().saturating_sub(self.points_read)
    }

    pub fn into_inner(self) -> R {
        self.source
    }
}

impl<R> Iterator for PointReader<R>
where
    R: Read + Seek,
{
    type Item = Result<Point>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_point().transpose()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }

        // one extra item for a possible truncation error
        let upper = usize::try_from(self.remaining())
            .ok()
            .and_then(|remaining| remaining.checked_add(1));
        (0, upper)
    }
}

impl<R> FusedIterator for PointReader<R> where R: Read + Seek {}

/// Header and point decoding over one byte source.
pub struct Decoder<R> {
    source: R,
    header: Header,
}

impl Decoder<BufReader<File>> {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<'a> Decoder<Cursor<&'a [u8]>> {
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        Self::new(Cursor::new(bytes))
    }
}

impl<R> Decoder<R>
where
    R: Read + Seek,
{
    /// Rewinds `source` and decodes the header.
    pub fn new(mut source: R) -> Result<Self> {
        source.rewind()?;
        let header = Header::read_from(&mut source)?;
        Ok(Self { source, header })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Streams the points while keeping the decoder, and its header,
    /// around.
    pub fn points(&mut self) -> Result<PointReader<&mut R>> {
        PointReader::new(&mut self.source, &self.header)
    }

    pub fn into_points(self) -> Result<PointReader<R>> {
        PointReader::new(self.source, &self.header)
    }

    pub fn read_all(&mut self) -> Result<DecodedPoints> {
        self.points()?.read_all()
    }

    pub fn into_parts(self) -> (Header, R) {
        (self.header, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_result_reports_truncation() {
        let decoded = DecodedPoints {
            points: vec![],
            status: DecodeStatus::Truncated {
                expected: 3,
                decoded: 0,
            },
        };
        assert!(!decoded.is_complete());
        assert!(matches!(
            decoded.into_result(),
            Err(Error::Truncated {
                expected: 3,
                decoded: 0
            })
        ));
    }

    #[test]
    fn into_result_reports_unrecognized_format() {
        let decoded = DecodedPoints {
            points: vec![],
            status: DecodeStatus::UnrecognizedFormat(2),
        };
        let err = decoded.into_result().unwrap_err();
        assert!(err.is_recoverable());
        assert!(matches!(err, Error::UnrecognizedFormat(2)));
    }

    #[test]
    fn empty_source_has_no_header() {
        let err = Decoder::from_bytes(&[]).err().unwrap();
        assert!(!err.is_recoverable());
        assert!(matches!(
            err,
            Error::TruncatedHeader {
                available: 0,
                ..
            }
        ));
    }

    /// Hands out at most `chunk` bytes per call and fails every other call
    /// with `Interrupted`.
    struct Stuttering {
        inner: Cursor<Vec<u8>>,
        chunk: usize,
        interrupt: bool,
    }

    impl Read for Stuttering {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::ErrorKind::Interrupted.into());
            }
            let len = buf.len().min(self.chunk);
            self.inner.read(&mut buf[..len])
        }
    }

    impl Seek for Stuttering {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    fn format0_header(count: u32) -> Header {
        let mut bytes = vec![0u8; crate::HEADER_SIZE];
        bytes[..4].copy_from_slice(&crate::FILE_SIGNATURE);
        bytes[105..107].copy_from_slice(&20u16.to_le_bytes());
        bytes[107..111].copy_from_slice(&count.to_le_bytes());
        // point data starts at offset 0 of the test source
        Header::parse(&bytes).unwrap()
    }

    fn format0_record(x: i32, intensity: u16) -> Vec<u8> {
        let mut record = vec![0u8; 20];
        record[..4].copy_from_slice(&x.to_le_bytes());
        record[12..14].copy_from_slice(&intensity.to_le_bytes());
        record
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let mut bytes = format0_record(-7, 100);
        bytes.extend(format0_record(42, 200));
        let source = Stuttering {
            inner: Cursor::new(bytes),
            chunk: 7,
            interrupt: false,
        };

        let decoded = PointReader::new(source, &format0_header(2))
            .unwrap()
            .read_all()
            .unwrap();

        assert_eq!(decoded.status, DecodeStatus::Complete);
        let xs: Vec<_> = decoded.points.iter().map(|p| p.raw_position()[0]).collect();
        let intensities: Vec<_> = decoded.points.iter().map(|p| p.intensity()).collect();
        assert_eq!(xs, [-7, 42]);
        assert_eq!(intensities, [100, 200]);
    }

    #[test]
    fn interrupted_reads_do_not_hide_truncation() {
        let mut bytes = format0_record(1, 1);
        bytes.extend(&format0_record(2, 2)[..9]);
        let source = Stuttering {
            inner: Cursor::new(bytes),
            chunk: 4,
            interrupt: false,
        };

        let mut reader = PointReader::new(source, &format0_header(2)).unwrap();
        assert!(reader.next().unwrap().is_ok());
        assert!(matches!(
            reader.next(),
            Some(Err(Error::Truncated {
                expected: 2,
                decoded: 1
            }))
        ));
        assert!(reader.next().is_none());
    }
}
