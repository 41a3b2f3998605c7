use crate::types::FileFormat;
use las_format::{Header, Point};
use std::{collections::VecDeque, path::Path};

pub fn guess_file_format<P>(file: P) -> Option<FileFormat>
where
    P: AsRef<Path>,
{
    let file = file.as_ref();
    let file_name = file.file_name()?.to_str()?.to_ascii_lowercase();

    let format = if file_name.ends_with(".las") {
        FileFormat::Las
    } else if file_name.ends_with(".pcd") {
        FileFormat::LibpclPcd
    } else if file_name.ends_with(".bin") {
        FileFormat::RawBin
    } else {
        return None;
    };

    Some(format)
}

/// Real-world position of `point` relative to `origin`, narrowed to f32.
///
/// Subtracting the origin in f64 first keeps the precision that
/// georeferenced coordinates would lose in f32.
pub fn relative_position(point: &Point, header: &Header, origin: [f64; 3]) -> [f32; 3] {
    let [x, y, z] = point.position(header);
    let [ox, oy, oz] = origin;
    [(x - ox) as f32, (y - oy) as f32, (z - oz) as f32]
}

pub fn bounds_center(header: &Header) -> [f64; 3] {
    let [min_x, min_y, min_z] = header.min_bounds();
    let [max_x, max_y, max_z] = header.max_bounds();
    [
        (min_x + max_x) / 2.0,
        (min_y + max_y) / 2.0,
        (min_z + max_z) / 2.0,
    ]
}

/// Intensity scaled to 0..=1.
pub fn normalized_intensity(point: &Point) -> f32 {
    point.intensity() as f32 / u16::MAX as f32
}

/// Keeps the first and the last items of a stream without buffering
/// the middle part.
#[derive(Debug, Clone)]
pub struct RowWindow<T> {
    first: usize,
    last: usize,
    head: Vec<T>,
    tail: VecDeque<T>,
    skipped: u64,
}

impl<T> RowWindow<T> {
    pub fn new(first: usize, last: usize) -> Self {
        Self {
            first,
            last,
            head: Vec::with_capacity(first.min(4096)),
            tail: VecDeque::with_capacity(last.min(4096)),
            skipped: 0,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.head.len() < self.first {
            self.head.push(item);
            return;
        }

        if self.last == 0 {
            self.skipped += 1;
            return;
        }

        if self.tail.len() == self.last {
            self.tail.pop_front();
            self.skipped += 1;
        }
        self.tail.push_back(item);
    }

    /// True once further items can only be skipped.
    pub fn is_saturated(&self) -> bool {
        self.last == 0 && self.head.len() == self.first
    }

    /// Returns the leading items, the number of items dropped in between
    /// and the trailing items.
    pub fn into_parts(self) -> (Vec<T>, u64, Vec<T>) {
        (self.head, self.skipped, self.tail.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guess_formats_from_extension() {
        assert_eq!(guess_file_format("a/b/scan.las"), Some(FileFormat::Las));
        assert_eq!(guess_file_format("SCAN.LAS"), Some(FileFormat::Las));
        assert_eq!(guess_file_format("out.pcd"), Some(FileFormat::LibpclPcd));
        assert_eq!(guess_file_format("000001.bin"), Some(FileFormat::RawBin));
        assert_eq!(guess_file_format("scan.laz"), None);
        assert_eq!(guess_file_format("las"), None);
    }

    #[test]
    fn window_keeps_head_and_tail() {
        let mut window = RowWindow::new(2, 3);
        (0..10).for_each(|idx| window.push(idx));

        let (head, skipped, tail) = window.into_parts();
        assert_eq!(head, [0, 1]);
        assert_eq!(skipped, 5);
        assert_eq!(tail, [7, 8, 9]);
    }

    #[test]
    fn window_with_few_items_skips_nothing() {
        let mut window = RowWindow::new(5, 5);
        (0..7).for_each(|idx| window.push(idx));

        let (head, skipped, tail) = window.into_parts();
        assert_eq!(head, [0, 1, 2, 3, 4]);
        assert_eq!(skipped, 0);
        assert_eq!(tail, [5, 6]);
    }

    #[test]
    fn window_without_tail_saturates() {
        let mut window = RowWindow::new(2, 0);
        window.push('a');
        assert!(!window.is_saturated());
        window.push('b');
        assert!(window.is_saturated());
        window.push('c');

        let (head, skipped, tail) = window.into_parts();
        assert_eq!(head, ['a', 'b']);
        assert_eq!(skipped, 1);
        assert!(tail.is_empty());
    }
}
