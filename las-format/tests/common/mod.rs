#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use las_format::{Guid, Header, FILE_SIGNATURE, HEADER_SIZE};

/// Field values of one point, independent of the record format.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestPoint {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub intensity: u16,
    pub flags: u8,
    pub classification: u8,
    pub scan_angle_rank: i8,
    pub user_data: u8,
    pub point_source_id: u16,
    pub gps_time: f64,
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

pub fn test_header(format: u8, record_length: u16, count: u32) -> Header {
    let mut system_identifier = [0; 32];
    system_identifier[..5].copy_from_slice(b"TESTS");
    let mut generating_software = [b' '; 32];
    generating_software[..8].copy_from_slice(b"las-test");

    Header {
        file_signature: FILE_SIGNATURE,
        file_source_id: 17,
        global_encoding: 1,
        guid: Guid {
            data1: 0xDEAD_BEEF,
            data2: 0x1234,
            data3: 0x5678,
            data4: [1, 2, 3, 4, 5, 6, 7, 8],
        },
        version_major: 1,
        version_minor: 2,
        system_identifier,
        generating_software,
        file_creation_day_of_year: 140,
        file_creation_year: 2016,
        header_size: HEADER_SIZE as u16,
        offset_to_point_data: HEADER_SIZE as u32,
        number_of_vlrs: 0,
        point_data_record_format: format,
        point_data_record_length: record_length,
        legacy_number_of_point_records: count,
        legacy_number_of_points_by_return: [count, 0, 0, 0, 0],
        x_scale: 0.01,
        y_scale: 0.01,
        z_scale: 0.001,
        x_offset: 500_000.0,
        y_offset: 4_000_000.0,
        z_offset: 0.0,
        max_x: 500_100.0,
        min_x: 499_900.0,
        max_y: 4_000_100.0,
        min_y: 3_999_900.0,
        max_z: 50.0,
        min_z: -5.0,
    }
}

/// Encodes the fixed header fields in file order.
pub fn encode_header(header: &Header) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_SIZE);

    out.extend_from_slice(&header.file_signature);
    out.write_u16::<LittleEndian>(header.file_source_id).unwrap();
    out.write_u16::<LittleEndian>(header.global_encoding).unwrap();
    out.write_u32::<LittleEndian>(header.guid.data1).unwrap();
    out.write_u16::<LittleEndian>(header.guid.data2).unwrap();
    out.write_u16::<LittleEndian>(header.guid.data3).unwrap();
    out.extend_from_slice(&header.guid.data4);
    out.write_u8(header.version_major).unwrap();
    out.write_u8(header.version_minor).unwrap();
    out.extend_from_slice(&header.system_identifier);
    out.extend_from_slice(&header.generating_software);
    out.write_u16::<LittleEndian>(header.file_creation_day_of_year)
        .unwrap();
    out.write_u16::<LittleEndian>(header.file_creation_year).unwrap();
    out.write_u16::<LittleEndian>(header.header_size).unwrap();
    out.write_u32::<LittleEndian>(header.offset_to_point_data)
        .unwrap();
    out.write_u32::<LittleEndian>(header.number_of_vlrs).unwrap();
    out.write_u8(header.point_data_record_format).unwrap();
    out.write_u16::<LittleEndian>(header.point_data_record_length)
        .unwrap();
    out.write_u32::<LittleEndian>(header.legacy_number_of_point_records)
        .unwrap();
    for count in header.legacy_number_of_points_by_return {
        out.write_u32::<LittleEndian>(count).unwrap();
    }
    for value in [
        header.x_scale,
        header.y_scale,
        header.z_scale,
        header.x_offset,
        header.y_offset,
        header.z_offset,
        header.max_x,
        header.min_x,
        header.max_y,
        header.min_y,
        header.max_z,
        header.min_z,
    ] {
        out.write_f64::<LittleEndian>(value).unwrap();
    }

    assert_eq!(out.len(), HEADER_SIZE);
    out
}

/// Encodes one record of `format`, zero-padded to `record_length`.
pub fn encode_point(point: &TestPoint, format: u8, record_length: u16) -> Vec<u8> {
    let mut out = vec![];

    out.write_i32::<LittleEndian>(point.x).unwrap();
    out.write_i32::<LittleEndian>(point.y).unwrap();
    out.write_i32::<LittleEndian>(point.z).unwrap();
    out.write_u16::<LittleEndian>(point.intensity).unwrap();
    out.write_u8(point.flags).unwrap();
    out.write_u8(point.classification).unwrap();
    out.write_i8(point.scan_angle_rank).unwrap();
    out.write_u8(point.user_data).unwrap();
    out.write_u16::<LittleEndian>(point.point_source_id).unwrap();

    if format == 1 || format == 3 {
        out.write_f64::<LittleEndian>(point.gps_time).unwrap();
    }
    if format == 3 {
        out.write_u16::<LittleEndian>(point.red).unwrap();
        out.write_u16::<LittleEndian>(point.blue).unwrap();
        out.write_u16::<LittleEndian>(point.green).unwrap();
    }

    assert!(out.len() <= record_length as usize);
    out.resize(record_length as usize, 0);
    out
}

/// Builds a complete file image. The gap between the header and
/// `offset_to_point_data` is filled with 0xEE.
pub fn encode_file(header: &Header, points: &[TestPoint]) -> Vec<u8> {
    let mut out = encode_header(header);
    out.resize(header.offset_to_point_data as usize, 0xEE);

    for point in points {
        out.extend(encode_point(
            point,
            header.point_data_record_format,
            header.point_data_record_length,
        ));
    }

    out
}

pub fn gen_points(count: usize) -> Vec<TestPoint> {
    (0..count)
        .map(|idx| {
            let idx_i32 = idx as i32;
            TestPoint {
                x: idx_i32 * 100 - 5_000,
                y: -idx_i32 * 37,
                z: idx_i32 * 1_001,
                intensity: (idx * 13) as u16,
                flags: 0b0000_1001 | ((idx as u8 & 1) << 6),
                classification: (idx % 32) as u8,
                scan_angle_rank: (idx as i8).wrapping_sub(90),
                user_data: idx as u8,
                point_source_id: 1000 + idx as u16,
                gps_time: 345_600.0 + idx as f64 * 0.25,
                red: (idx * 3) as u16,
                green: (idx * 5) as u16,
                blue: (idx * 7) as u16,
            }
        })
        .collect()
}
