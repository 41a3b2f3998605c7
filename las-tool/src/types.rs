use clap::ValueEnum;
use pcd_rs::PcdSerialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum FileFormat {
    #[value(name = "las")]
    Las,
    #[value(name = "pcd.libpcl")]
    LibpclPcd,
    #[value(name = "bin")]
    RawBin,
}

/// Point layout of the libpcl PCD files written by `convert`.
#[derive(Debug, Clone, Copy, PartialEq, PcdSerialize)]
pub struct LibpclPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub intensity: f32,
}
