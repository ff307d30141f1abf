//! I/O operations for point sets
//!
//! This crate writes point-cloud snapshots to disk (PLY, ASCII by default)
//! and reads them back for inspection.

pub mod ply;
pub mod export;
pub mod error;

pub use error::*;
pub use export::{snapshot_file_name, PlyExporter, PointCloudExporter, SNAPSHOT_PREFIX};
pub use ply::{PlyFormat, PlyReader, PlyWriteOptions, PlyWriter};

use depthcloud_core::{PointSet, Result};

/// Trait for reading point sets from files
pub trait PointCloudReader {
    fn read_point_cloud<P: AsRef<std::path::Path>>(path: P) -> Result<PointSet>;
}

/// Trait for writing point sets to files
pub trait PointCloudWriter {
    fn write_point_cloud<P: AsRef<std::path::Path>>(cloud: &PointSet, path: P) -> Result<()>;
}

/// Auto-detect format and read a point set
pub fn read_point_cloud<P: AsRef<std::path::Path>>(path: P) -> Result<PointSet> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("ply") => ply::PlyReader::read_point_cloud(path),
        _ => Err(IoError::InvalidFormat {
            format: format!("Unsupported point cloud format: {:?}", path.extension()),
        }
        .into()),
    }
}

/// Auto-detect format and write a point set
pub fn write_point_cloud<P: AsRef<std::path::Path>>(cloud: &PointSet, path: P) -> Result<()> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("ply") => ply::PlyWriter::write_point_cloud(cloud, path),
        _ => Err(IoError::InvalidFormat {
            format: format!("Unsupported point cloud format: {:?}", path.extension()),
        }
        .into()),
    }
}
