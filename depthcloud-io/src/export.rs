//! Snapshot export

use crate::ply::{PlyWriteOptions, PlyWriter};
use chrono::NaiveDateTime;
use depthcloud_core::{PointSet, Result};
use std::path::Path;

/// File name prefix of exported snapshots
pub const SNAPSHOT_PREFIX: &str = "zed_depth_";

/// Name of the snapshot taken at `time`: `zed_depth_<YYYYMMDD_HHMMSS>.ply`
pub fn snapshot_file_name(time: &NaiveDateTime) -> String {
    format!("{}{}.ply", SNAPSHOT_PREFIX, time.format("%Y%m%d_%H%M%S"))
}

/// Writes a point set snapshot to a file
pub trait PointCloudExporter {
    fn write_point_cloud(&mut self, path: &Path, cloud: &PointSet, ascii: bool) -> Result<()>;
}

/// Exports snapshots as PLY files
#[derive(Debug, Clone, Default)]
pub struct PlyExporter {
    comments: Vec<String>,
}

impl PlyExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header comment to every file written from now on
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comments.push(comment.into());
        self
    }
}

impl PointCloudExporter for PlyExporter {
    fn write_point_cloud(&mut self, path: &Path, cloud: &PointSet, ascii: bool) -> Result<()> {
        let mut options = if ascii {
            PlyWriteOptions::ascii()
        } else {
            PlyWriteOptions::binary()
        };
        options.comments.extend(self.comments.iter().cloned());

        PlyWriter::write_point_cloud_with_options(cloud, path, &options)?;
        tracing::debug!("Wrote {} points to {}", cloud.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use depthcloud_core::Point3f;
    use std::fs;

    #[test]
    fn test_snapshot_file_name_format() {
        let time = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 2)
            .unwrap();
        assert_eq!(snapshot_file_name(&time), "zed_depth_20240307_090502.ply");
    }

    #[test]
    fn test_exporter_writes_requested_encoding() {
        let dir = std::env::temp_dir();
        let ascii = dir.join(format!("depthcloud_{}_export_ascii.ply", std::process::id()));
        let binary = dir.join(format!("depthcloud_{}_export_binary.ply", std::process::id()));
        let cloud =
            PointSet::from_parts(vec![Point3f::new(1.0, 2.0, 3.0)], vec![[0.0, 0.5, 1.0]]).unwrap();

        let mut exporter = PlyExporter::new().with_comment("test run");
        exporter.write_point_cloud(&ascii, &cloud, true).unwrap();
        exporter.write_point_cloud(&binary, &cloud, false).unwrap();

        let text = fs::read_to_string(&ascii).unwrap();
        assert!(text.contains("format ascii 1.0"));
        assert!(text.contains("comment test run"));
        let bytes = fs::read(&binary).unwrap();
        let header = String::from_utf8_lossy(&bytes[..64]);
        assert!(header.contains("format binary_little_endian 1.0"));

        let _ = fs::remove_file(&ascii);
        let _ = fs::remove_file(&binary);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let path = std::env::temp_dir().join("depthcloud_no_such_dir").join("x").join("cloud.ply");
        let result = PlyExporter::new().write_point_cloud(&path, &PointSet::origin(), true);
        assert!(result.is_err());
    }
}
