//! Shader sources for 3D visualization

/// Point cloud shader: per-vertex color, shared view-projection uniform
pub const POINT_CLOUD_SHADER: &str = include_str!("shaders/point_cloud.wgsl");
