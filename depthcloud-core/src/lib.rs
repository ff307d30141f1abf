//! Core data structures for depthcloud
//!
//! This crate provides the per-frame building blocks of the depth streaming
//! pipeline: the reusable measurement buffer, the packed color decoder, the
//! invalid-sample filter and the point set handed to renderers and exporters.

pub mod point;
pub mod point_set;
pub mod frame_buffer;
pub mod color;
pub mod filter;
pub mod error;

pub use point::*;
pub use point_set::*;
pub use frame_buffer::*;
pub use color::*;
pub use filter::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::Point3;
