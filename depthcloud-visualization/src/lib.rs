//! Visualization and the interactive capture loop
//!
//! This crate provides:
//! - the [`RenderWindow`] contract and a wgpu/winit implementation, [`WgpuWindow`]
//! - the keyboard-driven [`InteractiveState`] machine
//! - [`ViewerController`], which polls a frame source, keeps the live cloud on
//!   screen and exports snapshots on request

pub mod state;
pub mod window;
pub mod controller;
pub mod camera;
pub mod renderer;
pub mod shaders;
pub mod wgpu_window;

pub use state::*;
pub use window::*;
pub use controller::*;
pub use camera::*;
pub use renderer::{PointCloudRenderer, PointVertex};
pub use wgpu_window::WgpuWindow;
