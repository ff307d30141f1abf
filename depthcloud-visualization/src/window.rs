//! Render window contract

use crate::state::InteractiveState;
use depthcloud_core::{Point3f, PointSet, Result};
use serde::{Deserialize, Serialize};
pub use winit::keyboard::KeyCode;

/// Handle to a geometry added to a [`RenderWindow`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(pub usize);

/// Whether the window is still open after polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStatus {
    Open,
    Closed,
}

/// Invoked synchronously from [`RenderWindow::poll_events`] when its key is pressed
pub type KeyHandler = Box<dyn FnMut(&mut InteractiveState)>;

/// Window creation options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub background_color: [f64; 3],
    pub point_size: f32,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: "Pointcloud".to_string(),
            width: 600,
            height: 600,
            background_color: [0.2, 0.2, 0.2],
            point_size: 0.5,
        }
    }
}

/// A window that displays point sets and reports key presses
pub trait RenderWindow {
    /// Start displaying `geometry`; the returned id is used to replace it later
    fn add_geometry(&mut self, geometry: &PointSet) -> Result<GeometryId>;

    /// Replace the displayed contents of `id`
    fn update_geometry(&mut self, id: GeometryId, geometry: &PointSet) -> Result<()>;

    /// Call `handler` whenever `key` is pressed during [`RenderWindow::poll_events`]
    fn register_key_callback(&mut self, key: KeyCode, handler: KeyHandler);

    /// Process pending window events, running key handlers against `state`
    fn poll_events(&mut self, state: &mut InteractiveState) -> WindowStatus;

    /// Draw the current geometries
    fn update_renderer(&mut self) -> Result<()>;

    /// Close the window and release its resources. Idempotent.
    fn destroy_window(&mut self);
}

/// Axis marker at the origin: red x, green y, blue z, each `size` long
pub fn coordinate_frame(size: f32) -> PointSet {
    const SAMPLES: usize = 64;
    let mut frame = PointSet::with_capacity(3 * SAMPLES);
    for i in 0..SAMPLES {
        let d = size * i as f32 / (SAMPLES - 1) as f32;
        frame.push(Point3f::new(d, 0.0, 0.0), [1.0, 0.0, 0.0]);
        frame.push(Point3f::new(0.0, d, 0.0), [0.0, 1.0, 0.0]);
        frame.push(Point3f::new(0.0, 0.0, d), [0.0, 0.0, 1.0]);
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::DeserializeOwned;

    fn is_config<T: Serialize + DeserializeOwned + Default>() -> T {
        T::default()
    }

    #[test]
    fn test_window_options_defaults() {
        let options: WindowOptions = is_config();
        assert_eq!(options.title, "Pointcloud");
        assert_eq!((options.width, options.height), (600, 600));
        assert_eq!(options.background_color, [0.2, 0.2, 0.2]);
        assert_eq!(options.point_size, 0.5);
    }

    #[test]
    fn test_coordinate_frame_spans_each_axis() {
        let frame = coordinate_frame(0.1);
        assert_eq!(frame.len(), 3 * 64);
        let colors = frame.colors().unwrap();
        for (p, c) in frame.positions().iter().zip(colors) {
            let axis = c.iter().position(|&v| v == 1.0).unwrap();
            let coords = [p.x, p.y, p.z];
            assert!(coords[axis] >= 0.0 && coords[axis] <= 0.1 + 1e-6);
            for (i, v) in coords.iter().enumerate() {
                if i != axis {
                    assert_eq!(*v, 0.0);
                }
            }
        }
    }
}
