//! A [`RenderWindow`] backed by winit and wgpu.
//!
//! The event loop is pumped from [`RenderWindow::poll_events`] instead of being
//! handed control, so the capture loop stays in charge of timing.

use std::sync::Arc;
use std::time::Duration;

use depthcloud_core::{Error, PointSet, Result};
use tracing::{debug, info};
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::PhysicalKey;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowBuilder};

use crate::camera::Camera;
use crate::renderer::{PointCloudRenderer, PointVertex};
use crate::state::InteractiveState;
use crate::window::{GeometryId, KeyCode, KeyHandler, RenderWindow, WindowOptions, WindowStatus};

const ORBIT_SPEED: f32 = 0.01;
const ZOOM_SPEED: f32 = 0.1;

/// Native window drawing point sets with wgpu
pub struct WgpuWindow {
    event_loop: EventLoop<()>,
    window: Arc<Window>,
    renderer: Option<PointCloudRenderer>,
    camera: Camera,
    key_callbacks: Vec<(KeyCode, KeyHandler)>,
    last_mouse_pos: Option<PhysicalPosition<f64>>,
    mouse_pressed: bool,
    closed: bool,
}

impl WgpuWindow {
    /// Open a window and initialize the GPU renderer
    pub fn create(options: &WindowOptions) -> Result<Self> {
        let event_loop = EventLoop::new()
            .map_err(|e| Error::Visualization(format!("Failed to create event loop: {}", e)))?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(options.title.as_str())
                .with_inner_size(LogicalSize::new(options.width, options.height))
                .build(&event_loop)
                .map_err(|e| Error::Visualization(format!("Failed to create window: {}", e)))?,
        );

        let renderer = pollster::block_on(PointCloudRenderer::new(
            window.clone(),
            options.background_color,
        ))?;
        let camera = Camera::sensor_view(renderer.aspect_ratio());

        // PointList primitives rasterize at one pixel on every backend.
        debug!("Point size {} requested, drawing 1px points", options.point_size);
        info!("Opened window \"{}\" ({}x{})", options.title, options.width, options.height);

        Ok(Self {
            event_loop,
            window,
            renderer: Some(renderer),
            camera,
            key_callbacks: Vec::new(),
            last_mouse_pos: None,
            mouse_pressed: false,
            closed: false,
        })
    }

    fn renderer_mut(&mut self) -> Result<&mut PointCloudRenderer> {
        self.renderer
            .as_mut()
            .ok_or_else(|| Error::Visualization("Window has been destroyed".to_string()))
    }

    fn handle_window_event(&mut self, event: WindowEvent, state: &mut InteractiveState) {
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.closed = true;
            }
            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(new_size);
                    self.camera.aspect_ratio = renderer.aspect_ratio();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    for (key, handler) in self.key_callbacks.iter_mut() {
                        if *key == code {
                            handler(state);
                        }
                    }
                }
            }
            WindowEvent::MouseInput { state: button_state, button: MouseButton::Left, .. } => {
                self.mouse_pressed = button_state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(last_pos) = self.last_mouse_pos {
                    if self.mouse_pressed {
                        let delta_x = (position.x - last_pos.x) as f32;
                        let delta_y = (position.y - last_pos.y) as f32;
                        self.camera.orbit(delta_x * ORBIT_SPEED, delta_y * ORBIT_SPEED);
                    }
                }
                self.last_mouse_pos = Some(position);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll_delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
                self.camera.zoom(scroll_delta * ZOOM_SPEED);
            }
            _ => {}
        }
    }
}

impl RenderWindow for WgpuWindow {
    fn add_geometry(&mut self, geometry: &PointSet) -> Result<GeometryId> {
        let renderer = self.renderer_mut()?;
        let id = renderer.add_geometry();
        renderer.update_geometry(id, &PointVertex::from_point_set(geometry))?;
        Ok(id)
    }

    fn update_geometry(&mut self, id: GeometryId, geometry: &PointSet) -> Result<()> {
        let vertices = PointVertex::from_point_set(geometry);
        self.renderer_mut()?.update_geometry(id, &vertices)
    }

    fn register_key_callback(&mut self, key: KeyCode, handler: KeyHandler) {
        self.key_callbacks.push((key, handler));
    }

    fn poll_events(&mut self, state: &mut InteractiveState) -> WindowStatus {
        if self.closed {
            return WindowStatus::Closed;
        }

        let mut events = Vec::new();
        let status = self
            .event_loop
            .pump_events(Some(Duration::ZERO), |event, _target| {
                if let Event::WindowEvent { event, .. } = event {
                    events.push(event);
                }
            });
        if let PumpStatus::Exit(code) = status {
            debug!("Event loop exited with code {}", code);
            self.closed = true;
        }

        for event in events {
            self.handle_window_event(event, state);
        }

        if self.closed {
            WindowStatus::Closed
        } else {
            WindowStatus::Open
        }
    }

    fn update_renderer(&mut self) -> Result<()> {
        let view_matrix = self.camera.view_matrix();
        let proj_matrix = self.camera.projection_matrix();
        let camera_pos = self.camera.position.coords;
        let renderer = self.renderer_mut()?;
        renderer.update_camera(view_matrix, proj_matrix, camera_pos);
        renderer.render()
    }

    fn destroy_window(&mut self) {
        if self.renderer.take().is_some() {
            self.window.set_visible(false);
            self.closed = true;
            debug!("Window destroyed");
        }
    }
}

impl Drop for WgpuWindow {
    fn drop(&mut self) {
        self.destroy_window();
    }
}
