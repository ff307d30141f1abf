//! The viewer control loop

use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use depthcloud_capture::FrameSource;
use depthcloud_core::{PointSet, Result};
use depthcloud_io::{snapshot_file_name, PointCloudExporter};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::state::{InteractiveState, ViewerState};
use crate::window::{coordinate_frame, GeometryId, KeyCode, RenderWindow, WindowStatus};

/// Source of snapshot timestamps
pub type Clock = Box<dyn FnMut() -> NaiveDateTime>;

/// Viewer loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    pub save_key: KeyCode,
    pub exit_key: KeyCode,
    /// Directory snapshots are written to
    pub output_dir: PathBuf,
    /// ASCII or binary snapshot payload
    pub ascii: bool,
    /// Axis length of the origin marker
    pub marker_size: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            save_key: KeyCode::Space,
            exit_key: KeyCode::Escape,
            output_dir: PathBuf::from("."),
            ascii: true,
            marker_size: 0.1,
        }
    }
}

/// What one loop iteration did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// A new frame was pushed to the window
    Frame,
    /// No new frame; the window was polled and redrawn
    NoFrame,
    /// The current snapshot was written to this path
    Exported(PathBuf),
    /// Writing the snapshot to this path failed
    ExportFailed(PathBuf),
    /// The loop is stopped; nothing was done
    Stopped,
}

/// Drives acquisition, display and export from a single polling loop
pub struct ViewerController<S, W, E>
where
    S: FrameSource,
    W: RenderWindow,
    E: PointCloudExporter,
{
    source: S,
    window: W,
    exporter: E,
    config: ViewerConfig,
    clock: Clock,
    state: InteractiveState,
    snapshot: PointSet,
    marker: PointSet,
    cloud_id: GeometryId,
    marker_id: GeometryId,
}

impl<S, W, E> ViewerController<S, W, E>
where
    S: FrameSource,
    W: RenderWindow,
    E: PointCloudExporter,
{
    /// Add the live cloud and the origin marker to `window` and bind the save
    /// and exit keys
    pub fn new(source: S, mut window: W, exporter: E, config: ViewerConfig) -> Result<Self> {
        let snapshot = PointSet::origin();
        let marker = coordinate_frame(config.marker_size);
        let cloud_id = window.add_geometry(&snapshot)?;
        let marker_id = window.add_geometry(&marker)?;

        window.register_key_callback(
            config.save_key,
            Box::new(|state: &mut InteractiveState| {
                state.request_save();
            }),
        );
        window.register_key_callback(
            config.exit_key,
            Box::new(|state: &mut InteractiveState| {
                if state.request_exit() {
                    info!("Exit");
                }
            }),
        );

        Ok(Self {
            source,
            window,
            exporter,
            config,
            clock: Box::new(|| Local::now().naive_local()),
            state: InteractiveState::new(),
            snapshot,
            marker,
            cloud_id,
            marker_id,
        })
    }

    /// Replace the wall clock used for snapshot names
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> &InteractiveState {
        &self.state
    }

    /// The point set an export would write right now
    pub fn snapshot(&self) -> &PointSet {
        &self.snapshot
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn exporter(&self) -> &E {
        &self.exporter
    }

    /// Run one loop iteration.
    ///
    /// Only fatal errors from the frame source are returned; render and export
    /// failures are logged and the loop carries on.
    pub fn step(&mut self) -> Result<StepOutcome> {
        match self.state.state() {
            ViewerState::Stopped => Ok(StepOutcome::Stopped),
            ViewerState::SaveRequested => {
                let outcome = self.export_snapshot();
                self.state.finish_save();
                Ok(outcome)
            }
            ViewerState::Running => {
                let outcome = match self.source.acquire_frame()? {
                    Some(points) => {
                        self.snapshot = points;
                        self.push_geometry();
                        StepOutcome::Frame
                    }
                    None => StepOutcome::NoFrame,
                };

                if self.window.poll_events(&mut self.state) == WindowStatus::Closed {
                    debug!("Window closed");
                    self.state.request_exit();
                }
                if let Err(e) = self.window.update_renderer() {
                    warn!("Render failed: {}", e);
                }

                Ok(outcome)
            }
        }
    }

    /// Loop until stopped, then destroy the window
    pub fn run(&mut self) -> Result<()> {
        info!(
            "Running point cloud collecting tool. \
             Press {:?} to save one frame of point cloud, {:?} to exit",
            self.config.save_key, self.config.exit_key
        );

        let result = self.run_loop();
        self.window.destroy_window();
        result
    }

    fn run_loop(&mut self) -> Result<()> {
        while self.state.is_running() {
            self.step()?;
        }
        Ok(())
    }

    fn push_geometry(&mut self) {
        if let Err(e) = self.window.update_geometry(self.cloud_id, &self.snapshot) {
            warn!("Failed to update point cloud: {}", e);
        }
        if let Err(e) = self.window.update_geometry(self.marker_id, &self.marker) {
            warn!("Failed to update origin marker: {}", e);
        }
    }

    fn export_snapshot(&mut self) -> StepOutcome {
        info!("Collecting point cloud...");
        let name = snapshot_file_name(&(self.clock)());
        let path = self.config.output_dir.join(&name);

        match self
            .exporter
            .write_point_cloud(&path, &self.snapshot, self.config.ascii)
        {
            Ok(()) => {
                info!("Done! {} is saved ({} points)", name, self.snapshot.len());
                StepOutcome::Exported(path)
            }
            Err(e) => {
                error!("Failed to save {}: {}", path.display(), e);
                StepOutcome::ExportFailed(path)
            }
        }
    }
}
