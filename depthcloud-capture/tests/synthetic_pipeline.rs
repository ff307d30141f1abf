//! End-to-end acquisition against the synthetic camera

use depthcloud_capture::*;
use depthcloud_core::{Error, Resolution};

fn processor(resolution: Resolution) -> FrameProcessor<SyntheticCamera> {
    let init = InitParameters {
        camera_fps: 0,
        ..Default::default()
    };
    let camera = SyntheticCamera::open(init).unwrap();
    FrameProcessor::new(camera, resolution, RuntimeParameters::default()).unwrap()
}

#[test]
fn test_only_finite_points_reach_the_point_set() {
    let mut processor = processor(Resolution::new(96, 54));

    for _ in 0..5 {
        let points = processor.acquire_frame().unwrap().expect("synthetic camera always delivers");
        assert!(!points.is_empty());
        assert!(points.len() < 96 * 54);

        let colors = points.colors().expect("frames are colored");
        assert_eq!(colors.len(), points.len());
        for (p, c) in points.positions().iter().zip(colors) {
            assert!(p.x.is_finite() && p.y.is_finite() && p.z.is_finite());
            assert!(c.iter().all(|channel| (0.0..=1.0).contains(channel)));
        }
    }

    assert_eq!(processor.stats().processed, 5);
    assert_eq!(processor.stats().dropped, 0);
}

#[test]
fn test_buffer_is_sized_once() {
    let mut processor = processor(Resolution::new(32, 18));
    let capacity = processor.buffer().len();
    processor.acquire_frame().unwrap();
    processor.acquire_frame().unwrap();
    assert_eq!(processor.buffer().len(), capacity);
    assert_eq!(processor.buffer().byte_len(), 32 * 18 * 16);
}

#[test]
fn test_closed_camera_yields_no_frames() {
    let mut processor = processor(Resolution::new(8, 8));
    processor.camera_mut().close();
    assert!(processor.acquire_frame().unwrap().is_none());
    assert_eq!(processor.stats().dropped, 1);
}

#[test]
fn test_request_above_sensor_resolution_is_fatal() {
    let init = InitParameters {
        camera_resolution: CameraResolution::Vga,
        camera_fps: 0,
        ..Default::default()
    };
    let camera = SyntheticCamera::open(init).unwrap();

    let requested = Resolution::new(1280, 720);
    let result = FrameProcessor::new(camera, requested, RuntimeParameters::default());

    let err = result.err().expect("1280x720 from a VGA sensor");
    assert!(matches!(err, Error::ContractViolation(_)));
    assert!(err.is_fatal());
}

#[test]
fn test_full_sensor_resolution_is_accepted() {
    let init = InitParameters {
        camera_resolution: CameraResolution::Vga,
        camera_fps: 0,
        ..Default::default()
    };
    let native = CameraResolution::Vga.size();
    let camera = SyntheticCamera::open(init).unwrap();
    let mut processor = FrameProcessor::new(camera, native, RuntimeParameters::default()).unwrap();

    assert!(processor.acquire_frame().unwrap().is_some());
}
