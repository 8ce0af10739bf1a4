// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the reprojection engine and buffer cache

use depth_reproject::calibration::{CameraCalibration, Extrinsics, Intrinsics, LensModel};
use depth_reproject::{
    Bgra, BufferCache, BufferKind, Calibration, CalibrationData, FrameBuffer, FrameFormat,
    ReprojectError, ReprojectionEngine, Short3, VisualizationRange,
};

const DEPTH_4X3: [u16; 12] = [0, 500, 500, 500, 500, 0, 500, 500, 500, 500, 500, 0];

fn depth_4x3() -> FrameBuffer {
    FrameBuffer::from_pixels(FrameFormat::Depth16, 4, 3, &DEPTH_4X3).unwrap()
}

#[test]
fn test_point_cloud_4x3_scenario() {
    let calibration = Calibration::identity((4, 3), (4, 3)).unwrap();
    let mut cache = BufferCache::new();
    let mut engine = ReprojectionEngine::new();

    let out = cache.ensure(4, 3, BufferKind::PointCloud);
    engine
        .depth_to_point_cloud(&depth_4x3(), &calibration, out)
        .unwrap();

    let points = out.to_vec::<Short3>().unwrap();
    assert_eq!(points.len(), 12);
    let invalid: Vec<usize> = points
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_invalid())
        .map(|(i, _)| i)
        .collect();
    assert_eq!(invalid, vec![0, 5, 11], "Exactly the zero-depth cells are invalid");
    for (i, point) in points.iter().enumerate() {
        if !invalid.contains(&i) {
            assert_eq!(point.z, -500, "Cell {} should sit 500 mm in front", i);
        }
    }
}

#[test]
fn test_point_cloud_axis_convention() {
    let calibration = Calibration::identity((4, 3), (4, 3)).unwrap();
    let mut out = FrameBuffer::new(FrameFormat::PointCloudXyz16, 4, 3);
    ReprojectionEngine::new()
        .depth_to_point_cloud(&depth_4x3(), &calibration, &mut out)
        .unwrap();

    let view = out.view::<Short3>().unwrap();
    // (u=3, v=1): native (1500, 500, 500) -> (x, -y, -z)
    assert_eq!(view.get(3, 1), Some(Short3::new(1500, -500, -500)));
    assert_eq!(view.get(2, 2), Some(Short3::new(1000, -1000, -500)));
}

#[test]
fn test_alignment_propagates_depth_sentinel() {
    let calibration = Calibration::identity((4, 3), (4, 3)).unwrap();
    let color = FrameBuffer::from_pixels(
        FrameFormat::ColorBgra32,
        4,
        3,
        &[Bgra::new(10, 20, 30, 255); 12],
    )
    .unwrap();
    let mut out = FrameBuffer::new(FrameFormat::ColorBgra32, 4, 3);
    ReprojectionEngine::new()
        .align_color_to_depth(&depth_4x3(), &color, &calibration, &mut out)
        .unwrap();

    let aligned = out.to_vec::<Bgra>().unwrap();
    for (i, (px, depth)) in aligned.iter().zip(DEPTH_4X3).enumerate() {
        if depth == 0 {
            assert_eq!(*px, Bgra::INVALID, "Cell {} has no depth", i);
        } else {
            assert_eq!(*px, Bgra::new(10, 20, 30, 255));
        }
    }
}

#[test]
fn test_resolution_change_reallocates_buffers() {
    let large = Calibration::identity((4, 3), (4, 3)).unwrap();
    let small = Calibration::identity((2, 2), (2, 2)).unwrap();
    let small_depth = FrameBuffer::from_pixels(FrameFormat::Depth16, 2, 2, &[1u16; 4]).unwrap();
    let mut cache = BufferCache::new();
    let mut engine = ReprojectionEngine::new();

    for _ in 0..3 {
        let out = cache.ensure(4, 3, BufferKind::PointCloud);
        engine.depth_to_point_cloud(&depth_4x3(), &large, out).unwrap();
    }
    assert_eq!(cache.allocations(), 1);

    let out = cache.ensure(2, 2, BufferKind::PointCloud);
    engine.depth_to_point_cloud(&small_depth, &small, out).unwrap();
    assert_eq!(out.dimensions(), (2, 2));
    assert_eq!(cache.allocations(), 2);
    assert_eq!(engine.table_builds(), 2);
}

#[test]
fn test_calibration_identity_drives_rebuilds() {
    let calibration = Calibration::identity((4, 3), (4, 3)).unwrap();
    let mut out = FrameBuffer::new(FrameFormat::PointCloudXyz16, 4, 3);
    let mut engine = ReprojectionEngine::new();

    for _ in 0..10 {
        engine
            .depth_to_point_cloud(&depth_4x3(), &calibration, &mut out)
            .unwrap();
    }
    assert_eq!(engine.table_builds(), 1, "Same calibration must not rebuild");

    let equal_values = Calibration::new(calibration.data().clone()).unwrap();
    engine
        .depth_to_point_cloud(&depth_4x3(), &equal_values, &mut out)
        .unwrap();
    assert_eq!(engine.table_builds(), 2, "New calibration instance must rebuild");
    assert_eq!(engine.cached_calibration(), Some(equal_values.id()));
}

#[test]
fn test_inverted_range_writes_nothing() {
    let range = VisualizationRange {
        min: 2000.0,
        max: 0.0,
    };
    let mut out = FrameBuffer::new(FrameFormat::ColorBgra32, 4, 3);
    out.view_mut::<Bgra>().unwrap().fill(Bgra::gray(42));

    let err = ReprojectionEngine::new()
        .visualize(&depth_4x3(), &range, &mut out)
        .unwrap_err();
    assert!(matches!(err, ReprojectError::InvalidRange { .. }));
    assert!(err.to_string().contains("Max must be larger than min"));
    assert_eq!(out.to_vec::<Bgra>().unwrap(), vec![Bgra::gray(42); 12]);
}

#[test]
fn test_visualization_of_4x3_depth() {
    let mut out = FrameBuffer::new(FrameFormat::ColorBgra32, 4, 3);
    ReprojectionEngine::new()
        .visualize(&depth_4x3(), &VisualizationRange::default(), &mut out)
        .unwrap();
    let pixels = out.to_vec::<Bgra>().unwrap();
    // 500 / 2000 * 255 = 63.75
    assert_eq!(pixels[1], Bgra::gray(63));
    assert_eq!(pixels[0], Bgra::gray(0));
    assert!(pixels.iter().all(|p| p.a == 255));
}

#[test]
fn test_infrared_cannot_become_points() {
    let calibration = Calibration::identity((4, 3), (4, 3)).unwrap();
    let ir = FrameBuffer::from_pixels(FrameFormat::Ir16, 4, 3, &DEPTH_4X3).unwrap();
    let mut out = FrameBuffer::new(FrameFormat::PointCloudXyz16, 4, 3);
    assert!(matches!(
        ReprojectionEngine::new().depth_to_point_cloud(&ir, &calibration, &mut out),
        Err(ReprojectError::FormatMismatch {
            actual: FrameFormat::Ir16,
            ..
        })
    ));

    // IR still visualizes fine
    let mut preview = FrameBuffer::new(FrameFormat::ColorBgra32, 4, 3);
    assert!(
        ReprojectionEngine::new()
            .visualize(&ir, &VisualizationRange::default(), &mut preview)
            .is_ok()
    );
}

#[test]
fn test_color_resolution_mismatch_rejected() {
    let calibration = Calibration::identity((4, 3), (8, 6)).unwrap();
    let color = FrameBuffer::new(FrameFormat::ColorBgra32, 4, 3);
    let mut out = FrameBuffer::new(FrameFormat::ColorBgra32, 4, 3);
    let err = ReprojectionEngine::new()
        .align_color_to_depth(&depth_4x3(), &color, &calibration, &mut out)
        .unwrap_err();
    assert!(matches!(
        err,
        ReprojectError::ResolutionMismatch {
            expected: (8, 6),
            actual: (4, 3),
            ..
        }
    ));
}

#[test]
fn test_depth_resolution_must_match_calibration() {
    let calibration = Calibration::identity((2, 2), (2, 2)).unwrap();
    let mut out = FrameBuffer::new(FrameFormat::PointCloudXyz16, 4, 3);
    assert!(matches!(
        ReprojectionEngine::new().depth_to_point_cloud(&depth_4x3(), &calibration, &mut out),
        Err(ReprojectError::ResolutionMismatch { .. })
    ));
}

/// 64x48 depth camera with rational distortion; the metric radius cuts off
/// the corners
fn distorted_depth_intrinsics() -> Intrinsics {
    Intrinsics::from_parameters(
        LensModel::BrownConrady,
        &[
            31.5, 23.5, 50.0, 50.0, 0.62, -0.05, -0.01, 0.98, 0.14, -0.03, 0.0, 0.0, -0.0001,
            0.00005, 0.7,
        ],
        15,
    )
    .unwrap()
}

#[test]
fn test_point_cloud_follows_distorted_lens() {
    let intrinsics = distorted_depth_intrinsics();
    let calibration = Calibration::new(CalibrationData {
        depth: CameraCalibration::new(intrinsics.clone(), 64, 48),
        color: CameraCalibration::new(Intrinsics::pinhole(1.0, 1.0, 0.0, 0.0), 64, 48),
        depth_to_color: Extrinsics::identity(),
    })
    .unwrap();
    let samples: Vec<u16> = (0..64 * 48).map(|i| 800 + (i % 97) as u16 * 7).collect();
    let depth = FrameBuffer::from_pixels(FrameFormat::Depth16, 64, 48, &samples).unwrap();
    let mut out = FrameBuffer::new(FrameFormat::PointCloudXyz16, 64, 48);
    ReprojectionEngine::new()
        .depth_to_point_cloud(&depth, &calibration, &mut out)
        .unwrap();

    let view = out.view::<Short3>().unwrap();
    let (mut valid, mut invalid) = (0, 0);
    for v in 0..48usize {
        for u in 0..64usize {
            let point = view.get(u, v).unwrap();
            let d = samples[v * 64 + u] as f64;
            let Some([rx, ry]) = intrinsics.unproject([u as f64, v as f64]) else {
                assert!(point.is_invalid(), "({}, {}) has no ray but got {:?}", u, v, point);
                invalid += 1;
                continue;
            };
            let expected = [rx * d, -ry * d, -d];
            let actual = [point.x as f64, point.y as f64, point.z as f64];
            for (axis, (a, e)) in actual.iter().zip(expected).enumerate() {
                assert!(
                    (a - e).abs() <= 1.0,
                    "({}, {}) axis {}: {} vs {}",
                    u,
                    v,
                    axis,
                    a,
                    e
                );
            }
            valid += 1;
        }
    }
    assert!(valid > 0 && invalid > 0, "valid={} invalid={}", valid, invalid);
    assert!(view.get(31, 23).is_some_and(|p| !p.is_invalid()));
    assert!(view.get(0, 0).is_some_and(|p| p.is_invalid()));
}

/// Color pixel (x, y) carries (x + 1, y + 1) so lookups are traceable
fn traceable_color(width: u32, height: u32) -> FrameBuffer {
    let pixels: Vec<Bgra> = (0..height)
        .flat_map(|y| (0..width).map(move |x| Bgra::new(x as u8 + 1, y as u8 + 1, 7, 255)))
        .collect();
    FrameBuffer::from_pixels(FrameFormat::ColorBgra32, width, height, &pixels).unwrap()
}

#[test]
fn test_alignment_with_translated_color_camera() {
    // Depth point (X, Y, 1000) lands on color pixel ((X - 25) / 5 + 4, (Y + 10) / 5 + 2)
    let calibration = Calibration::new(CalibrationData {
        depth: CameraCalibration::new(Intrinsics::pinhole(100.0, 100.0, 1.5, 1.0), 4, 3),
        color: CameraCalibration::new(Intrinsics::pinhole(200.0, 200.0, 4.0, 2.0), 8, 6),
        depth_to_color: Extrinsics::from_row_major(
            [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            [-25.0, 10.0, 0.0],
        ),
    })
    .unwrap();
    let depth = FrameBuffer::from_pixels(FrameFormat::Depth16, 4, 3, &[1000u16; 12]).unwrap();
    let mut out = FrameBuffer::new(FrameFormat::ColorBgra32, 4, 3);
    ReprojectionEngine::new()
        .align_color_to_depth(&depth, &traceable_color(8, 6), &calibration, &mut out)
        .unwrap();

    let seen = |x: u8, y: u8| Bgra::new(x + 1, y + 1, 7, 255);
    let invalid = Bgra::INVALID;
    assert_eq!(
        out.to_vec::<Bgra>().unwrap(),
        vec![
            // u = 0, 1 fall left of the color frame
            invalid, invalid, seen(0, 2), seen(2, 2),
            invalid, invalid, seen(0, 4), seen(2, 4),
            // row 2 lands on v = 6, one past the last color row
            invalid, invalid, invalid, invalid,
        ]
    );
}

#[test]
fn test_alignment_rejects_points_behind_color_camera() {
    let mut data = Calibration::identity((4, 3), (4, 3)).unwrap().data().clone();
    data.depth_to_color =
        Extrinsics::from_row_major([1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0], [0.0, 0.0, -1500.0]);
    let behind = Calibration::new(data).unwrap();
    let depth = FrameBuffer::from_pixels(FrameFormat::Depth16, 4, 3, &[1000u16; 12]).unwrap();
    let color = traceable_color(4, 3);
    let mut engine = ReprojectionEngine::new();
    let mut out = FrameBuffer::new(FrameFormat::ColorBgra32, 4, 3);

    // Without the shift pixel (0, 0) sees color (0, 0)
    let front = Calibration::identity((4, 3), (4, 3)).unwrap();
    engine
        .align_color_to_depth(&depth, &color, &front, &mut out)
        .unwrap();
    assert_eq!(out.view::<Bgra>().unwrap().get(0, 0), Some(Bgra::new(1, 1, 7, 255)));

    engine
        .align_color_to_depth(&depth, &color, &behind, &mut out)
        .unwrap();
    assert_eq!(out.to_vec::<Bgra>().unwrap(), vec![Bgra::INVALID; 12]);
}
