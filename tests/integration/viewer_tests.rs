//! Viewer navigation integration tests.
//!
//! Tests verify:
//! - Pyramid geometry for the reference 1000x1000 image
//! - Focal-point zoom round trips
//! - Requests are never duplicated and arrived tiles are never re-requested
//! - Visibility is inclusive at tile boundaries
//! - Panning leaves already resolved tiles alone

use std::collections::HashSet;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use image::RgbaImage;

use canvas_zoom::{
    visible_rect, visible_tiles, CanvasSize, ImageDescriptor, Intent, Point, Pyramid, TileId,
    TileRequest, TileState, Viewer, ViewerConfig,
};

use super::test_utils::reference_viewer;

fn tile() -> RgbaImage {
    RgbaImage::new(1, 1)
}

fn started() -> Viewer<RgbaImage> {
    let mut viewer = reference_viewer();
    for request in viewer.startup_requests() {
        viewer.tile_arrived(&request.identifier(), tile());
    }
    viewer.finish_startup();
    viewer
}

fn ids(requests: &[TileRequest]) -> Vec<TileId> {
    requests.iter().map(|r| r.id).collect()
}

// =============================================================================
// Pyramid Geometry
// =============================================================================

#[test]
fn test_reference_pyramid() {
    let viewer = reference_viewer();
    let pyramid = viewer.pyramid();

    assert_eq!(pyramid.max_level(), 10);
    let full = pyramid.level(10).unwrap();
    assert_eq!(full.width, 1000.0);
    assert_eq!((full.columns, full.rows), (4, 4));
    assert_eq!(pyramid.fallback_level(), 8);
    assert_eq!(pyramid.start_level(), 9);

    for index in 0..pyramid.max_level() {
        let lower = pyramid.level(index).unwrap();
        let upper = pyramid.level(index + 1).unwrap();
        assert_relative_eq!(lower.width, upper.width / 2.0);
        assert_eq!(lower.columns, (lower.width / 256.0).ceil() as u32);
    }
}

#[test]
fn test_fallback_level_is_largest_single_tile_level() {
    for (width, height) in [(1000, 1000), (5000, 300), (256, 256), (257, 1), (1, 1)] {
        let pyramid = Pyramid::build(width, height, 256, CanvasSize::new(800, 600)).unwrap();
        let fallback = pyramid.level(pyramid.fallback_level()).unwrap();
        assert!(fallback.width <= 256.0 && fallback.height <= 256.0);

        if let Some(above) = pyramid.level(pyramid.fallback_level() + 1) {
            assert!(above.width > 256.0 || above.height > 256.0);
        }
    }
}

// =============================================================================
// Zooming
// =============================================================================

#[test]
fn test_zoom_round_trip_restores_offset() {
    let mut viewer = started();
    let start = viewer.viewport().offset();

    viewer.zoom_to(10, 123.0, 456.0);
    viewer.zoom_to(9, 123.0, 456.0);
    let (x, y) = viewer.viewport().offset();
    assert_abs_diff_eq!(x, start.0, epsilon = 1e-9);
    assert_abs_diff_eq!(y, start.1, epsilon = 1e-9);

    viewer.zoom_to(3, 700.0, 10.0);
    viewer.zoom_to(9, 700.0, 10.0);
    let (x, y) = viewer.viewport().offset();
    assert_abs_diff_eq!(x, start.0, epsilon = 1e-6);
    assert_abs_diff_eq!(y, start.1, epsilon = 1e-6);
}

#[test]
fn test_zoom_in_twice_out_twice_at_centre() {
    let mut viewer = started();
    viewer.zoom_out_centre();
    viewer.zoom_out_centre();
    let before = viewer.viewport().offset();
    let level = viewer.viewport().zoom_level();

    viewer.zoom_in_centre();
    viewer.zoom_in_centre();
    viewer.zoom_out_centre();
    viewer.zoom_out_centre();

    assert_eq!(viewer.viewport().zoom_level(), level);
    let (x, y) = viewer.viewport().offset();
    assert_abs_diff_eq!(x, before.0, epsilon = 1e-9);
    assert_abs_diff_eq!(y, before.1, epsilon = 1e-9);
}

#[test]
fn test_focal_point_stays_fixed() {
    let mut viewer = started();
    let focal = Point::new(300.0, 200.0);
    let (x0, y0) = viewer.viewport().offset();
    // Image-space position under the focal point, as a fraction of the level.
    let width = viewer.pyramid().width_at(9).unwrap();
    let fraction = ((focal.x - x0) / width, (focal.y - y0) / width);

    viewer.apply(Intent::ZoomInAt(focal));

    let (x1, y1) = viewer.viewport().offset();
    let width = viewer.pyramid().width_at(10).unwrap();
    assert_relative_eq!((focal.x - x1) / width, fraction.0);
    assert_relative_eq!((focal.y - y1) / width, fraction.1);
}

#[test]
fn test_zoom_out_past_level_zero_is_noop() {
    let mut viewer = started();
    viewer.zoom_to(0, 400.0, 300.0);
    let offset = viewer.viewport().offset();

    assert!(viewer.zoom_out_centre().is_empty());
    assert_eq!(viewer.viewport().zoom_level(), 0);
    assert_eq!(viewer.viewport().offset(), offset);
}

// =============================================================================
// Request Deduplication
// =============================================================================

#[test]
fn test_requests_never_duplicated() {
    let mut viewer = reference_viewer();
    let mut seen: HashSet<TileId> = HashSet::new();

    let mut record = |requests: Vec<TileRequest>| {
        for id in ids(&requests) {
            assert!(seen.insert(id), "tile {} requested twice", id);
        }
    };

    record(viewer.startup_requests());
    viewer.finish_startup();
    record(viewer.zoom_in_centre());
    record(viewer.pan(-200.0, 0.0));
    record(viewer.pan(200.0, 0.0));
    record(viewer.pan(-500.0, -500.0));
    record(viewer.zoom_out_at(0.0, 0.0));
    record(viewer.zoom_in_at(0.0, 0.0));
    record(viewer.zoom_in_centre());
}

#[test]
fn test_arrived_tiles_not_rerequested() {
    let mut viewer = started();
    let requests = viewer.zoom_in_centre();
    for request in &requests {
        viewer.tile_arrived(&request.identifier(), tile());
    }

    viewer.zoom_out_centre();
    let again = viewer.zoom_in_centre();
    assert!(again.iter().all(|r| !requests.contains(r)));
    assert!(again.is_empty());
}

#[test]
fn test_uris_follow_tile_layout() {
    let config = ViewerConfig::new(
        ImageDescriptor::new(1000, 1000).with_format("png"),
        "http://host/tiles/",
        CanvasSize::new(800, 600),
    );
    let mut viewer: Viewer<RgbaImage> = Viewer::new(config).unwrap();

    let requests = viewer.startup_requests();
    assert_eq!(requests[0].uri, "http://host/tiles/9/0_0.png");
    assert_eq!(requests.last().unwrap().uri, "http://host/tiles/8/0_0.png");
}

// =============================================================================
// Visibility
// =============================================================================

#[test]
fn test_visibility_inclusive_at_edges() {
    let pyramid = Pyramid::build(1000, 1000, 256, CanvasSize::new(800, 600)).unwrap();
    let level = pyramid.level(10).unwrap();
    let canvas = CanvasSize::new(256, 256);

    // Viewport exactly over tile (1, 1): its neighbours share an edge.
    let visible = visible_rect((-256.0, -256.0), canvas);
    let tiles: HashSet<TileId> = visible_tiles(level, visible).collect();

    assert!(tiles.contains(&TileId::new(10, 1, 1)));
    assert!(tiles.contains(&TileId::new(10, 0, 0)));
    assert!(tiles.contains(&TileId::new(10, 2, 2)));
    assert!(tiles.contains(&TileId::new(10, 0, 2)));
    assert_eq!(tiles.len(), 9);
}

#[test]
fn test_nothing_visible_far_off_canvas() {
    let mut viewer = started();
    let requests = viewer.pan(5000.0, 5000.0);
    assert!(requests.is_empty());
}

// =============================================================================
// Panning
// =============================================================================

#[test]
fn test_pan_does_not_touch_resolved_tiles() {
    let mut viewer = started();
    let first = viewer.zoom_in_centre();
    for request in first.iter().step_by(2) {
        viewer.tile_arrived(&request.identifier(), tile());
    }

    let snapshot = |viewer: &Viewer<RgbaImage>| -> Vec<(bool, bool)> {
        first
            .iter()
            .map(|r| {
                let state = viewer.store().state(r.id).unwrap();
                (state.is_pending(), state.is_loaded())
            })
            .collect()
    };
    let before = snapshot(&viewer);

    viewer.apply(Intent::Pan { dx: 250.0, dy: -120.0 });
    viewer.apply(Intent::Pan { dx: -600.0, dy: 300.0 });

    assert_eq!(snapshot(&viewer), before);
}

#[test]
fn test_pan_is_unclamped() {
    let mut viewer = started();
    viewer.pan(-10_000.0, 10_000.0);
    let (x, y) = viewer.viewport().offset();
    assert_eq!((x, y), (150.0 - 10_000.0, 50.0 + 10_000.0));
}

#[test]
fn test_late_arrival_for_invisible_tile_is_applied() {
    let mut viewer = started();
    let requests = viewer.zoom_in_centre();
    viewer.pan(5000.0, 0.0);

    let late = requests[0].id;
    assert!(viewer.tile_arrived_id(late, tile()));
    assert!(matches!(
        viewer.store().state(late),
        Some(TileState::Loaded(_))
    ));
}
