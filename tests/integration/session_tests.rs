//! Session integration tests.
//!
//! Tests verify:
//! - Startup loads the start level and the fallback tile, then paints once
//! - Missing tiles are covered by the scaled fallback
//! - Every tile is fetched at most once across arbitrary navigation
//! - Each applied arrival repaints the frame
//! - A full run against tiles on disk renders the expected pixels

use std::collections::HashSet;

use canvas_zoom::{
    CanvasSize, FsTileSource, ImageDescriptor, Intent, Point, RasterSurface, Rect, Session,
    Viewer, ViewerConfig,
};

use super::test_utils::{
    addressing_for, level_colour, pyramid_for, pyramid_tiles, reference_config, write_tiles,
    DrawOp, RecordingSurface, TrackingTileSource,
};

fn recording_session(
    levels: impl IntoIterator<Item = usize>,
) -> (
    Session<TrackingTileSource, RecordingSurface>,
    TrackingTileSource,
) {
    let config = reference_config();
    let tiles = pyramid_tiles(&pyramid_for(&config), &addressing_for(&config), levels);
    let source = TrackingTileSource::new(tiles);
    let surface = RecordingSurface::new(config.canvas);
    let viewer = Viewer::new(config).unwrap();

    (Session::new(viewer, source.clone(), surface), source)
}

// =============================================================================
// Startup
// =============================================================================

#[tokio::test]
async fn test_startup_fetches_start_level_and_fallback() {
    let (mut session, source) = recording_session(0..=10);
    session.start().await;

    let fetched: HashSet<String> = source.fetched().into_iter().collect();
    let expected: HashSet<String> = [
        "tiles/9/0_0.jpg",
        "tiles/9/0_1.jpg",
        "tiles/9/1_0.jpg",
        "tiles/9/1_1.jpg",
        "tiles/8/0_0.jpg",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    assert_eq!(fetched, expected);

    assert!(session.viewer().is_ready());
    assert_eq!(session.viewer().viewport().offset(), (150.0, 50.0));
    assert_eq!(session.frames(), 1);
    assert_eq!(session.outstanding_batches(), 0);

    let surface = session.surface();
    assert_eq!(surface.draw_count(), 4);
    assert_eq!(surface.scaled_count(), 0);
    assert_eq!(
        surface.ops.last(),
        Some(&DrawOp::Stroke(Rect::new(0.0, 0.0, 800.0, 600.0)))
    );

    // Above, left, right and below a 500x500 image centred on 800x600.
    assert_eq!(
        surface.clear_ops(),
        vec![
            Rect::new(0.0, 0.0, 800.0, 50.0),
            Rect::new(0.0, 50.0, 150.0, 550.0),
            Rect::new(650.0, 50.0, 150.0, 550.0),
            Rect::new(150.0, 550.0, 500.0, 50.0),
        ]
    );
}

#[tokio::test]
async fn test_startup_tile_positions() {
    let (mut session, _) = recording_session(8..=9);
    session.start().await;

    let draws: Vec<DrawOp> = session
        .surface()
        .ops
        .iter()
        .filter(|op| matches!(op, DrawOp::Draw { .. }))
        .cloned()
        .collect();

    assert_eq!(
        draws,
        vec![
            DrawOp::Draw {
                size: (256, 256),
                x: 150.0,
                y: 50.0
            },
            DrawOp::Draw {
                size: (256, 244),
                x: 150.0,
                y: 306.0
            },
            DrawOp::Draw {
                size: (244, 256),
                x: 406.0,
                y: 50.0
            },
            DrawOp::Draw {
                size: (244, 244),
                x: 406.0,
                y: 306.0
            },
        ]
    );
}

// =============================================================================
// Fallback
// =============================================================================

#[tokio::test]
async fn test_missing_tiles_use_fallback() {
    // Level 10 is missing entirely.
    let (mut session, _) = recording_session(0..=9);
    session.start().await;

    session.apply(Intent::ZoomInCentre);
    session.settle().await;

    let stats = session.last_paint();
    assert_eq!(stats.tiles, 0);
    assert!(stats.fallback > 0);
    assert_eq!(stats.blank, 0);

    let pending = session.viewer().store().counts().pending;
    assert_eq!(pending, stats.fallback);

    // The fallback is stretched over the whole level-10 image.
    let last_scaled = session
        .surface()
        .ops
        .iter()
        .rev()
        .find_map(|op| match op {
            DrawOp::DrawScaled { size, dest, .. } => Some((*size, *dest)),
            _ => None,
        })
        .unwrap();
    assert_eq!(last_scaled.0, (250, 250));
    assert_eq!(last_scaled.1, Rect::new(-100.0, -200.0, 1000.0, 1000.0));
}

#[tokio::test]
async fn test_no_tiles_at_all_paints_blank() {
    let (mut session, source) = recording_session(std::iter::empty::<usize>());
    session.start().await;

    assert!(session.viewer().is_ready());
    assert_eq!(source.fetch_count(), 5);
    let stats = session.last_paint();
    assert_eq!((stats.tiles, stats.fallback, stats.blank), (0, 0, 4));
}

// =============================================================================
// Deduplication and Repaint
// =============================================================================

#[tokio::test]
async fn test_each_tile_fetched_once() {
    let (mut session, source) = recording_session(0..=10);
    session.start().await;

    let centre = Point::new(400.0, 300.0);
    let intents = [
        Intent::ZoomInAt(centre),
        Intent::Pan { dx: -300.0, dy: -300.0 },
        Intent::ZoomOutAt(Point::new(10.0, 10.0)),
        Intent::ZoomInAt(Point::new(10.0, 10.0)),
        Intent::Pan { dx: 300.0, dy: 300.0 },
        Intent::ZoomOutCentre,
        Intent::ZoomOutCentre,
        Intent::ZoomInCentre,
    ];
    for intent in intents {
        session.apply(intent);
    }
    session.settle().await;

    assert!(source.no_duplicate_fetches());
    assert_eq!(session.viewer().store().counts().pending, 0);
    assert_eq!(
        session.viewer().store().counts().loaded,
        source.fetch_count()
    );
}

#[tokio::test]
async fn test_each_arrival_repaints() {
    let (mut session, _) = recording_session(0..=10);
    session.start().await;
    assert_eq!(session.frames(), 1);

    let batch = session.apply(Intent::ZoomInCentre);
    assert!(batch.is_some());
    assert_eq!(session.frames(), 2);

    session.settle().await;
    let loaded_at_10 = session
        .viewer()
        .store()
        .counts()
        .loaded
        .saturating_sub(5);
    assert!(loaded_at_10 > 0);
    assert_eq!(session.frames(), 2 + loaded_at_10 as u64);
    assert_eq!(session.last_paint().fallback, 0);
}

#[tokio::test]
async fn test_gestures_drive_navigation() {
    let (mut session, _) = recording_session(0..=10);
    session.start().await;

    // Drag
    session.pointer_down(Point::new(100.0, 100.0));
    session.pointer_move(Point::new(120.0, 90.0));
    session.pointer_up(Point::new(120.0, 90.0));
    assert_eq!(session.viewer().viewport().offset(), (170.0, 40.0));
    assert_eq!(session.viewer().viewport().zoom_level(), 9);

    // Click
    session.pointer_down(Point::new(400.0, 300.0));
    session.pointer_up(Point::new(400.0, 300.0));
    assert_eq!(session.viewer().viewport().zoom_level(), 10);

    // Wheel
    session.wheel(120.0, Point::new(400.0, 300.0));
    assert_eq!(session.viewer().viewport().zoom_level(), 9);
    assert_eq!(session.viewer().viewport().offset(), (170.0, 40.0));

    session.wheel(0.0, Point::new(400.0, 300.0));
    assert_eq!(session.viewer().viewport().zoom_level(), 9);
    session.settle().await;
}

// =============================================================================
// End to End
// =============================================================================

#[tokio::test]
async fn test_render_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("tiles").display().to_string();

    let canvas = CanvasSize::new(400, 300);
    let config = ViewerConfig::new(ImageDescriptor::new(600, 400), base, canvas)
        .with_border(false);
    let pyramid = pyramid_for(&config);
    write_tiles(&pyramid_tiles(
        &pyramid,
        &addressing_for(&config),
        0..=pyramid.max_level(),
    ));

    let viewer = Viewer::new(config).unwrap();
    let start_level = viewer.pyramid().start_level();
    let mut session = Session::new(viewer, FsTileSource::new(), RasterSurface::new(canvas));
    session.start().await;

    // 600x400 at level 10 does not fit; level 9 (300x200) does.
    assert_eq!(start_level, 9);
    assert_eq!(session.viewer().viewport().offset(), (50.0, 50.0));

    let frame = session.surface().frame();
    assert_eq!(frame.get_pixel(10, 10).0[3], 0);

    let expected = level_colour(9);
    let pixel = frame.get_pixel(200, 150).0;
    for channel in 0..3 {
        assert!((pixel[channel] as i32 - expected[channel] as i32).abs() <= 8);
    }
    assert_eq!(pixel[3], 255);

    session.apply(Intent::ZoomInCentre);
    session.settle().await;
    assert_eq!(session.last_paint().fallback, 0);

    let jpeg = session.surface().encode_jpeg(80).unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
}
