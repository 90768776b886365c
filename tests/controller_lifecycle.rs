use std::sync::Arc;
use std::time::Duration;

use folio::event_source::KeyCode;
use folio::test_utils::test_helpers::TestScenarioBuilder;
use folio::test_utils::{FakeBackend, page_color};
use folio::viewer::renderer::{FAILED_FILL, RenderResult};
use folio::viewer::{ImageBackend, PageSize, PageStep, ViewMode};
use folio::{
    CellSize, ViewerCommand, ViewerController, ViewerError, ViewerSettings, ViewerStatus,
    export_frame, run_with_event_source,
};

const WAIT: Duration = Duration::from_secs(5);

fn viewer_for(backend: &FakeBackend) -> ViewerController {
    ViewerController::new(Arc::new(backend.clone()), &ViewerSettings::default())
}

fn painted_scale(viewer: &ViewerController, slot: usize) -> f32 {
    match viewer.frame().and_then(|frame| frame.slots()[slot].result()) {
        Some(RenderResult::Painted {
            effective_scale, ..
        }) => *effective_scale,
        other => panic!("slot {slot} not painted: {other:?}"),
    }
}

#[test]
fn test_superseded_render_never_reaches_the_screen() {
    let backend = FakeBackend::new(10).with_render_delay(Duration::from_millis(30));
    let mut viewer = viewer_for(&backend);
    viewer.open("fake://slow-pages");
    assert!(viewer.wait_until_idle(WAIT));

    // Second request issued before the first one can finish
    viewer.next();
    viewer.next();
    assert!(viewer.wait_until_idle(WAIT));

    let frame = viewer.frame().expect("frame on screen");
    let pages: Vec<_> = frame.results().map(RenderResult::page).collect();
    assert_eq!(pages, vec![4, 5]);
    for result in frame.results() {
        assert_eq!(*result.image().get_pixel(0, 0), page_color(result.page()));
    }

    // Late arrivals from the first pass are drained and dropped
    std::thread::sleep(Duration::from_millis(100));
    viewer.pump();
    let pages: Vec<_> = viewer
        .frame()
        .expect("frame on screen")
        .results()
        .map(RenderResult::page)
        .collect();
    assert_eq!(pages, vec![4, 5]);
}

#[test]
fn test_failed_page_does_not_affect_its_sibling() {
    let backend = FakeBackend::new(10).failing_page(3);
    let mut viewer = viewer_for(&backend);
    viewer.open("fake://damaged");
    assert!(viewer.wait_until_idle(WAIT));
    viewer.next();
    assert!(viewer.wait_until_idle(WAIT));

    assert_eq!(viewer.status(), ViewerStatus::Ready);
    let frame = viewer.frame().expect("frame on screen");
    let left = frame.slots()[0].result().expect("left slot");
    let right = frame.slots()[1].result().expect("right slot");
    assert!(left.is_painted());
    assert!(!right.is_painted());
    assert_eq!(*right.image().get_pixel(0, 0), FAILED_FILL);
    assert_eq!(right.label().as_deref(), Some("Page 3 failed to load"));
    assert!(matches!(
        right.error(),
        Some(ViewerError::PageRenderFailed { page: 3, .. })
    ));

    // Navigation keeps working past the broken page
    viewer.next();
    assert!(viewer.wait_until_idle(WAIT));
    assert_eq!(viewer.displayed_pages(), vec![4, 5]);
}

#[test]
fn test_backend_failure_recovers_on_reload() {
    let backend = FakeBackend::new(6).failing_init(1);
    let mut viewer = viewer_for(&backend);
    viewer.open("fake://issue");
    assert!(viewer.wait_until_idle(WAIT));

    assert!(matches!(
        viewer.status(),
        ViewerStatus::Error(ViewerError::BackendUnavailable(_))
    ));
    viewer.next();
    assert_eq!(viewer.navigation().current_page, 1);
    assert!(viewer.displayed_pages().is_empty());

    viewer.dispatch(ViewerCommand::Reload);
    assert!(viewer.wait_until_idle(WAIT));
    assert_eq!(viewer.status(), ViewerStatus::Ready);
    assert_eq!(viewer.page_count(), 6);
    assert_eq!(backend.init_attempts(), 2);
}

#[test]
fn test_open_failure_reports_locator_and_stays_failed() {
    let backend = FakeBackend::new(6).failing_open("truncated file");
    let mut viewer = viewer_for(&backend);
    viewer.open("issues/1998-spring.pdf");
    assert!(viewer.wait_until_idle(WAIT));

    match viewer.status() {
        ViewerStatus::Error(ViewerError::DocumentOpenFailed { locator, reason }) => {
            assert_eq!(locator, "issues/1998-spring.pdf");
            assert!(reason.contains("truncated file"));
        }
        other => panic!("unexpected status {other:?}"),
    }
    assert!(viewer.status_line().starts_with("Error:"));

    viewer.reload();
    assert!(viewer.wait_until_idle(WAIT));
    assert!(viewer.error().is_some());
    assert_eq!(backend.open_count(), 2);
}

#[test]
fn test_reload_returns_to_cover_with_fresh_handle() {
    let backend = FakeBackend::new(10);
    let mut viewer = viewer_for(&backend);
    viewer.open("fake://issue");
    assert!(viewer.wait_until_idle(WAIT));
    viewer.go_to(6);
    viewer.reload();
    assert!(viewer.is_loading());
    assert!(viewer.wait_until_idle(WAIT));

    assert_eq!(viewer.navigation().mode, ViewMode::Cover);
    assert_eq!(viewer.displayed_pages(), vec![1]);
    assert_eq!(backend.open_count(), 2);
    assert_eq!(backend.init_attempts(), 1);
}

#[test]
fn test_close_stops_background_work() {
    let backend = FakeBackend::new(10).with_render_delay(Duration::from_millis(40));
    let mut viewer = viewer_for(&backend);
    viewer.open("fake://issue");
    assert!(viewer.wait_until_idle(WAIT));

    let before = backend.rendered_pages().len();
    viewer.next();
    viewer.close();
    std::thread::sleep(Duration::from_millis(250));

    assert_eq!(viewer.status(), ViewerStatus::Closed);
    assert!(viewer.frame().is_none());
    assert!(!viewer.pump());
    // At most the slot already being painted when close arrived
    assert!(backend.rendered_pages().len() <= before + 1);

    viewer.next();
    assert!(viewer.frame().is_none());
}

#[test]
fn test_reopen_starts_with_fresh_zoom_and_step() {
    let backend = FakeBackend::new(10);
    let mut viewer = viewer_for(&backend);
    viewer.open("fake://first");
    assert!(viewer.wait_until_idle(WAIT));
    viewer.next();
    viewer.toggle_page_step();
    for _ in 0..3 {
        viewer.zoom(1.2);
    }
    assert!(viewer.wait_until_idle(WAIT));
    assert!(viewer.scale() > 1.7);
    assert_eq!(viewer.page_step(), PageStep::Single);

    viewer.close();
    viewer.open("fake://second");
    assert!(viewer.wait_until_idle(WAIT));

    assert_eq!(viewer.status(), ViewerStatus::Ready);
    assert!((viewer.scale() - 1.0).abs() < f32::EPSILON);
    assert_eq!(viewer.page_step(), PageStep::Spread);
    assert_eq!(viewer.navigation().mode, ViewMode::Cover);
    assert_eq!(viewer.status_line(), "Cover | 100% | spread");

    viewer.next();
    assert!(viewer.wait_until_idle(WAIT));
    assert_eq!(viewer.displayed_pages(), vec![2, 3]);
}

#[test]
fn test_zoom_and_fullscreen_scale_rendering() {
    let backend = FakeBackend::new(4);
    let mut viewer = viewer_for(&backend);
    viewer.open("fake://issue");
    assert!(viewer.wait_until_idle(WAIT));
    let base = painted_scale(&viewer, 0);

    viewer.zoom_in();
    assert!(viewer.wait_until_idle(WAIT));
    let zoomed = painted_scale(&viewer, 0);
    assert!((zoomed / base - 1.2).abs() < 1e-4, "{zoomed} vs {base}");

    viewer.reset_zoom();
    viewer.set_fullscreen(true);
    assert!(viewer.wait_until_idle(WAIT));
    assert!(painted_scale(&viewer, 0) > base);
}

#[test]
fn test_wide_page_fits_by_width() {
    let backend = FakeBackend::new(4).with_page_size(1, PageSize::new(4000.0, 100.0));
    let settings = ViewerSettings::default();
    let mut viewer = ViewerController::new(Arc::new(backend.clone()), &settings);
    viewer.open("fake://panorama");
    assert!(viewer.wait_until_idle(WAIT));

    let target = settings
        .layout
        .render_target(&viewer.viewport(), ViewMode::Cover, false);
    let scale = painted_scale(&viewer, 0);
    assert!((scale - target.width as f32 / 4000.0).abs() < 1e-5, "{scale}");

    let (width, height) = viewer.frame().unwrap().slots()[0]
        .result()
        .unwrap()
        .image()
        .dimensions();
    assert_eq!(width, target.width);
    assert!(height < target.height);
}

#[test]
fn test_viewport_change_rerenders_current_pages() {
    let backend = FakeBackend::new(4);
    let mut viewer = viewer_for(&backend);
    viewer.open("fake://issue");
    assert!(viewer.wait_until_idle(WAIT));
    let small_before = viewer.surface_size();

    viewer.set_viewport(2560, 1600);
    assert!(viewer.wait_until_idle(WAIT));
    assert!(viewer.surface_size().height > small_before.height);
    assert_eq!(viewer.displayed_pages(), vec![1]);
    assert!(viewer.frame().is_some_and(|frame| frame.is_complete()));
}

#[test]
fn test_keyboard_session() {
    let backend = FakeBackend::new(10);
    let mut viewer = viewer_for(&backend);
    viewer.open("fake://issue");

    let mut events = TestScenarioBuilder::new()
        .resize(128, 40)
        .press_right(2)
        .press_char('f')
        .press_esc()
        .press_left(1)
        .press_char('+')
        .press_esc()
        .build();

    let mut lines = Vec::new();
    run_with_event_source(&mut viewer, &mut events, CellSize::new(10, 20), WAIT, |viewer| {
        lines.push(viewer.status_line());
        Ok(())
    })
    .unwrap();

    assert_eq!(
        lines,
        vec![
            "Cover | 100% | spread",
            "Cover | 100% | spread",
            "2-3 / 10 | 100% | spread",
            "4-5 / 10 | 100% | spread",
            "4-5 / 10 | 100% | spread | fullscreen",
            "4-5 / 10 | 100% | spread",
            "2-3 / 10 | 100% | spread",
            "2-3 / 10 | 120% | spread",
        ]
    );
    assert!(viewer.is_closed());
    assert_eq!(events.remaining(), 0);
}

#[test]
fn test_keyboard_step_toggle_and_jumps() {
    let backend = FakeBackend::new(10);
    let mut viewer = viewer_for(&backend);
    viewer.open("fake://issue");

    let mut events = TestScenarioBuilder::new()
        .press_right(1)
        .press_char('d')
        .press_key(KeyCode::End)
        .press_key(KeyCode::PageUp)
        .press_key(KeyCode::Home)
        .press_key(KeyCode::PageDown)
        .press_char('h')
        .build();

    let mut lines = Vec::new();
    run_with_event_source(&mut viewer, &mut events, CellSize::new(10, 20), WAIT, |viewer| {
        lines.push(viewer.status_line());
        Ok(())
    })
    .unwrap();

    assert_eq!(
        lines,
        vec![
            "Cover | 100% | spread",
            "2-3 / 10 | 100% | spread",
            "2 / 10 | 100% | single",
            "10 / 10 | 100% | single",
            "9 / 10 | 100% | single",
            "Cover | 100% | single",
            "2 / 10 | 100% | single",
        ]
    );
    assert!(viewer.is_closed());
    assert_eq!(backend.rendered_pages().last(), Some(&2));
}

#[test]
fn test_export_mirrors_the_screen() {
    let out = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new(5);
    let mut viewer = viewer_for(&backend);
    viewer.open("fake://issue");
    assert!(viewer.wait_until_idle(WAIT));

    let written = export_frame(&viewer, out.path()).unwrap();
    assert_eq!(written, vec![out.path().join("slot-0-page-1.png")]);

    viewer.next();
    assert!(viewer.wait_until_idle(WAIT));
    export_frame(&viewer, out.path()).unwrap();

    let mut names: Vec<_> = std::fs::read_dir(out.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["slot-0-page-2.png", "slot-1-page-3.png"]);

    let reloaded = image::open(out.path().join("slot-1-page-3.png"))
        .unwrap()
        .to_rgba8();
    assert_eq!(*reloaded.get_pixel(0, 0), page_color(3));
}

#[test]
fn test_image_directory_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    for (index, shade) in [(1, 30u8), (2, 60), (3, 90)] {
        let page = image::RgbaImage::from_pixel(210, 297, image::Rgba([shade, 0, 0, 255]));
        page.save(dir.path().join(format!("page-{index:03}.png")))
            .unwrap();
    }

    let mut viewer = ViewerController::new(Arc::new(ImageBackend::new()), &ViewerSettings::default());
    viewer.open(dir.path().to_str().unwrap());
    assert!(viewer.wait_until_idle(WAIT));
    assert_eq!(viewer.page_count(), 3);

    viewer.next();
    assert!(viewer.wait_until_idle(WAIT));
    let frame = viewer.frame().expect("frame on screen");
    let shades: Vec<u8> = frame
        .results()
        .map(|result| result.image().get_pixel(0, 0)[0])
        .collect();
    assert_eq!(shades, vec![60, 90]);
}
