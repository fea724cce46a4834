use box_grid::{Renderer, SceneController, Viewport, config::camera_params};

use crate::common::test_utils::{CountingScheduler, RecordingRenderer, approx_eq};

mod common;

fn controller() -> SceneController<RecordingRenderer> {
    SceneController::init(RecordingRenderer::new(), Viewport::new(800, 600))
        .expect("scene setup with a container present")
}

#[test]
fn resize_updates_surface_and_aspect() {
    let mut controller = controller();
    controller.resize(Viewport::new(1920, 1080));
    assert_eq!(controller.renderer().size(), Viewport::new(1920, 1080));
    assert!(approx_eq(controller.camera().aspect, 1920.0 / 1080.0));
    assert_eq!(controller.viewport(), Viewport::new(1920, 1080));
    assert_eq!(controller.controls().element_size(), Viewport::new(1920, 1080));
}

#[test]
fn resize_recomputes_the_projection() {
    let mut controller = controller();
    let before = controller.camera().projection_matrix();
    controller.resize(Viewport::new(600, 600));
    let after = controller.camera().projection_matrix();
    assert_ne!(before, after);
    // a square viewport scales x and y equally
    assert!(approx_eq(after.x.x, after.y.y));
}

#[test]
fn aspect_follows_every_resize() {
    let mut controller = controller();
    for (w, h) in [(640, 480), (300, 900), (1000, 250)] {
        let viewport = Viewport::new(w, h);
        controller.resize(viewport);
        assert!(approx_eq(controller.camera().aspect, camera_params(viewport).aspect));
    }
}

#[test]
fn unchanged_size_is_a_no_op() {
    let mut controller = controller();
    let calls = controller.renderer().size_history.len();
    controller.resize(Viewport::new(800, 600));
    assert_eq!(controller.renderer().size_history.len(), calls);
}

#[test]
fn empty_sizes_are_ignored() {
    let mut controller = controller();
    controller.resize(Viewport::new(0, 0));
    controller.resize(Viewport::new(1024, 0));
    assert_eq!(controller.renderer().size(), Viewport::new(800, 600));
    assert!(approx_eq(controller.camera().aspect, 800.0 / 600.0));
}

#[test]
fn frames_after_resize_use_the_new_aspect() {
    let mut controller = controller();
    let scheduler = CountingScheduler::new();
    controller.resize(Viewport::new(1000, 500));
    controller.render(&scheduler);
    let call = &controller.renderer().renders[0];
    assert!(approx_eq(call.camera_aspect, 2.0));
}
