use box_grid::{SceneController, Viewport};

use crate::common::test_utils::{CountingScheduler, RecordingRenderer, approx_eq};

mod common;

fn controller() -> SceneController<RecordingRenderer> {
    SceneController::init(RecordingRenderer::new(), Viewport::new(800, 600))
        .expect("scene setup with a container present")
}

#[test]
fn each_frame_rotates_every_box() {
    let mut controller = controller();
    let scheduler = CountingScheduler::new();
    for n in 1..=7 {
        controller.render(&scheduler);
        let expected = 0.01 * n as f32;
        for mesh in controller.scene().meshes() {
            assert!(approx_eq(mesh.transform.rotation.x, expected));
            assert!(approx_eq(mesh.transform.rotation.y, expected));
            assert_eq!(mesh.transform.rotation.z, 0.0);
        }
    }
}

#[test]
fn one_hundred_frames_make_one_radian() {
    let mut controller = controller();
    let scheduler = CountingScheduler::new();
    for _ in 0..100 {
        controller.render(&scheduler);
    }
    let rotation = controller.scene().meshes()[0].transform.rotation;
    assert!((rotation.x - 1.0).abs() < 1e-3);
    assert!((rotation.y - 1.0).abs() < 1e-3);
    assert_eq!(controller.frame_count(), 100);
    assert_eq!(controller.scene().lights().len(), 3);
}

#[test]
fn every_frame_schedules_the_next_and_renders_once() {
    let mut controller = controller();
    let scheduler = CountingScheduler::new();
    for _ in 0..5 {
        controller.render(&scheduler);
    }
    assert_eq!(scheduler.requests(), 5);
    let renders = &controller.renderer().renders;
    assert_eq!(renders.len(), 5);
    assert!(renders.iter().all(|call| call.meshes == 100 && call.lights == 3));
}

#[test]
fn renderer_sees_the_rotation_of_the_current_frame() {
    let mut controller = controller();
    let scheduler = CountingScheduler::new();
    controller.render(&scheduler);
    controller.render(&scheduler);
    let rotations: Vec<f32> = controller
        .renderer()
        .renders
        .iter()
        .filter_map(|call| call.first_rotation.map(|r| r.x))
        .collect();
    assert_eq!(rotations.len(), 2);
    assert!(approx_eq(rotations[0], 0.01));
    assert!(approx_eq(rotations[1], 0.02));
}

#[test]
fn idle_controls_leave_the_camera_in_place() {
    let mut controller = controller();
    let scheduler = CountingScheduler::new();
    let start = controller.camera().position;
    for _ in 0..10 {
        controller.render(&scheduler);
    }
    assert_eq!(controller.camera().position, start);
}

#[test]
fn pending_orbit_input_moves_the_camera_on_the_next_frame() {
    let mut controller = controller();
    let scheduler = CountingScheduler::new();
    let start = controller.camera().position;
    controller.controls_mut().rotate_left(0.3);
    controller.render(&scheduler);
    assert_ne!(controller.camera().position, start);
    let seen = controller.renderer().renders[0].camera_position;
    assert_eq!(seen, controller.camera().position);
}

#[test]
fn stop_finishes_the_current_frame_without_scheduling() {
    let mut controller = controller();
    let scheduler = CountingScheduler::new();
    controller.render(&scheduler);
    controller.stop();
    assert!(!controller.is_running());
    controller.render(&scheduler);
    assert_eq!(scheduler.requests(), 1);
    assert_eq!(controller.renderer().renders.len(), 2);
    assert_eq!(controller.frame_count(), 2);
}

#[test]
fn render_errors_do_not_stop_the_loop() {
    let mut controller = SceneController::init(RecordingRenderer::failing(), Viewport::new(800, 600))
        .expect("scene setup with a container present");
    let scheduler = CountingScheduler::new();
    for _ in 0..3 {
        controller.render(&scheduler);
    }
    assert_eq!(scheduler.requests(), 3);
    assert_eq!(controller.frame_count(), 3);
    assert!(controller.is_running());
}
