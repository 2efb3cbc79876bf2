//! End-to-end checks over the CPU-side scene: the initial layout, the slider
//! bindings and the frame clock, driven through the public API only.

use flagwave::camera::Camera;
use flagwave::panel::{Binding, SLIDERS};
use flagwave::scene::{Clock, SceneState};

#[test]
fn every_slider_round_trips_through_its_binding() {
    let mut state = SceneState::new(true);
    let mut camera = Camera::new((0.0, 0.0, 2.25));

    for slider in SLIDERS {
        let mid = (slider.min + slider.max) / 2.0;
        slider.binding.set(&mut state, &mut camera, mid);
        assert_eq!(
            slider.binding.get(&state, &camera),
            Some(mid),
            "{} did not round-trip",
            slider.label
        );
    }
}

#[test]
fn camera_slider_writes_are_seen_by_the_view_matrix() {
    let mut state = SceneState::new(false);
    let mut camera = Camera::new((0.0, 0.0, 2.25));
    let before = camera.view_matrix();

    Binding::CameraX.set(&mut state, &mut camera, 1.0);
    let after = camera.view_matrix();

    assert_ne!(before, after);
}

#[test]
fn the_flag_animates_while_the_text_sliders_stay_inert() {
    let mut state = SceneState::new(false);
    let mut camera = Camera::new((0.0, 0.0, 2.25));
    let clock = Clock::new();

    state.flag.params.time = clock.elapsed();
    Binding::TextY.set(&mut state, &mut camera, -1.5);

    assert!(state.text.is_none());
    assert!(state.flag.params.time >= 0.0);
}
