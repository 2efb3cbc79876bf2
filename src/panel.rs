//! The debug panel: a fixed, hand-picked set of numeric scene properties
//! exposed as range-constrained sliders.
//!
//! Each slider is bound through an explicit accessor pair ([`Binding::get`] /
//! [`Binding::set`]) rather than a captured pointer, so the indirection from
//! widget to live object is spelled out in one place. Setting a slider writes
//! straight into the scene state or camera — no intermediate copy, no undo.

use crate::camera::Camera;
use crate::scene::SceneState;

/// Which live property a slider reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    TextY,
    TextScaleX,
    TextScaleY,
    FrequencyX,
    FrequencyY,
    Elevation,
    CameraX,
    CameraY,
    CameraZ,
}

impl Binding {
    /// Read the current value, or `None` when the target doesn't exist
    /// (text bindings while the font never resolved).
    pub fn get(&self, state: &SceneState, camera: &Camera) -> Option<f32> {
        match self {
            Binding::TextY => state.text.as_ref().map(|t| t.transform.position.y),
            Binding::TextScaleX => state.text.as_ref().map(|t| t.transform.scale.x),
            Binding::TextScaleY => state.text.as_ref().map(|t| t.transform.scale.y),
            Binding::FrequencyX => Some(state.flag.params.frequency.x),
            Binding::FrequencyY => Some(state.flag.params.frequency.y),
            Binding::Elevation => Some(state.flag.transform.position.y),
            Binding::CameraX => Some(camera.position.x),
            Binding::CameraY => Some(camera.position.y),
            Binding::CameraZ => Some(camera.position.z),
        }
    }

    /// Write `value` into the live target. Writes to an absent text mesh
    /// are dropped.
    pub fn set(&self, state: &mut SceneState, camera: &mut Camera, value: f32) {
        match self {
            Binding::TextY => {
                if let Some(t) = state.text.as_mut() {
                    t.transform.position.y = value;
                }
            }
            Binding::TextScaleX => {
                if let Some(t) = state.text.as_mut() {
                    t.transform.scale.x = value;
                }
            }
            Binding::TextScaleY => {
                if let Some(t) = state.text.as_mut() {
                    t.transform.scale.y = value;
                }
            }
            Binding::FrequencyX => state.flag.params.frequency.x = value,
            Binding::FrequencyY => state.flag.params.frequency.y = value,
            Binding::Elevation => state.flag.transform.position.y = value,
            Binding::CameraX => camera.position.x = value,
            Binding::CameraY => camera.position.y = value,
            Binding::CameraZ => camera.position.z = value,
        }
    }
}

/// One slider row: target binding plus its range, step and label.
#[derive(Debug, Clone, Copy)]
pub struct Slider {
    pub label: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f64,
    pub binding: Binding,
}

/// The full panel, in display order.
pub const SLIDERS: [Slider; 9] = [
    Slider { label: "positionTextY", min: -2.0, max: 1.0, step: 0.1, binding: Binding::TextY },
    Slider { label: "scaleX", min: 0.0, max: 1.0, step: 0.1, binding: Binding::TextScaleX },
    Slider { label: "scaleY", min: 0.0, max: 1.0, step: 0.1, binding: Binding::TextScaleY },
    Slider { label: "frequencyX", min: 0.0, max: 20.0, step: 0.01, binding: Binding::FrequencyX },
    Slider { label: "frequencyY", min: 0.0, max: 20.0, step: 0.01, binding: Binding::FrequencyY },
    Slider { label: "elevation", min: -3.0, max: 3.0, step: 0.01, binding: Binding::Elevation },
    Slider { label: "cameraX", min: -1.0, max: 1.0, step: 0.25, binding: Binding::CameraX },
    Slider { label: "cameraY", min: -1.0, max: 1.0, step: 0.25, binding: Binding::CameraY },
    Slider { label: "cameraZ", min: 0.0, max: 3.0, step: 0.25, binding: Binding::CameraZ },
];

/// Draw the panel and apply any slider changes to the live targets.
pub fn draw(ctx: &egui::Context, state: &mut SceneState, camera: &mut Camera) {
    egui::Window::new("Tweaks")
        .default_width(240.0)
        .resizable(false)
        .show(ctx, |ui| {
            for slider in SLIDERS {
                let Some(mut value) = slider.binding.get(state, camera) else {
                    continue;
                };
                let response = ui.add(
                    egui::Slider::new(&mut value, slider.min..=slider.max)
                        .step_by(slider.step)
                        .text(slider.label),
                );
                if response.changed() {
                    slider.binding.set(state, camera, value);
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;

    fn targets() -> (SceneState, Camera) {
        (SceneState::new(true), Camera::new((0.0, 0.0, 2.25)))
    }

    #[test]
    fn boundary_values_land_exactly() {
        let (mut state, mut camera) = targets();
        for slider in SLIDERS {
            slider.binding.set(&mut state, &mut camera, slider.min);
            assert_eq!(
                slider.binding.get(&state, &camera),
                Some(slider.min),
                "min of {}",
                slider.label
            );
            slider.binding.set(&mut state, &mut camera, slider.max);
            assert_eq!(
                slider.binding.get(&state, &camera),
                Some(slider.max),
                "max of {}",
                slider.label
            );
        }
    }

    #[test]
    fn elevation_minimum_sets_mesh_y_to_exactly_minus_three() {
        let (mut state, mut camera) = targets();
        Binding::Elevation.set(&mut state, &mut camera, -3.0);
        assert_eq!(state.flag.transform.position.y, -3.0);
    }

    #[test]
    fn camera_bindings_write_through_to_position() {
        let (mut state, mut camera) = targets();
        Binding::CameraX.set(&mut state, &mut camera, -1.0);
        Binding::CameraY.set(&mut state, &mut camera, 1.0);
        Binding::CameraZ.set(&mut state, &mut camera, 3.0);
        assert_eq!(camera.position, Point3::new(-1.0, 1.0, 3.0));
    }

    #[test]
    fn text_bindings_are_inert_without_a_text_mesh() {
        let mut state = SceneState::new(false);
        let mut camera = Camera::new((0.0, 0.0, 2.25));
        assert_eq!(Binding::TextY.get(&state, &camera), None);
        Binding::TextY.set(&mut state, &mut camera, 0.5);
        assert!(state.text.is_none());
    }

    #[test]
    fn panel_covers_the_configured_ranges() {
        let ranges: Vec<(Binding, f32, f32, f64)> = SLIDERS
            .iter()
            .map(|s| (s.binding, s.min, s.max, s.step))
            .collect();
        assert!(ranges.contains(&(Binding::TextY, -2.0, 1.0, 0.1)));
        assert!(ranges.contains(&(Binding::TextScaleX, 0.0, 1.0, 0.1)));
        assert!(ranges.contains(&(Binding::TextScaleY, 0.0, 1.0, 0.1)));
        assert!(ranges.contains(&(Binding::FrequencyX, 0.0, 20.0, 0.01)));
        assert!(ranges.contains(&(Binding::FrequencyY, 0.0, 20.0, 0.01)));
        assert!(ranges.contains(&(Binding::Elevation, -3.0, 3.0, 0.01)));
        assert!(ranges.contains(&(Binding::CameraX, -1.0, 1.0, 0.25)));
        assert!(ranges.contains(&(Binding::CameraY, -1.0, 1.0, 0.25)));
        assert!(ranges.contains(&(Binding::CameraZ, 0.0, 3.0, 0.25)));
    }
}
