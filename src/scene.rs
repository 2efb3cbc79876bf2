//! Scene state and the GPU scene it drives.
//!
//! The CPU side ([`SceneState`]) holds everything the debug panel and the
//! animation loop mutate: transforms, wave parameters and the clock. The GPU
//! side ([`Scene`]) pairs that state with uploaded meshes. Objects are only
//! ever added — nothing is removed for the lifetime of the process, and a
//! mesh whose asset never resolved is simply never created.

use cgmath::{Matrix4, Vector2, Vector3};
use instant::Instant;

use crate::assets::Assets;
use crate::geometry;
use crate::mesh::GpuMesh;
use crate::pipelines::Pipelines;

/// Text shown by the splash scene.
pub const SPLASH_TEXT: &str = "COMING SOON";
/// Rasterization size of the text, in pixels.
pub const TEXT_PIXELS: f32 = 42.0;
/// World-space glyph height and extrusion depth of the text mesh.
pub const TEXT_SIZE: f32 = 0.5;
pub const TEXT_DEPTH: f32 = 0.05;

/// Position and scale of a mesh; identity rotation throughout this scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// The named uniform set of a shader material.
///
/// Held CPU-side and shared with the debug panel, which mutates it in place;
/// the values are re-uploaded every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveParams {
    pub frequency: Vector2<f32>,
    pub time: f32,
    pub color: [f32; 3],
}

const CYAN: [f32; 3] = [0.0, 1.0, 1.0];
/// The pale yellow of the text material (#FDF5A6).
const TEXT_COLOR: [f32; 3] = [253.0 / 255.0, 245.0 / 255.0, 166.0 / 255.0];

/// Live state of one mesh: its transform plus its material parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshState {
    pub transform: Transform,
    pub params: WaveParams,
}

/// CPU scene model. Constructed once at startup; mutated by the panel and
/// the animation loop only.
#[derive(Debug, Clone)]
pub struct SceneState {
    pub flag: MeshState,
    pub script: MeshState,
    /// Present only once the font asset has resolved; stays absent forever
    /// otherwise.
    pub text: Option<MeshState>,
}

impl SceneState {
    pub fn new(with_text: bool) -> Self {
        let flag = MeshState {
            transform: Transform {
                position: Vector3::new(0.0, 1.0, 0.0),
                scale: Vector3::new(1.0, 2.0 / 3.0, 1.0),
            },
            params: WaveParams {
                frequency: Vector2::new(3.0, 0.0),
                time: 0.0,
                color: CYAN,
            },
        };
        let script = MeshState {
            transform: Transform::new(),
            params: WaveParams {
                frequency: Vector2::new(0.0, 0.0),
                time: 0.0,
                color: CYAN,
            },
        };
        let text = with_text.then(|| MeshState {
            transform: Transform {
                position: Vector3::new(0.0, -0.9, 0.0),
                scale: Vector3::new(0.5, 0.5, 1.0),
            },
            params: WaveParams {
                frequency: Vector2::new(0.0, 0.0),
                time: 0.0,
                color: TEXT_COLOR,
            },
        });
        Self { flag, script, text }
    }
}

/// Monotonic elapsed-time source, read once per frame.
#[derive(Debug, Clone)]
pub struct Clock {
    start: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Seconds since startup. Never decreases.
    pub fn elapsed(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// The GPU scene: state plus whatever meshes could actually be built from
/// the resolved assets.
pub struct Scene {
    pub state: SceneState,
    pub clock: Clock,
    flag: Option<GpuMesh>,
    script: Option<GpuMesh>,
    text: Option<GpuMesh>,
}

impl Scene {
    /// Assemble all meshes whose assets resolved and attach them.
    pub fn build(device: &wgpu::Device, pipelines: &Pipelines, assets: &Assets) -> Self {
        let text_data = assets
            .font
            .as_ref()
            .and_then(|font| geometry::text_mesh(font, SPLASH_TEXT, TEXT_PIXELS, TEXT_SIZE, TEXT_DEPTH));
        // The text mesh also needs the matcap to shade with.
        let with_text = text_data.is_some() && assets.matcap_texture.is_some();
        let state = SceneState::new(with_text);

        let flag = assets.flag_texture.as_ref().map(|tex| {
            GpuMesh::new(
                device,
                &geometry::plane(1.0, 1.0, 32, 32, true),
                tex,
                &pipelines.uniform_layout,
                &pipelines.texture_layout,
                &state.flag.transform,
                &state.flag.params,
                "flag",
            )
        });
        let script = assets.script_texture.as_ref().map(|tex| {
            GpuMesh::new(
                device,
                &geometry::plane(2.0, 1.0, 32, 32, false),
                tex,
                &pipelines.uniform_layout,
                &pipelines.texture_layout,
                &state.script.transform,
                &state.script.params,
                "script",
            )
        });
        let text = match (&state.text, &text_data, &assets.matcap_texture) {
            (Some(text_state), Some(data), Some(matcap)) => Some(GpuMesh::new(
                device,
                data,
                matcap,
                &pipelines.uniform_layout,
                &pipelines.texture_layout,
                &text_state.transform,
                &text_state.params,
                "text",
            )),
            _ => None,
        };

        Self {
            state,
            clock: Clock::new(),
            flag,
            script,
            text,
        }
    }

    /// Number of renderable meshes currently attached.
    pub fn object_count(&self) -> usize {
        [self.flag.is_some(), self.script.is_some(), self.text.is_some()]
            .iter()
            .filter(|&&present| present)
            .count()
    }

    /// Advance the animation state for one tick: read the clock and write
    /// the elapsed time into the flag material's time uniform.
    pub fn tick(&mut self) -> f32 {
        let elapsed = self.clock.elapsed();
        self.state.flag.params.time = elapsed;
        elapsed
    }

    /// Push all live uniform values to the GPU.
    pub fn write_uniforms(&self, queue: &wgpu::Queue) {
        if let Some(mesh) = &self.flag {
            mesh.write_uniform(queue, &self.state.flag.transform, &self.state.flag.params);
        }
        if let Some(mesh) = &self.script {
            mesh.write_uniform(queue, &self.state.script.transform, &self.state.script.params);
        }
        if let (Some(mesh), Some(state)) = (&self.text, &self.state.text) {
            mesh.write_uniform(queue, &state.transform, &state.params);
        }
    }

    /// Record one draw per attached mesh.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, pipelines: &Pipelines) {
        if let Some(mesh) = &self.flag {
            pass.set_pipeline(&pipelines.flag);
            mesh.draw(pass);
        }
        if let Some(mesh) = &self.script {
            pass.set_pipeline(&pipelines.script);
            mesh.draw(pass);
        }
        if let Some(mesh) = &self.text {
            pass.set_pipeline(&pipelines.matcap);
            mesh.draw(pass);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_transforms_match_the_layout() {
        let state = SceneState::new(true);
        assert_eq!(state.flag.transform.position.y, 1.0);
        assert_eq!(state.flag.transform.scale.y, 2.0 / 3.0);
        assert_eq!(state.flag.params.frequency, Vector2::new(3.0, 0.0));
        assert_eq!(state.flag.params.time, 0.0);
        let text = state.text.expect("text state present");
        assert_eq!(text.transform.position.y, -0.9);
        assert_eq!(text.transform.scale.x, 0.5);
        assert_eq!(text.transform.scale.y, 0.5);
    }

    #[test]
    fn no_font_means_no_text_state_ever() {
        let state = SceneState::new(false);
        assert!(state.text.is_none());
        // Absence is stable: nothing in the state machine re-adds it.
        let cloned = state.clone();
        assert!(cloned.text.is_none());
    }

    #[test]
    fn clock_is_monotonic() {
        let clock = Clock::new();
        let mut last = clock.elapsed();
        for _ in 0..100 {
            let now = clock.elapsed();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn time_uniform_is_non_decreasing() {
        let clock = Clock::new();
        let mut state = SceneState::new(false);
        let mut last = state.flag.params.time;
        for _ in 0..50 {
            state.flag.params.time = clock.elapsed();
            assert!(state.flag.params.time >= last);
            last = state.flag.params.time;
        }
    }

    #[test]
    fn transform_matrix_applies_scale_then_translation() {
        let transform = Transform {
            position: Vector3::new(0.0, -3.0, 0.0),
            scale: Vector3::new(0.5, 0.5, 1.0),
        };
        let m = transform.matrix();
        let p = m * cgmath::Vector4::new(1.0, 1.0, 0.0, 1.0);
        assert!((p.x - 0.5).abs() < 1e-6);
        assert!((p.y - (-2.5)).abs() < 1e-6);
    }
}
