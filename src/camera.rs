//! Camera types, damped orbit controller and the view/projection uniform.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3};
use instant::Duration;
use wgpu::util::DeviceExt;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// wgpu clip space is z in [0, 1] while cgmath produces OpenGL's [-1, 1].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// A camera orbiting a fixed target.
///
/// `position` is live-mutable (the debug panel writes it directly); the orbit
/// controller re-reads it every frame, so external writes are never clobbered.
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>>(position: P) -> Self {
        Self {
            position: position.into(),
            target: Point3::new(0.0, 0.0, 0.0),
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, Vector3::unit_y())
    }
}

/// Perspective projection parameters.
///
/// The aspect ratio is re-derived from the surface size on every resize; no
/// frame renders with a stale aspect because [`resize`](Self::resize) runs in
/// the same event that reconfigures the surface.
#[derive(Clone, Debug)]
pub struct Projection {
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// View-projection matrix in GPU layout.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_proj = (projection.matrix() * camera.view_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Damped orbit interaction around the camera target.
///
/// Pointer drags feed angular velocity, the wheel feeds zoom velocity, and
/// both decay exponentially each frame. The spherical offset is re-derived
/// from the camera position at the start of every update.
#[derive(Clone, Debug)]
pub struct OrbitController {
    rotate_speed: f32,
    zoom_speed: f32,
    damping: f32,
    dragging: bool,
    pending_rotate: (f32, f32),
    pending_zoom: f32,
    yaw_velocity: f32,
    pitch_velocity: f32,
    zoom_velocity: f32,
}

impl OrbitController {
    pub fn new(rotate_speed: f32, zoom_speed: f32, damping: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            damping,
            dragging: false,
            pending_rotate: (0.0, 0.0),
            pending_zoom: 0.0,
            yaw_velocity: 0.0,
            pitch_velocity: 0.0,
            zoom_velocity: 0.0,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Track drag state and wheel input from window events.
    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
                };
                self.pending_zoom -= lines;
            }
            _ => {}
        }
    }

    /// Accumulate raw pointer motion while the left button is held.
    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        if self.dragging {
            self.pending_rotate.0 += dx as f32;
            self.pending_rotate.1 += dy as f32;
        }
    }

    /// Advance the orbit once per frame, before rendering.
    pub fn update(&mut self, camera: &mut Camera, dt: Duration) {
        let dt = dt.as_secs_f32();

        self.yaw_velocity += self.pending_rotate.0 * self.rotate_speed;
        self.pitch_velocity += self.pending_rotate.1 * self.rotate_speed;
        self.zoom_velocity += self.pending_zoom * self.zoom_speed;
        self.pending_rotate = (0.0, 0.0);
        self.pending_zoom = 0.0;

        let offset = camera.position - camera.target;
        let radius = offset.magnitude().max(1e-4);
        let mut yaw = offset.x.atan2(offset.z);
        let mut pitch = (offset.y / radius).clamp(-1.0, 1.0).asin();

        yaw -= self.yaw_velocity * dt;
        pitch += self.pitch_velocity * dt;
        // Keep away from the poles so look_at keeps a well-defined up vector.
        let limit = std::f32::consts::FRAC_PI_2 - 0.01;
        pitch = pitch.clamp(-limit, limit);
        let radius = (radius * (1.0 + self.zoom_velocity * dt)).max(0.05);

        camera.position = camera.target
            + Vector3::new(
                radius * pitch.cos() * yaw.sin(),
                radius * pitch.sin(),
                radius * pitch.cos() * yaw.cos(),
            );

        let decay = (-self.damping * dt).exp();
        self.yaw_velocity *= decay;
        self.pitch_velocity *= decay;
        self.zoom_velocity *= decay;
    }
}

impl Default for OrbitController {
    fn default() -> Self {
        // Tuned by eye: inertia noticeable but short-lived.
        Self::new(0.004, 0.4, 6.0)
    }
}

/// Camera state plus its GPU resources, owned by the context.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: OrbitController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device, camera: Camera, projection: &Projection) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera_buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = camera_layout(device);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            camera,
            controller: OrbitController::default(),
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }
}

pub fn camera_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("camera_bind_group_layout"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Deg;

    #[test]
    fn resize_rederives_aspect_exactly() {
        let mut projection = Projection::new(800, 600, Deg(75.0), 0.1, 100.0);
        projection.resize(1920, 1080);
        assert_eq!(projection.aspect, 1920.0 / 1080.0);
        projection.resize(333, 777);
        assert_eq!(projection.aspect, 333.0 / 777.0);
    }

    #[test]
    fn view_projection_is_finite() {
        let camera = Camera::new((0.0, 0.0, 2.25));
        let projection = Projection::new(1280, 720, Deg(75.0), 0.1, 100.0);
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, &projection);
        let m: Matrix4<f32> = projection.matrix() * camera.view_matrix();
        for col in [m.x, m.y, m.z, m.w] {
            assert!(col.x.is_finite() && col.y.is_finite() && col.z.is_finite() && col.w.is_finite());
        }
    }

    #[test]
    fn idle_controller_leaves_camera_in_place() {
        let mut camera = Camera::new((0.0, 0.0, 2.25));
        let mut controller = OrbitController::default();
        controller.update(&mut camera, Duration::from_millis(16));
        let offset = camera.position - camera.target;
        assert!((offset.magnitude() - 2.25).abs() < 1e-4);
        assert!(offset.x.abs() < 1e-4 && offset.y.abs() < 1e-4);
    }

    #[test]
    fn drag_velocity_decays() {
        let mut camera = Camera::new((0.0, 0.0, 2.25));
        let mut controller = OrbitController::default();
        controller.dragging = true;
        controller.handle_mouse(40.0, 0.0);
        controller.update(&mut camera, Duration::from_millis(16));
        let first = controller.yaw_velocity.abs();
        assert!(first > 0.0);
        // A few seconds worth of frames.
        for _ in 0..240 {
            controller.update(&mut camera, Duration::from_millis(16));
        }
        assert!(controller.yaw_velocity.abs() < first * 0.05);
    }

    #[test]
    fn drag_preserves_orbit_radius() {
        let mut camera = Camera::new((0.0, 0.0, 2.25));
        let mut controller = OrbitController::default();
        controller.dragging = true;
        controller.handle_mouse(25.0, -12.0);
        for _ in 0..60 {
            controller.update(&mut camera, Duration::from_millis(16));
        }
        let radius = (camera.position - camera.target).magnitude();
        assert!((radius - 2.25).abs() < 1e-3);
    }

    #[test]
    fn panel_writes_to_position_survive_update() {
        let mut camera = Camera::new((0.0, 0.0, 2.25));
        let mut controller = OrbitController::default();
        camera.position = Point3::new(1.0, 0.0, 2.0);
        controller.update(&mut camera, Duration::from_millis(16));
        // Radius derived from the freshly written position, not the old one.
        let radius = (camera.position - camera.target).magnitude();
        assert!((radius - (1.0f32 + 4.0).sqrt()).abs() < 1e-3);
    }
}
