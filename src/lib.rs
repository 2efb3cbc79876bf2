//! flagwave
//!
//! A small, continuously running wgpu demo scene: a waving flag plane and a
//! script plane driven by custom shader materials, a matcap-shaded 3D text
//! mesh extruded from a font, a damped orbit camera and an egui panel of
//! live-tweakable parameters.
//!
//! High-level modules
//! - `app`: winit event loop, per-frame tick and resize handling
//! - `assets`: async texture/font loading (native files or web fetch)
//! - `camera`: perspective camera, projection and damped orbit controller
//! - `context`: central GPU and window context owning device/queue/surface
//! - `geometry`: pure mesh builders (subdivided planes, extruded text)
//! - `mesh`: GPU-side mesh resources and per-frame uniform upload
//! - `panel`: slider descriptors and the egui debug panel
//! - `pipelines`: render pipeline constructors for the scene's materials
//! - `scene`: CPU scene state and the GPU scene it drives
//! - `texture`: GPU texture wrapper and loaders
//!

pub mod app;
pub mod assets;
pub mod camera;
pub mod context;
pub mod geometry;
pub mod mesh;
pub mod panel;
pub mod pipelines;
pub mod scene;
pub mod texture;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
