//! Pure geometry builders.
//!
//! Everything here is CPU-side and deterministic apart from the per-vertex
//! random attribute, which is sampled exactly once when a plane is built.
//! The text mesh is produced by rasterizing a string with fontdue and
//! extruding the resulting coverage bitmap into a thin 3D slab.

use rand::Rng;

/// Vertex layout shared by every mesh in the scene.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// One uniform sample in [0, 1) per vertex, or 0 for meshes that don't
    /// carry the attribute.
    pub random: f32,
}

impl MeshVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
            2 => Float32x2,
            3 => Float32,
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// CPU-side mesh: vertices plus triangle indices.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Axis-aligned bounding box as (min, max), or zeros when empty.
    pub fn bounding_box(&self) -> ([f32; 3], [f32; 3]) {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for v in &self.vertices {
            for axis in 0..3 {
                min[axis] = min[axis].min(v.position[axis]);
                max[axis] = max[axis].max(v.position[axis]);
            }
        }
        if self.vertices.is_empty() {
            ([0.0; 3], [0.0; 3])
        } else {
            (min, max)
        }
    }

    /// Translate all vertices so the bounding box is centered on the origin.
    pub fn center(&mut self) {
        let (min, max) = self.bounding_box();
        let mid = [
            (min[0] + max[0]) / 2.0,
            (min[1] + max[1]) / 2.0,
            (min[2] + max[2]) / 2.0,
        ];
        for v in &mut self.vertices {
            for axis in 0..3 {
                v.position[axis] -= mid[axis];
            }
        }
    }
}

/// Build a subdivided plane in the XY plane, facing +Z, centered on origin.
///
/// When `randomize` is set, every vertex gets its own uniform sample in
/// [0, 1); the attribute is generated here and never regenerated.
pub fn plane(width: f32, height: f32, xsegs: u32, ysegs: u32, randomize: bool) -> MeshData {
    let mut rng = rand::rng();
    let mut vertices = Vec::with_capacity(((xsegs + 1) * (ysegs + 1)) as usize);
    for j in 0..=ysegs {
        for i in 0..=xsegs {
            let u = i as f32 / xsegs as f32;
            let v = j as f32 / ysegs as f32;
            vertices.push(MeshVertex {
                position: [(u - 0.5) * width, (v - 0.5) * height, 0.0],
                normal: [0.0, 0.0, 1.0],
                uv: [u, 1.0 - v],
                random: if randomize { rng.random::<f32>() } else { 0.0 },
            });
        }
    }

    let stride = xsegs + 1;
    let mut indices = Vec::with_capacity((xsegs * ysegs * 6) as usize);
    for j in 0..ysegs {
        for i in 0..xsegs {
            let a = j * stride + i;
            let b = a + 1;
            let c = a + stride + 1;
            let d = a + stride;
            indices.extend_from_slice(&[a, b, c, c, d, a]);
        }
    }

    MeshData { vertices, indices }
}

/// Boolean glyph-coverage bitmap, row 0 at the top (fontdue's convention).
#[derive(Debug, Clone)]
pub struct CoverageGrid {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<bool>,
}

impl CoverageGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// Out-of-range coordinates read as empty.
    pub fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.cells[y as usize * self.width + x as usize]
    }

    pub fn set(&mut self, x: usize, y: usize) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = true;
        }
    }
}

/// Rasterize a line of text into a coverage grid at `px` pixels.
pub fn rasterize_text(font: &fontdue::Font, text: &str, px: f32) -> CoverageGrid {
    use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};

    let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings::default());
    layout.append(&[font], &TextStyle::new(text, px, 0));

    let glyphs: Vec<_> = layout.glyphs().to_vec();
    if glyphs.is_empty() {
        return CoverageGrid::new(0, 0);
    }

    let min_x = glyphs.iter().map(|g| g.x.floor() as i64).min().unwrap_or(0);
    let min_y = glyphs.iter().map(|g| g.y.floor() as i64).min().unwrap_or(0);
    let max_x = glyphs
        .iter()
        .map(|g| g.x.floor() as i64 + g.width as i64)
        .max()
        .unwrap_or(0);
    let max_y = glyphs
        .iter()
        .map(|g| g.y.floor() as i64 + g.height as i64)
        .max()
        .unwrap_or(0);

    let mut grid = CoverageGrid::new((max_x - min_x) as usize, (max_y - min_y) as usize);
    for glyph in &glyphs {
        let (metrics, bitmap) = font.rasterize_config(glyph.key);
        let gx = glyph.x.floor() as i64 - min_x;
        let gy = glyph.y.floor() as i64 - min_y;
        for row in 0..metrics.height {
            for col in 0..metrics.width {
                if bitmap[row * metrics.width + col] >= 128 {
                    grid.set((gx + col as i64) as usize, (gy + row as i64) as usize);
                }
            }
        }
    }
    grid
}

/// Extrude a coverage grid into a slab of thickness `depth`.
///
/// Each covered cell becomes a `cell`-sized column: front and back faces
/// always, side faces only where the neighbouring cell is empty. Bitmap rows
/// grow downward, so row 0 maps to the top of the mesh.
pub fn extrude_grid(grid: &CoverageGrid, cell: f32, depth: f32) -> MeshData {
    let mut mesh = MeshData::default();
    let hz = depth / 2.0;
    let (gw, gh) = (grid.width as f32, grid.height as f32);

    let mut quad = |mesh: &mut MeshData, corners: [[f32; 3]; 4], normal: [f32; 3]| {
        let base = mesh.vertices.len() as u32;
        for p in corners {
            mesh.vertices.push(MeshVertex {
                position: p,
                normal,
                uv: [p[0] / (gw * cell), 1.0 - p[1] / (gh * cell)],
                random: 0.0,
            });
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    };

    for gy in 0..grid.height as i64 {
        for gx in 0..grid.width as i64 {
            if !grid.get(gx, gy) {
                continue;
            }
            let x0 = gx as f32 * cell;
            let x1 = x0 + cell;
            // Flip vertically: the bottom bitmap row sits at world y = 0.
            let y0 = (grid.height as i64 - 1 - gy) as f32 * cell;
            let y1 = y0 + cell;

            quad(
                &mut mesh,
                [[x0, y0, hz], [x1, y0, hz], [x1, y1, hz], [x0, y1, hz]],
                [0.0, 0.0, 1.0],
            );
            quad(
                &mut mesh,
                [[x1, y0, -hz], [x0, y0, -hz], [x0, y1, -hz], [x1, y1, -hz]],
                [0.0, 0.0, -1.0],
            );
            if !grid.get(gx + 1, gy) {
                quad(
                    &mut mesh,
                    [[x1, y0, hz], [x1, y0, -hz], [x1, y1, -hz], [x1, y1, hz]],
                    [1.0, 0.0, 0.0],
                );
            }
            if !grid.get(gx - 1, gy) {
                quad(
                    &mut mesh,
                    [[x0, y0, -hz], [x0, y0, hz], [x0, y1, hz], [x0, y1, -hz]],
                    [-1.0, 0.0, 0.0],
                );
            }
            // Grid y grows downward, so the row above is gy - 1.
            if !grid.get(gx, gy - 1) {
                quad(
                    &mut mesh,
                    [[x0, y1, hz], [x1, y1, hz], [x1, y1, -hz], [x0, y1, -hz]],
                    [0.0, 1.0, 0.0],
                );
            }
            if !grid.get(gx, gy + 1) {
                quad(
                    &mut mesh,
                    [[x0, y0, -hz], [x1, y0, -hz], [x1, y0, hz], [x0, y0, hz]],
                    [0.0, -1.0, 0.0],
                );
            }
        }
    }

    mesh
}

/// Build the text mesh: rasterize, extrude, center on the bounding box.
///
/// `size` is the world-space glyph height target; `depth` the extrusion
/// thickness. Returns `None` for strings that rasterize to nothing.
pub fn text_mesh(
    font: &fontdue::Font,
    text: &str,
    px: f32,
    size: f32,
    depth: f32,
) -> Option<MeshData> {
    let grid = rasterize_text(font, text, px);
    if grid.width == 0 || grid.height == 0 {
        return None;
    }
    let cell = size / px;
    let mut mesh = extrude_grid(&grid, cell, depth);
    mesh.center();
    Some(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_vertex_and_index_counts() {
        let mesh = plane(1.0, 1.0, 32, 32, false);
        assert_eq!(mesh.vertices.len(), 33 * 33);
        assert_eq!(mesh.indices.len(), 32 * 32 * 6);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn plane_random_attribute_in_unit_interval() {
        let mesh = plane(2.0, 1.0, 32, 32, true);
        // One value per vertex, all in [0, 1).
        assert_eq!(mesh.vertices.len(), 33 * 33);
        assert!(mesh.vertices.iter().all(|v| v.random >= 0.0 && v.random < 1.0));
        // Uniform samples over a thousand vertices are not all identical.
        let first = mesh.vertices[0].random;
        assert!(mesh.vertices.iter().any(|v| v.random != first));
    }

    #[test]
    fn plane_without_randoms_is_zeroed() {
        let mesh = plane(1.0, 1.0, 4, 4, false);
        assert!(mesh.vertices.iter().all(|v| v.random == 0.0));
    }

    #[test]
    fn plane_spans_requested_extent() {
        let mesh = plane(2.0, 1.0, 8, 8, false);
        let (min, max) = mesh.bounding_box();
        assert_eq!(min[0], -1.0);
        assert_eq!(max[0], 1.0);
        assert_eq!(min[1], -0.5);
        assert_eq!(max[1], 0.5);
    }

    fn single_cell_grid() -> CoverageGrid {
        let mut grid = CoverageGrid::new(3, 3);
        grid.set(1, 1);
        grid
    }

    #[test]
    fn extruded_cell_is_a_closed_box() {
        let mesh = extrude_grid(&single_cell_grid(), 0.1, 0.05);
        // A lone cell has all six faces: 6 quads, 4 verts / 6 indices each.
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
    }

    #[test]
    fn adjacent_cells_share_no_inner_wall() {
        let mut grid = CoverageGrid::new(4, 1);
        grid.set(1, 0);
        grid.set(2, 0);
        let mesh = extrude_grid(&grid, 0.1, 0.05);
        // Two cells: 2 front + 2 back + 2 vertical sides each (top+bottom)
        // + 1 outer left + 1 outer right = 10 quads.
        assert_eq!(mesh.vertices.len(), 40);
        assert_eq!(mesh.indices.len(), 60);
    }

    #[test]
    fn centering_moves_bbox_midpoint_to_origin() {
        let mut grid = CoverageGrid::new(5, 2);
        grid.set(0, 0);
        grid.set(4, 1);
        let mut mesh = extrude_grid(&grid, 0.2, 0.05);
        mesh.center();
        let (min, max) = mesh.bounding_box();
        for axis in 0..3 {
            assert!((min[axis] + max[axis]).abs() < 1e-5);
        }
    }

    #[test]
    fn empty_grid_extrudes_to_nothing() {
        let mesh = extrude_grid(&CoverageGrid::new(0, 0), 0.1, 0.05);
        assert!(mesh.vertices.is_empty());
        assert!(mesh.indices.is_empty());
    }
}
