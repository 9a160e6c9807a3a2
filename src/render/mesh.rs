use std::f32::consts::{FRAC_PI_2, TAU};

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use super::camera::TILE_HALF;

/// How far the middle of a tile bows back from its edges.
const BEND: f32 = 0.1;
/// Segments per side of the fine mesh.
pub const FINE_SEGMENTS: u32 = 20;

/// Mesh vertex in the tile's local frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,  // position
        1 => Float32x2,  // uv
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// A tile plane bent along its width into a shallow arc.
pub struct BentPlane {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl BentPlane {
    pub fn new(segments_x: u32, segments_y: u32) -> Self {
        let sx = segments_x.max(1);
        let sy = segments_y.max(1);
        let height = TILE_HALF.y * 2.0;
        let arc = Arc::new(TILE_HALF.x, BEND);

        let mut vertices = Vec::with_capacity(((sx + 1) * (sy + 1)) as usize);
        for iy in 0..=sy {
            let y = TILE_HALF.y - iy as f32 * height / sy as f32;
            for ix in 0..=sx {
                let u = ix as f32 / sx as f32;
                let p = arc.point(1.0 - u);
                vertices.push(Vertex {
                    position: [p.x, y, -p.y],
                    uv: [u, 1.0 - iy as f32 / sy as f32],
                });
            }
        }

        let row = sx + 1;
        let mut indices = Vec::with_capacity((sx * sy * 6) as usize);
        for iy in 0..sy {
            for ix in 0..sx {
                let a = ix + row * iy;
                let b = ix + row * (iy + 1);
                let c = ix + 1 + row * (iy + 1);
                let d = ix + 1 + row * iy;
                indices.extend([a, b, d, b, c, d].map(|i| i as u16));
            }
        }

        Self { vertices, indices }
    }
}

/// Circle through (-half, 0), (0, bend), (half, 0).
struct Arc {
    center: Vec2,
    start: Vec2,
    sweep: f32,
}

impl Arc {
    fn new(half: f32, bend: f32) -> Self {
        let a = Vec2::new(-half, 0.0);
        let b = Vec2::new(0.0, bend);
        let c = Vec2::new(half, 0.0);
        let (ab, bc, ac) = (a - b, b - c, a - c);
        let radius = ab.length() * bc.length() * ac.length() / (2.0 * ab.perp_dot(ac).abs());
        let center = Vec2::new(0.0, bend - radius);
        let to_a = a - center;
        let base = to_a.y.atan2(to_a.x).rem_euclid(TAU) - FRAC_PI_2;
        Self {
            center,
            start: c,
            sweep: base * 2.0,
        }
    }

    /// Point at fraction `t` of the sweep from the right edge to the left.
    fn point(&self, t: f32) -> Vec2 {
        let rel = self.start - self.center;
        self.center + Vec2::from_angle(self.sweep * t).rotate(rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coarse_plane_is_a_quad() {
        let plane = BentPlane::new(1, 1);
        assert_eq!(plane.vertices.len(), 4);
        assert_eq!(plane.indices.len(), 6);
        for v in &plane.vertices {
            assert!(v.position[2].abs() < 1e-5, "corners stay on the plane");
        }
    }

    #[test]
    fn fine_plane_bows_back_in_the_middle() {
        let plane = BentPlane::new(FINE_SEGMENTS, FINE_SEGMENTS);
        assert_eq!(plane.vertices.len(), 21 * 21);
        let mid = &plane.vertices[10];
        assert!((mid.position[0]).abs() < 1e-4);
        assert!((mid.position[2] + BEND).abs() < 1e-4);
        assert!(plane.indices.iter().all(|&i| (i as usize) < plane.vertices.len()));
    }

    #[test]
    fn edges_keep_full_width() {
        let plane = BentPlane::new(4, 1);
        let first = plane.vertices[0].position;
        let last = plane.vertices[4].position;
        assert!((first[0] + 0.5).abs() < 1e-4);
        assert!((last[0] - 0.5).abs() < 1e-4);
    }
}
