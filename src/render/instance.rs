use bytemuck::{Pod, Zeroable};

use crate::gallery::TileSnapshot;

/// Stand-in colors per source image; decoding real images is left to an
/// asset pipeline.
const SOURCE_TINTS: [[f32; 3]; 10] = [
    [0.85, 0.42, 0.38],
    [0.93, 0.71, 0.36],
    [0.55, 0.74, 0.45],
    [0.33, 0.62, 0.72],
    [0.45, 0.47, 0.80],
    [0.72, 0.45, 0.78],
    [0.90, 0.55, 0.66],
    [0.62, 0.58, 0.50],
    [0.38, 0.70, 0.62],
    [0.80, 0.80, 0.76],
];

/// Per-instance data uploaded to GPU each frame.
/// Stride = 96 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct TileInstance {
    /// Tile-to-world matrix, column major.
    pub model: [[f32; 4]; 4],
    /// RGBA tint standing in for the image.
    pub tint: [f32; 4],
    /// Corner radius, texture zoom, unused, unused.
    pub params: [f32; 4],
}

impl TileInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        2 => Float32x4,  // model col 0
        3 => Float32x4,  // model col 1
        4 => Float32x4,  // model col 2
        5 => Float32x4,  // model col 3
        6 => Float32x4,  // tint
        7 => Float32x4,  // params
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<TileInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }

    pub fn from_snapshot(tile: &TileSnapshot) -> Self {
        let source = tile.image.source.saturating_sub(1) as usize % SOURCE_TINTS.len();
        let [r, g, b] = SOURCE_TINTS[source];
        Self {
            model: tile.world().to_cols_array_2d(),
            tint: [r, g, b, 1.0],
            params: [tile.visual.blur_radius, tile.visual.zoom, 0.0, 0.0],
        }
    }
}

/// Per-frame uniforms shared by every draw.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4],
    /// Camera position (w unused), for fog distance.
    pub eye: [f32; 4],
    /// Screen width and height in pixels, zw unused.
    pub screen: [f32; 4],
    /// Cover circle center xy and radius in pixels, w unused.
    pub cover: [f32; 4],
}
