use glam::Vec3;

use crate::anim::Damped;
use crate::layout::Row;

/// Which tile this entity is. Ring tiles are always mounted; flat tiles
/// only exist while the gallery is expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileId {
    Ring(usize),
    Flat { column: usize, row: Row },
}

impl TileId {
    pub fn is_flat(self) -> bool {
        matches!(self, TileId::Flat { .. })
    }
}

/// Position and Euler XYZ rotation, written only by tweens.
/// Ring tiles live in the ring group's frame, flat tiles in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
}

/// Hover-driven look, continuously damped every frame.
#[derive(Debug, Clone, Copy)]
pub struct Visual {
    pub scale: Damped,
    /// Corner rounding of the image.
    pub blur_radius: Damped,
    /// Texture zoom inside the frame.
    pub zoom: Damped,
    /// Extra Z pushed onto flat tiles; stays 0 for ring tiles.
    pub depth_offset: Damped,
}

impl Default for Visual {
    /// Freshly mounted image: settles toward its resting look from here.
    fn default() -> Self {
        Self {
            scale: Damped::new(1.0),
            blur_radius: Damped::new(0.0),
            zoom: Damped::new(1.0),
            depth_offset: Damped::new(0.0),
        }
    }
}

/// Whether the pointer is over this tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hovered(pub bool);
