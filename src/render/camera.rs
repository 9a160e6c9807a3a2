use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};

use crate::ecs::components::TileId;
use crate::gallery::TileSnapshot;

/// Fixed viewing camera looking down -Z at the origin.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub eye: Vec3,
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 17.0),
            fov_y_deg: 15.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y_deg.to_radians(), aspect.max(0.01), self.near, self.far);
        let view = Mat4::look_at_rh(self.eye, Vec3::ZERO, Vec3::Y);
        proj * view
    }
}

/// Half extents of the tile plane in its local frame.
pub const TILE_HALF: Vec2 = Vec2::new(0.5, 0.75);

/// Front-most tile under `cursor` (physical pixels, origin top-left).
/// Tiles are treated as flat quads; the bend is ignored.
pub fn pick(tiles: &[TileSnapshot], camera: &Camera, cursor: Vec2, screen: Vec2) -> Option<TileId> {
    if screen.x <= 0.0 || screen.y <= 0.0 {
        return None;
    }
    let view_proj = camera.view_proj(screen.x / screen.y);
    let ndc_cursor = Vec2::new(cursor.x / screen.x * 2.0 - 1.0, 1.0 - cursor.y / screen.y * 2.0);

    let corners = [
        Vec3::new(-TILE_HALF.x, -TILE_HALF.y, 0.0),
        Vec3::new(TILE_HALF.x, -TILE_HALF.y, 0.0),
        Vec3::new(TILE_HALF.x, TILE_HALF.y, 0.0),
        Vec3::new(-TILE_HALF.x, TILE_HALF.y, 0.0),
    ];

    let mut best: Option<(f32, TileId)> = None;
    for tile in tiles {
        let mvp = view_proj * tile.world();
        let mut quad = [Vec2::ZERO; 4];
        let mut depth = 0.0;
        let mut visible = true;
        for (slot, corner) in quad.iter_mut().zip(corners) {
            let clip = mvp * corner.extend(1.0);
            if clip.w <= 0.0 {
                visible = false;
                break;
            }
            *slot = clip.xy() / clip.w;
            depth += clip.z / clip.w * 0.25;
        }
        if !visible || !inside_quad(&quad, ndc_cursor) {
            continue;
        }
        if best.map_or(true, |(d, _)| depth < d) {
            best = Some((depth, tile.id));
        }
    }
    best.map(|(_, id)| id)
}

/// Point-in-convex-quad test that accepts either winding.
fn inside_quad(quad: &[Vec2; 4], p: Vec2) -> bool {
    let mut sign = 0.0f32;
    for i in 0..4 {
        let a = quad[i];
        let b = quad[(i + 1) % 4];
        let cross = (b - a).perp_dot(p - a);
        if cross.abs() < f32::EPSILON {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}
