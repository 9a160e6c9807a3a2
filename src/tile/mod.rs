pub mod assets;
pub mod set;

use glam::Vec3;

use crate::ecs::components::*;
use crate::layout::{Arrangement, ArrangementKind, Row};
use assets::AssetProvider;

pub use set::TileSet;

/// Start height of a dropped-in flat tile above its resting row:
/// `DROP_HEIGHT - element * DROP_STEP`, element = 2 * column + row.
pub const DROP_HEIGHT: f32 = 10.0;
pub const DROP_STEP: f32 = 0.4;

/// Spawn ring tile `index` at its circular placement.
pub fn spawn_ring_tile(
    world: &mut hecs::World,
    layout: &Arrangement,
    assets: &dyn AssetProvider,
    index: usize,
) -> hecs::Entity {
    let target = layout.target(index, ArrangementKind::Circular);
    let image = assets.image(index);
    log::trace!("Ring tile {index} shows {}", image.url());
    world.spawn((
        TileId::Ring(index),
        Transform {
            position: target.position,
            rotation: target.rotation,
        },
        Visual::default(),
        Hovered(false),
        image,
    ))
}

/// Flat element index for a column/row pair (upper rows are even).
pub fn flat_element(column: usize, row: Row) -> usize {
    column * 2 + usize::from(row == Row::Lower)
}

/// Inverse of [`flat_element`].
pub fn flat_slot(element: usize) -> (usize, Row) {
    let row = if element % 2 == 0 { Row::Upper } else { Row::Lower };
    (element / 2, row)
}

/// Where a flat tile starts its drop: above its row, staggered by element.
pub fn drop_start(resting: Vec3, element: usize) -> Vec3 {
    resting + Vec3::Y * (DROP_HEIGHT - element as f32 * DROP_STEP)
}

/// Mount one flat tile at the top of its drop. Returns the entity and its
/// resting position.
pub fn spawn_flat(
    world: &mut hecs::World,
    layout: &Arrangement,
    assets: &dyn AssetProvider,
    element: usize,
) -> (hecs::Entity, Vec3) {
    let (column, row) = flat_slot(element);
    let target = layout.target(column, ArrangementKind::FlatPaired(row));
    let entity = world.spawn((
        TileId::Flat { column, row },
        Transform {
            position: drop_start(target.position, element),
            rotation: target.rotation,
        },
        Visual::default(),
        Hovered(false),
        assets.image(column),
    ));
    (entity, target.position)
}
