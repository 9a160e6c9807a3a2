use hecs::Entity;

use super::assets::AssetProvider;
use super::{flat_element, spawn_flat, spawn_ring_tile};
use crate::ecs::components::TileId;
use crate::layout::Arrangement;

/// All tiles of the gallery, indexable by ring index or flat element.
///
/// A slot holding `None` is a tile that isn't mounted (yet). Lookups on
/// such slots come back empty rather than failing.
pub struct TileSet {
    world: hecs::World,
    layout: Arrangement,
    assets: Box<dyn AssetProvider>,
    ring: Vec<Option<Entity>>,
    /// Indexed by flat element (2 * column + row).
    flat: Vec<Option<Entity>>,
}

impl TileSet {
    /// Empty set sized for `layout`; nothing is mounted.
    pub fn new(layout: Arrangement, assets: Box<dyn AssetProvider>) -> Self {
        let count = layout.count();
        Self {
            world: hecs::World::new(),
            layout,
            assets,
            ring: vec![None; count],
            flat: vec![None; count * 2],
        }
    }

    pub fn layout(&self) -> &Arrangement {
        &self.layout
    }

    pub fn world(&self) -> &hecs::World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut hecs::World {
        &mut self.world
    }

    /// Mount every ring tile that isn't mounted yet.
    pub fn mount_ring(&mut self) {
        for index in 0..self.ring.len() {
            self.mount_ring_tile(index);
        }
    }

    /// Mount one ring tile. Returns None for an out-of-range index.
    pub fn mount_ring_tile(&mut self, index: usize) -> Option<Entity> {
        let slot = self.ring.get_mut(index)?;
        if let Some(entity) = *slot {
            return Some(entity);
        }
        let entity = spawn_ring_tile(&mut self.world, &self.layout, self.assets.as_ref(), index);
        *slot = Some(entity);
        Some(entity)
    }

    /// Mount the paired rows. Newly mounted tiles start at the top of their
    /// drop. Returns how many were mounted.
    pub fn mount_flat(&mut self) -> usize {
        let mut mounted = 0;
        for (element, slot) in self.flat.iter_mut().enumerate() {
            if slot.is_none() {
                let (entity, _) =
                    spawn_flat(&mut self.world, &self.layout, self.assets.as_ref(), element);
                *slot = Some(entity);
                mounted += 1;
            }
        }
        mounted
    }

    /// Despawn the paired rows. Returns the entities that were removed.
    pub fn unmount_flat(&mut self) -> Vec<Entity> {
        let removed: Vec<Entity> = self.flat.iter_mut().filter_map(Option::take).collect();
        for &entity in &removed {
            // Already gone is fine.
            let _ = self.world.despawn(entity);
        }
        removed
    }

    /// Mounted ring tiles as (index, entity).
    pub fn ring(&self) -> impl Iterator<Item = (usize, Entity)> + '_ {
        mounted(&self.ring)
    }

    /// Mounted flat tiles as (element, entity).
    pub fn flat(&self) -> impl Iterator<Item = (usize, Entity)> + '_ {
        mounted(&self.flat)
    }

    pub fn flat_count(&self) -> usize {
        self.flat.iter().flatten().count()
    }

    /// Resolve a tile id to its entity, if mounted.
    pub fn entity(&self, id: TileId) -> Option<Entity> {
        match id {
            TileId::Ring(index) => self.ring.get(index).copied().flatten(),
            TileId::Flat { column, row } => {
                self.flat.get(flat_element(column, row)).copied().flatten()
            }
        }
    }
}

fn mounted(slots: &[Option<Entity>]) -> impl Iterator<Item = (usize, Entity)> + '_ {
    slots
        .iter()
        .enumerate()
        .filter_map(|(i, slot)| slot.map(|e| (i, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Row;
    use crate::tile::assets::CyclicAssets;

    fn set(count: usize) -> TileSet {
        TileSet::new(Arrangement::new(count, 1.4), Box::new(CyclicAssets::default()))
    }

    #[test]
    fn starts_unmounted() {
        let tiles = set(8);
        assert_eq!(tiles.ring().count(), 0);
        assert!(tiles.entity(TileId::Ring(0)).is_none());
    }

    #[test]
    fn ring_mounts_once() {
        let mut tiles = set(8);
        let first = tiles.mount_ring_tile(2);
        assert_eq!(tiles.mount_ring_tile(2), first);
        assert!(tiles.mount_ring_tile(8).is_none());

        tiles.mount_ring();
        assert_eq!(tiles.ring().count(), 8);
        assert_eq!(tiles.world().len(), 8);
    }

    #[test]
    fn flat_rows_mount_and_unmount() {
        let mut tiles = set(8);
        assert_eq!(tiles.mount_flat(), 16);
        assert_eq!(tiles.mount_flat(), 0);
        assert_eq!(tiles.flat_count(), 16);
        assert!(tiles.entity(TileId::Flat { column: 7, row: Row::Lower }).is_some());

        let removed = tiles.unmount_flat();
        assert_eq!(removed.len(), 16);
        assert_eq!(tiles.flat_count(), 0);
        assert!(!tiles.world().contains(removed[0]));
        assert!(tiles.entity(TileId::Flat { column: 0, row: Row::Upper }).is_none());
    }
}
