use crate::ecs::components::{Hovered, TileId, Visual};

/// Scale: hovered / resting / smooth time.
const SCALE: (f32, f32, f32) = (1.15, 1.0, 0.1);
const BLUR_RADIUS: (f32, f32, f32) = (0.25, 0.1, 0.2);
const ZOOM: (f32, f32, f32) = (1.0, 1.5, 0.2);
/// Flat tiles only; settles three times faster than the others.
const DEPTH_OFFSET: (f32, f32, f32) = (0.0, -1.5, 0.2 / 3.0);

/// Damp every tile's visual parameters toward the targets implied by its
/// hover flag. Independent of arrangement and transition phase.
pub fn damp(world: &mut hecs::World, dt: f32) {
    for (_, (id, hovered, visual)) in world.query_mut::<(&TileId, &Hovered, &mut Visual)>() {
        damp_one(visual, hovered.0, id.is_flat(), dt);
    }
}

fn damp_one(visual: &mut Visual, hovered: bool, flat: bool, dt: f32) {
    let pick = |(on, off, _): (f32, f32, f32)| if hovered { on } else { off };

    visual.scale.damp(pick(SCALE), SCALE.2, dt);
    visual.blur_radius.damp(pick(BLUR_RADIUS), BLUR_RADIUS.2, dt);
    visual.zoom.damp(pick(ZOOM), ZOOM.2, dt);
    if flat {
        visual.depth_offset.damp(pick(DEPTH_OFFSET), DEPTH_OFFSET.2, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Row;

    const DT: f32 = 1.0 / 60.0;

    fn settle(world: &mut hecs::World, seconds: f32) {
        for _ in 0..(seconds / DT).ceil() as usize {
            damp(world, DT);
        }
    }

    #[test]
    fn hovered_tile_grows() {
        let mut world = hecs::World::new();
        let e = world.spawn((TileId::Ring(0), Hovered(true), Visual::default()));
        settle(&mut world, 5.0 * 0.1);

        let v = world.get::<&Visual>(e).unwrap();
        assert!((v.scale.value - 1.15).abs() < 1.15 * 0.01);
    }

    #[test]
    fn resting_tile_settles_on_resting_look() {
        let mut world = hecs::World::new();
        let e = world.spawn((TileId::Ring(1), Hovered(false), Visual::default()));
        settle(&mut world, 3.0);

        let v = world.get::<&Visual>(e).unwrap();
        assert_eq!(v.scale.value, 1.0);
        assert_eq!(v.blur_radius.value, 0.1);
        assert_eq!(v.zoom.value, 1.5);
        assert_eq!(v.depth_offset.value, 0.0, "ring tiles keep no depth offset");
    }

    #[test]
    fn flat_tiles_sink_back_unless_hovered() {
        let mut world = hecs::World::new();
        let flat = TileId::Flat { column: 2, row: Row::Lower };
        let e = world.spawn((flat, Hovered(false), Visual::default()));
        settle(&mut world, 1.0);
        assert_eq!(world.get::<&Visual>(e).unwrap().depth_offset.value, -1.5);

        world.get::<&mut Hovered>(e).unwrap().0 = true;
        settle(&mut world, 1.0);
        assert_eq!(world.get::<&Visual>(e).unwrap().depth_offset.value, 0.0);
    }

    #[test]
    fn depth_settles_faster_than_zoom() {
        let mut world = hecs::World::new();
        let flat = TileId::Flat { column: 0, row: Row::Upper };
        let e = world.spawn((flat, Hovered(false), Visual::default()));
        settle(&mut world, 0.15);

        let v = world.get::<&Visual>(e).unwrap();
        let depth_progress = v.depth_offset.value / -1.5;
        let zoom_progress = (v.zoom.value - 1.0) / 0.5;
        assert!(depth_progress > zoom_progress);
    }
}
