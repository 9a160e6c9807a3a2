use std::collections::HashSet;

use glam::Vec3;

use crate::anim::{Ease, Timing, TweenManager};
use crate::ecs::components::Transform;
use crate::layout::{Arrangement, ArrangementKind, Row};
use crate::rig::Rig;
use crate::tile::{flat_slot, TileSet};
use crate::topbar::{COVER_DURATION, COVER_HOLD};

/// Ring tiles sliding into the strip.
const EXPAND_POSITION: Timing = Timing::new(1.0, Ease::Power2InOut);
const EXPAND_ROTATION: Timing = Timing::new(1.0, Ease::CircOut);
/// Flat tiles dropping into their rows.
const DROP_POSITION: Timing = Timing::new(1.0, Ease::Power1Out);
/// Extra start delay per column so columns land in order.
const DROP_STAGGER: f32 = 0.025;
/// Ring tiles returning to the circle.
const COLLAPSE_POSITION: Timing = Timing::new(1.2, Ease::Power2InOut);
const COLLAPSE_ROTATION: Timing = Timing::new(1.2, Ease::CircOut);
/// How long the cover masks the collapse before the carousel idles again.
const COLLAPSE_SETTLE: f32 = COVER_DURATION + COVER_HOLD;

/// Transition state of the whole gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Idle on the ring; the rig spins.
    Collapsed,
    Expanding,
    /// Idle in columns; nothing moves but hover damping.
    Expanded,
    Collapsing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Position,
    Rotation,
}

/// Tween address: which entity, which part of its transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TweenKey {
    pub entity: hecs::Entity,
    pub channel: Channel,
}

/// Where one tile is headed and how it gets there.
#[derive(Debug, Clone, Copy)]
struct TransitionTarget {
    position: Vec3,
    position_timing: Timing,
    /// None leaves rotation alone.
    rotation: Option<(Vec3, Timing)>,
}

/// Drives tiles between the ring and the columns whenever the expanded flag
/// flips.
///
/// Every flip retargets all tiles from wherever they currently are, so a
/// flip mid-transition never snaps anything back to an old start point.
/// Tiles mounted after a flip are picked up on the next tick and join the
/// transition in progress.
pub struct Orchestrator {
    phase: Phase,
    tweens: TweenManager<TweenKey>,
    rig: Rig,
    /// Seconds since the current collapse began.
    collapse_clock: f32,
    /// Tiles already sent toward the current arrangement.
    covered: HashSet<hecs::Entity>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            phase: Phase::Collapsed,
            tweens: TweenManager::new(),
            rig: Rig::new(),
            collapse_clock: 0.0,
            covered: HashSet::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rig(&self) -> &Rig {
        &self.rig
    }

    #[cfg(test)]
    pub fn tweens_in_flight(&self) -> usize {
        self.tweens.len()
    }

    /// React to a flip of the expanded flag.
    pub fn on_toggle(&mut self, expanded: bool, tiles: &mut TileSet) {
        match (expanded, self.phase) {
            (true, Phase::Expanding | Phase::Expanded) => {}
            (false, Phase::Collapsing | Phase::Collapsed) => {}
            (true, _) => self.expand(tiles),
            (false, _) => self.collapse(tiles),
        }
    }

    fn expand(&mut self, tiles: &mut TileSet) {
        log::info!("Expanding gallery from {:?}", self.phase);
        if self.phase == Phase::Collapsing {
            log::debug!("Collapse interrupted, retargeting {} tweens", self.tweens.len());
        }
        self.phase = Phase::Expanding;
        self.rig.set_idle(false);

        let mounted = tiles.mount_flat();
        log::debug!("Mounted {mounted} flat tiles ({} total)", tiles.flat_count());

        self.covered.clear();
        self.adopt(tiles);
    }

    fn collapse(&mut self, tiles: &mut TileSet) {
        log::info!("Collapsing gallery from {:?}", self.phase);
        self.phase = Phase::Collapsing;
        self.collapse_clock = 0.0;
        self.rig.set_idle(false);

        for entity in tiles.unmount_flat() {
            self.tweens.cancel_where(|key| key.entity == entity);
        }

        self.covered.clear();
        self.adopt(tiles);
    }

    /// Retarget every mounted tile not yet covered since the last flip
    /// toward the arrangement of the current phase. Returns how many were
    /// retargeted.
    fn adopt(&mut self, tiles: &TileSet) -> usize {
        let expanded = matches!(self.phase, Phase::Expanding | Phase::Expanded);
        let layout = tiles.layout();
        let mut adopted = 0;

        for (index, entity) in tiles.ring() {
            if !self.covered.contains(&entity) {
                self.retarget(tiles.world(), entity, ring_target(layout, index, expanded));
                adopted += 1;
            }
        }
        if expanded {
            for (element, entity) in tiles.flat() {
                if !self.covered.contains(&entity) {
                    self.retarget(tiles.world(), entity, drop_target(layout, element));
                    adopted += 1;
                }
            }
        }
        adopted
    }

    /// Restart the tile's tweens toward `target` from its current transform.
    /// A tile without a transform is skipped.
    fn retarget(&mut self, world: &hecs::World, entity: hecs::Entity, target: TransitionTarget) {
        self.covered.insert(entity);
        let Ok(current) = world.get::<&Transform>(entity).map(|t| *t) else {
            log::trace!("Skipping retarget of unmounted {:?}", entity);
            return;
        };
        let key = |channel| TweenKey { entity, channel };

        self.tweens.start(
            key(Channel::Position),
            current.position,
            target.position,
            target.position_timing,
        );
        if let Some((rotation, timing)) = target.rotation {
            self.tweens
                .start(key(Channel::Rotation), current.rotation, rotation, timing);
        }
    }

    /// Advance tweens, idle motion and the phase machine by one frame.
    pub fn tick(&mut self, dt: f32, tiles: &mut TileSet) {
        if self.phase != Phase::Collapsed {
            let late = self.adopt(tiles);
            if late > 0 {
                log::debug!("{late} late-mounted tiles joined the {:?} transition", self.phase);
                if self.phase == Phase::Expanded {
                    self.phase = Phase::Expanding;
                }
            }
        }

        let world = tiles.world_mut();
        self.tweens.advance(dt, |key, value| {
            let Ok(mut transform) = world.get::<&mut Transform>(key.entity) else {
                return false;
            };
            match key.channel {
                Channel::Position => transform.position = value,
                Channel::Rotation => transform.rotation = value,
            }
            true
        });

        match self.phase {
            Phase::Collapsed => self.rig.advance(dt),
            Phase::Expanding => {
                if self.tweens.is_idle() {
                    log::info!("Gallery expanded");
                    self.phase = Phase::Expanded;
                }
            }
            Phase::Expanded => {}
            Phase::Collapsing => {
                self.collapse_clock += dt;
                if self.collapse_clock >= COLLAPSE_SETTLE && self.tweens.is_idle() {
                    log::info!("Gallery collapsed, resuming idle spin");
                    self.phase = Phase::Collapsed;
                    self.rig.set_idle(true);
                }
            }
        }
    }
}

/// Ring tile `index` headed for the strip (expanded) or home on the ring.
fn ring_target(layout: &Arrangement, index: usize, expanded: bool) -> TransitionTarget {
    let (kind, position_timing, rotation_timing) = if expanded {
        (ArrangementKind::FlatPaired(Row::Strip), EXPAND_POSITION, EXPAND_ROTATION)
    } else {
        (ArrangementKind::Circular, COLLAPSE_POSITION, COLLAPSE_ROTATION)
    };
    let placement = layout.target(index, kind);
    TransitionTarget {
        position: placement.position,
        position_timing,
        rotation: Some((placement.rotation, rotation_timing)),
    }
}

/// Flat element dropping into its row, later columns starting later.
fn drop_target(layout: &Arrangement, element: usize) -> TransitionTarget {
    let (column, row) = flat_slot(element);
    let rest = layout.target(column, ArrangementKind::FlatPaired(row));
    TransitionTarget {
        position: rest.position,
        position_timing: DROP_POSITION.delayed(column as f32 * DROP_STAGGER),
        rotation: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::assets::CyclicAssets;

    const DT: f32 = 1.0 / 60.0;

    fn mounted(count: usize) -> TileSet {
        let mut tiles = TileSet::new(Arrangement::new(count, 1.4), Box::new(CyclicAssets::default()));
        tiles.mount_ring();
        tiles
    }

    fn run(orch: &mut Orchestrator, tiles: &mut TileSet, seconds: f32) {
        for _ in 0..(seconds / DT).ceil() as usize {
            orch.tick(DT, tiles);
        }
    }

    fn transform(tiles: &TileSet, entity: hecs::Entity) -> Transform {
        *tiles.world().get::<&Transform>(entity).unwrap()
    }

    #[test]
    fn expand_reaches_strip_and_rows() {
        let mut tiles = mounted(8);
        let mut orch = Orchestrator::new();
        orch.on_toggle(true, &mut tiles);
        assert_eq!(orch.phase(), Phase::Expanding);
        assert_eq!(tiles.flat_count(), 16);

        run(&mut orch, &mut tiles, 1.25);
        assert_eq!(orch.phase(), Phase::Expanded);

        let layout = *tiles.layout();
        for (i, e) in tiles.ring() {
            let strip = layout.target(i, ArrangementKind::FlatPaired(Row::Strip));
            assert_eq!(transform(&tiles, e).position, strip.position);
            assert_eq!(transform(&tiles, e).rotation, Vec3::ZERO);
        }
        for (element, e) in tiles.flat() {
            let (column, row) = flat_slot(element);
            let rest = layout.target(column, ArrangementKind::FlatPaired(row));
            assert_eq!(transform(&tiles, e).position, rest.position);
        }
    }

    #[test]
    fn repeated_toggle_does_not_restart() {
        let mut tiles = mounted(4);
        let mut orch = Orchestrator::new();
        orch.on_toggle(true, &mut tiles);
        run(&mut orch, &mut tiles, 0.5);
        let e = tiles.ring().next().unwrap().1;
        let before = transform(&tiles, e);

        orch.on_toggle(true, &mut tiles);
        orch.tick(0.0, &mut tiles);
        assert_eq!(transform(&tiles, e), before);
    }

    #[test]
    fn collapse_waits_for_cover() {
        let mut tiles = mounted(8);
        let mut orch = Orchestrator::new();
        orch.on_toggle(true, &mut tiles);
        run(&mut orch, &mut tiles, 1.5);
        orch.on_toggle(false, &mut tiles);
        assert_eq!(tiles.flat_count(), 0);

        run(&mut orch, &mut tiles, 2.0);
        assert_eq!(orch.phase(), Phase::Collapsing, "tweens done but cover still closing");
        assert_eq!(orch.tweens_in_flight(), 0);

        run(&mut orch, &mut tiles, 4.2);
        assert_eq!(orch.phase(), Phase::Collapsed);
        assert!(orch.rig().is_idle());
    }

    #[test]
    fn partially_mounted_ring_is_tolerated() {
        let mut tiles = TileSet::new(Arrangement::new(8, 1.4), Box::new(CyclicAssets::default()));
        tiles.mount_ring_tile(0);
        let mut orch = Orchestrator::new();
        orch.on_toggle(true, &mut tiles);
        run(&mut orch, &mut tiles, 0.3);

        // Late joiner mid-flight starts from the ring and follows the others.
        let late = tiles.mount_ring_tile(5).unwrap();
        run(&mut orch, &mut tiles, 1.2);
        assert_eq!(orch.phase(), Phase::Expanded);
        let strip = tiles.layout().target(5, ArrangementKind::FlatPaired(Row::Strip));
        assert_eq!(transform(&tiles, late).position, strip.position);
        assert_eq!(transform(&tiles, late).rotation, Vec3::ZERO);
    }

    #[test]
    fn late_mount_after_expanded_reopens_transition() {
        let mut tiles = TileSet::new(Arrangement::new(8, 1.4), Box::new(CyclicAssets::default()));
        tiles.mount_ring_tile(0);
        let mut orch = Orchestrator::new();
        orch.on_toggle(true, &mut tiles);
        run(&mut orch, &mut tiles, 1.2);
        assert_eq!(orch.phase(), Phase::Expanded);

        let late = tiles.mount_ring_tile(3).unwrap();
        orch.tick(DT, &mut tiles);
        assert_eq!(orch.phase(), Phase::Expanding);

        run(&mut orch, &mut tiles, 1.1);
        assert_eq!(orch.phase(), Phase::Expanded);
        let strip = tiles.layout().target(3, ArrangementKind::FlatPaired(Row::Strip));
        assert_eq!(transform(&tiles, late).position, strip.position);
    }

    #[test]
    fn expand_interrupts_collapse_without_jumps() {
        let mut tiles = mounted(8);
        let mut orch = Orchestrator::new();
        orch.on_toggle(true, &mut tiles);
        run(&mut orch, &mut tiles, 1.5);
        orch.on_toggle(false, &mut tiles);

        let ring: Vec<_> = tiles.ring().collect();
        let positions = |tiles: &TileSet| -> Vec<Vec3> {
            ring.iter().map(|&(_, e)| transform(tiles, e).position).collect()
        };
        let max_step = |a: &[Vec3], b: &[Vec3]| {
            a.iter().zip(b).map(|(p, q)| p.distance(*q)).fold(0.0f32, f32::max)
        };

        let mut last = positions(&tiles);
        let mut last_step = 0.0;
        for _ in 0..(0.5 / DT).ceil() as usize {
            orch.tick(DT, &mut tiles);
            let now = positions(&tiles);
            last_step = max_step(&last, &now);
            last = now;
        }
        assert!(last_step > 0.0, "collapse should be moving");

        orch.on_toggle(true, &mut tiles);
        assert_eq!(orch.phase(), Phase::Expanding);
        assert_eq!(tiles.flat_count(), 16);
        orch.tick(DT, &mut tiles);
        let flip_step = max_step(&last, &positions(&tiles));
        assert!(
            flip_step <= last_step + 1e-6,
            "flip step {flip_step} exceeds previous step {last_step}"
        );

        run(&mut orch, &mut tiles, 1.3);
        assert_eq!(orch.phase(), Phase::Expanded);
        assert_eq!(tiles.flat_count(), 16);
        let layout = *tiles.layout();
        for &(i, e) in &ring {
            let strip = layout.target(i, ArrangementKind::FlatPaired(Row::Strip));
            assert_eq!(transform(&tiles, e).position, strip.position);
        }
    }

    #[test]
    fn despawned_target_drops_its_tween() {
        let mut tiles = mounted(2);
        let mut orch = Orchestrator::new();
        orch.on_toggle(true, &mut tiles);
        let e = tiles.ring().next().unwrap().1;
        tiles.world_mut().despawn(e).unwrap();
        let before = orch.tweens_in_flight();
        orch.tick(DT, &mut tiles);
        assert_eq!(orch.tweens_in_flight(), before - 2);
    }

    #[test]
    fn idle_spin_runs_only_collapsed() {
        let mut tiles = mounted(8);
        let mut orch = Orchestrator::new();
        run(&mut orch, &mut tiles, 1.0);
        assert!((orch.rig().spin() - 0.5).abs() < 0.01);

        orch.on_toggle(true, &mut tiles);
        assert_eq!(orch.rig().spin(), 0.0);
        run(&mut orch, &mut tiles, 1.0);
        assert_eq!(orch.rig().spin(), 0.0);
    }
}
