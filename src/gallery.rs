use glam::{EulerRot, Mat4, Vec3};

use crate::config::GalleryConfig;
use crate::ecs::components::{Hovered, TileId, Transform, Visual};
use crate::ecs::systems::visual;
use crate::error::GalleryError;
use crate::layout::Arrangement;
use crate::orchestrator::{Orchestrator, Phase};
use crate::state::{InteractionState, Subscription};
use crate::tile::assets::{AssetProvider, ImageRef};
use crate::tile::TileSet;

/// Pointer input, already hit-tested by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryEvent {
    PointerEnter(TileId),
    PointerLeave(TileId),
    Activate(TileId),
}

/// Mesh subdivision the renderer should use for a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshDetail {
    /// 20x20 bent plane.
    Fine,
    /// Single quad.
    Coarse,
}

/// Presented transform of one tile. Position includes the depth offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileTransform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
}

impl TileTransform {
    /// Translate, then Euler XYZ rotate, then uniform scale.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
            * Mat4::from_scale(Vec3::splat(self.scale))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualParams {
    pub blur_radius: f32,
    pub zoom: f32,
}

/// Everything the renderer needs to draw one tile this frame.
#[derive(Debug, Clone, Copy)]
pub struct TileSnapshot {
    pub id: TileId,
    pub image: ImageRef,
    pub transform: TileTransform,
    pub visual: VisualParams,
    pub detail: MeshDetail,
    /// Frame `transform` is expressed in: the ring group pose for ring
    /// tiles, identity for flat tiles.
    pub parent: Mat4,
}

impl TileSnapshot {
    /// Tile to world.
    pub fn world(&self) -> Mat4 {
        self.parent * self.transform.matrix()
    }
}

/// One frame handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct FrameSnapshot<'a> {
    pub tiles: &'a [TileSnapshot],
    /// Top-bar cover scale, None while the cover is hidden.
    pub cover: Option<f32>,
}

/// Rendering collaborator: paints a frame.
pub trait Presenter {
    fn present(&mut self, frame: &FrameSnapshot);
}

/// Composes the ring and the paired rows, routes pointer input, and runs the
/// per-frame update.
pub struct Gallery {
    config: GalleryConfig,
    interaction: InteractionState,
    changes: Subscription,
    tiles: TileSet,
    orchestrator: Orchestrator,
}

impl Gallery {
    pub fn new(config: GalleryConfig, assets: Box<dyn AssetProvider>) -> Result<Self, GalleryError> {
        config.validate()?;

        let mut interaction = InteractionState::new();
        let changes = interaction.subscribe();
        let mut tiles = TileSet::new(Arrangement::new(config.count, config.radius), assets);
        tiles.mount_ring();
        log::info!(
            "Gallery ready: {} ring tiles, radius {}",
            config.count,
            config.radius
        );

        Ok(Self {
            config,
            interaction,
            changes,
            tiles,
            orchestrator: Orchestrator::new(),
        })
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    /// For collaborators that flip the flag themselves (the top bar).
    /// The flip is picked up at the start of the next tick.
    pub fn interaction_mut(&mut self) -> &mut InteractionState {
        &mut self.interaction
    }

    pub fn phase(&self) -> Phase {
        self.orchestrator.phase()
    }

    /// Spin angle of the idle ring.
    #[cfg(test)]
    pub fn spin(&self) -> f32 {
        self.orchestrator.rig().spin()
    }

    /// Apply one pointer event. Events for unmounted tiles are ignored.
    pub fn handle(&mut self, event: GalleryEvent) {
        let id = match event {
            GalleryEvent::PointerEnter(id)
            | GalleryEvent::PointerLeave(id)
            | GalleryEvent::Activate(id) => id,
        };
        let Some(entity) = self.tiles.entity(id) else {
            log::debug!("Ignoring {:?} for unmounted tile", event);
            return;
        };

        match event {
            GalleryEvent::PointerEnter(_) | GalleryEvent::PointerLeave(_) => {
                let hovered = matches!(event, GalleryEvent::PointerEnter(_));
                if let Ok(mut flag) = self.tiles.world().get::<&mut Hovered>(entity) {
                    flag.0 = hovered;
                }
            }
            GalleryEvent::Activate(_) => {
                log::debug!("Tile {:?} activated", id);
                self.interaction.set(true);
            }
        }
        self.pump();
    }

    /// Deliver pending flag changes to the orchestrator.
    fn pump(&mut self) {
        while let Ok(expanded) = self.changes.changes.try_recv() {
            self.orchestrator.on_toggle(expanded, &mut self.tiles);
        }
    }

    /// Advance one frame: hover damping, then tweens and phase.
    pub fn tick(&mut self, dt: f32) {
        self.pump();
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        visual::damp(self.tiles.world_mut(), dt);
        self.orchestrator.tick(dt, &mut self.tiles);
    }

    /// Fill `out` with one entry per mounted tile, ring first.
    pub fn snapshot(&self, out: &mut Vec<TileSnapshot>) {
        out.clear();
        let expanded = self.interaction.get();
        let rig = self.orchestrator.rig().matrix();
        let world = self.tiles.world();

        let entities = self.tiles.ring().chain(self.tiles.flat()).map(|(_, e)| e);
        for entity in entities {
            let Ok(mut query) =
                world.query_one::<(&TileId, &ImageRef, &Transform, &Visual)>(entity)
            else {
                continue;
            };
            let Some((&id, &image, transform, visual)) = query.get() else {
                continue;
            };

            let (parent, detail) = match id {
                TileId::Ring(_) if !expanded => (rig, MeshDetail::Fine),
                TileId::Ring(_) => (rig, MeshDetail::Coarse),
                TileId::Flat { .. } => (Mat4::IDENTITY, MeshDetail::Coarse),
            };

            out.push(TileSnapshot {
                id,
                image,
                transform: TileTransform {
                    position: transform.position + Vec3::Z * visual.depth_offset.value,
                    rotation: transform.rotation,
                    scale: visual.scale.value,
                },
                visual: VisualParams {
                    blur_radius: visual.blur_radius.value,
                    zoom: visual.zoom.value,
                },
                detail,
                parent,
            });
        }
    }
}
