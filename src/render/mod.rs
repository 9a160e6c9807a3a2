pub mod camera;
pub mod instance;
pub mod mesh;
pub mod pipeline;

use std::sync::Arc;

use glam::Vec2;
use winit::window::Window;

use self::camera::Camera;
use self::instance::{Globals, TileInstance};
use self::pipeline::{create_depth_view, MeshBuffers, TilePipeline};
use crate::gallery::{FrameSnapshot, MeshDetail, Presenter};
use crate::topbar::{COVER_MAX_SCALE, LOGO_BOX};

/// Scene background. Fog only tints distant tiles, not the backdrop.
const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;

/// Cover radius in pixels; at full scale it reaches every corner.
pub fn cover_radius(cover_scale: f32, width: f32, height: f32) -> f32 {
    let diagonal = Vec2::new(width, height).length();
    (cover_scale / COVER_MAX_SCALE).clamp(0.0, 1.0) * diagonal
}

/// Core GPU state: device, queue, surface, pipeline.
pub struct GpuState {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub tile_pipeline: TilePipeline,
    pub camera: Camera,
    depth_view: wgpu::TextureView,
    // Reused every frame
    fine_buf: Vec<TileInstance>,
    coarse_buf: Vec<TileInstance>,
}

impl GpuState {
    /// Initialize wgpu and the tile pipeline.
    pub fn new(window: Arc<Window>) -> Result<Self, Box<dyn std::error::Error>> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        log::info!(
            "GPU adapter: {:?} ({:?})",
            adapter.get_info().name,
            adapter.get_info().backend
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("carousel_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            ..Default::default()
        }))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .ok_or("surface reports no texture formats")?;

        // Prefer Mailbox (no CPU-blocking on missed deadlines) with Fifo fallback.
        let present_mode = if surface_caps.present_modes.contains(&wgpu::PresentMode::Mailbox) {
            log::info!("Using PresentMode::Mailbox");
            wgpu::PresentMode::Mailbox
        } else {
            log::info!("Mailbox unavailable, falling back to PresentMode::Fifo");
            wgpu::PresentMode::Fifo
        };

        log::info!("Surface: format={:?}", format);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: wgpu::CompositeAlphaMode::Auto,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let tile_pipeline = TilePipeline::new(&device, format);
        let depth_view = create_depth_view(&device, surface_config.width, surface_config.height);

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            tile_pipeline,
            camera: Camera::default(),
            depth_view,
            fine_buf: Vec::new(),
            coarse_buf: Vec::new(),
        })
    }

    /// Resize the surface and depth target.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.depth_view = create_depth_view(&self.device, width, height);
    }

    pub fn screen_size(&self) -> Vec2 {
        Vec2::new(self.surface_config.width as f32, self.surface_config.height as f32)
    }

    fn upload(&mut self, frame: &FrameSnapshot) {
        self.fine_buf.clear();
        self.coarse_buf.clear();
        for tile in frame.tiles {
            let instance = TileInstance::from_snapshot(tile);
            match tile.detail {
                MeshDetail::Fine => self.fine_buf.push(instance),
                MeshDetail::Coarse => self.coarse_buf.push(instance),
            }
        }
        self.tile_pipeline
            .update_instances(&self.queue, &self.fine_buf, &self.coarse_buf);

        let screen = self.screen_size();
        let logo = LOGO_BOX * 0.5;
        let globals = Globals {
            view_proj: self.camera.view_proj(screen.x / screen.y).to_cols_array_2d(),
            eye: self.camera.eye.extend(1.0).to_array(),
            screen: [screen.x, screen.y, 0.0, 0.0],
            cover: [logo, logo, cover_radius(frame.cover.unwrap_or(0.0), screen.x, screen.y), 0.0],
        };
        self.tile_pipeline.update_globals(&self.queue, &globals);
    }

    /// Acquire the next surface texture.
    /// Returns None if the surface is lost/outdated (caller should skip this frame).
    fn acquire(&self) -> Option<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(output) => Some(output),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.surface_config);
                None
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory");
                None
            }
            Err(e) => {
                log::warn!("Surface error: {e:?}");
                None
            }
        }
    }

    fn draw(&self, view: &wgpu::TextureView, cover_visible: bool) -> wgpu::CommandBuffer {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tile_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let p = &self.tile_pipeline;
            render_pass.set_bind_group(0, &p.globals_bind_group, &[]);
            render_pass.set_pipeline(&p.pipeline);
            render_pass.set_vertex_buffer(1, p.instance_buffer.slice(..));
            let batches: [(&MeshBuffers, std::ops::Range<u32>); 2] = [
                (&p.fine, 0..p.num_fine),
                (&p.coarse, p.num_fine..p.num_fine + p.num_coarse),
            ];
            for (mesh, instances) in batches {
                if instances.is_empty() {
                    continue;
                }
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..mesh.num_indices, 0, instances);
            }

            if cover_visible {
                render_pass.set_pipeline(&p.cover_pipeline);
                render_pass.draw(0..3, 0..1); // fullscreen triangle
            }
        }

        encoder.finish()
    }
}

impl Presenter for GpuState {
    fn present(&mut self, frame: &FrameSnapshot) {
        self.upload(frame);
        let Some(output) = self.acquire() else {
            return;
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let commands = self.draw(&view, frame.cover.is_some());
        self.queue.submit(std::iter::once(commands));
        output.present();
    }
}
