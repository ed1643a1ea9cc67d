//! Forward Renderer
//!
//! A deliberately small renderer: one color pass with a depth buffer,
//! drawing lit (optionally skinned) meshes first and sprite point clouds
//! after them.
//!
//! - [`WgpuContext`]: device, queue, surface and depth target
//! - [`GpuResources`](resources::GpuResources): uploaded geometry and textures
//! - [`MeshPass`](mesh_pass::MeshPass) / [`PointsPass`](points_pass::PointsPass)
//!
//! The [`Renderer`] is created without a GPU and initialised once a window
//! exists, so the application can construct it before the event loop runs.

pub mod context;
pub mod mesh_pass;
pub mod points_pass;
pub mod resources;
pub mod settings;
pub mod uniforms;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use wgpu::util::DeviceExt;

pub use context::WgpuContext;
pub use settings::RendererSettings;

use crate::assets::AssetServer;
use crate::errors::Result;
use crate::scene::Scene;

use self::mesh_pass::MeshPass;
use self::points_pass::PointsPass;
use self::resources::GpuResources;
use self::uniforms::GlobalUniforms;

/// Everything that exists only once a GPU device does.
struct RendererState {
    context: WgpuContext,
    resources: GpuResources,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    mesh_pass: MeshPass,
    points_pass: PointsPass,
}

pub struct Renderer {
    settings: RendererSettings,
    state: Option<RendererState>,
    frame_index: u64,
}

impl Renderer {
    #[must_use]
    pub fn new(settings: RendererSettings) -> Self {
        Self {
            settings,
            state: None,
            frame_index: 0,
        }
    }

    /// Creates the GPU context for `window` and builds the pipelines.
    pub async fn init<W>(&mut self, window: W, width: u32, height: u32) -> Result<()>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let context = WgpuContext::new(window, &self.settings, width, height).await?;
        let device = &context.device;

        let resources = GpuResources::new(device, &context.queue);

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let globals = GlobalUniforms::from_scene(&Scene::new(), width, height);
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals Uniforms"),
            contents: bytemuck::bytes_of(&globals),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let mesh_pass = MeshPass::new(
            device,
            &globals_layout,
            &resources.texture_layout,
            context.view_format,
            context.depth_format,
        );
        let points_pass = PointsPass::new(
            device,
            &globals_layout,
            &resources.texture_layout,
            context.view_format,
            context.depth_format,
        );

        log::info!("Renderer initialized ({width}x{height}, {:?})", context.view_format);

        self.state = Some(RendererState {
            context,
            resources,
            globals_buffer,
            globals_bind_group,
            mesh_pass,
            points_pass,
        });
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    #[must_use]
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    #[must_use]
    pub fn size(&self) -> Option<(u32, u32)> {
        self.state.as_ref().map(|s| s.context.size())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(state) = &mut self.state {
            state.context.resize(width, height);
        }
    }

    /// Draws `scene` from its active camera. World matrices, camera matrices
    /// and joint palettes must already be up to date.
    pub fn render(&mut self, scene: &Scene, assets: &AssetServer) {
        let Some(state) = &mut self.state else {
            return;
        };
        self.frame_index += 1;
        let frame = self.frame_index;

        let output = match state.context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = state.context.size();
                state.context.resize(width, height);
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::debug!("Surface timeout, skipping frame");
                return;
            }
            Err(e) => {
                log::error!("Render error: {e:?}");
                return;
            }
        };

        let view = output.texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(state.context.view_format),
            ..Default::default()
        });

        let (width, height) = state.context.size();
        let globals = GlobalUniforms::from_scene(scene, width, height);
        state
            .context
            .queue
            .write_buffer(&state.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let device = &state.context.device;
        let queue = &state.context.queue;
        let mesh_draws = state
            .mesh_pass
            .prepare(device, queue, scene, assets, &mut state.resources, frame);
        let points_draws = state
            .points_pass
            .prepare(device, queue, scene, assets, &mut state.resources, frame);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(state.context.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &state.context.depth_texture_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            state
                .mesh_pass
                .draw(&mut pass, &state.globals_bind_group, &state.resources, &mesh_draws);
            state
                .points_pass
                .draw(&mut pass, &state.globals_bind_group, &state.resources, &points_draws);
        }

        queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if frame.is_multiple_of(600) {
            state.resources.prune(assets);
        }
    }
}
