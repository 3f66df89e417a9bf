use crate::render::{
    cell_offset, cell_values, cell_word, create_render_bind_group, create_render_bind_group_layout,
    prefers_full_upload, RenderParams, CELL_BYTES,
};
use crate::ui::{self, SetupMenu, UiAction};
use delta_life::{ChangeSet, ControlEvent, LifeError, Response, RunState, Session, SimConfig};
use std::sync::Arc;
use std::time::Instant;
use winit::{dpi::PhysicalSize, window::Window};

// GUI Imports
use egui::Context as EguiContext;
use egui_wgpu::Renderer as EguiWgpuRenderer;
use egui_winit::State as EguiWinitState;

/// Window size while the setup menu is shown.
pub const MENU_SIZE: PhysicalSize<u32> = PhysicalSize::new(800, 600);

const BACKGROUND: wgpu::Color = wgpu::Color {
    r: 10.0 / 255.0,
    g: 10.0 / 255.0,
    b: 40.0 / 255.0,
    a: 1.0,
};

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable GPU adapter found")]
    NoAdapter,
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error(transparent)]
    Life(#[from] LifeError),
}

/// A running session and the GPU copy of its grid.
pub struct World {
    pub session: Session,
    pub cell_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl World {
    /// Write every cell. Used after seeding and restarts.
    fn upload_all(&self, queue: &wgpu::Queue) {
        if let Some(grid) = self.session.grid() {
            queue.write_buffer(&self.cell_buffer, 0, bytemuck::cast_slice(&cell_values(grid)));
        }
    }

    /// Write only the cells that changed in the last generation.
    fn upload_changes(&self, queue: &wgpu::Queue, changes: &ChangeSet) {
        let Some(grid) = self.session.grid() else {
            return;
        };
        if prefers_full_upload(changes, grid) {
            self.upload_all(queue);
            return;
        }
        for change in changes {
            let offset = cell_offset(change.row, change.col, grid.width());
            queue.write_buffer(&self.cell_buffer, offset, bytemuck::bytes_of(&cell_word(change.value)));
        }
    }
}

pub enum Screen {
    Setup(SetupMenu),
    Simulation(World),
}

pub struct State {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    pub window: Arc<Window>,

    pub render_pipeline: wgpu::RenderPipeline,
    pub render_bind_group_layout: wgpu::BindGroupLayout,
    pub render_param_buffer: wgpu::Buffer,

    pub screen: Screen,
    pub quit_requested: bool,

    // GUI state
    pub egui_ctx: EguiContext,
    pub egui_winit_state: EguiWinitState,
    pub egui_renderer: EguiWgpuRenderer,
}

impl State {
    pub async fn new(
        window: Arc<Window>,
        menu: SetupMenu,
        initial: Option<SimConfig>,
    ) -> Result<Self, StateError> {
        let size = window.inner_size();

        log::info!("Initializing wgpu...");

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .ok_or(StateError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // egui draws in gamma space, so prefer a non-sRGB target.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(StateError::NoSurfaceFormat)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let render_param_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Render Parameters"),
            size: std::mem::size_of::<RenderParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let render_shader_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Render Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../render.wgsl").into()),
        });

        let render_bind_group_layout = create_render_bind_group_layout(&device);
        let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Render Pipeline Layout"),
            bind_group_layouts: &[&render_bind_group_layout],
            push_constant_ranges: &[],
        });
        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &render_shader_module,
                entry_point: "vs_main",
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &render_shader_module,
                entry_point: "fs_main",
                targets: &[Some(config.format.into())],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        log::info!("Initializing egui...");
        let egui_ctx = EguiContext::default();
        let egui_winit_state =
            EguiWinitState::new(egui_ctx.clone(), egui_ctx.viewport_id(), &*window, None, None);
        let egui_renderer = EguiWgpuRenderer::new(&device, config.format, None, 1);
        log::info!("wgpu initialized successfully.");

        let mut state = Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            render_pipeline,
            render_bind_group_layout,
            render_param_buffer,
            screen: Screen::Setup(menu),
            quit_requested: false,
            egui_ctx,
            egui_winit_state,
            egui_renderer,
        };

        if let Some(config) = initial {
            state.start_session(config)?;
        }
        Ok(state)
    }

    pub fn has_session(&self) -> bool {
        matches!(self.screen, Screen::Simulation(_))
    }

    /// Seed a new world, allocate its cell buffer and size the window to it.
    pub fn start_session(&mut self, config: SimConfig) -> Result<(), LifeError> {
        let session = Session::new(config)?;
        let (width, height) = config.world_size();

        let cell_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cell Buffer"),
            size: (width * height) as u64 * CELL_BYTES,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.queue.write_buffer(
            &self.render_param_buffer,
            0,
            bytemuck::bytes_of(&RenderParams::new(width, height, config.cell_size)),
        );
        let bind_group = create_render_bind_group(
            &self.device,
            &self.render_bind_group_layout,
            &self.render_param_buffer,
            &cell_buffer,
        );

        let world = World {
            session,
            cell_buffer,
            bind_group,
        };
        world.upload_all(&self.queue);
        self.screen = Screen::Simulation(world);

        let pixels = PhysicalSize::new(width as u32 * config.cell_size, height as u32 * config.cell_size);
        if let Some(new_size) = self.window.request_inner_size(pixels) {
            self.resize(new_size);
        }
        self.window.request_redraw();
        Ok(())
    }

    /// Forward a control event to the session, if there is one.
    pub fn apply_control(&mut self, event: ControlEvent) {
        let Screen::Simulation(world) = &mut self.screen else {
            return;
        };
        match world.session.handle(event) {
            Ok(Response::Restarted) => world.upload_all(&self.queue),
            Ok(Response::StateChanged { to: RunState::Stopped, .. }) => self.quit_requested = true,
            Ok(_) => {}
            Err(err) => log::error!("Failed to apply {:?}: {}", event, err),
        }
        self.window.request_redraw();
    }

    pub fn apply_ui_action(&mut self, action: UiAction) {
        match action {
            UiAction::Start(config) => {
                if let Err(err) = self.start_session(config) {
                    log::error!("Could not start session: {}", err);
                    if let Screen::Setup(menu) = &mut self.screen {
                        menu.error = Some(err.to_string());
                    }
                }
            }
            UiAction::Control(event) => self.apply_control(event),
            UiAction::NewWorld => self.return_to_menu(),
        }
    }

    /// Drop the current run and show the setup menu with its choices.
    fn return_to_menu(&mut self) {
        let menu = match &mut self.screen {
            Screen::Simulation(world) => {
                if let Err(err) = world.session.handle(ControlEvent::Quit) {
                    log::warn!("Failed to stop session: {}", err);
                }
                SetupMenu::from_config(world.session.config())
            }
            Screen::Setup(_) => return,
        };
        self.screen = Screen::Setup(menu);
        if let Some(new_size) = self.window.request_inner_size(MENU_SIZE) {
            self.resize(new_size);
        }
        self.window.request_redraw();
    }

    /// When the session next wants a redraw, if it is running.
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        match &self.screen {
            Screen::Simulation(world) => world.session.next_deadline(now),
            Screen::Setup(_) => None,
        }
    }

    /// Build this frame's egui widgets for the current screen.
    pub fn draw_ui(&mut self) -> Option<UiAction> {
        match &mut self.screen {
            Screen::Setup(menu) => menu.show(&self.egui_ctx),
            Screen::Simulation(world) => ui::session_ui(&self.egui_ctx, &world.session),
        }
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            log::info!("Reconfigured surface to: {}x{}", new_size.width, new_size.height);
        } else {
            log::warn!("Ignoring resize to zero dimensions: {}x{}", new_size.width, new_size.height);
        }
    }

    /// Advance the simulation if a generation is due, upload the changed
    /// cells and draw the grid. Returns the surface texture for egui to draw on.
    pub fn update_and_render(&mut self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        if let Screen::Simulation(world) = &mut self.screen {
            if let Some(changes) = world.session.tick(Instant::now()) {
                world.upload_changes(&self.queue, &changes);
            }
        }

        // --- Get Surface Texture (early exit on error) ---
        let output_frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost) => {
                log::warn!("Surface lost, recreating...");
                self.resize(self.size);
                return Err(wgpu::SurfaceError::Lost);
            }
            Err(e) => {
                log::error!("Failed to acquire next swap chain texture: {:?}", e);
                return Err(e);
            }
        };

        // --- Render Pass ---
        let output_view = output_frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut render_encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Render Encoder") });
        {
            let mut render_pass = render_encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &output_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(BACKGROUND),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if let Screen::Simulation(world) = &self.screen {
                render_pass.set_pipeline(&self.render_pipeline);
                render_pass.set_bind_group(0, &world.bind_group, &[]);
                render_pass.draw(0..3, 0..1); // Draw full-screen triangle
            }
        }
        self.queue.submit(Some(render_encoder.finish()));

        // Return the frame so egui can render to it
        Ok(output_frame)
    }
}
