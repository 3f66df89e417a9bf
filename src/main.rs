// Shell modules live in the binary; the simulation core is the library.
pub mod input;
pub mod render;
pub mod state;
pub mod ui;

use crate::state::{State, StateError, MENU_SIZE};
use crate::ui::SetupMenu;

use clap::Parser;
use delta_life::config::Args;
use delta_life::{ControlEvent, SimConfig};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::Window,
};

async fn run(
    event_loop: EventLoop<()>,
    window: Arc<Window>,
    menu: SetupMenu,
    initial: Option<SimConfig>,
) -> Result<(), StateError> {
    let mut state = State::new(window, menu, initial).await?;

    event_loop.run(move |event, window_target| {
        match event {
            Event::WindowEvent { window_id, ref event } if window_id == state.window.id() => {
                // egui sees window events first
                let response = state.egui_winit_state.on_window_event(&state.window, event);
                if response.repaint {
                    state.window.request_redraw();
                }

                // Resizes and redraws are ours regardless of what egui did with them.
                let consumed_by_egui = response.consumed
                    && !matches!(event, WindowEvent::Resized(_) | WindowEvent::RedrawRequested);
                if consumed_by_egui {
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => {
                        state.apply_control(ControlEvent::Quit);
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        state.resize(*new_size);
                    }
                    WindowEvent::KeyboardInput { event: key_event, .. } => {
                        input::handle_keyboard(&mut state, key_event);
                    }
                    WindowEvent::RedrawRequested => {
                        render_frame(&mut state);
                    }
                    _ => (),
                }

                if state.quit_requested {
                    log::info!("Quit requested, closing window.");
                    window_target.exit();
                }
            }
            Event::AboutToWait => {
                let now = Instant::now();
                match state.next_deadline(now) {
                    Some(deadline) if deadline <= now => {
                        state.window.request_redraw();
                        window_target.set_control_flow(ControlFlow::Wait);
                    }
                    Some(deadline) => window_target.set_control_flow(ControlFlow::WaitUntil(deadline)),
                    None => window_target.set_control_flow(ControlFlow::Wait),
                }
            }
            _ => (),
        }
    })?;
    Ok(())
}

/// Draw the world, then egui on top of it, then act on whatever the UI asked for.
fn render_frame(state: &mut State) {
    let output_frame = match state.update_and_render() {
        Ok(frame) => frame,
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::OutOfMemory) => {
            // resize() was called internally if Lost.
            log::warn!("Skipping frame due to surface error.");
            state.window.request_redraw();
            return;
        }
        Err(err @ (wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Outdated)) => {
            log::warn!("Skipping frame due to surface {:?}", err);
            state.window.request_redraw();
            return;
        }
    };

    // --- Egui Frame and UI Definition ---
    let output_view = output_frame
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let raw_input = state.egui_winit_state.take_egui_input(&state.window);
    state.egui_ctx.begin_frame(raw_input);
    let action = state.draw_ui();
    let full_output = state.egui_ctx.end_frame();

    let pixels_per_point = state.window.scale_factor() as f32;
    let paint_jobs = state.egui_ctx.tessellate(full_output.shapes, pixels_per_point);
    let screen_descriptor = egui_wgpu::ScreenDescriptor {
        size_in_pixels: [state.config.width, state.config.height],
        pixels_per_point,
    };

    // Upload egui data to GPU
    let mut encoder = state.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("egui Encoder"),
    });
    for (id, image_delta) in &full_output.textures_delta.set {
        state.egui_renderer.update_texture(&state.device, &state.queue, *id, image_delta);
    }
    let user_buffers = state.egui_renderer.update_buffers(
        &state.device,
        &state.queue,
        &mut encoder,
        &paint_jobs,
        &screen_descriptor,
    );
    state.egui_winit_state.handle_platform_output(&state.window, full_output.platform_output);

    {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("egui Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &output_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load, // keep the world underneath
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        state.egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
    }

    for id in &full_output.textures_delta.free {
        state.egui_renderer.free_texture(id);
    }

    state
        .queue
        .submit(user_buffers.into_iter().chain(std::iter::once(encoder.finish())));
    output_frame.present();

    if let Some(action) = action {
        state.apply_ui_action(action);
    }
    if full_output.viewport_output.values().any(|v| v.repaint_delay.is_zero()) {
        state.window.request_redraw();
    }
}

fn start(menu: SetupMenu, initial: Option<SimConfig>) -> Result<(), StateError> {
    let event_loop = EventLoop::new()?;

    let window = Arc::new(
        winit::window::WindowBuilder::new()
            .with_title("Conway's Game of Life")
            .with_inner_size(MENU_SIZE)
            .build(&event_loop)?,
    );

    pollster::block_on(run(event_loop, window, menu, initial))
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let menu = SetupMenu::from_args(&args);
    let initial = match args.into_config() {
        Ok(initial) => initial,
        Err(err) => {
            log::error!("Invalid options: {}", err);
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };

    match start(menu, initial) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
