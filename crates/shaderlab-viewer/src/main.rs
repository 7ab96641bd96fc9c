//! Entry point for the shaderlab viewer.

use anyhow::Result;
use clap::Parser;
use shaderlab_viewer::{app::App, config::Config};
use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
};

fn main() -> Result<()> {
    // Initialize logging; default to "info" if RUST_LOG is unset.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let config = Config::parse();

    // Create the event loop, window and initial program. A shader pair that
    // does not build here is fatal.
    let event_loop = EventLoop::new()?;
    let mut app = App::new(&config, &event_loop)?;

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { window_id, event } if window_id == app.window_id() => {
                if app.handle_event(&event) {
                    elwt.exit();
                    return;
                }
                match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::RedrawRequested => {
                        if let Err(err) = app.render() {
                            log::error!("Render error: {err:#}");
                            elwt.exit();
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                app.update();
                // Request a redraw each frame.
                app.window().request_redraw();
            }
            Event::LoopExiting => app.shutdown(),
            _ => {}
        }
    })?;

    Ok(())
}
