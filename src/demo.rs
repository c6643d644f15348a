//! Demo window: a transparent tao window with the effect applied

use acrylic_engine::{global, RawEffectOptions, WindowHandle};
use tao::{
    dpi::LogicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

/// Open the window and run its event loop. Only returns on failure.
pub fn run(options: RawEffectOptions) -> Result<(), tao::error::OsError> {
    let event_loop = EventLoop::new();

    let window = WindowBuilder::new()
        .with_title("fancy-acrylic")
        .with_inner_size(LogicalSize::new(480, 320))
        .with_transparent(true)
        .build(&event_loop)?;

    let Some(handle) = WindowHandle::from_window(&window) else {
        log::error!("Demo window has no Win32 handle");
        return Ok(());
    };

    let engine = global();
    match engine.apply_effect(&options.with_hwnd(handle.raw() as i64)) {
        Ok(outcome) => log::info!("Demo window {}: {:?}", handle, outcome),
        Err(e) => log::warn!("Demo window {}: {}", handle, e),
    }

    // Dropping the window triggers `Destroyed`.
    let mut window = Some(window);

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent {
                event: WindowEvent::ThemeChanged(theme),
                ..
            } => {
                log::info!("Theme changed to {:?}, reapplying", theme);
                if let Some(Err(e)) = engine.reapply(handle) {
                    log::warn!("Reapply failed: {}", e);
                }
            }

            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                window.take();
            }

            Event::WindowEvent {
                event: WindowEvent::Destroyed,
                ..
            } => {
                engine.window_destroyed(handle);
                *control_flow = ControlFlow::Exit;
            }

            _ => (),
        }
    });
}
