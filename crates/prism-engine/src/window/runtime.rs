use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::core::{App, AppDriver};
use crate::gpu::{Gpu, WgpuBackend};
use crate::render::RenderManager;
use crate::render::setup::RenderSetup;

/// Entry point for windowed apps.
pub struct Runtime;

impl Runtime {
    /// Opens one window described by `setup` and drives `app` once per redraw
    /// until it exits or the window is closed (close button or Escape).
    ///
    /// Returns the first error raised by GPU initialization or by the app.
    pub fn run<A>(setup: RenderSetup, app: A) -> Result<()>
    where
        A: App<WgpuBackend> + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = RuntimeState::new(setup, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        state.finish();
        match state.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

struct RuntimeState<A: App<WgpuBackend>> {
    setup: RenderSetup,
    pending_app: Option<A>,
    window: Option<Arc<Window>>,
    driver: Option<AppDriver<WgpuBackend, A>>,
    error: Option<anyhow::Error>,
}

impl<A: App<WgpuBackend>> RuntimeState<A> {
    fn new(setup: RenderSetup, app: A) -> Self {
        Self {
            setup,
            pending_app: Some(app),
            window: None,
            driver: None,
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let Some(app) = self.pending_app.take() else {
            return Ok(());
        };

        let attrs = Window::default_attributes()
            .with_title(self.setup.title.clone())
            .with_inner_size(LogicalSize::new(self.setup.width, self.setup.height));

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let gpu = pollster::block_on(Gpu::new(
            window.clone(),
            self.setup.gpu.clone(),
            self.setup.sample_count,
        ))
        .context("GPU initialization failed")?;

        let backend = WgpuBackend::new(gpu, &self.setup);
        let render = RenderManager::new(self.setup.clone(), backend);

        window.request_redraw();
        self.window = Some(window);
        self.driver = Some(AppDriver::new(render, app));
        Ok(())
    }

    /// Runs any outstanding cleanup and records the app's result.
    fn finish(&mut self) {
        if let Some(mut driver) = self.driver.take() {
            driver.shutdown();
            if let Err(e) = driver.into_result() {
                self.error.get_or_insert(e);
            }
        }
        self.window = None;
    }

    fn request_quit(&mut self) {
        if let Some(driver) = self.driver.as_mut() {
            driver.render_mut().request_quit();
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(driver) = self.driver.as_mut() else {
            return;
        };

        driver.tick();
        if driver.render().backend().is_fatal() {
            driver.render_mut().request_quit();
        }

        if driver.is_done() {
            self.finish();
            event_loop.exit();
        }
    }
}

impl<A: App<WgpuBackend>> ApplicationHandler for RuntimeState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.start(event_loop) {
            log::error!("failed to start: {e:#}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.request_quit(),

            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                self.request_quit();
            }

            WindowEvent::Resized(new_size) => {
                if let Some(driver) = self.driver.as_mut() {
                    driver.render_mut().backend_mut().resize(new_size);
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let (Some(window), Some(driver)) = (self.window.as_ref(), self.driver.as_mut()) {
                    driver.render_mut().backend_mut().resize(window.inner_size());
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}
