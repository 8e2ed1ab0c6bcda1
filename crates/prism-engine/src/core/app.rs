use crate::render::{RenderBackend, RenderManager};

/// Control directive returned by `App::on_running`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by `AppDriver`.
///
/// The render manager is passed to every callback; apps never own it.
pub trait App<B: RenderBackend> {
    /// Called once before the first frame. Creates the app's resources.
    fn on_init(&mut self, render: &mut RenderManager<B>) -> anyhow::Result<()>;

    /// Called once per tick until it returns `Exit` or quit is requested.
    fn on_running(&mut self, render: &mut RenderManager<B>) -> anyhow::Result<AppControl>;

    /// Called once after the last frame, also after a failed init or tick.
    /// The manager is discarded right after, so releasing here is optional.
    fn on_cleanup(&mut self, render: &mut RenderManager<B>) -> anyhow::Result<()> {
        let _ = render;
        Ok(())
    }
}
