use crate::render::RenderManager;
use crate::render::headless::{CommandLog, HeadlessBackend};
use crate::render::setup::RenderSetup;

use super::app::App;
use super::driver::AppDriver;

/// Drives an app against [`HeadlessBackend`] without a window or GPU.
pub struct HeadlessRuntime;

impl HeadlessRuntime {
    /// Runs `app` until it exits on its own or has been ticked `max_frames`
    /// times, then cleans up. Returns the backend's command log.
    pub fn run<A>(setup: RenderSetup, app: A, max_frames: u64) -> anyhow::Result<CommandLog>
    where
        A: App<HeadlessBackend>,
    {
        let backend = HeadlessBackend::new(&setup);
        let log = backend.log();
        let mut driver = AppDriver::new(RenderManager::new(setup, backend), app);

        let mut ticks = 0u64;
        while !driver.is_done() {
            driver.tick();
            ticks += 1;
            if ticks > max_frames {
                driver.render_mut().request_quit();
            }
        }

        log::info!(
            "headless run finished after {} frame(s)",
            driver.render().frame_count()
        );
        driver.into_result()?;
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AppControl;
    use crate::render::headless::BackendCommand;
    use crate::render::setup::ClearState;

    struct Clearing;

    impl App<HeadlessBackend> for Clearing {
        fn on_init(&mut self, _: &mut RenderManager<HeadlessBackend>) -> anyhow::Result<()> {
            Ok(())
        }

        fn on_running(&mut self, render: &mut RenderManager<HeadlessBackend>) -> anyhow::Result<AppControl> {
            if render.begin_frame()? {
                render.clear(&ClearState::default())?;
                render.end_frame()?;
            }
            Ok(AppControl::Continue)
        }
    }

    #[test]
    fn runs_exactly_max_frames() {
        let log = HeadlessRuntime::run(RenderSetup::default(), Clearing, 3).unwrap();
        let frames = log
            .snapshot()
            .iter()
            .filter(|c| **c == BackendCommand::EndFrame)
            .count();
        assert_eq!(frames, 3);
    }

    #[test]
    fn zero_frames_still_initializes_and_cleans_up() {
        let log = HeadlessRuntime::run(RenderSetup::default(), Clearing, 0).unwrap();
        assert!(log.is_empty());
    }
}
