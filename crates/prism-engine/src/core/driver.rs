use crate::render::{RenderBackend, RenderManager};

use super::app::{App, AppControl};

/// Lifecycle phase of a driven app.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppPhase {
    Init,
    Running,
    Cleanup,
    Done,
}

/// Runs an [`App`] through `Init -> Running -> Cleanup -> Done`.
///
/// Runtimes call `tick()` once per frame opportunity. A failing callback is
/// logged and moves the app to `Cleanup`; the first failure is kept and
/// returned by `into_result`. Cleanup always ends with
/// `RenderManager::discard`.
pub struct AppDriver<B: RenderBackend, A: App<B>> {
    render: RenderManager<B>,
    app: A,
    phase: AppPhase,
    error: Option<anyhow::Error>,
}

impl<B: RenderBackend, A: App<B>> AppDriver<B, A> {
    pub fn new(render: RenderManager<B>, app: A) -> Self {
        Self {
            render,
            app,
            phase: AppPhase::Init,
            error: None,
        }
    }

    pub fn phase(&self) -> AppPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == AppPhase::Done
    }

    pub fn render(&self) -> &RenderManager<B> {
        &self.render
    }

    pub fn render_mut(&mut self) -> &mut RenderManager<B> {
        &mut self.render
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    /// Advances the phase machine by one step and returns the new phase.
    pub fn tick(&mut self) -> AppPhase {
        let phase = self.phase;
        self.phase = match phase {
            AppPhase::Init => match self.app.on_init(&mut self.render) {
                Ok(()) => {
                    log::debug!("app initialized");
                    AppPhase::Running
                }
                Err(e) => self.fail("init", e),
            },

            AppPhase::Running if self.render.quit_requested() => AppPhase::Cleanup,
            AppPhase::Running => match self.app.on_running(&mut self.render) {
                Ok(AppControl::Continue) if !self.render.quit_requested() => AppPhase::Running,
                Ok(_) => AppPhase::Cleanup,
                Err(e) => self.fail("frame", e),
            },

            AppPhase::Cleanup => {
                if let Err(e) = self.app.on_cleanup(&mut self.render) {
                    self.fail("cleanup", e);
                }
                self.render.discard();
                AppPhase::Done
            }

            AppPhase::Done => AppPhase::Done,
        };
        self.phase
    }

    /// Runs cleanup now unless it already ran.
    pub fn shutdown(&mut self) {
        if matches!(self.phase, AppPhase::Init | AppPhase::Running) {
            self.phase = AppPhase::Cleanup;
        }
        while !self.is_done() {
            self.tick();
        }
    }

    /// The first callback failure, if any.
    pub fn into_result(self) -> anyhow::Result<()> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn fail(&mut self, stage: &str, e: anyhow::Error) -> AppPhase {
        log::error!("app {stage} failed: {e:#}");
        if self.error.is_none() {
            self.error = Some(e.context(format!("app {stage} failed")));
        }
        AppPhase::Cleanup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::HeadlessBackend;
    use crate::render::setup::RenderSetup;

    #[derive(Default)]
    struct Counting {
        inits: u32,
        frames: u32,
        cleanups: u32,
        fail_init: bool,
        fail_on_frame: Option<u32>,
        exit_on_frame: Option<u32>,
    }

    impl App<HeadlessBackend> for Counting {
        fn on_init(&mut self, _: &mut RenderManager<HeadlessBackend>) -> anyhow::Result<()> {
            self.inits += 1;
            anyhow::ensure!(!self.fail_init, "init refused");
            Ok(())
        }

        fn on_running(&mut self, render: &mut RenderManager<HeadlessBackend>) -> anyhow::Result<AppControl> {
            self.frames += 1;
            if self.fail_on_frame == Some(self.frames) {
                anyhow::bail!("frame {} broke", self.frames);
            }
            if render.begin_frame()? {
                render.end_frame()?;
            }
            Ok(match self.exit_on_frame {
                Some(n) if n == self.frames => AppControl::Exit,
                _ => AppControl::Continue,
            })
        }

        fn on_cleanup(&mut self, _: &mut RenderManager<HeadlessBackend>) -> anyhow::Result<()> {
            self.cleanups += 1;
            Ok(())
        }
    }

    fn driver(app: Counting) -> AppDriver<HeadlessBackend, Counting> {
        let setup = RenderSetup::default();
        let backend = HeadlessBackend::new(&setup);
        AppDriver::new(RenderManager::new(setup, backend), app)
    }

    #[test]
    fn phases_advance_in_order() {
        let mut d = driver(Counting {
            exit_on_frame: Some(2),
            ..Counting::default()
        });

        assert_eq!(d.tick(), AppPhase::Running);
        assert_eq!(d.tick(), AppPhase::Running);
        assert_eq!(d.tick(), AppPhase::Cleanup);
        assert_eq!(d.tick(), AppPhase::Done);
        assert_eq!(d.tick(), AppPhase::Done);

        assert_eq!((d.app().inits, d.app().frames, d.app().cleanups), (1, 2, 1));
        assert!(d.into_result().is_ok());
    }

    #[test]
    fn quit_request_ends_running() {
        let mut d = driver(Counting::default());
        d.tick();
        d.tick();
        d.render_mut().request_quit();

        assert_eq!(d.tick(), AppPhase::Cleanup);
        assert_eq!(d.app().frames, 1);
    }

    #[test]
    fn failed_init_still_cleans_up() {
        let mut d = driver(Counting {
            fail_init: true,
            ..Counting::default()
        });
        assert_eq!(d.tick(), AppPhase::Cleanup);
        d.shutdown();
        d.shutdown();

        assert_eq!(d.app().frames, 0);
        assert_eq!(d.app().cleanups, 1);
        let err = d.into_result().unwrap_err();
        assert!(format!("{err:#}").contains("init refused"));
    }

    #[test]
    fn frame_failure_is_reported_after_cleanup() {
        let mut d = driver(Counting {
            fail_on_frame: Some(3),
            ..Counting::default()
        });
        while !d.is_done() {
            d.tick();
        }

        assert_eq!(d.app().cleanups, 1);
        assert_eq!(d.render().frame_count(), 2);
        assert!(d.into_result().is_err());
    }

    #[test]
    fn shutdown_from_running_discards() {
        let mut d = driver(Counting::default());
        d.tick();
        d.tick();
        d.shutdown();

        assert!(d.is_done());
        assert_eq!(d.render().live_resource_count(), 0);
    }
}
