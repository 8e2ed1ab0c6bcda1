//! Application contract and lifecycle driving.
//!
//! Apps implement [`App`]; a runtime (`window::Runtime` or
//! [`HeadlessRuntime`]) owns an [`AppDriver`] and ticks it once per frame.

mod app;
mod driver;
mod headless;

pub use app::{App, AppControl};
pub use driver::{AppDriver, AppPhase};
pub use headless::HeadlessRuntime;
