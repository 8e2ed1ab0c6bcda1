//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the window, and wires them to the wgpu
//! backend and the app driver.

mod runtime;

pub use runtime::Runtime;
