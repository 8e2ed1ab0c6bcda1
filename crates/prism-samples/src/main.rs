//! Packed normals sample.
//!
//! Renders five shapes whose normals are stored as four signed bytes, half of
//! them through a multisampled draw state.
//!
//! ```text
//! packed-normals               # window, Escape or close to quit
//! packed-normals --headless 60 # 60 frames without a GPU
//! ```

mod packed_normals;
mod shapes;

use anyhow::Result;
use clap::Parser;
use prism_engine::core::HeadlessRuntime;
use prism_engine::logging::{init_logging, LoggingConfig};
use prism_engine::render::setup::RenderSetup;
use prism_engine::window::Runtime;

use packed_normals::PackedNormals;

#[derive(clap::Parser, Debug)]
#[command(about = "Packed normals sample", long_about = None)]
struct Args {
    /// Run without a window for this many frames (default 120).
    #[arg(long, value_name = "FRAMES", num_args = 0..=1, default_missing_value = "120")]
    headless: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(LoggingConfig::default());

    let setup = RenderSetup::window(600, 400, true, "Prism Packed Normals");

    match args.headless {
        None => Runtime::run(setup, PackedNormals::new()),
        Some(frames) => {
            let log = HeadlessRuntime::run(setup, PackedNormals::new(), frames)?;
            log::info!("recorded {} backend commands", log.len());
            Ok(())
        }
    }
}
