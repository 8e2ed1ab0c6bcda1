use std::sync::Once;

use log::LevelFilter;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "prism_engine=debug,wgpu_core=warn") and wins over `RUST_LOG`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    /// Level used when neither `env_filter` nor `RUST_LOG` is set.
    pub default_level: LevelFilter,
    /// Caps wgpu and naga internals at `warn`.
    pub quiet_gpu: bool,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            quiet_gpu: true,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

const GPU_TARGETS: [&str; 3] = ["wgpu_core", "wgpu_hal", "naga"];

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are ignored.
///
/// Intended usage is early in `main`. A logger installed by someone else
/// (e.g. a test harness) is left in place.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(config.default_level);

        if config.quiet_gpu {
            for target in GPU_TARGETS {
                builder.filter_module(target, LevelFilter::Warn);
            }
        }

        // Explicit filters are parsed last so they override the defaults above.
        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        }

        builder.write_style(config.write_style);

        if builder.try_init().is_err() {
            return;
        }
        log::debug!("logging initialized");
    });
}
