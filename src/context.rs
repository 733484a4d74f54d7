//! Run configuration shared by the frame loop and its flows.
//!
//! A [`Context`] carries the settings a flow may read every frame and adjust
//! from `on_init` through [`Out::Configure`](crate::flow::Out::Configure).
//! Logging is set up separately with [`init_logging`].

use std::sync::Once;

use log::warn;

use crate::data_structures::model::Colour;

pub const DEFAULT_FPS: u32 = 60;

#[derive(Debug, Clone)]
pub struct Context {
    /// Stop after this many frames. `None` runs until a flow asks to exit.
    pub frame_limit: Option<u64>,
    pub target_fps: u32,
    /// Seed for noise and randomness. `None` picks a fresh one per run.
    pub seed: Option<u64>,
    pub clear_colour: Colour,
    /// Aspect ratio handed to cameras created by flows.
    pub aspect: f32,
}

impl Context {
    pub fn new() -> Self {
        Self {
            frame_limit: None,
            target_fps: DEFAULT_FPS,
            seed: None,
            clear_colour: Colour::BLACK,
            aspect: 16.0 / 9.0,
        }
    }

    /**
     * Defaults overridden by environment variables:
     *
     * - `FLOW_FRAMES` is the frame limit
     * - `FLOW_FPS` is the target frame rate
     * - `FLOW_SEED` is the noise and random seed
     *
     * Unparsable values are ignored with a warning.
     */
    pub fn from_env() -> Self {
        let mut ctx = Self::new();
        if let Some(frames) = parse_env::<u64>("FLOW_FRAMES") {
            ctx.frame_limit = Some(frames);
        }
        if let Some(fps) = parse_env::<u32>("FLOW_FPS") {
            ctx.target_fps = fps.max(1);
        }
        if let Some(seed) = parse_env::<u64>("FLOW_SEED") {
            ctx.seed = Some(seed);
        }
        ctx
    }

    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The configured seed, or a fresh random one.
    pub fn seed_or_random(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring {}={:?}: not a valid number", key, raw);
            None
        }
    }
}

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "flow_scenes=debug"). Without it `RUST_LOG` is used, then `info`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }
        builder.write_style(config.write_style);
        if let Err(e) = builder.try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        }
        log::debug!("logging initialized");
    });
}
