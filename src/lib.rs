//! Constraint-driven parameter schemas.
//!
//! Describe function and constructor params as a closed constraint tree, then
//! derive what a form needs from it:
//! - [`defaults`]: initial values honoring declared defaults and nesting,
//! - [`validate`]: compiled validators reporting every issue with its path,
//! - [`merge`]: reconciliation of discovered and declared metadata,
//! - [`describe`]: shape summaries for display.
//!
//! [`check`] ties these together to self-check metadata documents.
pub mod check;
pub mod defaults;
pub mod describe;
pub mod error;
pub mod merge;
pub mod meta;
pub mod path_de;
pub mod schema;
pub mod validate;

use std::sync::Once;

pub use error::{Error, Result};

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber once.
///
/// `RUST_LOG` wins when set; otherwise `verbosity` picks the level
/// (0 = warn, 1 = info, 2+ = debug).
pub fn init_tracing(verbosity: u8) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let fallback = match verbosity {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true).with_level(true))
            .with(filter)
            .init();
    });
}
