//! Browser Console Logging
//!
//! `tracing-subscriber`'s fmt layer, writing each event to the matching
//! `console.*` method through `tracing-web`.

use tracing::Level;
use tracing_web::MakeWebConsoleWriter;

/// Install the console subscriber (no timestamps: the console has its own)
pub fn init(max_level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_writer(MakeWebConsoleWriter::new())
        .with_ansi(false)
        .without_time()
        .with_max_level(max_level)
        .try_init();
}
