use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "CASA_LOG";

/// Map the `-v` count to a filter directive; `CASA_LOG` wins when set.
pub fn directive(verbosity: u8) -> String {
    if let Ok(env) = std::env::var(LOG_ENV) {
        if !env.trim().is_empty() {
            return env;
        }
    }
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
    .to_string()
}

/// Install the global subscriber. Logs go to stderr so command output on
/// stdout stays clean.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_new(directive(verbosity)).unwrap_or_else(|_| EnvFilter::new("warn"));
    let layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}
