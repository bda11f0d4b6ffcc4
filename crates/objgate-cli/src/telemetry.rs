//! Log subscriber setup

use tracing::metadata::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a log filter directive
pub const LOG_ENV: &str = "OBJGATE_LOG";

fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

/// Install the global subscriber. `OBJGATE_LOG` wins over the configured
/// filter, which wins over the verbosity flags.
pub fn init(verbosity: u8, configured: Option<&str>) {
    let default = level_from_verbosity(verbosity);
    let filter = match std::env::var(LOG_ENV) {
        Ok(directive) if !directive.is_empty() => EnvFilter::builder()
            .with_default_directive(default.into())
            .parse_lossy(directive),
        _ => match configured {
            Some(directive) => EnvFilter::builder()
                .with_default_directive(default.into())
                .parse_lossy(directive),
            None => EnvFilter::default().add_directive(default.into()),
        },
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
