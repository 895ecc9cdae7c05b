//! Process logging.
//!
//! Every component logs through the `log` facade with a bracketed tag
//! (`[ACQUISITION]`, `[BOOTH]`, ...). This installs `env_logger` with the
//! booth's line format: `[timestamp] [LEVEL] [target] message`.

use std::io::Write;

use chrono::Local;
use env_logger::{Builder, Env};

/// Install the logger. `RUST_LOG` overrides `default_level`.
///
/// Returns `false` when a logger was already installed; calling this more
/// than once is harmless.
pub fn init_logging(default_level: &str) -> bool {
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}] [{}] [{}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    match builder.try_init() {
        Ok(()) => {
            log::info!("Logging initialized (default level: {})", default_level);
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        init_logging("debug");
        assert!(!init_logging("info"));
    }
}
