//! Tracing subscriber setup.

use tracing::Level;

/// Map `-v`/`-q` counts to a level. Quiet wins over verbose.
pub fn level_for(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::WARN;
    }
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the stderr subscriber. Calling it again is a no-op.
pub fn init(level: Level) {
    let installed = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .try_init();
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for(0, false), Level::INFO);
        assert_eq!(level_for(1, false), Level::DEBUG);
        assert_eq!(level_for(3, false), Level::TRACE);
        assert_eq!(level_for(2, true), Level::WARN);
    }

    #[test]
    fn init_twice_does_not_panic() {
        init(Level::WARN);
        init(Level::DEBUG);
    }
}
