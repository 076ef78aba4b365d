//! Logging setup for fleetcare.
//!
//! Diagnostics go to stderr so command output on stdout stays clean for
//! piping, including `--format json`. Events from dependencies such as
//! `rusqlite` or `figment` are held at `warn` whatever `-v` says; `RUST_LOG`
//! replaces the whole filter when set.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much diagnostic output the CLI prints, chosen by `-q` / `-v` / `-vv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only, from fleetcare and its dependencies.
    Quiet,
    /// Schema migrations and other one-off notices.
    #[default]
    Normal,
    /// Storage and evaluation steps.
    Verbose,
    /// Every evaluated service.
    Trace,
}

impl Verbosity {
    /// Map the `-q` flag and the `-v` count. `-q` wins over any `-v`.
    #[must_use]
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// `EnvFilter` directives for this level.
    #[must_use]
    pub fn directives(self) -> &'static str {
        match self {
            Self::Quiet => "error,fleetcare=error",
            Self::Normal => "warn,fleetcare=info",
            Self::Verbose => "warn,fleetcare=debug",
            Self::Trace => "warn,fleetcare=trace",
        }
    }
}

/// Install the global subscriber.
///
/// Call once at startup; later calls keep the first subscriber.
///
/// # Examples
///
/// ```no_run
/// use fleetcare::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::from_flags(false, 1));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directives()));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    fn enabled_under(verbosity: Verbosity, check: impl FnOnce() -> bool) -> bool {
        let subscriber =
            tracing_subscriber::registry().with(EnvFilter::new(verbosity.directives()));
        tracing::subscriber::with_default(subscriber, check)
    }

    #[test]
    fn test_from_flags() {
        assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, 4), Verbosity::Trace);
        assert_eq!(Verbosity::from_flags(true, 2), Verbosity::Quiet);
    }

    #[test]
    fn test_directives_parse() {
        for verbosity in [
            Verbosity::Quiet,
            Verbosity::Normal,
            Verbosity::Verbose,
            Verbosity::Trace,
        ] {
            assert!(EnvFilter::try_new(verbosity.directives()).is_ok());
        }
    }

    #[test]
    fn test_own_events_follow_verbosity() {
        assert!(enabled_under(Verbosity::Normal, || tracing::enabled!(Level::INFO)));
        assert!(!enabled_under(Verbosity::Normal, || tracing::enabled!(Level::DEBUG)));
        assert!(enabled_under(Verbosity::Verbose, || tracing::enabled!(Level::DEBUG)));
        assert!(enabled_under(Verbosity::Trace, || tracing::enabled!(Level::TRACE)));
        assert!(!enabled_under(Verbosity::Quiet, || tracing::enabled!(Level::WARN)));
    }

    #[test]
    fn test_dependencies_held_at_warn() {
        assert!(!enabled_under(Verbosity::Trace, || {
            tracing::enabled!(target: "rusqlite", Level::INFO)
        }));
        assert!(enabled_under(Verbosity::Verbose, || {
            tracing::enabled!(target: "figment", Level::WARN)
        }));
        assert!(!enabled_under(Verbosity::Quiet, || {
            tracing::enabled!(target: "figment", Level::WARN)
        }));
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging(Verbosity::Quiet);
        init_logging(Verbosity::Trace);
    }
}
