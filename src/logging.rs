use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber.
///
/// Verbose runs log at `debug` to stdout, everything else at `info` to stderr.
/// `RUST_LOG` overrides the level either way.
pub fn init_logging(verbose: bool) {
    let (level, writer) = if verbose {
        ("debug", BoxMakeWriter::new(std::io::stdout))
    } else {
        ("info", BoxMakeWriter::new(std::io::stderr))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(writer)
        .with_target(false)
        .try_init();
}
