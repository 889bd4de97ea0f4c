use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

/// Filter variable checked first; `RUST_LOG` is the fallback.
pub const LOG_ENV: &str = "ALLOTAX_LOG";

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Installs a stderr `fmt` subscriber as the global default.
///
/// Stdout is reserved for reports, so diagnostics never interleave with them. Calling this
/// more than once (e.g. from tests) keeps the first subscriber.
pub fn init(default_filter: &str) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::trace!("global subscriber already installed");
    }
}
