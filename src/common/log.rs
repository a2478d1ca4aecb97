use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_tree::HierarchicalLayer;
use tracing_tree::time::Uptime;

/// Environment variable holding an `EnvFilter` directive, e.g.
/// `RIFT_SWITCHER_LOG=rift_switcher::sys=trace`.
pub const LOG_ENV: &str = "RIFT_SWITCHER_LOG";

pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let tree = HierarchicalLayer::default()
        .with_writer(std::io::stderr)
        .with_indent_lines(true)
        .with_indent_amount(2)
        .with_targets(true)
        .with_bracketed_fields(true)
        .with_timer(Uptime::default());

    // A subscriber may already be installed when running under a test harness.
    let _ = tracing_subscriber::registry().with(filter).with(tree).try_init();
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "rift_switcher=debug,info" } else { "info" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_only_raises_our_own_targets() {
        assert_eq!(default_directive(false), "info");
        assert!(default_directive(true).starts_with("rift_switcher=debug"));
        assert!(EnvFilter::try_new(default_directive(true)).is_ok());
    }
}
