use env_logger::{Builder, Env};

const DEFAULT_FILTER: &str = "info";

/// Logger reading its filter from `filter_var`, `info` when unset.
fn builder(filter_var: &str) -> Builder {
    Builder::from_env(Env::new().filter_or(filter_var, DEFAULT_FILTER))
}

/// Install the global logger, filtered by `RUST_LOG`.
pub fn init_logging() {
    builder("RUST_LOG").init();
}
