pub mod pipeline;

pub use pipeline::ScenePipeline;

/// Install the stderr log subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ab_scout=debug,ab_vision=debug,ab_capture=debug".into()),
        )
        .init();
}
