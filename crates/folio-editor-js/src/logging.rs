//! Console logging.

/// Install the console subscriber, filtered by `directives`.
///
/// Only the first call installs anything; later editors on the same page
/// share the subscriber.
pub fn init_tracing(directives: &str) {
    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    {
        use tracing::Level;
        use tracing::subscriber::set_global_default;
        use tracing_subscriber::Registry;
        use tracing_subscriber::filter::EnvFilter;
        use tracing_subscriber::layer::SubscriberExt;

        let console_level = if cfg!(debug_assertions) {
            Level::DEBUG
        } else {
            Level::INFO
        };

        let wasm_layer = tracing_wasm::WASMLayer::new(
            tracing_wasm::WASMLayerConfigBuilder::new()
                .set_max_level(console_level)
                .build(),
        );

        let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"));

        let reg = Registry::default().with(filter).with(wasm_layer);

        let _ = set_global_default(reg);
    }

    #[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
    let _ = directives;
}
