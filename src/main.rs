use clap::Parser;
use drill_backend::{AnyBackend, HttpBackend, InMemoryBackend};
use drill_core::{Config, Domain};
use std::time::Duration;

/// Artificial latency of the demo backend, so loading states are visible.
const DEMO_LATENCY: Duration = Duration::from_millis(150);

#[derive(Parser)]
#[command(name = "drill", about = "Drill down through the retail forecast dataset")]
struct Cli {
    /// Write debug logs to /tmp/drill-debug.log (tail -f to inspect).
    #[arg(long)]
    debug: bool,

    /// Explore the built-in demo dataset instead of the forecast API.
    #[arg(long)]
    demo: bool,

    /// Tab to open first: product or store.
    #[arg(long)]
    domain: Option<Domain>,

    /// Forecast API base URL, overriding the config file.
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/drill-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("drill debug log started — tail -f /tmp/drill-debug.log");
    }

    let mut config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "config: falling back to defaults");
        Config::defaults()
    });
    if let Some(url) = cli.base_url {
        config.backend.base_url = url;
    }
    let domain = cli.domain.unwrap_or(config.ui.default_domain);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let _guard = runtime.enter();

    let backend: AnyBackend = if cli.demo {
        tracing::info!("using the demo dataset");
        InMemoryBackend::demo().with_latency(DEMO_LATENCY).into()
    } else {
        tracing::info!(base_url = %config.backend.base_url, "using the forecast API");
        HttpBackend::from_config(&config.backend)?.into()
    };

    drill_tui::run(config, backend, domain)
}
