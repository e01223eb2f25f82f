//! Carbon-aware sentiment routing demo
//!
//! Run with: cargo run --example carbon_demo -- "This project is revolutionary and exciting!"
//!
//! Reads `config/carbon.yaml` when present (defaults otherwise), loads the
//! three sentiment models, routes one text and prints the dashboard.

use candle_carbon_router::{CarbonAwareRouter, DashboardReport, GlobalConfigLoader, ModelRegistry};
use tracing_subscriber::EnvFilter;

const DEFAULT_TEXT: &str = "This project is revolutionary and exciting!";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let text = if args.is_empty() {
        DEFAULT_TEXT.to_string()
    } else {
        args.join(" ")
    };

    let config = GlobalConfigLoader::load_router_config_safe();
    let registry = ModelRegistry::from_config(config.clone());
    let router = CarbonAwareRouter::from_registry(&registry, &config)?;

    let result = router.infer(&text)?;
    let report = DashboardReport::from_result(&result);

    println!("Text: {}\n", text);
    println!("{}", report.render_text());
    Ok(())
}
