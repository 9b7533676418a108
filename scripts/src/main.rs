//! Deploy script entry point.
//!
//! Deploys the token and the crowdfunding contract on a local sandbox ledger,
//! creates and funds a test campaign, and optionally writes the deployed
//! addresses to `DEPLOYMENTS_PATH`. Any failed step exits non-zero.

use soroban_sdk::Env;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crowdfunding_scripts::Config;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    let env = Env::default();
    // Sandbox accounts sign everything.
    env.mock_all_auths();

    let report = crowdfunding_scripts::run(&env, &config)?;

    if let Some(path) = &config.deployments_path {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&report.module)?)?;
        info!("Deployed addresses written to {}", path.display());
    }

    Ok(())
}
