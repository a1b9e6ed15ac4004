// Entrypoint for the demo CLI.
// - Keeps `main` small: load config, log in, hand the client to the menu.
// - Returns `anyhow::Result` to simplify error handling at the edge.

use anyhow::Context;
use phenoml_demo::{ui, ApiClient, Config};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // PHENOML_BASE_URL / PHENOML_EMAIL / PHENOML_PASSWORD, optionally from .env
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(base_url = %config.base_url, scheme = ?config.auth_scheme, "starting demo");

    let mut api = ApiClient::new(config).context("Failed to build HTTP client")?;
    if !ui::login(&mut api)? {
        anyhow::bail!("could not authenticate against the service");
    }

    ui::main_menu(&api)?;
    Ok(())
}
