use anyhow::Result;
use dialoguer::{Input, Password, Select};

use agrotrade_client::config::{self, Config};
use agrotrade_client::context::AppContext;
use agrotrade_client::models::{Role, Status};

#[tokio::main]
async fn main() -> Result<()> {
    // Check if interactive setup is needed (no .env and no base URL)
    if config::needs_interactive_setup() {
        let interactive_config = config::run_interactive_setup()?;

        // Set environment variables from interactive config so Config::load() can use them
        std::env::set_var("API_BASE_URL", &interactive_config.api_base_url);
    }

    // Load configuration first (for log level)
    let config = Config::load()?;
    config.validate()?;

    // Initialize logging with a configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    tracing::info!("🌱 AgroTrade client starting...");
    tracing::info!("API base URL: {}", config.api_base_url);

    let ctx = AppContext::new(config)?;

    // Reachability probe before asking for credentials
    if ctx.client.check_connection().await {
        tracing::info!("✅ API is reachable");
    } else {
        tracing::warn!("⚠️ API is not reachable; requests will fail until connectivity returns");
    }

    // Interactive login
    let roles = [Role::Client, Role::Farmer, Role::StoreOwner];
    let labels = ["Client", "Farmer", "Store Owner"];
    let role_idx = Select::new()
        .with_prompt("Login as")
        .items(&labels)
        .default(0)
        .interact()?;

    let email: String = Input::new().with_prompt("Email address").interact_text()?;
    let password = Password::new().with_prompt("Password").interact()?;

    if let Err(errors) = ctx.session.login(&email, &password, roles[role_idx]).await {
        for (field, message) in errors {
            tracing::error!("{}: {}", field, message);
        }
        anyhow::bail!("Login aborted: invalid input");
    }

    let session = ctx.session.session().await;
    match session.status {
        Status::Succeeded => {
            let name = session
                .user
                .as_ref()
                .map(|u| u.name.as_str())
                .unwrap_or("unknown");
            tracing::info!("✅ Logged in as {}", name);
        }
        _ => {
            let message = session
                .error
                .unwrap_or_else(|| "unknown error".to_string());
            anyhow::bail!("Login failed: {}", message);
        }
    }

    // Background profile refresh (non-fatal)
    ctx.session.fetch_profile().await;

    ctx.products.fetch().await;
    let products = ctx.products.state().await;
    match products.status {
        Status::Succeeded => tracing::info!("📦 {} products in the catalog", products.items.len()),
        _ => tracing::warn!("Products: {}", products.error.unwrap_or_default()),
    }

    ctx.orders.fetch().await;
    let orders = ctx.orders.state().await;
    match orders.status {
        Status::Succeeded => tracing::info!("🧾 {} orders on record", orders.items.len()),
        _ => tracing::warn!("Orders: {}", orders.error.unwrap_or_default()),
    }

    Ok(())
}
