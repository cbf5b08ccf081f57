use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::{Confirm, Input};
use std::io::Write;

/// AgroTrade marketplace client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Base URL of the AgroTrade API
    #[arg(short = 'u', long, env = "API_BASE_URL")]
    pub api_base_url: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, env = "HTTP_REQUEST_TIMEOUT", default_value = "15")]
    pub http_timeout: u64,

    /// HTTP connect timeout in seconds
    #[arg(long, env = "HTTP_CONNECT_TIMEOUT", default_value = "10")]
    pub connect_timeout: u64,

    /// Reachability probe timeout in seconds
    #[arg(long, env = "PING_TIMEOUT", default_value = "5")]
    pub ping_timeout: u64,

    /// Keystore service name the token is stored under
    #[arg(long, env = "KEYRING_SERVICE", default_value = "agrotrade")]
    pub keyring_service: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the remote API, e.g. `http://192.168.0.9:8000/api`
    pub api_base_url: String,

    // Timeouts
    pub http_connect_timeout: u64,
    pub http_request_timeout: u64,
    pub ping_timeout: u64,

    // Secure storage
    pub keyring_service: String,

    // Logging
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with priority: CLI > ENV > defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        // Parse CLI arguments (clap falls back to env vars per field)
        let args = CliArgs::parse();

        let config = Config {
            api_base_url: args
                .api_base_url
                .context("API_BASE_URL is required (use -u or set API_BASE_URL env var)")?,
            http_connect_timeout: args.connect_timeout,
            http_request_timeout: args.http_timeout,
            ping_timeout: args.ping_timeout,
            keyring_service: args.keyring_service,
            log_level: args.log_level,
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            anyhow::bail!(
                "API_BASE_URL must start with http:// or https://: {}",
                self.api_base_url
            );
        }

        if self.http_request_timeout == 0 {
            anyhow::bail!("HTTP_REQUEST_TIMEOUT must be at least 1 second");
        }

        Ok(())
    }
}

// === Interactive Setup ===

/// Check if interactive setup is needed (no .env file and no base URL)
pub fn needs_interactive_setup() -> bool {
    let env_file_exists = std::path::Path::new(".env").exists();
    let has_base_url = std::env::var("API_BASE_URL").is_ok();

    !env_file_exists && !has_base_url
}

/// Run interactive setup to collect required configuration
pub fn run_interactive_setup() -> Result<InteractiveConfig> {
    println!();
    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║          🌱 AgroTrade Client - First Time Setup            ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    println!();
    println!("No configuration found. Let's point the client at your API.");
    println!();

    let api_base_url: String = Input::new()
        .with_prompt("AgroTrade API base URL (API_BASE_URL)")
        .default("http://127.0.0.1:8000/api".to_string())
        .interact_text()
        .context("Failed to read API_BASE_URL")?;

    if api_base_url.trim().is_empty() {
        anyhow::bail!("API_BASE_URL cannot be empty");
    }

    let config = InteractiveConfig {
        api_base_url: api_base_url.trim().to_string(),
    };

    println!();
    let save_to_env = Confirm::new()
        .with_prompt("Save configuration to .env file?")
        .default(true)
        .interact()
        .context("Failed to read save confirmation")?;

    if save_to_env {
        save_env_file(&config)?;
        println!();
        println!("✅ Configuration saved to .env file");
    }

    println!();
    println!("✅ Setup complete! Starting client...");
    println!();

    Ok(config)
}

/// Configuration collected from interactive setup
#[derive(Debug, Clone)]
pub struct InteractiveConfig {
    pub api_base_url: String,
}

/// Save configuration to .env file
fn save_env_file(config: &InteractiveConfig) -> Result<()> {
    let env_content = format!(
        r#"# AgroTrade Client Configuration
# Generated by interactive setup

# Base URL of the AgroTrade API (required)
API_BASE_URL={}

# HTTP request timeout in seconds
HTTP_REQUEST_TIMEOUT=15

# Logging (trace, debug, info, warn, error)
LOG_LEVEL=info
"#,
        config.api_base_url,
    );

    let mut file = std::fs::File::create(".env").context("Failed to create .env file")?;
    file.write_all(env_content.as_bytes())
        .context("Failed to write .env file")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            api_base_url: "http://localhost:8000/api".to_string(),
            http_connect_timeout: 10,
            http_request_timeout: 15,
            ping_timeout: 5,
            keyring_service: "agrotrade".to_string(),
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_http_and_https() {
        let config = base_config();
        assert!(config.validate().is_ok());

        let mut config = base_config();
        config.api_base_url = "https://api.agrotrade.example/api".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        let mut config = base_config();
        config.api_base_url = "ftp://api.agrotrade.example".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = base_config();
        config.http_request_timeout = 0;
        assert!(config.validate().is_err());
    }
}
