//! Configuration for the storefront backend.
//!
//! Sources are layered, later ones winning:
//!
//! 1. built-in defaults (the service starts with no files at all)
//! 2. `config/default.{toml,yaml,json}`
//! 3. `config/{RUN_ENV}.{toml,yaml,json}` (`RUN_ENV` defaults to `debug`)
//! 4. `STOREFRONT__SECTION__KEY` environment variables
//! 5. secrets from their well-known variables (see [`env_vars`])

use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use config::builder::DefaultState;
use once_cell::sync::OnceCell;
use std::env;
use tracing::debug;

pub mod env_vars;
pub mod models;

pub use models::*;

/// Loads the configuration from files, environment and `.env`.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let prefix = env_vars::get_config_prefix();
    debug!(%run_env, %config_dir, %prefix, "Loading configuration");

    let builder = Config::builder()
        .add_source(File::with_name(&format!("{config_dir}/default")).required(false))
        .add_source(File::with_name(&format!("{config_dir}/{run_env}")).required(false))
        .add_source(
            Environment::with_prefix(&prefix)
                .separator(env_vars::CONFIG_SEPARATOR)
                .try_parsing(true),
        );

    let config = build(builder)?;
    Ok(env_vars::apply_env_secrets(config))
}

/// Parses a TOML document on top of the built-in defaults.
///
/// No environment lookups are performed; secrets stay as written.
pub fn from_toml_str(toml: &str) -> Result<AppConfig, ConfigError> {
    build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
}

fn build(builder: ConfigBuilder<DefaultState>) -> Result<AppConfig, ConfigError> {
    builder.build()?.try_deserialize()
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file into the process environment, once.
///
/// `DOTENV_OVERRIDE` selects another file; a missing file is not an error.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}
