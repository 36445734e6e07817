use std::sync::Arc;

use anyhow::Context;
use ludo_config::LudoConfig;
use ludo_db::service::StoreService;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: Arc<StoreService>,
    pub config: LudoConfig,
}

impl AppContext {
    /// Open the configured store and run migrations.
    pub async fn init(config: LudoConfig) -> anyhow::Result<Self> {
        let service = StoreService::from_config(&config)
            .await
            .with_context(|| format!("failed to open database at {}", config.database.path))?;
        Ok(Self {
            service: Arc::new(service),
            config,
        })
    }

    /// The actor recorded for a CLI-initiated operation.
    pub fn actor<'a>(&'a self, explicit: Option<&'a str>) -> &'a str {
        explicit.unwrap_or(&self.config.auth.admin_user)
    }
}

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &LudoConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &LudoConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();
    let mut warnings = Vec::new();

    if !config.auth.is_configured() && has_env_prefix(&env_keys, "LUDO_AUTH") {
        warnings.push(
            "Auth config appears default while LUDO_AUTH* env vars exist. Use double underscores (example: LUDO_AUTH__ADMIN_TOKEN)."
                .to_string(),
        );
    }

    if config.database.path == ludo_config::DatabaseConfig::default().path
        && has_env_prefix(&env_keys, "LUDO_DATABASE")
    {
        warnings.push(
            "Database path appears default while LUDO_DATABASE* env vars exist. Use double underscores (example: LUDO_DATABASE__PATH)."
                .to_string(),
        );
    }

    warnings
}

fn has_env_prefix(keys: &[String], prefix: &str) -> bool {
    keys.iter()
        .any(|key| key.starts_with(prefix) && !key.starts_with(&format!("{prefix}__")))
}
