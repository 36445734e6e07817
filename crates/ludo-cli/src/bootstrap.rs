use anyhow::Context;
use ludo_config::LudoConfig;

use crate::cli::GlobalFlags;

/// Load layered configuration, then apply command-line overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<LudoConfig> {
    let config = LudoConfig::load_with_dotenv().context("failed to load ludo configuration")?;
    apply_overrides(config, flags)
}

fn apply_overrides(mut config: LudoConfig, flags: &GlobalFlags) -> anyhow::Result<LudoConfig> {
    if let Some(path) = &flags.database {
        config.database.path.clone_from(path);
    }
    config
        .validate()
        .context("invalid configuration after command-line overrides")?;
    Ok(config)
}
