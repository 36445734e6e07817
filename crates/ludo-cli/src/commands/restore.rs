use anyhow::Context;
use ludo_core::responses::RestoreResult;
use ludo_db::service::StoreService;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RestoreArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `ludo restore <file>`.
pub async fn handle(args: &RestoreArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let actor = ctx.actor(args.actor.as_deref());
    let result = restore_file(&ctx.service, &args.file, actor).await?;
    if !flags.quiet {
        output(&result, flags.format)?;
    }
    Ok(())
}

async fn restore_file(service: &StoreService, file: &str, actor: &str) -> anyhow::Result<RestoreResult> {
    let raw = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read snapshot file {file}"))?;
    service
        .restore(&raw, actor)
        .await
        .with_context(|| format!("failed to restore from {file}"))
}
