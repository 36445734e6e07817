use ludo_db::repos::audit::AuditFilter;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `ludo audit`.
pub async fn handle(args: &AuditArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let filter = AuditFilter {
        actor: args.actor.clone(),
        action: args.action.map(Into::into),
        limit: flags.limit,
    };
    let entries = ctx.service.query_audit(&filter).await?;
    output(&entries, flags.format)
}
