use std::sync::Arc;

use ludo_server::AppState;

use crate::cli::root_commands::ServeArgs;
use crate::context::AppContext;

/// Handle `ludo serve`.
pub async fn handle(args: &ServeArgs, ctx: &AppContext) -> anyhow::Result<()> {
    let host = args.host.as_deref().unwrap_or(&ctx.config.server.host);
    let port = args.port.unwrap_or(ctx.config.server.port);
    let addr = format!("{host}:{port}");

    let state = AppState::from_config(Arc::clone(&ctx.service), &ctx.config);
    ludo_server::run(state, &addr).await
}
