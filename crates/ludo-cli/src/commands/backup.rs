use std::path::PathBuf;

use anyhow::Context;
use ludo_core::responses::BackupSummary;
use ludo_db::service::StoreService;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::BackupArgs;
use crate::context::AppContext;
use crate::output::output;

/// `--out` value that streams the document to stdout.
const STDOUT: &str = "-";

/// Handle `ludo backup`.
pub async fn handle(args: &BackupArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let actor = ctx.actor(args.actor.as_deref());

    if args.out.as_deref() == Some(STDOUT) {
        let snapshot = ctx.service.create_snapshot(actor).await?;
        println!("{}", String::from_utf8_lossy(&snapshot.to_json_vec()?));
        return Ok(());
    }

    let summary = write_backup(&ctx.service, actor, args.out.as_deref().map(PathBuf::from)).await?;
    if !flags.quiet {
        output(&summary, flags.format)?;
    }
    Ok(())
}

/// Export a snapshot to `out`, or to its suggested file name when `None`.
async fn write_backup(
    service: &StoreService,
    actor: &str,
    out: Option<PathBuf>,
) -> anyhow::Result<BackupSummary> {
    let snapshot = service
        .create_snapshot(actor)
        .await
        .context("failed to export snapshot")?;
    let path = out.unwrap_or_else(|| PathBuf::from(snapshot.file_name()));
    let document = snapshot.to_json_vec()?;

    tokio::fs::write(&path, &document)
        .await
        .with_context(|| format!("failed to write snapshot to {}", path.display()))?;

    Ok(BackupSummary {
        file: path.display().to_string(),
        timestamp: snapshot.timestamp,
        exported_by: snapshot.exported_by,
        counts: snapshot.meta.counts,
    })
}

#[cfg(test)]
mod tests {
    use ludo_core::snapshot::Snapshot;

    use super::*;

    #[tokio::test]
    async fn writes_a_restorable_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nightly.json");
        let service = StoreService::new_local(":memory:").await.unwrap();

        let summary = write_backup(&service, "ops", Some(path.clone())).await.unwrap();
        assert_eq!(summary.exported_by, "ops");
        assert_eq!(summary.file, path.display().to_string());
        assert_eq!(summary.counts["users"], 0);

        let raw = std::fs::read(&path).unwrap();
        let snapshot = Snapshot::from_slice(&raw).unwrap();
        assert_eq!(snapshot.timestamp, summary.timestamp);
        assert_eq!(snapshot.total_rows(), 0);
    }

    #[tokio::test]
    async fn unwritable_destination_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("nightly.json");
        let service = StoreService::new_local(":memory:").await.unwrap();

        let err = write_backup(&service, "ops", Some(path)).await.unwrap_err();
        assert!(format!("{err:#}").contains("failed to write snapshot"));
    }
}
