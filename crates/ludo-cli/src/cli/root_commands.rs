use clap::{Args, Subcommand, ValueEnum};
use ludo_core::audit::AuditAction;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Serve the admin HTTP API (backup and restore endpoints).
    Serve(ServeArgs),
    /// Export a snapshot of the whole dataset to a file.
    Backup(BackupArgs),
    /// Replace the whole dataset with a snapshot file.
    Restore(RestoreArgs),
    /// Print the insertion and deletion order of the managed entity types.
    Order,
    /// List recent backup and restore audit entries.
    Audit(AuditArgs),
}

#[derive(Clone, Debug, Args)]
pub struct ServeArgs {
    /// Bind host (defaults to `server.host`)
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port (defaults to `server.port`)
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Clone, Debug, Args)]
pub struct BackupArgs {
    /// Output path; `-` writes the document to stdout. Defaults to
    /// `backup-<date>.json` in the current directory.
    #[arg(short, long)]
    pub out: Option<String>,

    /// Name recorded as `exportedBy` (defaults to `auth.admin_user`)
    #[arg(long)]
    pub actor: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct RestoreArgs {
    /// Snapshot file to restore
    pub file: String,

    /// Name recorded in the audit log (defaults to `auth.admin_user`)
    #[arg(long)]
    pub actor: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    /// Only entries by this actor
    #[arg(long)]
    pub actor: Option<String>,

    /// Only entries for this action
    #[arg(long)]
    pub action: Option<AuditActionArg>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum AuditActionArg {
    Export,
    Restore,
}

impl From<AuditActionArg> for AuditAction {
    fn from(value: AuditActionArg) -> Self {
        match value {
            AuditActionArg::Export => Self::Export,
            AuditActionArg::Restore => Self::Restore,
        }
    }
}
