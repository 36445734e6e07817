//! Snapshot and restore tuning.

use serde::{Deserialize, Serialize};

/// SQLite's default bound-parameter ceiling per statement.
pub const MAX_BOUND_PARAMETERS: usize = 999;

const fn default_insert_batch_size() -> usize {
    200
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackupConfig {
    /// Rows per multi-row `INSERT` during restore.
    #[serde(default = "default_insert_batch_size")]
    pub insert_batch_size: usize,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            insert_batch_size: default_insert_batch_size(),
        }
    }
}

impl BackupConfig {
    /// Rows per statement for a table with `columns` columns, never binding
    /// more than [`MAX_BOUND_PARAMETERS`] values and never less than one row.
    pub fn rows_per_statement(&self, columns: usize) -> usize {
        let ceiling = MAX_BOUND_PARAMETERS / columns.max(1);
        self.insert_batch_size.min(ceiling).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_batch_fits_narrow_tables() {
        let config = BackupConfig::default();
        assert_eq!(config.rows_per_statement(2), 200);
    }

    #[test]
    fn wide_tables_are_clamped() {
        let config = BackupConfig::default();
        // 11 columns * 90 rows = 990 parameters
        assert_eq!(config.rows_per_statement(11), 90);
    }

    #[test]
    fn zero_batch_still_inserts() {
        let config = BackupConfig {
            insert_batch_size: 0,
        };
        assert_eq!(config.rows_per_statement(3), 1);
    }
}
