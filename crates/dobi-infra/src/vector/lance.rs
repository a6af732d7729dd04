//! LanceDB connection wrapper with table lifecycle helpers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow_schema::Schema;

/// A LanceDB database rooted at a directory (the persist dir).
pub struct LanceVectorStore {
    db: lancedb::Connection,
    base_path: PathBuf,
}

impl LanceVectorStore {
    /// Open or create a LanceDB database at `base_path`.
    ///
    /// Creates the directory if it does not exist.
    pub async fn new(base_path: impl AsRef<Path>) -> Result<Self, lancedb::Error> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path).map_err(|e| lancedb::Error::CreateDir {
            path: base_path.display().to_string(),
            source: e,
        })?;

        let uri = base_path
            .to_str()
            .ok_or_else(|| lancedb::Error::InvalidInput {
                message: format!("Path contains invalid UTF-8: {}", base_path.display()),
            })?;

        let db = lancedb::connect(uri).execute().await?;

        Ok(Self { db, base_path })
    }

    /// Open `table_name`, creating it empty with `schema` if missing.
    pub async fn ensure_table(
        &self,
        table_name: &str,
        schema: Arc<Schema>,
    ) -> Result<lancedb::Table, lancedb::Error> {
        match self.db.open_table(table_name).execute().await {
            Ok(table) => Ok(table),
            Err(lancedb::Error::TableNotFound { .. }) => {
                self.db.create_empty_table(table_name, schema).execute().await
            }
            Err(e) => Err(e),
        }
    }

    pub async fn table_exists(&self, table_name: &str) -> bool {
        self.db.open_table(table_name).execute().await.is_ok()
    }

    /// Drop a table. Dropping a missing table is not an error.
    pub async fn drop_table(&self, table_name: &str) -> Result<(), lancedb::Error> {
        match self.db.drop_table(table_name, &[]).await {
            Ok(()) => Ok(()),
            Err(lancedb::Error::TableNotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn table_names(&self) -> Result<Vec<String>, lancedb::Error> {
        self.db.table_names().execute().await
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}
