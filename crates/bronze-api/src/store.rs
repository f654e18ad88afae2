//! Source document storage.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bronze_config::{ConfigError, from_document, to_document};
use bronze_core::SourceConfig;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("invalid stored document {name}: {source}")]
    Corrupt { name: String, source: ConfigError },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A persisted source with its canonical text.
#[derive(Debug, Clone)]
pub struct StoredSource {
    pub config: SourceConfig,
    pub raw_yaml: String,
    pub yaml_path: PathBuf,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait SourceRepo: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<StoredSource>>;
    async fn get(&self, name: &str) -> StoreResult<StoredSource>;
    /// Fails with `Duplicate` when the name is taken.
    async fn create(&self, config: &SourceConfig) -> StoreResult<StoredSource>;
    async fn update(&self, config: &SourceConfig) -> StoreResult<StoredSource>;
    async fn delete(&self, name: &str) -> StoreResult<()>;
    async fn ping(&self) -> StoreResult<()>;
}

/// One `<name>.yaml` file per source in a directory.
pub struct FsSourceRepo {
    dir: PathBuf,
    // Held across existence check and write.
    write_lock: Mutex<()>,
}

impl FsSourceRepo {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> StoreResult<PathBuf> {
        let valid = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase())
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid {
            return Err(StoreError::NotFound(format!("source {}", name)));
        }
        Ok(self.dir.join(format!("{}.yaml", name)))
    }

    async fn read(&self, name: &str, path: PathBuf) -> StoreResult<StoredSource> {
        let raw_yaml = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(format!("source {}", name)));
            }
            Err(e) => return Err(e.into()),
        };
        let config = from_document(&raw_yaml).map_err(|source| StoreError::Corrupt {
            name: name.to_string(),
            source,
        })?;
        if config.name != name {
            return Err(StoreError::Corrupt {
                name: name.to_string(),
                source: ConfigError::InvalidValue {
                    field: "name".to_string(),
                    message: format!("'{}' does not match the file name", config.name),
                },
            });
        }
        let updated_at = tokio::fs::metadata(&path)
            .await?
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        Ok(StoredSource {
            config,
            raw_yaml,
            yaml_path: path,
            updated_at,
        })
    }

    async fn write(&self, config: &SourceConfig, path: PathBuf) -> StoreResult<StoredSource> {
        let raw_yaml = to_document(config).map_err(|source| StoreError::Corrupt {
            name: config.name.clone(),
            source,
        })?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let tmp = path.with_extension("yaml.tmp");
        let written = match tokio::fs::write(&tmp, &raw_yaml).await {
            Ok(()) => tokio::fs::rename(&tmp, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        tracing::info!(name = %config.name, path = %path.display(), "Wrote source document");
        Ok(StoredSource {
            config: config.clone(),
            raw_yaml,
            yaml_path: path,
            updated_at: Utc::now(),
        })
    }
}

#[async_trait]
impl SourceRepo for FsSourceRepo {
    async fn list(&self) -> StoreResult<Vec<StoredSource>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut sources = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };
            match self.read(&name, path).await {
                Ok(source) => sources.push(source),
                Err(StoreError::Corrupt { name, source }) => {
                    tracing::warn!(%name, error = %source, "Skipping unreadable source document");
                }
                Err(e) => return Err(e),
            }
        }
        sources.sort_by(|a, b| a.config.name.cmp(&b.config.name));
        Ok(sources)
    }

    async fn get(&self, name: &str) -> StoreResult<StoredSource> {
        let path = self.path_for(name)?;
        self.read(name, path).await
    }

    async fn create(&self, config: &SourceConfig) -> StoreResult<StoredSource> {
        let path = self.path_for(&config.name)?;
        let _guard = self.write_lock.lock().await;
        if tokio::fs::try_exists(&path).await? {
            return Err(StoreError::Duplicate(format!("source {}", config.name)));
        }
        self.write(config, path).await
    }

    async fn update(&self, config: &SourceConfig) -> StoreResult<StoredSource> {
        let path = self.path_for(&config.name)?;
        let _guard = self.write_lock.lock().await;
        if !tokio::fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(format!("source {}", config.name)));
        }
        self.write(config, path).await
    }

    async fn delete(&self, name: &str) -> StoreResult<()> {
        let path = self.path_for(name)?;
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(%name, "Deleted source document");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(format!("source {}", name)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::read_dir(&self.dir).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bronze_core::registry::SourceType;

    fn source(name: &str) -> SourceConfig {
        let mut config = SourceConfig::create_default(SourceType::Jdbc);
        config.name = name.to_string();
        config.target.table = name.to_string();
        config
    }

    #[tokio::test]
    async fn test_create_get_list_delete() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsSourceRepo::new(dir.path().join("sources"));

        let created = repo.create(&source("orders")).await.unwrap();
        assert!(created.yaml_path.ends_with("orders.yaml"));
        repo.create(&source("customers")).await.unwrap();

        let fetched = repo.get("orders").await.unwrap();
        assert_eq!(fetched.config, source("orders"));
        assert_eq!(fetched.raw_yaml, to_document(&source("orders")).unwrap());

        let names: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.config.name)
            .collect();
        assert_eq!(names, vec!["customers", "orders"]);

        repo.delete("orders").await.unwrap();
        assert!(matches!(repo.get("orders").await, Err(StoreError::NotFound(_))));
        assert!(matches!(repo.delete("orders").await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_duplicate_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsSourceRepo::new(dir.path());
        repo.create(&source("orders")).await.unwrap();
        assert!(matches!(
            repo.create(&source("orders")).await,
            Err(StoreError::Duplicate(_))
        ));
        assert!(matches!(
            repo.update(&source("invoices")).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(repo.get("../etc").await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_concurrent_creates_admit_one() {
        let dir = tempfile::tempdir().unwrap();
        let repo = std::sync::Arc::new(FsSourceRepo::new(dir.path()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.create(&source("orders")).await.is_ok() })
            })
            .collect();
        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn test_list_skips_corrupt_documents() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsSourceRepo::new(dir.path());
        repo.create(&source("orders")).await.unwrap();
        std::fs::write(dir.path().join("broken.yaml"), "name: [").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let sources = repo.list().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert!(repo.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_document_name_must_match_file() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsSourceRepo::new(dir.path());
        let text = to_document(&source("customers")).unwrap();
        std::fs::write(dir.path().join("jdbc_customers.yaml"), &text).unwrap();

        assert!(repo.list().await.unwrap().is_empty());
        assert!(matches!(
            repo.get("jdbc_customers").await,
            Err(StoreError::Corrupt { .. })
        ));

        repo.create(&source("customers")).await.unwrap();
        let names: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.config.name)
            .collect();
        assert_eq!(names, vec!["customers"]);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FsSourceRepo::new(dir.path());
        // A directory in place of the target makes the rename fail.
        std::fs::create_dir_all(dir.path().join("orders.yaml").join("occupied")).unwrap();
        let path = dir.path().join("orders.yaml");
        assert!(repo.write(&source("orders"), path).await.is_err());
        assert!(!dir.path().join("orders.yaml.tmp").exists());
    }
}
