use std::path::{Path, PathBuf};

use anyhow::Context as _;
use async_trait::async_trait;

use crate::foundation::error::RibbonResult;

/// Where a finished export goes.
#[async_trait(?Send)]
pub trait SaveAction {
    /// Persist `bytes` under `filename` and return the final location.
    async fn save(&self, filename: &str, bytes: &[u8]) -> RibbonResult<PathBuf>;
}

/// Writes exports into a directory on the local filesystem, overwriting.
#[derive(Clone, Debug)]
pub struct FsSaveAction {
    dir: PathBuf,
}

impl FsSaveAction {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait(?Send)]
impl SaveAction for FsSaveAction {
    async fn save(&self, filename: &str, bytes: &[u8]) -> RibbonResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("create output directory '{}'", self.dir.display()))?;
        let path = self.dir.join(filename);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("write export '{}'", path.display()))?;
        Ok(path)
    }
}
