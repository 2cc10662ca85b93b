use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use queue_core::{split_chain, CHAIN_DELIMITER};
use queue_logging::{queue_info, queue_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::persistence::{PersistError, RonFile};

const CHAINS_FILENAME: &str = "saved_chains.ron";

/// A prompt chain kept for reuse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedChain {
    pub name: String,
    pub chain: String,
    /// RFC 3339, UTC.
    pub created: String,
}

impl SavedChain {
    pub fn prompt_count(&self) -> usize {
        split_chain(&self.chain).len()
    }
}

#[derive(Debug, Error)]
pub enum ChainStoreError {
    #[error("chain name is blank")]
    BlankName,
    #[error("chain has no prompts")]
    EmptyChain,
    #[error("no saved chain named `{0}`")]
    NotFound(String),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Saved chains, one ron list per data directory.
///
/// Saving appends; names are not unique, and lookups return the most recent entry.
pub struct ChainStore {
    file: RonFile<Vec<SavedChain>>,
}

impl ChainStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            file: RonFile::new(dir.into().join(CHAINS_FILENAME)),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// All saved chains in save order. A missing file is an empty store.
    pub fn load(&self) -> Result<Vec<SavedChain>, ChainStoreError> {
        Ok(self.file.load()?.unwrap_or_default())
    }

    pub fn save(&self, name: &str, chain: &str) -> Result<SavedChain, ChainStoreError> {
        self.save_at(name, chain, Utc::now())
    }

    pub fn save_at(
        &self,
        name: &str,
        chain: &str,
        created: DateTime<Utc>,
    ) -> Result<SavedChain, ChainStoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ChainStoreError::BlankName);
        }
        let chain = chain.trim();
        if split_chain(chain).is_empty() {
            return Err(ChainStoreError::EmptyChain);
        }
        if !chain.contains(CHAIN_DELIMITER) {
            queue_warn!(
                "chain `{}` has no {} separator; it will run as a single prompt",
                name,
                CHAIN_DELIMITER
            );
        }

        let saved = SavedChain {
            name: name.to_string(),
            chain: chain.to_string(),
            created: created.to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let mut chains = self.load()?;
        chains.push(saved.clone());
        self.file.store(&chains)?;
        queue_info!("saved chain `{}` to {:?}", saved.name, self.path());
        Ok(saved)
    }

    /// Most recently saved chain with this name.
    pub fn find(&self, name: &str) -> Result<SavedChain, ChainStoreError> {
        let name = name.trim();
        self.load()?
            .into_iter()
            .rev()
            .find(|saved| saved.name == name)
            .ok_or_else(|| ChainStoreError::NotFound(name.to_string()))
    }
}

/// Default data directory: `$XDG_DATA_HOME/chat-queue`, else `./.chat-queue`.
pub fn default_data_dir() -> PathBuf {
    std::env::var_os("XDG_DATA_HOME")
        .map(|base| Path::new(&base).join("chat-queue"))
        .unwrap_or_else(|| PathBuf::from(".chat-queue"))
}
