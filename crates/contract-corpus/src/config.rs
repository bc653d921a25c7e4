//! Configuration for the document and policy collaborators

use std::path::PathBuf;

/// Where policy documents come from and where their index lives
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusConfig {
    /// Directory of `.txt` / `.md` policy documents to index
    pub policy_dir: Option<PathBuf>,
    /// On-disk index location; the index is kept in memory when unset
    pub index_path: Option<PathBuf>,
}

impl CorpusConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.policy_dir = Some(dir.into());
        self
    }

    pub fn with_index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.index_path = Some(path.into());
        self
    }

    /// Load configuration from environment variables
    ///
    /// Expected variables:
    /// - CONTRACTIQ_POLICY_DIR: directory of policy documents
    /// - CONTRACTIQ_INDEX_PATH: directory for the persistent policy index
    pub fn from_env() -> Self {
        Self {
            policy_dir: non_empty_var("CONTRACTIQ_POLICY_DIR").map(PathBuf::from),
            index_path: non_empty_var("CONTRACTIQ_INDEX_PATH").map(PathBuf::from),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = CorpusConfig::new()
            .with_policy_dir("/srv/policies")
            .with_index_path("/var/lib/contractiq/index");
        assert_eq!(config.policy_dir, Some(PathBuf::from("/srv/policies")));
        assert_eq!(
            config.index_path,
            Some(PathBuf::from("/var/lib/contractiq/index"))
        );
    }

    #[test]
    fn test_default_is_in_memory_without_policies() {
        let config = CorpusConfig::default();
        assert!(config.policy_dir.is_none());
        assert!(config.index_path.is_none());
    }
}
