//! Private per-job scratch storage.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::job::JobId;
use crate::preset::PresetProfile;
use crate::transcoder::output_path_for;
use crate::transport::InputDescriptor;

/// Where job workspaces live and how long leftovers may stay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Parent directory of all job workspaces.
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    /// How often the maintenance sweep runs.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Leftover entries older than this are removed by the sweep.
    #[serde(default = "default_max_artifact_age")]
    pub max_artifact_age_secs: u64,
}

fn default_root_dir() -> PathBuf {
    std::env::temp_dir().join("squish")
}

fn default_sweep_interval() -> u64 {
    30 * 60
}

fn default_max_artifact_age() -> u64 {
    3600
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            sweep_interval_secs: default_sweep_interval(),
            max_artifact_age_secs: default_max_artifact_age(),
        }
    }
}

impl WorkspaceConfig {
    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = root_dir.into();
        self
    }
}

/// Name prefix shared by every workspace of `job_id`.
pub(crate) fn workspace_prefix(job_id: &JobId) -> String {
    format!("job-{}-", job_id)
}

/// A job's scratch directory. Removed with everything in it on drop.
#[derive(Debug)]
pub struct JobWorkspace {
    dir: TempDir,
}

impl JobWorkspace {
    /// Creates `<root>/job-<id>-XXXX`.
    pub async fn create(root: &Path, job_id: &JobId) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(root).await?;
        let root = root.to_path_buf();
        let prefix = workspace_prefix(job_id);
        let dir = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new().prefix(&prefix).tempdir_in(root)
        })
        .await
        .map_err(std::io::Error::other)??;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the fetched input goes. Keeps the original extension for format detection.
    pub fn input_path(&self, input: &InputDescriptor) -> PathBuf {
        match Path::new(input.display_name()).extension() {
            Some(ext) => self.path().join(format!("input.{}", ext.to_string_lossy())),
            None => self.path().join("input"),
        }
    }

    /// Where the transcoder writes, named after the input. Stays inside the
    /// workspace whatever name the client sent.
    pub fn output_path(&self, input: &InputDescriptor, profile: &PresetProfile) -> PathBuf {
        output_path_for(self.path(), &format!("{}_compressed", input.stem()), profile)
    }
}
