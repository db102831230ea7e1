use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Category of resource a listing job discovers
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Regular files
    Files,
    /// Directories below the origin (the origin itself is not counted)
    Directories,
    /// Symbolic links
    Symlinks,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Files => "files",
            ResourceKind::Directories => "directories",
            ResourceKind::Symlinks => "symlinks",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One discovered resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Resource {
    File { path: PathBuf, size: u64 },
    Directory { path: PathBuf },
    Symlink { path: PathBuf, target: Option<PathBuf> },
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::File { .. } => ResourceKind::Files,
            Resource::Directory { .. } => ResourceKind::Directories,
            Resource::Symlink { .. } => ResourceKind::Symlinks,
        }
    }
}

/// Settings for the `scan` section of the configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Directory roots to inventory; each one is an origin
    pub origins: Vec<String>,
    /// Resource kinds listed for every origin
    pub kinds: Vec<ResourceKind>,
    /// Maximum directory depth below each origin
    pub max_depth: Option<usize>,
    /// Glob patterns a path (relative to its origin) must match to be counted
    pub include: Vec<String>,
    /// Include hidden entries
    pub hidden: bool,
    /// Deadline for a single listing job
    pub timeout_secs: u64,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            origins: vec![],
            kinds: vec![ResourceKind::Files, ResourceKind::Directories],
            max_depth: None,
            include: vec![],
            hidden: false,
            timeout_secs: 30,
        }
    }
}

impl ScanSettings {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.timeout_secs == 0 {
            anyhow::bail!("scan.timeout_secs cannot be 0");
        }
        if self.kinds.is_empty() {
            anyhow::bail!("scan.kinds must name at least one resource kind");
        }
        build_globset(&self.include)?;
        Ok(())
    }

    /// Build the input for a listing job of `kind`
    pub fn list_input(&self, kind: ResourceKind) -> anyhow::Result<ListInput> {
        Ok(ListInput {
            kind,
            max_depth: self.max_depth,
            include: build_globset(&self.include)?,
            hidden: self.hidden,
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

/// Input for one listing job
#[derive(Debug, Clone)]
pub struct ListInput {
    pub kind: ResourceKind,
    pub max_depth: Option<usize>,
    pub include: Option<GlobSet>,
    pub hidden: bool,
    pub timeout: Duration,
}

impl ListInput {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            max_depth: None,
            include: None,
            hidden: false,
            timeout: Duration::from_secs(30),
        }
    }
}

fn build_globset(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("Invalid include pattern '{}': {}", pattern, e))?;
        builder.add(glob);
    }
    Ok(Some(builder.build()?))
}
