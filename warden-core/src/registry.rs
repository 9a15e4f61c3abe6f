//! Domain handler registry.
//!
//! Each governed domain declares where its content lives and which
//! collaborator scripts keep it synchronized. Scripts are stored as
//! repo-relative paths and resolved against [`RepoConfig::root`] at use.
//!
//! The table is closed: specs are built through [`DomainSpec::new`] plus
//! builder methods, so every handler carries its required fields by
//! construction.

use std::path::{Path, PathBuf};

use crate::config::RepoConfig;
use crate::types::DomainName;

/// A collaborator script reference with its optional action argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptStep {
    /// Repo-relative script path.
    pub script: PathBuf,
    /// Action passed as the script's first positional argument.
    pub action: Option<String>,
}

impl ScriptStep {
    pub fn new(script: impl Into<PathBuf>, action: Option<String>) -> Self {
        Self {
            script: script.into(),
            action,
        }
    }

    /// File name of the script, for result records.
    pub fn script_name(&self) -> String {
        self.script
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.script.display().to_string())
    }

    /// Action label for result records (`"sync"` when none configured).
    pub fn action_label(&self) -> String {
        self.action.clone().unwrap_or_else(|| "sync".to_string())
    }
}

/// Declaration of one governed domain and its sync handler chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSpec {
    name: DomainName,
    /// Repo-relative directory whose content is hashed.
    source_dir: PathBuf,
    description: String,
    /// Optional best-effort script run before the rest of the chain.
    pre_step: Option<ScriptStep>,
    /// Preferred self-contained script; success short-circuits the chain.
    self_contained: Option<ScriptStep>,
    /// Ordered fallbacks, fail-fast within the domain.
    fallbacks: Vec<ScriptStep>,
    /// Skip silently when the source directory does not exist.
    optional: bool,
}

impl DomainSpec {
    pub fn new(
        name: impl Into<DomainName>,
        source_dir: impl Into<PathBuf>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source_dir: source_dir.into(),
            description: description.into(),
            pre_step: None,
            self_contained: None,
            fallbacks: Vec::new(),
            optional: false,
        }
    }

    pub fn with_pre_step(mut self, script: impl Into<PathBuf>, action: impl Into<String>) -> Self {
        self.pre_step = Some(ScriptStep::new(script, Some(action.into())));
        self
    }

    pub fn with_self_contained(mut self, script: impl Into<PathBuf>) -> Self {
        self.self_contained = Some(ScriptStep::new(script, None));
        self
    }

    pub fn with_fallback(mut self, script: impl Into<PathBuf>, action: impl Into<String>) -> Self {
        self.fallbacks.push(ScriptStep::new(script, Some(action.into())));
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn name(&self) -> &DomainName {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Repo-relative source directory.
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Absolute source directory for this domain under `config.root`.
    pub fn source_dir_in(&self, config: &RepoConfig) -> PathBuf {
        config.resolve(&self.source_dir)
    }

    pub fn pre_step(&self) -> Option<&ScriptStep> {
        self.pre_step.as_ref()
    }

    pub fn self_contained(&self) -> Option<&ScriptStep> {
        self.self_contained.as_ref()
    }

    pub fn fallbacks(&self) -> &[ScriptStep] {
        &self.fallbacks
    }
}

/// Find a domain spec by name.
pub fn find<'a>(domains: &'a [DomainSpec], name: &str) -> Option<&'a DomainSpec> {
    domains.iter().find(|d| d.name.0 == name)
}

/// The built-in domain table for the governed repository.
///
/// Each domain prefers a self-contained sync script that travels with the
/// domain; fallbacks live under `tools/`.
pub fn builtin_domains() -> Vec<DomainSpec> {
    vec![
        DomainSpec::new("skills", "skills", "Agent Skills")
            .with_pre_step("skills/skill-architect/scripts/dag_manager.py", "--sync")
            .with_self_contained("skills/scripts/sync.py")
            .with_fallback("tools/skill_converter.py", "full-sync"),
        DomainSpec::new("commands", "commands", "Slash Commands")
            .with_self_contained("commands/scripts/sync.py")
            .with_fallback("tools/command_sync.py", "post-hook"),
        DomainSpec::new("hooks", "hooks", "AI Tool Hooks").with_self_contained("hooks/sync.py"),
        DomainSpec::new("mcp-servers", "mcp-servers", "MCP Server Config")
            .with_fallback("tools/mcp_sync.py", "sync-all")
            .optional(),
    ]
}
