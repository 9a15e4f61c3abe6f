//! Skill structure check — every skill directory must carry a SKILL.md
//! manifest.
//!
//! Infrastructure directories under the skills root (`scripts`, `reference`,
//! dot-prefixed) are exempt. Missing manifests are a warning, not a block.

use serde_json::json;

use warden_core::{registry, DomainSpec, RepoConfig};

use crate::report::{CheckResult, Severity};

pub const NAME: &str = "skill-structure";

const MANIFEST: &str = "SKILL.md";
const EXEMPT_DIRS: &[&str] = &["scripts", "reference"];

pub fn check_structure(config: &RepoConfig, domains: &[DomainSpec]) -> CheckResult {
    let Some(skills) = registry::find(domains, "skills") else {
        return pass("No skills domain registered", 0, Vec::new());
    };
    let skills_root = skills.source_dir_in(config);
    if !skills_root.is_dir() {
        return pass("Skills directory absent", 0, Vec::new());
    }

    let entries = match std::fs::read_dir(&skills_root) {
        Ok(entries) => entries,
        Err(err) => {
            return CheckResult {
                name: NAME.to_string(),
                passed: false,
                message: format!("Cannot read {}: {err}", skills_root.display()),
                severity: Severity::Warning,
                details: json!({ "error": err.to_string() }),
            }
        }
    };

    let mut inspected = 0usize;
    let mut missing = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || EXEMPT_DIRS.contains(&name.as_str()) {
            continue;
        }
        inspected += 1;
        if !path.join(MANIFEST).is_file() {
            missing.push(name);
        }
    }
    missing.sort();

    if missing.is_empty() {
        return pass(
            &format!("All {inspected} skill(s) carry {MANIFEST}"),
            inspected,
            missing,
        );
    }
    CheckResult {
        name: NAME.to_string(),
        passed: false,
        message: format!("{} skill(s) missing {MANIFEST}: {}", missing.len(), missing.join(", ")),
        severity: Severity::Warning,
        details: json!({ "inspected": inspected, "missing_manifest": missing }),
    }
}

fn pass(message: &str, inspected: usize, missing: Vec<String>) -> CheckResult {
    CheckResult {
        name: NAME.to_string(),
        passed: true,
        message: message.to_string(),
        severity: Severity::Warning,
        details: json!({ "inspected": inspected, "missing_manifest": missing }),
    }
}
