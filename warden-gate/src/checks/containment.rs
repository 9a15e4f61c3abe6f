//! Containment check — do domain files reference only paths inside their
//! own domain subtree?
//!
//! Each relative-parent reference is resolved lexically against its
//! containing file's directory; a violation is recorded when resolution
//! climbs above the domain root. Resolution (rather than counting `../`
//! occurrences against nesting depth) avoids flagging references like
//! `a/b/../../c` that never leave the domain.

use std::path::{Path, PathBuf};

use serde_json::json;

use warden_core::{DomainSpec, RepoConfig};
use warden_sync::hasher;

use crate::report::{CheckResult, Severity};

pub const NAME: &str = "containment";

/// File extensions scanned for references.
const TEXT_EXTENSIONS: &[&str] = &["py", "md", "json", "yaml", "yml"];

/// At most this many violations are carried in the report details.
const DETAIL_CAP: usize = 10;

#[derive(Debug)]
struct Violation {
    file: PathBuf,
    line: usize,
    reference: String,
}

/// Scan every governed domain for escaping relative references.
pub fn check_containment(config: &RepoConfig, domains: &[DomainSpec]) -> CheckResult {
    let mut violations = Vec::new();
    let mut checked_files = 0usize;

    for spec in domains {
        let domain_root = spec.source_dir_in(config);
        if !domain_root.exists() {
            continue;
        }
        scan_dir(
            config,
            &domain_root,
            &domain_root,
            &mut checked_files,
            &mut violations,
        );
    }

    if violations.is_empty() {
        return CheckResult {
            name: NAME.to_string(),
            passed: true,
            message: format!("Containment OK ({checked_files} files checked)"),
            severity: Severity::Blocking,
            details: json!({ "checked_files": checked_files, "violations": 0 }),
        };
    }

    let shown: Vec<_> = violations
        .iter()
        .take(DETAIL_CAP)
        .map(|v| {
            json!({
                "file": v.file.display().to_string(),
                "line": v.line,
                "reference": v.reference,
            })
        })
        .collect();
    CheckResult {
        name: NAME.to_string(),
        passed: false,
        message: format!("{} containment violation(s) found", violations.len()),
        severity: Severity::Blocking,
        details: json!({
            "violations": shown,
            "total": violations.len(),
            "checked_files": checked_files,
        }),
    }
}

fn scan_dir(
    config: &RepoConfig,
    domain_root: &Path,
    dir: &Path,
    checked_files: &mut usize,
    violations: &mut Vec<Violation>,
) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let relative = path.strip_prefix(domain_root).unwrap_or(&path);
        // Generated and cache artifacts are not governed content.
        if hasher::should_skip(relative) {
            continue;
        }
        if path.is_dir() {
            scan_dir(config, domain_root, &path, checked_files, violations);
            continue;
        }
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !TEXT_EXTENSIONS.contains(&extension.as_str()) {
            continue;
        }
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        *checked_files += 1;

        // Depth of the file's directory below the domain root.
        let depth = relative.components().count().saturating_sub(1);
        for (line_no, line) in content.lines().enumerate() {
            if !line.contains("../") {
                continue;
            }
            for reference in candidate_references(line) {
                if escapes(depth, &reference) {
                    violations.push(Violation {
                        file: path.strip_prefix(&config.root).unwrap_or(&path).to_path_buf(),
                        line: line_no + 1,
                        reference,
                    });
                }
            }
        }
    }
}

/// Tokens on the line that look like relative paths with parent segments.
fn candidate_references(line: &str) -> Vec<String> {
    line.split(|c: char| {
        c.is_whitespace()
            || matches!(
                c,
                '"' | '\'' | '`' | '(' | ')' | '[' | ']' | '<' | '>' | ',' | ';' | '='
            )
    })
    .filter(|token| token.contains("../"))
    .filter(|token| !token.starts_with('/') && !token.contains("://"))
    .map(str::to_string)
    .collect()
}

/// Lexically resolve `reference` from a directory `depth` levels below the
/// domain root; true when resolution climbs above the root.
fn escapes(depth: usize, reference: &str) -> bool {
    let mut level = depth as isize;
    for segment in reference.split('/') {
        match segment {
            ".." => {
                level -= 1;
                if level < 0 {
                    return true;
                }
            }
            "" | "." => {}
            _ => level += 1,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use warden_core::registry::DomainSpec;

    fn fixture() -> (TempDir, RepoConfig, Vec<DomainSpec>) {
        let tmp = TempDir::new().unwrap();
        let config = RepoConfig::new(tmp.path());
        fs::create_dir_all(tmp.path().join("skills/unit")).unwrap();
        let domains = vec![DomainSpec::new("skills", "skills", "Agent Skills")];
        (tmp, config, domains)
    }

    fn write(config: &RepoConfig, rel: &str, content: &str) {
        let path = config.root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn contained_parent_reference_passes() {
        let (_tmp, config, domains) = fixture();
        write(&config, "skills/unit/doc.md", "see ../shared.md for details\n");
        write(&config, "skills/shared.md", "shared\n");

        let result = check_containment(&config, &domains);
        assert!(result.passed, "{}", result.message);
    }

    #[test]
    fn escaping_reference_is_a_blocking_violation() {
        let (_tmp, config, domains) = fixture();
        write(&config, "skills/unit/doc.md", "see ../../tools/helper.py\n");

        let result = check_containment(&config, &domains);
        assert!(result.is_blocking_failure());
        assert_eq!(result.details["total"], 1);
        assert_eq!(result.details["violations"][0]["line"], 1);
    }

    #[test]
    fn root_level_file_escapes_with_single_parent_reference() {
        let (_tmp, config, domains) = fixture();
        write(&config, "skills/readme.md", "import from ../commands/x.md\n");

        let result = check_containment(&config, &domains);
        assert!(result.is_blocking_failure());
    }

    #[test]
    fn internal_up_and_down_path_is_not_flagged() {
        let (_tmp, config, domains) = fixture();
        // Depth-counting heuristics flag this; lexical resolution must not.
        write(&config, "skills/readme.md", "path: a/b/../../c.md\n");

        let result = check_containment(&config, &domains);
        assert!(result.passed, "{}", result.message);
    }

    #[test]
    fn generated_artifacts_and_urls_are_ignored() {
        let (_tmp, config, domains) = fixture();
        write(&config, "skills/.cache/state.json", "\"../../escape\"\n");
        write(
            &config,
            "skills/unit/doc.md",
            "https://example.com/../up is fine\n",
        );

        let result = check_containment(&config, &domains);
        assert!(result.passed, "{}", result.message);
    }

    #[test]
    fn violations_in_details_are_capped() {
        let (_tmp, config, domains) = fixture();
        let mut body = String::new();
        for _ in 0..15 {
            body.push_str("ref ../../outside.md\n");
        }
        write(&config, "skills/unit/doc.md", &body);

        let result = check_containment(&config, &domains);
        assert_eq!(result.details["total"], 15);
        assert_eq!(result.details["violations"].as_array().unwrap().len(), 10);
    }
}
