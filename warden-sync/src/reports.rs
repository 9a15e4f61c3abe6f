//! Rolling post-hook report log.
//!
//! Every orchestrator run appends one [`PostHookReport`]; the log keeps the
//! most recent [`REPORT_LOG_CAP`] entries and is written atomically.

use warden_core::{PostHookReport, RepoConfig};

use crate::error::{io_err, SyncError};

/// Maximum number of retained report entries.
pub const REPORT_LOG_CAP: usize = 50;

/// Load the report log; missing or unparsable logs read as empty.
pub fn load(config: &RepoConfig) -> Vec<PostHookReport> {
    let path = config.post_hook_log_path();
    if !path.exists() {
        return Vec::new();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            log::warn!("post-hook log unparsable, starting fresh: {err}");
            Vec::new()
        }),
        Err(err) => {
            log::warn!("post-hook log unreadable, starting fresh: {err}");
            Vec::new()
        }
    }
}

/// Append `report`, dropping the oldest entries beyond the cap.
pub fn append(config: &RepoConfig, report: &PostHookReport) -> Result<(), SyncError> {
    let mut log = load(config);
    log.push(report.clone());
    if log.len() > REPORT_LOG_CAP {
        log.drain(..log.len() - REPORT_LOG_CAP);
    }

    let path = config.post_hook_log_path();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let json = serde_json::to_string_pretty(&log)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use chrono::Utc;
    use tempfile::TempDir;
    use warden_core::RunMode;

    fn report(marker: f64) -> PostHookReport {
        PostHookReport {
            timestamp: Utc::now(),
            mode: RunMode::Sync,
            changes_detected: BTreeMap::new(),
            sync_results: vec![],
            all_synced: true,
            total_duration_secs: marker,
        }
    }

    #[test]
    fn append_accumulates_in_order() {
        let tmp = TempDir::new().unwrap();
        let config = RepoConfig::new(tmp.path());

        append(&config, &report(1.0)).unwrap();
        append(&config, &report(2.0)).unwrap();

        let log = load(&config);
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].total_duration_secs, 1.0);
        assert_eq!(log[1].total_duration_secs, 2.0);
    }

    #[test]
    fn log_is_capped_at_fifty_entries() {
        let tmp = TempDir::new().unwrap();
        let config = RepoConfig::new(tmp.path());

        for i in 0..REPORT_LOG_CAP + 5 {
            append(&config, &report(i as f64)).unwrap();
        }

        let log = load(&config);
        assert_eq!(log.len(), REPORT_LOG_CAP);
        // Oldest entries were dropped.
        assert_eq!(log[0].total_duration_secs, 5.0);
        assert_eq!(log.last().unwrap().total_duration_secs, 54.0);
    }

    #[test]
    fn corrupt_log_starts_fresh_instead_of_failing() {
        let tmp = TempDir::new().unwrap();
        let config = RepoConfig::new(tmp.path());
        std::fs::create_dir_all(&config.cache_dir).unwrap();
        std::fs::write(config.post_hook_log_path(), "not json").unwrap();

        assert!(load(&config).is_empty());
        append(&config, &report(1.0)).unwrap();
        assert_eq!(load(&config).len(), 1);
    }
}
