use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use recon_report::Report;

use crate::filename::{build_filename, parse_filename_timestamp};

/// Append-only JSON-per-run store with timestamp-robust ordering and two
/// pruning policies (spec.md §4.3). `Save` is serialized under an internal
/// mutex; `LoadRecent`/`LoadLatest` only touch the directory listing and
/// don't block on it.
pub struct FileReportStore {
    directory: PathBuf,
    max_files: usize,
    retention_days: u32,
    write_lock: Mutex<()>,
}

impl FileReportStore {
    pub fn new(directory: impl Into<PathBuf>, max_files: usize, retention_days: u32) -> Self {
        FileReportStore {
            directory: directory.into(),
            max_files,
            retention_days,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn save(&self, report: &Report) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;
        tokio::fs::create_dir_all(&self.directory)
            .await
            .with_context(|| format!("creating report store directory {}", self.directory.display()))?;

        let filename = build_filename(report.run_id, report.timestamp);
        let final_path = self.directory.join(&filename);
        let tmp_path = self.directory.join(format!(".{filename}.tmp"));

        let body = serde_json::to_vec_pretty(report).context("serializing report")?;
        tokio::fs::write(&tmp_path, &body)
            .await
            .with_context(|| format!("writing temp report file {}", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, &final_path)
            .await
            .with_context(|| format!("renaming report file into place: {}", final_path.display()))?;

        if let Err(e) = self.prune().await {
            tracing::warn!(error = %e, "report store retention pruning failed");
        }

        Ok(())
    }

    pub async fn load_latest(&self) -> anyhow::Result<Option<Report>> {
        let mut entries = self.list_with_effective_time().await?;
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));

        for (path, _) in entries {
            if let Some(report) = read_report(&path).await {
                return Ok(Some(report));
            }
        }
        Ok(None)
    }

    pub async fn load_recent(&self, limit: usize) -> anyhow::Result<Vec<Report>> {
        let mut entries = self.list_with_effective_time().await?;
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));

        let mut out = Vec::with_capacity(limit.min(entries.len()));
        for (path, _) in entries {
            if out.len() >= limit {
                break;
            }
            if let Some(report) = read_report(&path).await {
                out.push(report);
            }
        }
        Ok(out)
    }

    /// One directory listing, effective time computed once per file and
    /// reused by every caller in this call (spec.md §4.3 "memoized per
    /// listing call").
    async fn list_with_effective_time(&self) -> anyhow::Result<Vec<(PathBuf, DateTime<Utc>)>> {
        let mut dir = match tokio::fs::read_dir(&self.directory).await {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e).context("listing report store directory"),
        };

        let mut out = Vec::new();
        while let Some(entry) = dir.next_entry().await.context("reading directory entry")? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let effective = effective_time(&path).await;
            out.push((path, effective));
        }
        Ok(out)
    }

    async fn prune(&self) -> anyhow::Result<()> {
        let mut entries = self.list_with_effective_time().await?;
        entries.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        if self.retention_days > 0 {
            let cutoff = Utc::now() - chrono::Duration::days(self.retention_days as i64);
            let (stale, fresh): (Vec<_>, Vec<_>) = entries.into_iter().partition(|(_, ts)| *ts < cutoff);
            for (path, _) in stale {
                remove_best_effort(&path).await;
            }
            entries = fresh;
        }

        if self.max_files > 0 && entries.len() > self.max_files {
            let excess = entries.len() - self.max_files;
            for (path, _) in entries.into_iter().take(excess) {
                remove_best_effort(&path).await;
            }
        }

        Ok(())
    }
}

async fn remove_best_effort(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "failed to prune report file");
        }
    }
}

/// Effective time per spec.md §4.3: filename timestamp if canonical, else
/// the in-body `timestamp` field, else filesystem mtime.
async fn effective_time(path: &Path) -> DateTime<Utc> {
    let filename = path.file_name().and_then(|f| f.to_str()).unwrap_or("");
    if let Some(ts) = parse_filename_timestamp(filename) {
        return ts;
    }

    if let Ok(bytes) = tokio::fs::read(path).await {
        if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&bytes) {
            if let Some(ts) = value
                .get("timestamp")
                .and_then(|v| v.as_str())
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            {
                return ts.with_timezone(&Utc);
            }
        }
    }

    match tokio::fs::metadata(path).await.and_then(|m| m.modified()) {
        Ok(modified) => DateTime::<Utc>::from(modified),
        Err(_) => Utc::now(),
    }
}

async fn read_report(path: &Path) -> Option<Report> {
    let bytes = tokio::fs::read(path).await.ok()?;
    match serde_json::from_slice::<Report>(&bytes) {
        Ok(report) => Some(report),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping malformed report file");
            None
        }
    }
}
