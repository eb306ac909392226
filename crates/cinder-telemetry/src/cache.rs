// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Durable on-disk report cache.
//!
//! Each report is one JSON file whose name encodes a zero-padded
//! milliseconds timestamp plus a per-process sequence number, so plain
//! lexicographic filename order is FIFO order, including across process
//! restarts. When the cache is full the oldest entry is evicted to make
//! room for the incoming one.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

/// Default bound on cached reports.
pub const DEFAULT_MAX_ENTRIES: usize = 64;

/// A report held for later delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedReport {
	pub api_key: String,
	/// Delivery attempts made so far.
	pub attempts: u32,
	/// The serialized crash report payload.
	pub body: String,
}

/// A cached report together with its backing file.
#[derive(Debug, Clone)]
pub struct CacheEntry {
	pub path: PathBuf,
	pub report: CachedReport,
}

/// Filesystem-backed FIFO cache for undeliverable reports.
pub struct ReportCache {
	dir: PathBuf,
	max_entries: usize,
	seq: AtomicU64,
}

impl ReportCache {
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self {
			dir: dir.into(),
			max_entries: DEFAULT_MAX_ENTRIES,
			seq: AtomicU64::new(0),
		}
	}

	pub fn with_max_entries(mut self, max_entries: usize) -> Self {
		self.max_entries = max_entries.max(1);
		self
	}

	/// Platform cache directory for this crate, falling back to a temp
	/// directory when the platform exposes none.
	pub fn default_dir() -> PathBuf {
		dirs::data_dir()
			.unwrap_or_else(std::env::temp_dir)
			.join("cinder")
			.join("reports")
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// Persists a report, evicting the oldest entries first when the cache
	/// is at capacity. The write is atomic: a temp file renamed into place,
	/// so a crash mid-write never leaves a half-parseable entry.
	pub fn store(&self, report: &CachedReport) -> Result<PathBuf> {
		fs::create_dir_all(&self.dir)?;

		let mut existing = self.sorted_entries()?;
		while existing.len() >= self.max_entries {
			let oldest = existing.remove(0);
			warn!(path = %oldest.display(), "Report cache full; evicting oldest entry");
			remove_quietly(&oldest);
		}

		let seq = self.seq.fetch_add(1, Ordering::Relaxed);
		let name = format!("{:020}-{:06}.json", Utc::now().timestamp_millis(), seq);
		let path = self.dir.join(name);
		let tmp = path.with_extension("json.tmp");

		fs::write(&tmp, serde_json::to_vec(report)?)?;
		fs::rename(&tmp, &path)?;
		debug!(path = %path.display(), attempts = report.attempts, "Cached report");
		Ok(path)
	}

	/// Loads cached reports for the given API key, oldest first. Entries
	/// that no longer parse are skipped (and removed) rather than wedging
	/// the queue.
	pub fn load(&self, api_key: &str) -> Result<Vec<CacheEntry>> {
		let mut entries = Vec::new();
		for path in self.sorted_entries()? {
			let report: CachedReport = match fs::read(&path).map_err(crate::error::TelemetryError::from)
				.and_then(|bytes| serde_json::from_slice(&bytes).map_err(Into::into))
			{
				Ok(report) => report,
				Err(e) => {
					warn!(path = %path.display(), error = %e, "Dropping unreadable cache entry");
					remove_quietly(&path);
					continue;
				}
			};
			if report.api_key == api_key {
				entries.push(CacheEntry { path, report });
			}
		}
		Ok(entries)
	}

	pub fn remove(&self, entry: &CacheEntry) -> Result<()> {
		fs::remove_file(&entry.path)?;
		Ok(())
	}

	/// Rewrites an entry with its attempt count bumped, via the same
	/// temp-file-then-rename dance as [`Self::store`] so a crash mid-rewrite
	/// cannot corrupt the entry.
	pub fn record_attempt(&self, entry: &mut CacheEntry) -> Result<()> {
		entry.report.attempts += 1;
		let tmp = entry.path.with_extension("json.tmp");
		fs::write(&tmp, serde_json::to_vec(&entry.report)?)?;
		fs::rename(&tmp, &entry.path)?;
		Ok(())
	}

	fn sorted_entries(&self) -> Result<Vec<PathBuf>> {
		let read_dir = match fs::read_dir(&self.dir) {
			Ok(read_dir) => read_dir,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(e.into()),
		};

		let mut paths: Vec<PathBuf> = read_dir
			.filter_map(|entry| entry.ok())
			.map(|entry| entry.path())
			.filter(|path| path.extension().map(|ext| ext == "json").unwrap_or(false))
			.collect();
		paths.sort();
		Ok(paths)
	}
}

fn remove_quietly(path: &Path) {
	if let Err(e) = fs::remove_file(path) {
		warn!(path = %path.display(), error = %e, "Failed to remove cache entry");
	}
}
