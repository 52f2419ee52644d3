//! Session/file store.
//!
//! Uploaded files live under an upload root, one directory per opaque
//! session id, created on first reference. The store persists bytes and
//! enumerates a session's files; turning those files into a
//! [`SessionSnapshot`] for the engine happens in [`SessionStore::load_session`].
//!
//! Filenames are sanitized before they touch the filesystem, and only a
//! small extension whitelist is accepted. Images are stored but not
//! indexed — OCR is an extension point, not a feature.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::warn;

use crate::extract::extract_pdf_pages;
use crate::models::{DocumentText, SessionSnapshot};

/// Accepted upload extensions (lowercase, with dot).
pub const ALLOWED_EXTS: &[&str] = &[".pdf", ".png", ".jpg", ".jpeg"];

/// Upload rejection, mapped by the server to HTTP 415.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("file type not allowed (use .pdf/.png/.jpg/.jpeg): {0}")]
    DisallowedType(String),
    #[error("filename sanitizes to nothing: {0:?}")]
    UnusableName(String),
}

/// A stored file with its modification timestamp, for listings.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub name: String,
    pub modified_at: DateTime<Utc>,
}

/// Filesystem-backed session store rooted at one upload directory.
#[derive(Debug, Clone)]
pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory for a session, created if absent.
    pub fn ensure_session_dir(&self, session_id: &str) -> Result<PathBuf> {
        let dir = self.root.join(sanitize_filename(session_id).map_err(|_| {
            anyhow::anyhow!("session id sanitizes to nothing: {:?}", session_id)
        })?);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create session directory: {}", dir.display()))?;
        Ok(dir)
    }

    /// Persist an uploaded file into the session, returning the stored
    /// (sanitized) filename.
    ///
    /// Re-uploads with identical bytes are detected by content hash and
    /// skipped; same-name uploads with different bytes overwrite.
    pub fn save_file(
        &self,
        session_id: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<String> {
        let safe_name = sanitize_filename(original_name)?;
        if !allowed_file(&safe_name) {
            return Err(StoreError::DisallowedType(safe_name).into());
        }

        let dir = self.ensure_session_dir(session_id)?;
        let dest = dir.join(&safe_name);

        if dest.exists() {
            let existing = fs::read(&dest)
                .with_context(|| format!("Failed to read existing file: {}", dest.display()))?;
            if content_hash(&existing) == content_hash(bytes) {
                return Ok(safe_name);
            }
        }

        fs::write(&dest, bytes)
            .with_context(|| format!("Failed to write upload: {}", dest.display()))?;
        Ok(safe_name)
    }

    /// All files stored for a session, filename-sorted. A session that
    /// was never written to lists as empty rather than erroring.
    pub fn list_files(&self, session_id: &str) -> Result<Vec<StoredFile>> {
        let dir = match sanitize_filename(session_id) {
            Ok(s) => self.root.join(s),
            Err(_) => return Ok(Vec::new()),
        };
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&dir)
            .with_context(|| format!("Failed to read session directory: {}", dir.display()))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let modified = entry
                .metadata()?
                .modified()
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH);
            files.push(StoredFile {
                name: entry.file_name().to_string_lossy().to_string(),
                modified_at: DateTime::<Utc>::from(modified),
            });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Build the engine's snapshot for a session: every stored PDF,
    /// filename-sorted, extracted per page.
    ///
    /// A PDF that fails extraction becomes a zero-page document (logged,
    /// never fatal) so the rest of the session stays searchable.
    pub fn load_session(&self, session_id: &str) -> Result<SessionSnapshot> {
        let mut documents = Vec::new();

        for file in self.list_files(session_id)? {
            if !file.name.to_lowercase().ends_with(".pdf") {
                continue;
            }
            let path = self.root.join(sanitize_filename(session_id)?).join(&file.name);
            let bytes = fs::read(&path)
                .with_context(|| format!("Failed to read stored file: {}", path.display()))?;
            let pages = match extract_pdf_pages(&bytes) {
                Ok(pages) => pages,
                Err(e) => {
                    warn!(file = %file.name, error = %e, "PDF extraction failed; document kept with no pages");
                    Vec::new()
                }
            };
            documents.push(DocumentText {
                name: file.name,
                pages,
            });
        }

        Ok(SessionSnapshot {
            id: session_id.to_string(),
            documents,
        })
    }
}

/// Build an ad-hoc snapshot from a directory tree of PDFs, without any
/// session bookkeeping. Used by the one-shot CLI search.
///
/// Files are matched against `include_globs` relative to `root` and
/// visited in path order for determinism; extraction failures degrade to
/// zero-page documents exactly as in [`SessionStore::load_session`].
pub fn scan_directory(root: &Path, include_globs: &[String]) -> Result<SessionSnapshot> {
    if !root.exists() {
        anyhow::bail!("Directory does not exist: {}", root.display());
    }

    let mut builder = globset::GlobSetBuilder::new();
    for pattern in include_globs {
        builder.add(
            globset::Glob::new(pattern)
                .with_context(|| format!("Invalid glob pattern: {}", pattern))?,
        );
    }
    let include_set = builder.build()?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in walkdir::WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if include_set.is_match(relative) {
            paths.push(entry.path().to_path_buf());
        }
    }
    paths.sort();

    let mut documents = Vec::new();
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let bytes =
            fs::read(&path).with_context(|| format!("Failed to read file: {}", path.display()))?;
        let pages = match extract_pdf_pages(&bytes) {
            Ok(pages) => pages,
            Err(e) => {
                warn!(file = %name, error = %e, "PDF extraction failed; document kept with no pages");
                Vec::new()
            }
        };
        documents.push(DocumentText { name, pages });
    }

    Ok(SessionSnapshot {
        id: root.display().to_string(),
        documents,
    })
}

/// Whether a filename's extension is on the upload whitelist.
pub fn allowed_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    ALLOWED_EXTS.iter().any(|ext| lower.ends_with(ext))
}

/// Reduce an untrusted filename to a safe single path component:
/// directory parts are stripped, anything outside `[A-Za-z0-9._-]`
/// becomes `_`, and leading dots are dropped so the result can never
/// escape the session directory or hide as a dotfile.
pub fn sanitize_filename(name: &str) -> Result<String, StoreError> {
    let base = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        return Err(StoreError::UnusableName(name.to_string()));
    }
    Ok(cleaned)
}

fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
