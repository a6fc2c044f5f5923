//! Request path to fixture file resolution.
//!
//! The URL path space mirrors the fixture tree on disk. A request is
//! resolved by two lookups, in order:
//!
//! 1. the path as a file, with `.json` appended when the last segment has
//!    no extension (`/extensions/42` -> `extensions/42.json`);
//! 2. the path as a directory. A directory is only a namespace for longer
//!    paths, so an exact directory hit answers nothing.
//!
//! A file and a directory may share a name: `extensions/42.json` answers
//! `/extensions/42` while the directory `extensions/42/` answers longer
//! paths such as `/extensions/42/43`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const JSON_SUFFIX: &str = ".json";

/// Outcome of resolving a request path against a fixture root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The request is answered by the file at this path.
    FileMatch(PathBuf),
    /// No fixture answers the request.
    NotFound,
}

impl Resolution {
    /// Whether a fixture file was found.
    pub fn is_match(&self) -> bool {
        matches!(self, Resolution::FileMatch(_))
    }

    /// The matched file, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Resolution::FileMatch(path) => Some(path),
            Resolution::NotFound => None,
        }
    }
}

/// What a single filesystem probe saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    File,
    Directory,
    Missing,
    /// Exists, but its metadata cannot be read.
    Unreadable,
}

/// Resolve `request_path` (a URL path, optionally with a query string) to a
/// fixture file under `root`.
///
/// Never resolves outside `root`: `..` segments are rejected outright and
/// every match is checked again after following symlinks. Only reads
/// metadata; the matched file is not opened.
pub fn resolve(request_path: &str, root: &Path) -> Resolution {
    let resolution = match normalize(request_path) {
        Some(relative) => lookup_file(root, &relative)
            .or_else(|| lookup_directory(root, &relative))
            .unwrap_or(Resolution::NotFound),
        None => Resolution::NotFound,
    };

    tracing::debug!(request_path, root = %root.display(), ?resolution, "resolved fixture");
    resolution
}

/// Turn a URL path into a relative filesystem path.
///
/// Returns `None` for paths that name nothing (`/`) or that try to leave the
/// fixture root.
fn normalize(request_path: &str) -> Option<PathBuf> {
    let path = request_path.split(['?', '#']).next().unwrap_or_default();
    let decoded = urlencoding::decode(path.trim_start_matches('/')).ok()?;

    let mut relative = PathBuf::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if s.contains(['\\', '\0']) => return None,
            s => relative.push(s),
        }
    }

    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(relative)
}

/// Exact path as a file, with `.json` appended when extensionless.
fn lookup_file(root: &Path, relative: &Path) -> Option<Resolution> {
    let candidate = with_json_suffix(&root.join(relative));

    match probe(&candidate) {
        Probe::File => contained(root, candidate),
        // Let the read report the failure instead of hiding it as a 404.
        Probe::Unreadable => Some(Resolution::FileMatch(candidate)),
        Probe::Directory | Probe::Missing => None,
    }
}

/// Exact path as a directory. Only reached when no file matched, and a
/// directory is never served itself.
fn lookup_directory(root: &Path, relative: &Path) -> Option<Resolution> {
    match probe(&root.join(relative)) {
        Probe::Directory => Some(Resolution::NotFound),
        Probe::File | Probe::Missing | Probe::Unreadable => None,
    }
}

fn with_json_suffix(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_owned();
    name.push(JSON_SUFFIX);
    PathBuf::from(name)
}

fn probe(path: &Path) -> Probe {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Probe::File,
        Ok(meta) if meta.is_dir() => Probe::Directory,
        Ok(_) => Probe::Missing,
        Err(e) if e.kind() == ErrorKind::PermissionDenied => Probe::Unreadable,
        Err(_) => Probe::Missing,
    }
}

/// Accept `candidate` only if it still lies under `root` once symlinks are
/// followed.
fn contained(root: &Path, candidate: PathBuf) -> Option<Resolution> {
    let real_root = fs::canonicalize(root).ok()?;
    let real = fs::canonicalize(&candidate).ok()?;

    if real.starts_with(&real_root) {
        Some(Resolution::FileMatch(candidate))
    } else {
        tracing::warn!(candidate = %candidate.display(), "fixture escapes root, ignoring");
        None
    }
}
