//! Recursive directory walking that collects a snapshot of regular files.
//!
//! Sibling directories are listed in parallel with rayon. Entries that
//! cannot be read (permission errors, races with deletion) are skipped so
//! one bad subtree never aborts the walk. Symlinks are neither reported nor
//! followed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::error::{FileQueryError, Result};
use crate::options::SearchOptions;

/// A regular file found during a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// The search root joined with the file's relative path.
    pub path: PathBuf,
    /// The base name (lossy UTF-8).
    pub name: String,
    /// Length in bytes.
    pub size: u64,
}

/// Shared state for one walk.
#[derive(Debug)]
struct WalkData<'a> {
    num_files: AtomicUsize,
    num_dirs: AtomicUsize,
    num_skipped: AtomicUsize,
    options: &'a SearchOptions,
}

impl<'a> WalkData<'a> {
    fn new(options: &'a SearchOptions) -> Self {
        Self {
            num_files: AtomicUsize::new(0),
            num_dirs: AtomicUsize::new(0),
            num_skipped: AtomicUsize::new(0),
            options,
        }
    }

    fn skip(&self, path: &Path, error: &io::Error) {
        self.num_skipped.fetch_add(1, Ordering::Relaxed);
        log::debug!("skipping {}: {error}", path.display());
    }
}

/// Walks `root` recursively and returns every regular file, sorted by path.
///
/// Fails with `NotFound` if `root` does not exist and `NotADirectory` if it
/// is not a directory. A root that exists but cannot be listed yields an
/// empty snapshot.
pub fn walk_files(root: &Path, options: &SearchOptions) -> Result<Vec<FileEntry>> {
    options.validate()?;

    let metadata = match fs::metadata(root) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Err(FileQueryError::NotFound(root.to_path_buf()));
        }
        Err(error) => return Err(error.into()),
    };
    if !metadata.is_dir() {
        return Err(FileQueryError::NotADirectory(root.to_path_buf()));
    }

    if options.should_ignore(root) {
        log::debug!("search root {} is ignored", root.display());
        return Ok(Vec::new());
    }

    let read_dir = match fs::read_dir(root) {
        Ok(iter) => iter,
        Err(error) => {
            log::warn!("cannot list search root {}: {error}", root.display());
            return Ok(Vec::new());
        }
    };

    let walk_data = WalkData::new(options);
    walk_data.num_dirs.fetch_add(1, Ordering::Relaxed);
    let mut files = walk_entries(root, read_dir, 1, &walk_data);

    // Parallel collection order is arbitrary; sort for a stable snapshot.
    files.sort_unstable_by(|a, b| a.path.cmp(&b.path));

    log::debug!(
        "walked {}: {} files in {} directories, {} entries skipped",
        root.display(),
        walk_data.num_files.load(Ordering::Relaxed),
        walk_data.num_dirs.load(Ordering::Relaxed),
        walk_data.num_skipped.load(Ordering::Relaxed),
    );

    Ok(files)
}

/// Lists a directory below the root. Unreadable directories contribute
/// nothing.
fn walk_dir(dir: &Path, depth: usize, walk_data: &WalkData) -> Vec<FileEntry> {
    match fs::read_dir(dir) {
        Ok(read_dir) => {
            walk_data.num_dirs.fetch_add(1, Ordering::Relaxed);
            walk_entries(dir, read_dir, depth, walk_data)
        }
        Err(error) => {
            walk_data.skip(dir, &error);
            Vec::new()
        }
    }
}

/// Walks the entries of one directory whose files sit at `depth`.
fn walk_entries(
    dir: &Path,
    read_dir: fs::ReadDir,
    depth: usize,
    walk_data: &WalkData,
) -> Vec<FileEntry> {
    let entries: Vec<fs::DirEntry> = read_dir
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(error) => {
                walk_data.skip(dir, &error);
                None
            }
        })
        .collect();

    entries
        .into_par_iter()
        .flat_map_iter(|entry| walk_entry(entry, depth, walk_data))
        .collect()
}

fn walk_entry(entry: fs::DirEntry, depth: usize, walk_data: &WalkData) -> Vec<FileEntry> {
    let path = entry.path();
    if walk_data.options.should_ignore(&path) {
        return Vec::new();
    }

    // Does not follow symlinks.
    let file_type = match entry.file_type() {
        Ok(file_type) => file_type,
        Err(error) => {
            walk_data.skip(&path, &error);
            return Vec::new();
        }
    };

    if file_type.is_dir() {
        if !walk_data.options.within_depth(depth + 1) {
            return Vec::new();
        }
        return walk_dir(&path, depth + 1, walk_data);
    }

    if !file_type.is_file() {
        return Vec::new();
    }

    let metadata = match entry.metadata() {
        Ok(metadata) => metadata,
        Err(error) => {
            walk_data.skip(&path, &error);
            return Vec::new();
        }
    };

    walk_data.num_files.fetch_add(1, Ordering::Relaxed);
    vec![FileEntry {
        name: entry.file_name().to_string_lossy().into_owned(),
        size: metadata.len(),
        path,
    }]
}
