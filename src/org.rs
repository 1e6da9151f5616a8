//! Organizing work directories.
//!
//! A work directory is any directory whose name contains a product code.
//! Organizing moves each of them to the path given by [`Work::path`],
//! relative to the library root, and then removes directories the moves left
//! empty.

use crate::fetcher::WorkFetcher;
use crate::{code, files, DlsiteError, Result, Work};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A directory move, with both paths relative to the library root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathRename {
    pub old: PathBuf,
    pub new: PathBuf,
}

impl PathRename {
    pub fn new(old: impl Into<PathBuf>, new: impl Into<PathBuf>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.old == self.new
    }

    /// Move `root/old` to `root/new`, creating parents of the destination.
    ///
    /// Fails without touching anything if the destination already exists.
    pub fn execute(&self, root: &Path) -> Result<()> {
        let old = root.join(&self.old);
        let new = root.join(&self.new);
        if new.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("destination {} already exists", new.display()),
            )
            .into());
        }
        if let Some(parent) = new.parent() {
            fs::create_dir_all(parent)?;
        }
        log::debug!("Renaming {} to {}", old.display(), new.display());
        fs::rename(&old, &new)?;
        Ok(())
    }
}

/// Find work directories below `root`, recursively.
///
/// Paths are returned relative to `root`, sorted by name. The contents of a
/// work directory are not searched, so a work containing coded
/// subdirectories (bonus material and the like) is returned once.
pub fn find_works(root: &Path) -> Result<Vec<PathBuf>> {
    walk_works(root, usize::MAX)
}

/// Find work directories that are direct children of `root`.
pub fn find_top_level_works(root: &Path) -> Result<Vec<PathBuf>> {
    walk_works(root, 1)
}

fn walk_works(root: &Path, max_depth: usize) -> Result<Vec<PathBuf>> {
    let mut works = Vec::new();
    let mut walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            // The root itself has to be readable
            Err(e) if e.depth() == 0 => return Err(io::Error::from(e).into()),
            Err(e) => {
                log::warn!("Skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        if !code::contains(&entry.file_name().to_string_lossy()) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(io::Error::other)?
            .to_path_buf();
        log::debug!("Found work directory {}", relative.display());
        works.push(relative);
        walker.skip_current_dir();
    }
    Ok(works)
}

/// Work out which renames organize `paths`.
///
/// Directories that are already where they belong produce no rename, so
/// running this on an organized library returns an empty list. Fails with
/// [`DlsiteError::DuplicateDestination`] if two directories would end up at
/// the same path.
pub async fn calculate_path_renames<F>(fetcher: &mut F, paths: &[PathBuf]) -> Result<Vec<PathRename>>
where
    F: WorkFetcher + ?Sized,
{
    let mut renames = Vec::new();
    let mut destinations: HashMap<PathBuf, PathBuf> = HashMap::new();

    for path in paths {
        let work = fetch_for_path(fetcher, path).await?;
        let wanted = work.path();

        if let Some(first) = destinations.get(&wanted) {
            return Err(DlsiteError::DuplicateDestination {
                destination: wanted,
                first: first.clone(),
                second: path.clone(),
            });
        }
        destinations.insert(wanted.clone(), path.clone());

        if *path == wanted {
            log::info!("{} already correct", path.display());
        } else {
            renames.push(PathRename::new(path.clone(), wanted));
        }
    }
    Ok(renames)
}

/// Fetch the work for a directory, using the code in its final segment.
pub async fn fetch_for_path<F>(fetcher: &mut F, path: &Path) -> Result<Work>
where
    F: WorkFetcher + ?Sized,
{
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let code = code::extract(&name)?;
    fetcher.fetch_work(&code).await
}

/// Apply `renames` below `root`.
///
/// In dry-run mode nothing is changed and the renames are only logged.
/// Otherwise the renames are executed in order, stopping at the first
/// failure, and empty directories are removed afterwards.
pub fn apply_renames(root: &Path, renames: &[PathRename], dry_run: bool) -> Result<()> {
    if dry_run {
        for rename in renames {
            log::info!(
                "Would rename {} to {}",
                rename.old.display(),
                rename.new.display()
            );
        }
        return Ok(());
    }

    for rename in renames.iter().filter(|rename| !rename.is_noop()) {
        log::info!(
            "Renaming {} to {}",
            rename.old.display(),
            rename.new.display()
        );
        rename.execute(root)?;
    }
    remove_empty_dirs(root)
}

/// What [`organize`] does besides planning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrganizeOptions {
    /// Look for works below the top level too
    pub recursive: bool,
    /// Only log what would change
    pub dry_run: bool,
    /// Write description and tracklist files into each work
    pub add_descriptions: bool,
}

/// Organize the library below `root` and return the planned renames.
///
/// Finds the works, plans their renames and applies them. With
/// `add_descriptions` the sidecar files are written at each work's new
/// location. A dry run changes nothing at all, sidecar files included.
pub async fn organize<F>(
    fetcher: &mut F,
    root: &Path,
    options: OrganizeOptions,
) -> Result<Vec<PathRename>>
where
    F: WorkFetcher + ?Sized,
{
    let paths = if options.recursive {
        find_works(root)?
    } else {
        find_top_level_works(root)?
    };
    log::info!("Found {} works in {}", paths.len(), root.display());

    let renames = calculate_path_renames(fetcher, &paths).await?;
    apply_renames(root, &renames, options.dry_run)?;

    if options.add_descriptions {
        if options.dry_run {
            log::info!("Dry run, not writing description files");
            return Ok(renames);
        }
        // Sidecar files go to where each work lives after the renames
        for path in renamed_paths(&paths, &renames) {
            let work = fetch_for_path(fetcher, &path).await?;
            files::add_work_files(&work, &root.join(&path))?;
        }
    }
    Ok(renames)
}

/// Remove every empty directory below `root`, deepest first.
///
/// Directories that only contained empty directories are removed as well.
/// `root` itself is kept.
pub fn remove_empty_dirs(root: &Path) -> Result<()> {
    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if fs::read_dir(entry.path())?.next().is_none() {
            log::debug!("Removing empty directory {}", entry.path().display());
            fs::remove_dir(entry.path())?;
        }
    }
    Ok(())
}

/// Map `paths` through `renames`, leaving paths without a rename unchanged.
pub fn renamed_paths(paths: &[PathBuf], renames: &[PathRename]) -> Vec<PathBuf> {
    let renames: HashMap<&Path, &Path> = renames
        .iter()
        .map(|rename| (rename.old.as_path(), rename.new.as_path()))
        .collect();
    paths
        .iter()
        .map(|path| {
            renames
                .get(path.as_path())
                .map_or_else(|| path.clone(), |new| new.to_path_buf())
        })
        .collect()
}
