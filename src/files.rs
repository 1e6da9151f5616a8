//! Sidecar files written next to a work's contents.

use crate::{Result, Work};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

pub const DESCRIPTION_FILE: &str = "dlsite-description.txt";
pub const TRACKLIST_FILE: &str = "dlsite-tracklist.txt";

/// Write the description and tracklist of `work` into `dir`.
///
/// A file is skipped when the work has no such field or when the file is
/// already there. Existing files are never overwritten.
pub fn add_work_files(work: &Work, dir: &Path) -> Result<()> {
    if let Some(description) = &work.description {
        write_new(&dir.join(DESCRIPTION_FILE), description)?;
    }
    if let Some(tracklist) = &work.tracklist {
        let contents: String = tracklist
            .iter()
            .map(|track| format!("{} {}\n", track.name, track.text))
            .collect();
        write_new(&dir.join(TRACKLIST_FILE), &contents)?;
    }
    Ok(())
}

fn write_new(path: &Path, contents: &str) -> Result<()> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            log::debug!("{} exists, leaving it alone", path.display());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    log::info!("Writing {}", path.display());
    file.write_all(contents.as_bytes())?;
    Ok(())
}
