/// Track library scanning
use crate::error::{MusicBoxError, Result};
use std::path::{Path, PathBuf};

/// Collect playable tracks directly inside `dir`
///
/// Only regular files whose extension (case-insensitive) is in `extensions`
/// are kept. Subdirectories are not descended into. Tracks are sorted by
/// file name.
pub fn scan_tracks(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut tracks = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() {
            continue;
        }
        if has_extension(&path, extensions) {
            tracks.push(path);
        } else {
            tracing::debug!("Skipping {}", path.display());
        }
    }

    if tracks.is_empty() {
        return Err(MusicBoxError::EmptyLibrary(dir.display().to_string()));
    }

    tracks.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    tracing::info!("Found {} tracks in {}", tracks.len(), dir.display());
    Ok(tracks)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
}
