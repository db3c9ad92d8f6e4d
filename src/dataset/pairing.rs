use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::path::Path;
use walkdir::WalkDir;

/// Names of the regular files directly inside `dir`.
fn file_names(dir: &Path) -> Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| Error::DatasetFolderMissing {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() {
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

/// Filenames present in both the RGB and the thermal folder, sorted.
///
/// Matching is by name only; a shared name is taken to mean the two images show the same scene.
pub fn find_common_filenames(rgb_dir: &Path, thermal_dir: &Path) -> Result<Vec<String>> {
    let rgb_files = file_names(rgb_dir)?;
    let thermal_files = file_names(thermal_dir)?;
    log::debug!(
        "{} rgb files, {} thermal files",
        rgb_files.len(),
        thermal_files.len()
    );
    Ok(rgb_files.intersection(&thermal_files).cloned().collect())
}
