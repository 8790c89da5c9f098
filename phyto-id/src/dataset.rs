//! Dataset discovery
//!
//! A dataset is a directory with one sub-folder per sample. The folder name
//! becomes the sample name and the photos are the image files directly inside
//! it, in file-name order. The photo count is not checked here; the workflow
//! reports wrong counts per sample.

use crate::types::{Photo, Sample};
use phyto_common::config::AssistantConfig;
use phyto_common::{Error, Result};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Which folders and files make up the dataset
#[derive(Debug, Clone)]
pub struct DatasetOptions {
    /// Photo extension without the dot, matched case-insensitively
    pub image_extension: String,
    /// Folder names never treated as samples
    pub skip_folders: Vec<String>,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self::from(&AssistantConfig::default())
    }
}

impl From<&AssistantConfig> for DatasetOptions {
    fn from(config: &AssistantConfig) -> Self {
        Self {
            image_extension: config.image_extension.trim_start_matches('.').to_string(),
            skip_folders: config.skip_folders.clone(),
        }
    }
}

/// Collect samples from the dataset root, sorted by name
pub fn scan_dataset(root: &Path, options: &DatasetOptions) -> Result<Vec<Sample>> {
    if !root.exists() {
        return Err(Error::NotFound(format!("Dataset not found: {}", root.display())));
    }
    if !root.is_dir() {
        return Err(Error::InvalidInput(format!(
            "Dataset is not a directory: {}",
            root.display()
        )));
    }

    let mut samples = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Error accessing dataset entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if options.skip_folders.iter().any(|skip| *skip == name) {
            debug!(folder = %name, "Skipping folder");
            continue;
        }

        let photos = scan_photos(entry.path(), options);
        debug!(sample = %name, photos = photos.len(), "Discovered sample");
        samples.push(Sample::new(name, photos));
    }

    Ok(samples)
}

fn scan_photos(folder: &Path, options: &DatasetOptions) -> Vec<Photo> {
    WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Error accessing photo entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && has_extension(entry, &options.image_extension))
        .map(|entry| Photo::File(entry.into_path()))
        .collect()
}

fn has_extension(entry: &DirEntry, extension: &str) -> bool {
    entry
        .path()
        .extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::write(path, b"jpeg").unwrap();
    }

    #[test]
    fn test_scan_dataset_layout() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        let rose = root.join("rose");
        fs::create_dir(&rose).unwrap();
        touch(&rose.join("c.jpg"));
        touch(&rose.join("a.JPG"));
        touch(&rose.join("b.jpg"));
        touch(&rose.join("notes.txt"));

        let fern = root.join("fern");
        fs::create_dir(&fern).unwrap();
        touch(&fern.join("1.jpg"));

        fs::create_dir(root.join("answers")).unwrap();
        touch(&root.join("answers").join("x.jpg"));
        touch(&root.join("README.md"));

        let samples = scan_dataset(root, &DatasetOptions::default()).unwrap();

        let names: Vec<&str> = samples.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["fern", "rose"]);

        let rose_files: Vec<String> = samples[1].photos.iter().map(Photo::file_name).collect();
        assert_eq!(rose_files, vec!["a.JPG", "b.jpg", "c.jpg"]);
        assert_eq!(samples[0].photos.len(), 1);
    }

    #[test]
    fn test_scan_missing_dataset() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        assert!(matches!(
            scan_dataset(&missing, &DatasetOptions::default()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_scan_file_instead_of_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file.jpg");
        touch(&file);
        assert!(matches!(
            scan_dataset(&file, &DatasetOptions::default()),
            Err(Error::InvalidInput(_))
        ));
    }
}
