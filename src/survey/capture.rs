use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::browser::driver::{CaptureTarget, Driver};
use crate::browser::error::DriverError;
use crate::survey::model::FieldRecord;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("cannot create capture directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Driver(#[from] DriverError),
}

/// `<dir>/page-<index>/`
pub fn page_dir(dir: &Path, page_index: usize) -> PathBuf {
    dir.join(format!("page-{}", page_index))
}

/// Screenshot of one question container.
pub fn capture_field(
    driver: &mut dyn Driver,
    dir: &Path,
    page_index: usize,
    field: &FieldRecord,
) -> Result<PathBuf, CaptureError> {
    let name = if field.question_number.is_empty() {
        format!("field-{}", file_stem(&field.question_text))
    } else {
        format!("q-{}", file_stem(&field.question_number))
    };
    let path = prepare(dir, page_index)?.join(format!("{}.png", name));
    driver.screenshot(&CaptureTarget::Element(field.container_selector.clone()), &path)?;
    Ok(path)
}

/// Full-page screenshot taken right before navigating away.
pub fn capture_page(
    driver: &mut dyn Driver,
    dir: &Path,
    page_index: usize,
) -> Result<PathBuf, CaptureError> {
    let path = prepare(dir, page_index)?.join("page.png");
    driver.screenshot(&CaptureTarget::FullPage, &path)?;
    Ok(path)
}

fn prepare(dir: &Path, page_index: usize) -> Result<PathBuf, CaptureError> {
    let path = page_dir(dir, page_index);
    std::fs::create_dir_all(&path).map_err(|e| CaptureError::Directory {
        path: path.clone(),
        source: e,
    })?;
    Ok(path)
}

/// Filesystem-safe, bounded-length stem.
pub fn file_stem(text: &str) -> String {
    let stem: String = text
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    let stem = stem
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    let stem: String = stem.chars().take(40).collect();
    if stem.is_empty() { "unnamed".to_string() } else { stem }
}
