//! On-disk storage of uploaded source files.
//!
//! Files live at `<upload_dir>/<owner>/<task_id>_<file_name>`. Path
//! components supplied by the client are reduced to a single safe segment.

use std::path::{Path, PathBuf};

/// Reduce a client-supplied name to one path segment.
///
/// Directory parts are dropped and anything outside `[A-Za-z0-9._@-]` is
/// replaced with `_`. Empty or dot-only results become `"upload"`.
pub fn sanitize_segment(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '@') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Where the source file of a task is stored.
pub fn source_path(upload_dir: &Path, owner: &str, task_id: &str, file_name: &str) -> PathBuf {
    upload_dir
        .join(sanitize_segment(owner))
        .join(format!("{task_id}_{}", sanitize_segment(file_name)))
}

/// Write an uploaded file, creating the owner's directory as needed.
pub async fn save_upload(path: &Path, data: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, data).await
}

/// Remove a stored source file. A file that is already gone is not an error.
pub async fn delete_upload(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_directories_and_unsafe_characters() {
        assert_eq!(sanitize_segment("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_segment("C:\\temp\\my photo.png"), "my_photo.png");
        assert_eq!(sanitize_segment("a@example.com"), "a@example.com");
        assert_eq!(sanitize_segment(".."), "upload");
    }

    #[test]
    fn source_path_layout() {
        let path = source_path(Path::new("/data"), "a@example.com", "t1", "clip.mp4");
        assert_eq!(path, PathBuf::from("/data/a@example.com/t1_clip.mp4"));
    }

    #[tokio::test]
    async fn save_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let path = source_path(dir.path(), "a@example.com", "t1", "x.png");

        save_upload(&path, b"bytes").await.unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"bytes");

        delete_upload(&path).await.unwrap();
        assert!(!path.exists());
        delete_upload(&path).await.unwrap();
    }
}
