use std::path::{Path, PathBuf};

use base64::Engine;
use sha2::{Digest, Sha256};

/// Container name used when an album title sanitizes to nothing.
pub const UNTITLED_ALBUM: &str = "Untitled Album";

/// Clean a filename by removing characters that are invalid on common
/// filesystems: `/`, `\`, `:`, `*`, `?`, `"`, `<`, `>`, `|`.
pub fn clean_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect()
}

/// Turn an album title into a local directory name.
///
/// Keeps ASCII alphanumerics, `-`, `_` and spaces; falls back to
/// [`UNTITLED_ALBUM`] when nothing survives.
pub fn sanitize_album_title(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ' '))
        .collect();
    let trimmed = kept.trim();
    if trimmed.is_empty() {
        UNTITLED_ALBUM.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Seven filename-safe characters derived from the item id.
///
/// Hashing first keeps ids that share a long common prefix apart.
fn id7(id: &str) -> String {
    let digest = Sha256::digest(id.as_bytes());
    base64::engine::general_purpose::URL_SAFE_NO_PAD
        .encode(digest)
        .chars()
        .take(7)
        .collect()
}

/// Insert the item's [`id7`] suffix before the extension:
/// `IMG_0001.JPG` becomes `IMG_0001_<id7>.JPG`.
pub fn apply_name_id7(filename: &str, id: &str) -> String {
    let suffix = id7(id);
    match filename.rfind('.').filter(|&dot| dot > 0) {
        Some(dot) => {
            let (stem, ext) = filename.split_at(dot);
            format!("{}_{}{}", stem, suffix, ext)
        }
        None => format!("{}_{}", filename, suffix),
    }
}

/// Local path an item lands at inside `container`.
///
/// The name carries an id-derived suffix so distinct items sharing a camera
/// filename never map to the same file. Falls back to the item id when the
/// remote filename cleans down to nothing.
pub fn item_target_path(container: &Path, filename: &str, id: &str) -> PathBuf {
    let clean = clean_filename(filename);
    let clean = clean.trim();
    if clean.is_empty() || clean == "." || clean == ".." {
        container.join(clean_filename(id))
    } else {
        container.join(apply_name_id7(clean, id))
    }
}

/// Temp path a download streams into before being renamed into place.
pub fn part_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    target.with_file_name(name)
}

/// Make sure a local container directory exists.
pub async fn ensure_container(path: &Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_filename() {
        assert_eq!(clean_filename("a/b\\c:d*e?f\"g<h>i|j.jpg"), "abcdefghij.jpg");
        assert_eq!(clean_filename("IMG_0001.HEIC"), "IMG_0001.HEIC");
    }

    #[test]
    fn test_sanitize_album_title_strips_punctuation() {
        assert_eq!(sanitize_album_title("Trip!"), "Trip");
        assert_eq!(sanitize_album_title("Summer 2024 - Beach_Day"), "Summer 2024 - Beach_Day");
        assert_eq!(sanitize_album_title("../../etc"), "etc");
    }

    #[test]
    fn test_sanitize_album_title_placeholder() {
        assert_eq!(sanitize_album_title("!!!"), UNTITLED_ALBUM);
        assert_eq!(sanitize_album_title("日本"), UNTITLED_ALBUM);
        assert_eq!(sanitize_album_title("   "), UNTITLED_ALBUM);
    }

    #[test]
    fn test_apply_name_id7() {
        let name = apply_name_id7("IMG_0001.JPG", "ABC123");
        assert!(name.starts_with("IMG_0001_"));
        assert!(name.ends_with(".JPG"));
        assert_eq!(name.len(), "IMG_0001_.JPG".len() + 7);
        assert_eq!(name, apply_name_id7("IMG_0001.JPG", "ABC123"));
    }

    #[test]
    fn test_apply_name_id7_no_extension() {
        let name = apply_name_id7("photo", "XYZ");
        assert_eq!(name, format!("photo_{}", id7("XYZ")));
        let dotfile = apply_name_id7(".hidden", "XYZ");
        assert_eq!(dotfile, format!(".hidden_{}", id7("XYZ")));
    }

    #[test]
    fn test_id7_is_filename_safe() {
        for id in ["AF1QipN-long/id+with=chars", "a", "AF1QipN-long/id+with=chart"] {
            let s = id7(id);
            assert_eq!(s.len(), 7);
            assert!(s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        }
    }

    #[test]
    fn test_item_target_path() {
        let root = Path::new("/photos/Trip");
        assert_eq!(
            item_target_path(root, "IMG_1.jpg", "ID1"),
            root.join(format!("IMG_1_{}.jpg", id7("ID1")))
        );
        assert_eq!(
            item_target_path(root, "", "ID1"),
            PathBuf::from("/photos/Trip/ID1")
        );
        assert_eq!(
            item_target_path(root, "..", "ID2"),
            PathBuf::from("/photos/Trip/ID2")
        );
    }

    #[test]
    fn test_same_filename_different_items_do_not_collide() {
        let root = Path::new("/photos");
        let first = item_target_path(root, "IMG_0001.jpg", "AF1QipFIRST");
        let second = item_target_path(root, "IMG_0001.jpg", "AF1QipSECOND");
        assert_ne!(first, second);
    }

    #[test]
    fn test_part_path() {
        assert_eq!(
            part_path(Path::new("/photos/IMG_1.jpg")),
            PathBuf::from("/photos/IMG_1.jpg.part")
        );
    }
}
