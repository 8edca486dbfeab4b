use super::error::TimesliderError;
use crate::tools::ensure_directory_exists;
use log::debug;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// 將暫存目錄中的所有檔案複製到發佈目錄，回傳複製的檔案數
///
/// VTT 檔最後複製：中途失敗時發佈目錄不會出現看似完整的輸出。
/// 不刪除暫存目錄。
pub fn publish(
    tmp_dir: &Path,
    final_dst: &Path,
    vtt_filename: &str,
) -> Result<usize, TimesliderError> {
    let entries =
        fs::read_dir(tmp_dir).map_err(|e| TimesliderError::io("讀取暫存目錄", tmp_dir, e))?;

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| TimesliderError::io("讀取暫存目錄", tmp_dir, e))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort_by_key(|path| {
        let is_vtt = path.file_name().is_some_and(|name| name == vtt_filename);
        (is_vtt, path.clone())
    });

    ensure_directory_exists(final_dst)
        .map_err(|e| TimesliderError::io("建立發佈目錄", final_dst, e))?;

    let mut copied = 0;
    for src in &files {
        let Some(name) = src.file_name() else {
            continue;
        };
        let dst = final_dst.join(name);
        copy_file_contents(src, &dst).map_err(|e| TimesliderError::io("複製檔案", src, e))?;
        debug!("已複製 {} -> {}", src.display(), dst.display());
        copied += 1;
    }

    Ok(copied)
}

/// 複製檔案內容並寫入磁碟
fn copy_file_contents(src: &Path, dst: &Path) -> io::Result<()> {
    let mut input = File::open(src)?;
    let mut output = File::create(dst)?;
    io::copy(&mut input, &mut output)?;
    output.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::timeslider::{OverwriteDecision, check_overwrite};
    use tempfile::TempDir;

    #[test]
    fn test_publish_copies_all_files() {
        let temp_dir = TempDir::new().unwrap();
        let tmp = temp_dir.path().join("tmp/123");
        fs::create_dir_all(&tmp).unwrap();
        fs::write(tmp.join("output001.jpg"), b"image-1").unwrap();
        fs::write(tmp.join("thumbnail.vtt"), b"WEBVTT\n\n").unwrap();
        let dst = temp_dir.path().join("www/site/ts/123");

        let copied = publish(&tmp, &dst, "thumbnail.vtt").unwrap();

        assert_eq!(copied, 2);
        assert_eq!(fs::read(dst.join("output001.jpg")).unwrap(), b"image-1");
        assert_eq!(fs::read(dst.join("thumbnail.vtt")).unwrap(), b"WEBVTT\n\n");
        assert!(tmp.join("output001.jpg").exists(), "暫存檔不應被刪除");
    }

    #[test]
    fn test_publish_overwrites_existing_files() {
        let temp_dir = TempDir::new().unwrap();
        let tmp = temp_dir.path().join("tmp");
        let dst = temp_dir.path().join("dst");
        fs::create_dir_all(&tmp).unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(tmp.join("thumbnail.vtt"), b"new").unwrap();
        fs::write(dst.join("thumbnail.vtt"), b"old content").unwrap();

        publish(&tmp, &dst, "thumbnail.vtt").unwrap();

        assert_eq!(fs::read(dst.join("thumbnail.vtt")).unwrap(), b"new");
    }

    #[test]
    fn test_publish_missing_tmp_dir_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let dst = temp_dir.path().join("dst");

        let err =
            publish(&temp_dir.path().join("missing"), &dst, "thumbnail.vtt").unwrap_err();

        assert!(matches!(err, TimesliderError::Io { .. }));
        assert!(!dst.exists());
    }

    #[test]
    fn test_failed_tile_copy_leaves_no_vtt() {
        let temp_dir = TempDir::new().unwrap();
        let tmp = temp_dir.path().join("tmp/123");
        let dst = temp_dir.path().join("www/123");
        fs::create_dir_all(&tmp).unwrap();
        for name in ["output001.jpg", "output002.jpg", "output003.jpg", "thumbnail.vtt"] {
            fs::write(tmp.join(name), name.as_bytes()).unwrap();
        }
        // 目的地同名目錄讓這張 tile 圖無法寫入
        fs::create_dir_all(dst.join("output002.jpg")).unwrap();
        let src = temp_dir.path().join("360p.mp4");
        fs::write(&src, b"mp4").unwrap();

        let err = publish(&tmp, &dst, "thumbnail.vtt").unwrap_err();

        assert!(matches!(err, TimesliderError::Io { .. }));
        assert!(!dst.join("thumbnail.vtt").exists());
        assert_eq!(
            check_overwrite(&src, &dst, "thumbnail.vtt", "output001.jpg").unwrap(),
            OverwriteDecision::Regenerate
        );
    }

    #[test]
    fn test_vtt_is_copied_after_tiles() {
        let temp_dir = TempDir::new().unwrap();
        let tmp = temp_dir.path().join("tmp");
        let dst = temp_dir.path().join("dst");
        fs::create_dir_all(&tmp).unwrap();
        // 名稱排序在 tile 圖之前的 VTT 檔仍須最後複製
        fs::write(tmp.join("a.vtt"), b"WEBVTT\n\n").unwrap();
        fs::write(tmp.join("output001.jpg"), b"image-1").unwrap();
        fs::create_dir_all(dst.join("output001.jpg")).unwrap();

        assert!(publish(&tmp, &dst, "a.vtt").is_err());
        assert!(!dst.join("a.vtt").exists());
    }
}
