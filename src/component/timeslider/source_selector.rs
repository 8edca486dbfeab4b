use log::{debug, info, warn};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// 依優先順序尋找可用的來源檔
///
/// 回傳第一個存在且最後修改時間早於 `now - stability_window` 的檔案。
/// 找不到時回傳 `None`，代表目前還不需要處理。
pub fn find_source_file(
    source_dir: &Path,
    candidates: &[String],
    stability_window: Duration,
    now: SystemTime,
) -> Option<PathBuf> {
    for candidate in candidates {
        let path = source_dir.join(candidate);

        let metadata = match path.metadata() {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => {
                warn!("無法讀取來源檔 {}: {e}", path.display());
                continue;
            }
        };

        let modified = match metadata.modified() {
            Ok(modified) => modified,
            Err(e) => {
                warn!("無法取得來源檔修改時間 {}: {e}", path.display());
                continue;
            }
        };

        if is_stable(modified, stability_window, now) {
            debug!("來源檔可用: {}", path.display());
            return Some(path);
        }

        info!("來源檔尚未完成寫入: {}", path.display());
    }

    None
}

/// 修改時間加上穩定時間窗不晚於現在即視為穩定
#[must_use]
pub fn is_stable(modified: SystemTime, stability_window: Duration, now: SystemTime) -> bool {
    modified
        .checked_add(stability_window)
        .is_some_and(|ready_at| ready_at <= now)
}
