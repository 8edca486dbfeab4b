use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// 單一影片產生流程的錯誤，發生時會排入重試佇列
#[derive(Debug, Error)]
pub enum TimesliderError {
    #[error("{action} 失敗 {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("無法取得影片資訊 {path}: {message}")]
    MediaProbe { path: PathBuf, message: String },

    #[error("無法執行縮圖程式 {program}: {source}")]
    ThumbnailerSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("縮圖程式執行失敗 (exit code {code:?}): {stderr}")]
    ThumbnailerFailed { code: Option<i32>, stderr: String },

    #[error("縮圖程式逾時 ({timeout:?})")]
    ThumbnailerTimeout { timeout: Duration },

    #[error("沒有產生任何縮圖: {0}")]
    NoThumbnails(PathBuf),

    #[error("無法從來源路徑取得影片 ID: {0}")]
    InvalidSource(PathBuf),
}

impl TimesliderError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
