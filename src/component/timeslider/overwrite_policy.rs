use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwriteDecision {
    /// 既有輸出不完整或比來源舊
    Regenerate,
    /// VTT 檔比來源新
    UpToDate,
}

impl fmt::Display for OverwriteDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regenerate => write!(f, "需要重新產生"),
            Self::UpToDate => write!(f, "已是最新"),
        }
    }
}

/// 無法判斷時的錯誤，呼叫端應視為不需重新產生
#[derive(Debug, Error)]
pub enum OverwriteCheckError {
    #[error("無法讀取發佈目錄 {path}: {source}")]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("無法讀取來源檔 {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 比對發佈目錄中的 VTT 檔與代表圖，判斷是否需要重新產生
pub fn check_overwrite(
    src_file: &Path,
    dst: &Path,
    vtt_filename: &str,
    image_filename: &str,
) -> Result<OverwriteDecision, OverwriteCheckError> {
    let destination_error = |source: std::io::Error| OverwriteCheckError::Destination {
        path: dst.to_path_buf(),
        source,
    };

    let mut vtt_modified: Option<SystemTime> = None;
    let mut has_image = false;

    for entry in fs::read_dir(dst).map_err(destination_error)? {
        let entry = entry.map_err(destination_error)?;
        let name = entry.file_name();
        if name == vtt_filename {
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .map_err(destination_error)?;
            vtt_modified = Some(modified);
        } else if name == image_filename {
            has_image = true;
        }
    }

    let Some(vtt_modified) = vtt_modified.filter(|_| has_image) else {
        return Ok(OverwriteDecision::Regenerate);
    };

    let src_modified = fs::metadata(src_file)
        .and_then(|m| m.modified())
        .map_err(|source| OverwriteCheckError::Source {
            path: src_file.to_path_buf(),
            source,
        })?;

    Ok(decide(vtt_modified, src_modified))
}

/// VTT 檔嚴格晚於來源才算最新
#[must_use]
pub fn decide(vtt_modified: SystemTime, src_modified: SystemTime) -> OverwriteDecision {
    if vtt_modified > src_modified {
        OverwriteDecision::UpToDate
    } else {
        OverwriteDecision::Regenerate
    }
}
