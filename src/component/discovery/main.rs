use super::catalog::MovieCatalog;
use crate::config::{SiteConfig, SiteDirectories};
use log::{debug, info, warn};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use walkdir::WalkDir;

/// 本次執行要處理的影片範圍
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    /// 來源目錄下的所有影片
    Full,
    /// 編碼完成目錄中的新影片
    News,
    /// 設定檔指定的影片
    Force,
}

impl TargetMode {
    /// force 模式不檢查既有輸出
    #[must_use]
    pub const fn checks_existing_output(self) -> bool {
        matches!(self, Self::Full | Self::News)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("未知的 target: {0}")]
pub struct UnknownTargetMode(pub String);

impl FromStr for TargetMode {
    type Err = UnknownTargetMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "news" => Ok(Self::News),
            "force" => Ok(Self::Force),
            other => Err(UnknownTargetMode(other.to_string())),
        }
    }
}

impl fmt::Display for TargetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Full => "full",
            Self::News => "news",
            Self::Force => "force",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("無法列出目錄 {path}: {source}")]
    Listing {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// 列出站點中需要處理的影片 ID
///
/// 目錄無法讀取時回傳錯誤，由呼叫端略過該站點。
pub fn discover_movies(
    mode: TargetMode,
    site: &SiteConfig,
    dirs: &SiteDirectories,
    catalog: &dyn MovieCatalog,
) -> Result<Vec<String>, DiscoveryError> {
    match mode {
        TargetMode::Full => list_entries(&dirs.src_root),
        TargetMode::News => {
            let entries = list_entries(&dirs.news_root)?;
            Ok(entries
                .into_iter()
                .filter(|name| match catalog.is_known_movie(site.site_id, name) {
                    Ok(()) => true,
                    Err(e) => {
                        info!("不是有效的影片 ID，略過: {name} ({e})");
                        false
                    }
                })
                .collect())
        }
        TargetMode::Force => Ok(forced_movies(site, &dirs.src_root)),
    }
}

/// 只列出第一層項目名稱，依名稱排序
fn list_entries(root: &Path) -> Result<Vec<String>, DiscoveryError> {
    let entries = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().to_string()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| DiscoveryError::Listing {
            path: root.to_path_buf(),
            source,
        })?;

    debug!("{} 共 {} 個項目", root.display(), entries.len());
    Ok(entries)
}

/// 逐一確認指定影片的來源資料夾，不列出目錄
fn forced_movies(site: &SiteConfig, src_root: &Path) -> Vec<String> {
    site.movie_ids
        .iter()
        .filter(|movie_id| {
            let path = src_root.join(movie_id.as_str());
            match path.metadata() {
                Ok(_) => true,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    warn!("找不到指定影片的來源: {} ({e})", path.display());
                    false
                }
                Err(e) => {
                    warn!("無法讀取指定影片的來源: {} ({e})", path.display());
                    false
                }
            }
        })
        .cloned()
        .collect()
}
