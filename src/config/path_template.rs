use crate::config::types::{Directories, SiteConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const SITE_PLACEHOLDER: &str = "%site";

/// 含 `%site` 佔位符的路徑樣板
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathTemplate(String);

impl PathTemplate {
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// 只替換第一個佔位符
    #[must_use]
    pub fn resolve(&self, value: &str) -> PathBuf {
        PathBuf::from(self.0.replacen(SITE_PLACEHOLDER, value, 1))
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 單一站點已解析完成的目錄
///
/// 來源與 news 目錄使用 `site_path`，發佈目錄使用 `site_name`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteDirectories {
    pub src_root: PathBuf,
    pub news_root: PathBuf,
    pub final_root: PathBuf,
}

impl SiteDirectories {
    #[must_use]
    pub fn resolve(directories: &Directories, site: &SiteConfig) -> Self {
        Self {
            src_root: directories.src.resolve(&site.site_path),
            news_root: directories.news.resolve(&site.site_path),
            final_root: directories.final_dst.resolve(&site.site_name),
        }
    }

    #[must_use]
    pub fn source_dir(&self, movie_id: &str) -> PathBuf {
        self.src_root.join(movie_id)
    }

    #[must_use]
    pub fn final_dir(&self, movie_id: &str) -> PathBuf {
        self.final_root.join(movie_id)
    }
}
