use crate::config::path_template::SiteDirectories;
use crate::config::types::Config;
use log::warn;
use regex::Regex;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 啟動時的設定錯誤，發生時不處理任何影片
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("無法讀取設定檔 {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("無法解析設定檔: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("設定缺少必要欄位: {0}")]
    MissingField(&'static str),

    #[error("設定欄位 {field} 無效: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("目錄不存在: {0}")]
    DirectoryMissing(PathBuf),

    #[error("目錄無法讀取 {path}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Config {
    /// 讀取並驗證設定檔
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse_json(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// 檢查必要欄位與實體目錄
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.directories.src.is_empty() {
            return Err(ConfigError::MissingField("directories.src"));
        }
        if self.directories.news.is_empty() {
            return Err(ConfigError::MissingField("directories.news"));
        }
        if self.directories.final_dst.is_empty() {
            return Err(ConfigError::MissingField("directories.final_dst"));
        }
        if self.directories.tmp_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("directories.tmp_dir"));
        }
        if self.vtt_filename.trim().is_empty() {
            return Err(ConfigError::MissingField("vtt_filename"));
        }
        if self
            .source_candidates
            .first()
            .is_none_or(|name| name.trim().is_empty())
        {
            return Err(ConfigError::MissingField("source_candidates"));
        }

        self.validate_tile_grid()?;

        Regex::new(&self.catalog.movie_id_pattern).map_err(|e| ConfigError::InvalidField {
            field: "catalog.movie_id_pattern",
            reason: e.to_string(),
        })?;

        for site in &self.sites {
            let dirs = SiteDirectories::resolve(&self.directories, site);
            if !dirs.src_root.exists() {
                return Err(ConfigError::DirectoryMissing(dirs.src_root));
            }
        }

        match fs::read_dir(&self.directories.tmp_dir) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ConfigError::DirectoryMissing(
                self.directories.tmp_dir.clone(),
            )),
            Err(source) => Err(ConfigError::DirectoryUnreadable {
                path: self.directories.tmp_dir.clone(),
                source,
            }),
        }
    }

    fn validate_tile_grid(&self) -> Result<(), ConfigError> {
        let grid = &self.tile_grid;
        if grid.x.is_empty() || grid.y.is_empty() {
            return Err(ConfigError::InvalidField {
                field: "tile_grid",
                reason: "x 與 y 位移清單不可為空".to_string(),
            });
        }
        if grid.width == 0 || grid.height == 0 {
            return Err(ConfigError::InvalidField {
                field: "tile_grid",
                reason: "格子寬高必須大於 0".to_string(),
            });
        }
        if grid.number_of_tiles != 0 && grid.number_of_tiles != grid.cells_per_tile() {
            warn!(
                "tile_grid.number_of_tiles ({}) 與位移清單組合數 ({}) 不一致",
                grid.number_of_tiles,
                grid.cells_per_tile()
            );
        }
        Ok(())
    }
}
