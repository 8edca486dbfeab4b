use crate::config::path_template::PathTemplate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 預設穩定時間窗：來源檔最後修改後須經過 10 分鐘才視為完整
pub const DEFAULT_STABILITY_WINDOW_SECS: u64 = 600;
pub const DEFAULT_RETRY: u32 = 3;
pub const DEFAULT_MOVIE_ID_PATTERN: &str = "^[A-Za-z0-9_-]+$";

/// 各站點共用的目錄樣板，`%site` 會被替換為站點路徑或名稱
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Directories {
    /// 來源根目錄，例如 `/data/www/%site/member/`
    pub src: PathTemplate,
    /// 編碼完成目錄，例如 `/data/auto/encoder/finished/%site/`
    pub news: PathTemplate,
    /// 正式發佈目錄，例如 `/www/%site/html/member/ts/`
    pub final_dst: PathTemplate,
    /// 暫存工作目錄
    pub tmp_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub site_name: String,
    pub site_path: String,
    pub site_id: u32,
    /// force 模式下要強制重新產生的影片 ID
    #[serde(default)]
    pub movie_ids: Vec<String>,
}

/// 縮圖網格設定：每張 tile 圖內的格子位置與尺寸
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TileGridSpec {
    /// 可省略，實際格子數以 x × y 為準
    #[serde(default)]
    pub number_of_tiles: usize,
    pub width: u32,
    pub height: u32,
    pub x: Vec<u32>,
    pub y: Vec<u32>,
}

impl TileGridSpec {
    #[must_use]
    pub fn cells_per_tile(&self) -> usize {
        self.x.len() * self.y.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThumbnailerOptions {
    #[serde(default = "default_ffmpeg_program")]
    pub program: String,
    /// ffmpeg scale 濾鏡參數，例如 `162:90`
    pub scale: String,
    /// ffmpeg tile 濾鏡參數，例如 `5x5`
    pub tile: String,
    /// 未設定時等待 ffmpeg 執行完畢
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ThumbnailerOptions {
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaProbeOptions {
    #[serde(default = "default_ffprobe_program")]
    pub program: String,
}

impl Default for MediaProbeOptions {
    fn default() -> Self {
        Self {
            program: default_ffprobe_program(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogOptions {
    #[serde(default = "default_movie_id_pattern")]
    pub movie_id_pattern: String,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            movie_id_pattern: default_movie_id_pattern(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub directories: Directories,
    /// 依優先順序排列的來源檔名（高解析度在前）
    pub source_candidates: Vec<String>,
    pub vtt_filename: String,
    /// 用來判斷既有輸出是否完整的代表圖檔名
    pub image_filename: String,
    #[serde(default = "default_stability_window_secs")]
    pub stability_window_secs: u64,
    #[serde(default = "default_retry")]
    pub retry: u32,
    #[serde(default)]
    pub sites: Vec<SiteConfig>,
    pub tile_grid: TileGridSpec,
    pub thumbnailer: ThumbnailerOptions,
    #[serde(default)]
    pub media_probe: MediaProbeOptions,
    #[serde(default)]
    pub catalog: CatalogOptions,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    #[must_use]
    pub const fn stability_window(&self) -> Duration {
        Duration::from_secs(self.stability_window_secs)
    }
}

fn default_ffmpeg_program() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_program() -> String {
    "ffprobe".to_string()
}

fn default_movie_id_pattern() -> String {
    DEFAULT_MOVIE_ID_PATTERN.to_string()
}

const fn default_stability_window_secs() -> u64 {
    DEFAULT_STABILITY_WINDOW_SECS
}

const fn default_retry() -> u32 {
    DEFAULT_RETRY
}

fn default_log_level() -> String {
    "info".to_string()
}
