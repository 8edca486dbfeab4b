//! WebVTT 縮圖索引產生
//!
//! 將影片長度切成 10 秒一段，每段對應到某張 tile 圖中的一個格子：
//!
//! ```text
//! WEBVTT
//!
//! 00:00:00.000 --> 00:00:10.000
//! output001.jpg#xywh=162,0,162,90
//!
//! ```

use super::error::TimesliderError;
use crate::config::TileGridSpec;
use log::debug;
use regex::Regex;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::LazyLock;

pub const VTT_HEADER: &str = "WEBVTT\n\n";

/// 每個時間區段的長度（秒）
pub const BUCKET_SECONDS: u64 = 10;

static REGEX_TILE_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^output\d+\.jpg$").expect("Invalid regex"));

/// tile 圖中的一個格子
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionDescriptor {
    pub tile_file: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for RegionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#xywh={},{},{},{}",
            self.tile_file, self.x, self.y, self.width, self.height
        )
    }
}

/// 一個時間區段 `[start, end)` 與對應的格子
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueEntry<'a> {
    pub start_seconds: u64,
    pub end_seconds: u64,
    pub region: &'a RegionDescriptor,
}

/// ffmpeg `output%03d.jpg` 產生的檔名，從 1 開始
#[must_use]
pub fn tile_image_name(index: usize) -> String {
    format!("output{index:03}.jpg")
}

/// 依 tile 圖順序展開所有格子，每張圖內 Y 為外層、X 為內層
#[must_use]
pub fn build_region_descriptors(tile_count: usize, grid: &TileGridSpec) -> Vec<RegionDescriptor> {
    let mut descriptors = Vec::with_capacity(tile_count * grid.cells_per_tile());

    for tile in 1..=tile_count {
        let tile_file = tile_image_name(tile);
        for &y in &grid.y {
            for &x in &grid.x {
                descriptors.push(RegionDescriptor {
                    tile_file: tile_file.clone(),
                    x,
                    y,
                    width: grid.width,
                    height: grid.height,
                });
            }
        }
    }

    descriptors
}

/// `floor(duration / 10)`，無效長度視為 0
#[must_use]
pub fn bucket_count(duration_seconds: f64) -> usize {
    if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
        return 0;
    }
    (duration_seconds / BUCKET_SECONDS as f64).floor() as usize
}

/// 格式化為 `H:MM:SS.000`，小時前固定補一個 0 且不限制寬度
#[must_use]
pub fn format_timestamp(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("0{hours}:{minutes:02}:{secs:02}.000")
}

/// 第 i 個區段（從 1 起算）對應 `descriptors[i]`，第一個格子不會被引用。
/// 格子不足時提前結束。
#[must_use]
pub fn build_cue_entries(descriptors: &[RegionDescriptor], duration_seconds: f64) -> Vec<CueEntry<'_>> {
    let buckets = bucket_count(duration_seconds);
    let mut entries = Vec::with_capacity(buckets.min(descriptors.len()));

    for bucket in 1..=buckets {
        let Some(region) = descriptors.get(bucket) else {
            debug!("格子數不足，停在第 {bucket} 個區段 (共 {buckets} 段)");
            break;
        };
        let bucket = bucket as u64;
        entries.push(CueEntry {
            start_seconds: BUCKET_SECONDS * (bucket - 1),
            end_seconds: BUCKET_SECONDS * bucket,
            region,
        });
    }

    entries
}

#[must_use]
pub fn render_vtt(entries: &[CueEntry<'_>]) -> String {
    let mut document = String::from(VTT_HEADER);
    for entry in entries {
        document.push_str(&format!(
            "{} --> {}\n{}\n\n",
            format_timestamp(entry.start_seconds),
            format_timestamp(entry.end_seconds),
            entry.region
        ));
    }
    document
}

/// 計算目錄中 `output<數字>.jpg` 的數量
pub fn count_tile_images(dir: &Path) -> Result<usize, TimesliderError> {
    let entries = fs::read_dir(dir).map_err(|e| TimesliderError::io("讀取縮圖目錄", dir, e))?;

    let mut count = 0;
    for entry in entries {
        let entry = entry.map_err(|e| TimesliderError::io("讀取縮圖目錄", dir, e))?;
        if REGEX_TILE_IMAGE.is_match(&entry.file_name().to_string_lossy()) {
            count += 1;
        }
    }
    Ok(count)
}

/// 依目錄中的 tile 圖產生 VTT 檔，回傳寫入的區段數
pub fn write_vtt_file(
    dir: &Path,
    duration_seconds: f64,
    grid: &TileGridSpec,
    vtt_filename: &str,
) -> Result<usize, TimesliderError> {
    let tile_count = count_tile_images(dir)?;
    if tile_count == 0 {
        return Err(TimesliderError::NoThumbnails(dir.to_path_buf()));
    }

    let descriptors = build_region_descriptors(tile_count, grid);
    let entries = build_cue_entries(&descriptors, duration_seconds);
    debug!(
        "tile 圖 {tile_count} 張，格子 {} 個，區段 {} 個",
        descriptors.len(),
        entries.len()
    );

    let path = dir.join(vtt_filename);
    let file = File::create(&path).map_err(|e| TimesliderError::io("建立 VTT 檔", &path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(render_vtt(&entries).as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|e| TimesliderError::io("寫入 VTT 檔", &path, e))?;

    Ok(entries.len())
}
