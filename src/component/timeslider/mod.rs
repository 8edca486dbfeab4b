//! 縮圖時間軸產生元件
//!
//! 單一影片的處理流程：
//! A. 選取穩定的來源檔
//! B. 判斷既有輸出是否需要覆寫
//! C. 以 ffmpeg 產生 tile 圖
//! D. 產生 WebVTT 索引
//! E. 複製到發佈目錄並清理暫存目錄

mod error;
mod main;
mod overwrite_policy;
mod publisher;
mod source_selector;
mod tile_generator;
mod vtt_writer;

pub use error::TimesliderError;
pub use main::{GenerationJob, JobStage, Timeslider, TimesliderSettings};
pub use overwrite_policy::{OverwriteCheckError, OverwriteDecision, check_overwrite, decide};
pub use publisher::publish;
pub use source_selector::{find_source_file, is_stable};
pub use tile_generator::{FfmpegThumbnailer, TILE_OUTPUT_PATTERN, Thumbnailer, sampling_rate};
pub use vtt_writer::{
    BUCKET_SECONDS, CueEntry, RegionDescriptor, VTT_HEADER, build_cue_entries,
    build_region_descriptors, bucket_count, count_tile_images, format_timestamp, render_vtt,
    tile_image_name, write_vtt_file,
};
