//! 批次執行元件
//!
//! 逐站點探索影片，為每部影片產生縮圖時間軸，最後重試失敗的影片

mod main;
mod retry;

pub use main::{BatchRunner, BatchSummary, print_summary};
pub use retry::{RetryQueue, RetryQueueEntry, RetryReport};
