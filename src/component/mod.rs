//! 功能元件模組
//!
//! 每個子模組實現一個獨立的功能，包含主要邏輯和專用工具

pub mod batch_runner;
pub mod discovery;
pub mod timeslider;

pub use batch_runner::{BatchRunner, BatchSummary};
pub use discovery::TargetMode;
pub use timeslider::Timeslider;
