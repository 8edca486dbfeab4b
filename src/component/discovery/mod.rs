//! 影片探索元件
//!
//! 依 target 模式列出每個站點需要處理的影片 ID

mod catalog;
mod main;

pub use catalog::{MovieCatalog, PatternCatalog};
pub use main::{DiscoveryError, TargetMode, UnknownTargetMode, discover_movies};
