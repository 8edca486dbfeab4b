use crate::component::timeslider::TimesliderError;
use log::{error, info, warn};
use std::path::{Path, PathBuf};

/// 失敗的影片，只存在於單次執行中
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryQueueEntry {
    pub source: PathBuf,
    pub final_dst: PathBuf,
    pub attempts: u32,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RetryReport {
    pub recovered: Vec<RetryQueueEntry>,
    pub permanently_failed: Vec<RetryQueueEntry>,
}

#[derive(Debug, Default)]
pub struct RetryQueue {
    entries: Vec<RetryQueueEntry>,
}

impl RetryQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: &Path, final_dst: &Path) {
        self.entries.push(RetryQueueEntry {
            source: source.to_path_buf(),
            final_dst: final_dst.to_path_buf(),
            attempts: 0,
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 每個項目最多重試 `max_attempts` 次，成功即停止
    pub fn run<F>(self, max_attempts: u32, mut attempt: F) -> RetryReport
    where
        F: FnMut(&Path, &Path) -> Result<(), TimesliderError>,
    {
        let mut report = RetryReport::default();

        if self.entries.is_empty() {
            info!("沒有需要重試的影片");
            return report;
        }

        for mut entry in self.entries {
            let mut succeeded = false;

            while entry.attempts < max_attempts {
                entry.attempts += 1;
                match attempt(&entry.source, &entry.final_dst) {
                    Ok(()) => {
                        info!(
                            "重試成功 (第 {} 次): {}",
                            entry.attempts,
                            entry.source.display()
                        );
                        succeeded = true;
                        break;
                    }
                    Err(e) => {
                        warn!(
                            "重試失敗 (第 {}/{max_attempts} 次): {} - {e}",
                            entry.attempts,
                            entry.source.display()
                        );
                    }
                }
            }

            if succeeded {
                report.recovered.push(entry);
            } else {
                error!(
                    "重試 {} 次後仍失敗，放棄: {} -> {}",
                    entry.attempts,
                    entry.source.display(),
                    entry.final_dst.display()
                );
                report.permanently_failed.push(entry);
            }
        }

        report
    }
}
