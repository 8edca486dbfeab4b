use super::retry::{RetryQueue, RetryReport};
use crate::component::discovery::{MovieCatalog, PatternCatalog, TargetMode, discover_movies};
use crate::component::timeslider::{OverwriteDecision, Timeslider, check_overwrite, find_source_file};
use crate::config::{Config, ConfigError, SiteConfig, SiteDirectories};
use console::style;
use log::{info, warn};
use std::time::SystemTime;

/// 批次執行結果
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub sites_processed: usize,
    pub sites_skipped: usize,
    pub discovered: usize,
    pub generated: usize,
    pub up_to_date: usize,
    pub not_ready: usize,
    pub undetermined: usize,
    pub failed: usize,
    pub recovered: usize,
    pub permanently_failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MovieOutcome {
    Generated,
    UpToDate,
    NotReady,
    Undetermined,
    Failed,
}

/// 依設定的站點順序，逐站、逐影片處理，最後重試失敗的影片
pub struct BatchRunner {
    config: Config,
    timeslider: Timeslider,
    catalog: Box<dyn MovieCatalog>,
}

impl BatchRunner {
    #[must_use]
    pub fn new(config: Config, timeslider: Timeslider, catalog: Box<dyn MovieCatalog>) -> Self {
        Self {
            config,
            timeslider,
            catalog,
        }
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let catalog = PatternCatalog::new(&config.catalog.movie_id_pattern).map_err(|e| {
            ConfigError::InvalidField {
                field: "catalog.movie_id_pattern",
                reason: e.to_string(),
            }
        })?;
        let timeslider = Timeslider::from_config(&config);
        Ok(Self::new(config, timeslider, Box::new(catalog)))
    }

    pub fn run(&self, mode: TargetMode) -> BatchSummary {
        self.run_at(mode, SystemTime::now())
    }

    /// `now` 用於判斷來源檔是否已穩定
    pub fn run_at(&self, mode: TargetMode, now: SystemTime) -> BatchSummary {
        info!("開始產生縮圖時間軸 (target: {mode})");

        let mut summary = BatchSummary::default();
        let mut retry_queue = RetryQueue::new();

        for site in &self.config.sites {
            self.process_site(mode, site, now, &mut summary, &mut retry_queue);
        }

        if !retry_queue.is_empty() {
            info!("重試 {} 部失敗的影片", retry_queue.len());
        }
        let report = retry_queue.run(self.config.retry, |src, dst| {
            self.timeslider.generate_timeslider(src, dst)
        });
        apply_retry_report(&mut summary, &report);

        info!(
            "縮圖時間軸完成 - 產生: {}, 已是最新: {}, 未就緒: {}, 失敗: {}, 重試成功: {}, 放棄: {}",
            summary.generated,
            summary.up_to_date,
            summary.not_ready,
            summary.failed,
            summary.recovered,
            summary.permanently_failed
        );

        summary
    }

    fn process_site(
        &self,
        mode: TargetMode,
        site: &SiteConfig,
        now: SystemTime,
        summary: &mut BatchSummary,
        retry_queue: &mut RetryQueue,
    ) {
        let dirs = SiteDirectories::resolve(&self.config.directories, site);

        let movies = match discover_movies(mode, site, &dirs, self.catalog.as_ref()) {
            Ok(movies) => movies,
            Err(e) => {
                warn!("站點 {} 略過: {e}", site.site_name);
                summary.sites_skipped += 1;
                return;
            }
        };
        summary.sites_processed += 1;

        if movies.is_empty() {
            info!("站點 {} 沒有需要產生縮圖時間軸的影片", site.site_path);
            return;
        }

        summary.discovered += movies.len();
        for movie_id in &movies {
            match self.process_movie(mode, &dirs, movie_id, now, retry_queue) {
                MovieOutcome::Generated => summary.generated += 1,
                MovieOutcome::UpToDate => summary.up_to_date += 1,
                MovieOutcome::NotReady => summary.not_ready += 1,
                MovieOutcome::Undetermined => summary.undetermined += 1,
                MovieOutcome::Failed => summary.failed += 1,
            }
        }
    }

    fn process_movie(
        &self,
        mode: TargetMode,
        dirs: &SiteDirectories,
        movie_id: &str,
        now: SystemTime,
        retry_queue: &mut RetryQueue,
    ) -> MovieOutcome {
        let Some(src_file) = find_source_file(
            &dirs.source_dir(movie_id),
            &self.config.source_candidates,
            self.config.stability_window(),
            now,
        ) else {
            return MovieOutcome::NotReady;
        };

        let dst = dirs.final_dir(movie_id);

        if mode.checks_existing_output() && dst.is_dir() {
            match check_overwrite(
                &src_file,
                &dst,
                &self.config.vtt_filename,
                &self.config.image_filename,
            ) {
                Ok(OverwriteDecision::Regenerate) => {}
                Ok(OverwriteDecision::UpToDate) => {
                    info!("縮圖時間軸已存在: {} ({movie_id})", dst.display());
                    return MovieOutcome::UpToDate;
                }
                Err(e) => {
                    warn!("無法判斷是否需要覆寫，略過 {movie_id}: {e}");
                    return MovieOutcome::Undetermined;
                }
            }
        }

        match self.timeslider.generate_timeslider(&src_file, &dst) {
            Ok(()) => {
                info!("縮圖時間軸已建立: {movie_id}");
                MovieOutcome::Generated
            }
            Err(e) => {
                warn!("產生縮圖時間軸失敗，稍後重試: {} - {e}", src_file.display());
                retry_queue.push(&src_file, &dst);
                MovieOutcome::Failed
            }
        }
    }
}

fn apply_retry_report(summary: &mut BatchSummary, report: &RetryReport) {
    summary.recovered = report.recovered.len();
    summary.permanently_failed = report.permanently_failed.len();
}

pub fn print_summary(mode: TargetMode, summary: &BatchSummary) {
    println!();
    println!("{}", style(format!("=== 縮圖時間軸摘要 ({mode}) ===")).cyan().bold());
    println!(
        "  站點: {} 個 (略過 {} 個)",
        summary.sites_processed, summary.sites_skipped
    );
    println!("  影片: {} 部", summary.discovered);
    println!("  產生: {} 部", style(summary.generated).green());

    if summary.up_to_date > 0 {
        println!("  已是最新: {} 部", style(summary.up_to_date).dim());
    }

    if summary.not_ready + summary.undetermined > 0 {
        println!(
            "  略過: {} 部",
            style(summary.not_ready + summary.undetermined).yellow()
        );
    }

    if summary.failed > 0 {
        println!(
            "  失敗: {} 部 (重試成功 {}，放棄 {})",
            style(summary.failed).red(),
            style(summary.recovered).green(),
            style(summary.permanently_failed).red()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_retry_report() {
        use crate::component::batch_runner::retry::RetryQueueEntry;
        use std::path::PathBuf;

        let entry = RetryQueueEntry {
            source: PathBuf::from("/src/a/360p.mp4"),
            final_dst: PathBuf::from("/www/a"),
            attempts: 3,
        };
        let report = RetryReport {
            recovered: vec![entry.clone(), entry.clone()],
            permanently_failed: vec![entry],
        };
        let mut summary = BatchSummary {
            failed: 3,
            ..BatchSummary::default()
        };

        apply_retry_report(&mut summary, &report);

        assert_eq!(summary.recovered, 2);
        assert_eq!(summary.permanently_failed, 1);
        assert_eq!(summary.failed, 3);
    }
}
