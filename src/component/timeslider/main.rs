use super::error::TimesliderError;
use super::publisher::publish;
use super::tile_generator::{FfmpegThumbnailer, Thumbnailer, sampling_rate};
use super::vtt_writer::write_vtt_file;
use crate::config::{Config, TileGridSpec};
use crate::tools::{
    FfprobeMediaProbe, MediaProbe, ensure_directory_exists, remove_directory_if_exists,
};
use log::{debug, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};

/// 單一影片的處理階段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Generating,
    Publishing,
    CleaningUp,
    Done,
    Failed,
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Generating => "產生縮圖",
            Self::Publishing => "發佈",
            Self::CleaningUp => "清理暫存",
            Self::Done => "完成",
            Self::Failed => "失敗",
        };
        f.write_str(name)
    }
}

/// 來源檔、暫存目錄與發佈目錄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    pub movie_id: String,
    pub source: PathBuf,
    pub tmp_dir: PathBuf,
    pub final_dst: PathBuf,
}

impl GenerationJob {
    /// 影片 ID 取自來源檔所在的資料夾名稱，暫存目錄為 `tmp_root/<影片 ID>`
    pub fn new(source: &Path, final_dst: &Path, tmp_root: &Path) -> Result<Self, TimesliderError> {
        let movie_id = source
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| TimesliderError::InvalidSource(source.to_path_buf()))?;

        Ok(Self {
            tmp_dir: tmp_root.join(&movie_id),
            movie_id,
            source: source.to_path_buf(),
            final_dst: final_dst.to_path_buf(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct TimesliderSettings {
    pub tmp_root: PathBuf,
    pub tile_grid: TileGridSpec,
    pub vtt_filename: String,
}

impl TimesliderSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            tmp_root: config.directories.tmp_dir.clone(),
            tile_grid: config.tile_grid.clone(),
            vtt_filename: config.vtt_filename.clone(),
        }
    }
}

/// 縮圖時間軸產生器
///
/// 流程：產生 tile 圖與 VTT → 複製到發佈目錄 → 刪除暫存目錄。
/// 無論成功或失敗，回傳前都會刪除暫存目錄。
pub struct Timeslider {
    settings: TimesliderSettings,
    probe: Box<dyn MediaProbe>,
    thumbnailer: Box<dyn Thumbnailer>,
}

impl Timeslider {
    #[must_use]
    pub fn new(
        settings: TimesliderSettings,
        probe: Box<dyn MediaProbe>,
        thumbnailer: Box<dyn Thumbnailer>,
    ) -> Self {
        Self {
            settings,
            probe,
            thumbnailer,
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            TimesliderSettings::from_config(config),
            Box::new(FfprobeMediaProbe::new(config.media_probe.program.clone())),
            Box::new(FfmpegThumbnailer::new(config.thumbnailer.clone())),
        )
    }

    #[must_use]
    pub const fn settings(&self) -> &TimesliderSettings {
        &self.settings
    }

    pub fn generate_timeslider(&self, src: &Path, final_dst: &Path) -> Result<(), TimesliderError> {
        let job = GenerationJob::new(src, final_dst, &self.settings.tmp_root)?;
        debug!("[{}] 暫存目錄: {}", job.movie_id, job.tmp_dir.display());

        let result = self.run_stages(&job);

        debug!("[{}] {}", job.movie_id, JobStage::CleaningUp);
        let cleanup = remove_directory_if_exists(&job.tmp_dir);

        match (result, cleanup) {
            (Ok(()), Ok(())) => {
                debug!("[{}] {}", job.movie_id, JobStage::Done);
                Ok(())
            }
            (Ok(()), Err(e)) => {
                debug!("[{}] {}", job.movie_id, JobStage::Failed);
                Err(TimesliderError::io("刪除暫存目錄", &job.tmp_dir, e))
            }
            (Err(e), cleanup) => {
                if let Err(cleanup_err) = cleanup {
                    warn!("無法清理暫存目錄 {}: {cleanup_err}", job.tmp_dir.display());
                }
                debug!("[{}] {}", job.movie_id, JobStage::Failed);
                Err(e)
            }
        }
    }

    fn run_stages(&self, job: &GenerationJob) -> Result<(), TimesliderError> {
        // 上次中斷殘留的檔案會影響 tile 圖計數
        remove_directory_if_exists(&job.tmp_dir)
            .map_err(|e| TimesliderError::io("刪除殘留暫存目錄", &job.tmp_dir, e))?;

        debug!("[{}] {}", job.movie_id, JobStage::Generating);
        self.generate_tile_image(&job.source, &job.tmp_dir)?;

        debug!("[{}] {}", job.movie_id, JobStage::Publishing);
        let copied = publish(
            &job.tmp_dir,
            &job.final_dst,
            &self.settings.vtt_filename,
        )?;
        info!(
            "[{}] 已發佈 {copied} 個檔案到 {}",
            job.movie_id,
            job.final_dst.display()
        );

        Ok(())
    }

    /// 在 `dst` 產生 tile 圖與 VTT 檔，回傳 VTT 區段數
    pub fn generate_tile_image(&self, input: &Path, dst: &Path) -> Result<usize, TimesliderError> {
        ensure_directory_exists(dst).map_err(|e| TimesliderError::io("建立暫存目錄", dst, e))?;

        let media_info = self
            .probe
            .probe(input)
            .map_err(|e| TimesliderError::MediaProbe {
                path: input.to_path_buf(),
                message: format!("{e:#}"),
            })?;

        let rate = sampling_rate(media_info.frame_rate);
        debug!(
            "幀率 {:.3}，取樣參數 {rate}，長度 {:.1}s",
            media_info.frame_rate, media_info.duration_seconds
        );

        self.thumbnailer.generate(input, rate, dst)?;

        write_vtt_file(
            dst,
            media_info.duration_seconds,
            &self.settings.tile_grid,
            &self.settings.vtt_filename,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::timeslider::vtt_writer::tile_image_name;
    use crate::tools::MediaInfo;
    use std::cell::Cell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct FixedProbe(MediaInfo);

    impl MediaProbe for FixedProbe {
        fn probe(&self, _path: &Path) -> anyhow::Result<MediaInfo> {
            Ok(self.0)
        }
    }

    struct FailingProbe;

    impl MediaProbe for FailingProbe {
        fn probe(&self, path: &Path) -> anyhow::Result<MediaInfo> {
            anyhow::bail!("無法辨識: {}", path.display())
        }
    }

    /// 寫出指定數量的 tile 圖並記錄取樣參數
    struct StubThumbnailer {
        tiles: usize,
        last_rate: Rc<Cell<u32>>,
    }

    impl Thumbnailer for StubThumbnailer {
        fn generate(&self, _input: &Path, rate: u32, output_dir: &Path) -> Result<(), TimesliderError> {
            self.last_rate.set(rate);
            for i in 1..=self.tiles {
                fs::write(output_dir.join(tile_image_name(i)), b"jpg").unwrap();
            }
            Ok(())
        }
    }

    struct FailingThumbnailer;

    impl Thumbnailer for FailingThumbnailer {
        fn generate(&self, _input: &Path, _rate: u32, output_dir: &Path) -> Result<(), TimesliderError> {
            fs::write(output_dir.join("output001.jpg"), b"partial").unwrap();
            Err(TimesliderError::ThumbnailerFailed {
                code: Some(1),
                stderr: "decode error".to_string(),
            })
        }
    }

    struct Fixture {
        temp_dir: TempDir,
        src: PathBuf,
        dst: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();
            let src = temp_dir.path().join("src/123456_001/360p.mp4");
            fs::create_dir_all(src.parent().unwrap()).unwrap();
            fs::write(&src, b"mp4").unwrap();
            fs::create_dir_all(temp_dir.path().join("tmp")).unwrap();
            let dst = temp_dir.path().join("www/123456_001");
            Self { temp_dir, src, dst }
        }

        fn tmp_root(&self) -> PathBuf {
            self.temp_dir.path().join("tmp")
        }

        fn timeslider(&self, probe: Box<dyn MediaProbe>, thumbnailer: Box<dyn Thumbnailer>) -> Timeslider {
            let settings = TimesliderSettings {
                tmp_root: self.tmp_root(),
                tile_grid: TileGridSpec {
                    number_of_tiles: 4,
                    width: 162,
                    height: 90,
                    x: vec![0, 162],
                    y: vec![0, 90],
                },
                vtt_filename: "thumbnail.vtt".to_string(),
            };
            Timeslider::new(settings, probe, thumbnailer)
        }
    }

    fn media(frame_rate: f64, duration_seconds: f64) -> Box<dyn MediaProbe> {
        Box::new(FixedProbe(MediaInfo {
            frame_rate,
            duration_seconds,
        }))
    }

    #[test]
    fn test_generation_job_paths() {
        let job = GenerationJob::new(
            Path::new("/data/www/site/member/123456_001/360p.mp4"),
            Path::new("/www/site/ts/123456_001"),
            Path::new("/data/tmp"),
        )
        .unwrap();

        assert_eq!(job.movie_id, "123456_001");
        assert_eq!(job.tmp_dir, PathBuf::from("/data/tmp/123456_001"));
    }

    #[test]
    fn test_generation_job_without_parent_is_error() {
        let err = GenerationJob::new(Path::new("360p.mp4"), Path::new("/www"), Path::new("/tmp"))
            .unwrap_err();
        assert!(matches!(err, TimesliderError::InvalidSource(_)));
    }

    #[test]
    fn test_generate_timeslider_publishes_and_cleans_up() {
        let f = Fixture::new();
        let last_rate = Rc::new(Cell::new(0));
        let timeslider = f.timeslider(
            media(29.97, 60.0),
            Box::new(StubThumbnailer {
                tiles: 2,
                last_rate: Rc::clone(&last_rate),
            }),
        );

        timeslider.generate_timeslider(&f.src, &f.dst).unwrap();

        assert_eq!(last_rate.get(), 299);
        assert!(f.dst.join("output001.jpg").exists());
        assert!(f.dst.join("output002.jpg").exists());
        let vtt = fs::read_to_string(f.dst.join("thumbnail.vtt")).unwrap();
        assert_eq!(vtt.matches(" --> ").count(), 6);
        assert!(!f.tmp_root().join("123456_001").exists());
    }

    #[test]
    fn test_thumbnailer_failure_cleans_up() {
        let f = Fixture::new();
        let timeslider = f.timeslider(media(30.0, 60.0), Box::new(FailingThumbnailer));

        let err = timeslider.generate_timeslider(&f.src, &f.dst).unwrap_err();

        assert!(matches!(err, TimesliderError::ThumbnailerFailed { .. }));
        assert!(!f.tmp_root().join("123456_001").exists());
        assert!(!f.dst.exists());
    }

    #[test]
    fn test_probe_failure_cleans_up() {
        let f = Fixture::new();
        let timeslider = f.timeslider(
            Box::new(FailingProbe),
            Box::new(StubThumbnailer {
                tiles: 1,
                last_rate: Rc::new(Cell::new(0)),
            }),
        );

        let err = timeslider.generate_timeslider(&f.src, &f.dst).unwrap_err();

        assert!(matches!(err, TimesliderError::MediaProbe { .. }));
        assert!(!f.tmp_root().join("123456_001").exists());
    }

    #[test]
    fn test_no_thumbnails_cleans_up() {
        let f = Fixture::new();
        let timeslider = f.timeslider(
            media(30.0, 60.0),
            Box::new(StubThumbnailer {
                tiles: 0,
                last_rate: Rc::new(Cell::new(0)),
            }),
        );

        let err = timeslider.generate_timeslider(&f.src, &f.dst).unwrap_err();

        assert!(matches!(err, TimesliderError::NoThumbnails(_)));
        assert!(!f.tmp_root().join("123456_001").exists());
    }

    #[test]
    fn test_publish_failure_cleans_up() {
        let f = Fixture::new();
        // 發佈目錄的上層是一般檔案，無法建立目錄
        let blocker = f.temp_dir.path().join("blocker");
        fs::write(&blocker, b"file").unwrap();
        let dst = blocker.join("123456_001");
        let timeslider = f.timeslider(
            media(30.0, 60.0),
            Box::new(StubThumbnailer {
                tiles: 1,
                last_rate: Rc::new(Cell::new(0)),
            }),
        );

        let err = timeslider.generate_timeslider(&f.src, &dst).unwrap_err();

        assert!(matches!(err, TimesliderError::Io { .. }));
        assert!(!f.tmp_root().join("123456_001").exists());
    }

    #[test]
    fn test_stale_tmp_files_are_removed_before_generation() {
        let f = Fixture::new();
        let stale = f.tmp_root().join("123456_001");
        fs::create_dir_all(&stale).unwrap();
        for i in 1..=5 {
            fs::write(stale.join(tile_image_name(i)), b"old").unwrap();
        }
        let timeslider = f.timeslider(
            media(30.0, 1000.0),
            Box::new(StubThumbnailer {
                tiles: 1,
                last_rate: Rc::new(Cell::new(0)),
            }),
        );

        timeslider.generate_timeslider(&f.src, &f.dst).unwrap();

        assert!(f.dst.join("output001.jpg").exists());
        assert!(!f.dst.join("output002.jpg").exists());
    }
}
