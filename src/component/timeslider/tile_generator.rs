use super::error::TimesliderError;
use crate::config::ThumbnailerOptions;
use log::{debug, warn};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// ffmpeg 依序輸出 `output001.jpg`、`output002.jpg`…
pub const TILE_OUTPUT_PATTERN: &str = "output%03d.jpg";

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// 產生 tile 圖的外部程式
pub trait Thumbnailer {
    fn generate(
        &self,
        input: &Path,
        sampling_rate: u32,
        output_dir: &Path,
    ) -> Result<(), TimesliderError>;
}

/// thumbnail 濾鏡的取樣參數：幀率 × 10 後取整數
#[must_use]
pub fn sampling_rate(frame_rate: f64) -> u32 {
    (frame_rate * 10.0) as u32
}

pub struct FfmpegThumbnailer {
    options: ThumbnailerOptions,
}

impl FfmpegThumbnailer {
    #[must_use]
    pub const fn new(options: ThumbnailerOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn build_command(&self, input: &Path, sampling_rate: u32, output_dir: &Path) -> Command {
        let mut cmd = Command::new(&self.options.program);

        let filter = format!(
            "scale={},thumbnail={sampling_rate},tile={}",
            self.options.scale, self.options.tile
        );

        cmd.args(["-loglevel", "error", "-i"]);
        cmd.arg(input);
        cmd.args(["-vf", &filter, "-q", "1", "-an", "-vsync", "0"]);
        cmd.arg(output_dir.join(TILE_OUTPUT_PATTERN));

        cmd
    }

    fn run_to_completion(&self, mut command: Command) -> Result<(), TimesliderError> {
        let output = command
            .output()
            .map_err(|source| self.spawn_error(source))?;

        if output.status.success() {
            return Ok(());
        }

        Err(TimesliderError::ThumbnailerFailed {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }

    fn run_with_timeout(
        &self,
        mut command: Command,
        timeout: Duration,
    ) -> Result<(), TimesliderError> {
        command.stdout(Stdio::null());
        command.stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|source| self.spawn_error(source))?;
        // 管線寫滿時子程序會停住，必須邊等待邊讀取 stderr
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = stderr.read_to_end(&mut buf);
                buf
            })
        });
        let started = Instant::now();

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if started.elapsed() >= timeout => {
                    warn!("縮圖程式逾時，終止程序 [{}]", child.id());
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(TimesliderError::ThumbnailerTimeout { timeout });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(self.spawn_error(e));
                }
            }
        };

        let stderr = stderr_reader
            .and_then(|reader| reader.join().ok())
            .map(|buf| String::from_utf8_lossy(&buf).trim().to_string())
            .unwrap_or_default();

        if status.success() {
            return Ok(());
        }

        Err(TimesliderError::ThumbnailerFailed {
            code: status.code(),
            stderr,
        })
    }

    fn spawn_error(&self, source: std::io::Error) -> TimesliderError {
        TimesliderError::ThumbnailerSpawn {
            program: self.options.program.clone(),
            source,
        }
    }
}

impl Thumbnailer for FfmpegThumbnailer {
    fn generate(
        &self,
        input: &Path,
        sampling_rate: u32,
        output_dir: &Path,
    ) -> Result<(), TimesliderError> {
        let command = self.build_command(input, sampling_rate, output_dir);
        debug!("執行縮圖程式: {command:?}");

        match self.options.timeout() {
            Some(timeout) => self.run_with_timeout(command, timeout),
            None => self.run_to_completion(command),
        }
    }
}
