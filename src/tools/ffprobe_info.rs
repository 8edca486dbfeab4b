use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaInfo {
    pub frame_rate: f64,
    pub duration_seconds: f64,
}

/// 取得來源影片的幀率與長度
pub trait MediaProbe {
    fn probe(&self, path: &Path) -> Result<MediaInfo>;
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

/// 使用 ffprobe 取得影片資訊
#[derive(Debug, Clone)]
pub struct FfprobeMediaProbe {
    program: String,
}

impl FfprobeMediaProbe {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl MediaProbe for FfprobeMediaProbe {
    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        let output = Command::new(&self.program)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .with_context(|| format!("無法執行 ffprobe: {}", path.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("ffprobe 執行失敗: {}", stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_ffprobe_output(&stdout).with_context(|| format!("無法讀取影片資訊: {}", path.display()))
    }
}

fn parse_ffprobe_output(stdout: &str) -> Result<MediaInfo> {
    let probe: FfprobeOutput =
        serde_json::from_str(stdout).with_context(|| "無法解析 ffprobe 輸出")?;

    let video_stream = probe
        .streams
        .as_ref()
        .and_then(|streams| {
            streams
                .iter()
                .find(|s| s.codec_type.as_deref() == Some("video"))
        })
        .ok_or_else(|| anyhow!("找不到視訊串流"))?;

    // 影片長度優先從 format，其次從 stream
    let duration_seconds = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .or(video_stream.duration.as_ref())
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| anyhow!("無法取得影片長度"))?;

    let frame_rate = video_stream
        .r_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .ok_or_else(|| anyhow!("無法取得影片幀率"))?;

    Ok(MediaInfo {
        frame_rate,
        duration_seconds,
    })
}

/// 解析幀率字串（例如 "30/1" 或 "30000/1001"）
fn parse_frame_rate(rate: &str) -> Option<f64> {
    match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            (den > 0.0).then_some(num / den)
        }
        None => rate.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rate_forms() {
        let cases = [("25/1", 25.0), ("24000/1001", 23.976), ("59.94", 59.94)];
        for (raw, expected) in cases {
            let rate = parse_frame_rate(raw).unwrap();
            assert!((rate - expected).abs() < 0.001, "{raw} -> {rate}");
        }

        for raw in ["", "abc", "25/0", "/1"] {
            assert_eq!(parse_frame_rate(raw), None, "{raw}");
        }
    }

    #[test]
    fn test_parse_ffprobe_output_prefers_format_duration() {
        let json = r#"{
            "format": { "duration": "3460.5" },
            "streams": [
                { "codec_type": "audio" },
                { "codec_type": "video", "r_frame_rate": "30000/1001", "duration": "3400.0" }
            ]
        }"#;

        let info = parse_ffprobe_output(json).unwrap();

        assert!((info.duration_seconds - 3460.5).abs() < 0.001);
        assert!((info.frame_rate - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_parse_ffprobe_output_without_video_stream() {
        let json = r#"{ "format": { "duration": "10" }, "streams": [{ "codec_type": "audio" }] }"#;
        assert!(parse_ffprobe_output(json).is_err());
    }

    #[test]
    fn test_probe_missing_program_is_error() {
        let probe = FfprobeMediaProbe::new("/nonexistent/ffprobe-binary");
        assert!(probe.probe(Path::new("/nonexistent.mp4")).is_err());
    }
}
