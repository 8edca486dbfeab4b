use clap::Parser;
use console::style;
use log::{error, info, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use video_timeslider::component::batch_runner::print_summary;
use video_timeslider::component::{BatchRunner, TargetMode};
use video_timeslider::config::Config;
use video_timeslider::init;

/// 產生影片的縮圖時間軸（tile 圖與 WebVTT 索引）
#[derive(Debug, Parser)]
#[command(name = "video_timeslider", version, about)]
struct Args {
    /// 處理範圍：full、news 或 force
    #[arg(long)]
    target: String,

    /// 設定檔路徑
    #[arg(long, default_value = "timeslider.json")]
    config: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = Config::load(&args.config);
    init::init(config.as_ref().map_or("info", |c| c.log_level.as_str()));

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("無法載入設定檔 {}: {e}", args.config.display());
            return ExitCode::SUCCESS;
        }
    };

    let mode = match args.target.parse::<TargetMode>() {
        Ok(mode) => mode,
        Err(e) => {
            warn!("{e}，可用的值: full、news、force");
            eprintln!("{} {e}", style("錯誤:").red().bold());
            return ExitCode::SUCCESS;
        }
    };

    let runner = match BatchRunner::from_config(config) {
        Ok(runner) => runner,
        Err(e) => {
            error!("設定檔內容無效: {e}");
            return ExitCode::SUCCESS;
        }
    };

    let summary = runner.run(mode);
    print_summary(mode, &summary);
    info!("程式正常結束");

    ExitCode::SUCCESS
}
