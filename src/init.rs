use env_logger::Env;

/// 初始化日誌，`RUST_LOG` 優先於設定檔的等級
pub fn init(default_level: &str) {
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();
}
