use anyhow::{Result, bail};
use regex::Regex;

/// 影片目錄服務：確認名稱是否為站點已登錄的影片 ID
pub trait MovieCatalog {
    fn is_known_movie(&self, site_id: u32, name: &str) -> Result<()>;
}

/// 以正規表示式判斷影片 ID
///
/// 編碼完成目錄中可能出現 `{movie_id}.{timestamp}` 之類的名稱，
/// 預設樣式只接受英數、底線與連字號。
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    pattern: Regex,
}

impl PatternCatalog {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }
}

impl MovieCatalog for PatternCatalog {
    fn is_known_movie(&self, site_id: u32, name: &str) -> Result<()> {
        if !self.pattern.is_match(name) {
            bail!("站點 {site_id} 沒有影片 ID: {name}");
        }
        Ok(())
    }
}
