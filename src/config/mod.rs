pub mod load;
pub mod path_template;
pub mod types;

pub use load::ConfigError;
pub use path_template::{PathTemplate, SITE_PLACEHOLDER, SiteDirectories};
pub use types::{
    CatalogOptions, Config, DEFAULT_MOVIE_ID_PATTERN, DEFAULT_RETRY,
    DEFAULT_STABILITY_WINDOW_SECS, Directories, MediaProbeOptions, SiteConfig,
    ThumbnailerOptions, TileGridSpec,
};
