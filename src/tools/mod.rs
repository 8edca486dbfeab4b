mod ffprobe_info;
mod path_validator;

pub use ffprobe_info::{FfprobeMediaProbe, MediaInfo, MediaProbe};
pub use path_validator::{ensure_directory_exists, remove_directory_if_exists};
