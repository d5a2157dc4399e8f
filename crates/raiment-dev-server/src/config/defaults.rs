use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 7000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 400;
pub const DEFAULT_POLL_JITTER_MS: u64 = 100;
pub const DEFAULT_KEEP_ALIVE_SECS: u64 = 15;

pub fn default_title() -> String {
    "raiment-dev-server".to_string()
}

pub fn default_out_dir() -> PathBuf {
    PathBuf::from("dist")
}

pub fn default_timestamp_file() -> PathBuf {
    PathBuf::from("dist/.build-timestamp")
}
