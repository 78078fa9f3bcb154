//! Application constants

/// Maximum accepted upload size (200 MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

/// Multipart field carrying the video
pub const UPLOAD_FIELD: &str = "file";

/// Extension used when the upload's filename has none
pub const DEFAULT_UPLOAD_SUFFIX: &str = ".mp4";

/// Prefix for temp files holding uploads while they are analysed
pub const UPLOAD_TEMP_PREFIX: &str = "deepfake_upload_";

/// Upper bound on a whole analysis, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Analyses (and their ffmpeg children) allowed to run at once
pub const DEFAULT_MAX_CONCURRENT_ANALYSES: usize = 4;
