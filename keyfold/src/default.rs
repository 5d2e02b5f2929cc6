pub const AWS_DEFAULT_REGION: &str = "us-east-2";
pub const AWS_MAX_LIST_OBJECTS: u32 = 1000;

// per-page request bound; a stalled page fails the whole listing
pub const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 30;
