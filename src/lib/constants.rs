pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "5000";
pub const DEFAULT_MONGO_URI: &str = "mongodb://127.0.0.1:27017";

pub const DEFAULT_DB_NAME: &str = "artifactsDB";
pub const ARTIFACTS_COLLECTION: &str = "artifacts";

pub const TOP_LIKED_LIMIT: i64 = 6;

/// Descriptive fields matched by the substring search.
pub const SEARCH_FIELDS: [&str; 4] = ["name", "description", "type", "presentLocation"];

pub const DB_HEALTH_CHECK_INTERVAL_SECS: u64 = 30;

pub const MAX_REQUEST_BODY_SIZE: usize = 1_048_576; // 1 MB
