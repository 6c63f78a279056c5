use std::time::Duration;

/// Exact `error` string the API returns on HTTP 400 when a wallet simply has
/// no allocation. Treated as a normal outcome, not a failure.
pub const NO_ALLOCATION_SENTINEL: &str = "No OG drop";

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const CLIENT_MARKER: &str = "og-drop-checker";

// FILES
pub const CONFIG_FILE_PATH: &str = "data/config.toml";
pub const PRIVATE_KEYS_FILE_PATH: &str = "data/private_keys.txt";
pub const PROXIES_FILE_PATH: &str = "data/proxies.txt";
pub const ELIGIBLE_FILE_PATH: &str = "data/eligible.txt";
pub const NOT_ELIGIBLE_FILE_PATH: &str = "data/not_eligible.txt";
