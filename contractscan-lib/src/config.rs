//! Config manager, holding the fixed operating constants.
//!
//! Nothing is read from the environment or the command line; every run uses [`Config::default`]. Tests
//! override single fields, e.g. to point the client at a local server.

use std::path::PathBuf;
use std::time::Duration;

/// Contracts whose metadata is collected, in output order. The first entry is the main token.
pub const CONTRACT_ADDRESSES: [&str; 5] = [
    "0xCF103155Ebe5358380BD946b12C8b7137ae3E2D2",
    "0x4bbb926AA09e15E2b38d81E0d16ae09a61c0402a",
    "0x88d76b5D04eDb69bfF31a0f6Fc1D51a23BD58720",
    "0x763742DB404a5779a07dD84a9cF7Fd139ea01dba",
    "0x11e21976c28748B32dd414cf172868D19AA2bed3",
];

const EXPLORER_URL: &str = "https://api.basescan.org/api";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const RATE_LIMIT_DELAY: Duration = Duration::from_secs(2);
const OUTPUT_PATH: &str = "../contracts_info.json";

#[derive(Debug, Clone)]
pub struct Config {
    /// Explorer API endpoint, e.g. <https://api.basescan.org/api>
    pub explorer_url: String,

    pub user_agent: String,

    /// Upper bound for a single explorer request.
    pub request_timeout: Duration,

    /// Sleep duration after each processed contract.
    pub rate_limit_delay: Duration,

    /// Where the collected results are written to, overwriting any existing file.
    pub output_path: PathBuf,

    pub contracts: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            explorer_url: EXPLORER_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            request_timeout: REQUEST_TIMEOUT,
            rate_limit_delay: RATE_LIMIT_DELAY,
            output_path: PathBuf::from(OUTPUT_PATH),
            contracts: CONTRACT_ADDRESSES.iter().map(|address| address.to_string()).collect(),
        }
    }
}
