//! Records collected from the explorer and written to the output file.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

/// Contract address -> collected information, in the order the contracts were processed.
pub type ResultSet = IndexMap<String, ContractInfo>;

/// Placeholder for contract metadata the explorer did not return.
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRecord {
    pub address: String,
    pub contract_name: String,
    pub compiler_version: String,
    pub optimization_used: String,
    pub runs: String,
    pub constructor_arguments: String,
    pub evm_version: String,
    pub library: String,
    pub license_type: String,
    pub proxy: String,
    pub implementation: String,
    pub swarm_source: String,
    pub source_code: String,
    pub abi: String,

    /// Whether the source code has been published, i.e. `source_code` is non-empty.
    pub verified: bool,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub token_name: String,
    pub token_symbol: String,
    pub token_decimals: String,
    pub total_supply: String,
    pub token_type: String,
}

impl TokenRecord {
    /// Returns a new token record, classifying it as `ERC20` only if the token has a name.
    pub fn new(name: String, symbol: String, decimals: String, total_supply: String) -> Self {
        let token_type = match name.is_empty() {
            true => UNKNOWN,
            false => "ERC20",
        };

        TokenRecord {
            token_name: name,
            token_symbol: symbol,
            token_decimals: decimals,
            total_supply,
            token_type: token_type.to_string(),
        }
    }
}

/// A contract record merged with its token record, serialized as one flat JSON object. Without a token
/// record none of the token keys are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInfo {
    #[serde(flatten)]
    pub contract: ContractRecord,

    #[serde(flatten)]
    pub token: Option<TokenRecord>,
}

impl ContractInfo {
    pub fn new(contract: ContractRecord) -> Self {
        ContractInfo { contract, token: None }
    }

    /// Returns the token symbol, or `N/A` if no token information was retrieved.
    pub fn token_symbol(&self) -> &str {
        self.token.as_ref().map_or("N/A", |token| token.token_symbol.as_str())
    }
}
