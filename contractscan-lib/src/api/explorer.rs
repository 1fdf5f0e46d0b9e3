//! Client for Etherscan compatible explorers such as <https://basescan.org/>
//!
//! Covers the `contract/getsourcecode` and `token/tokeninfo` endpoints, normalizing their results into
//! [`ContractRecord`]s and [`TokenRecord`]s.

use crate::config::Config;
use crate::error::Error;
use crate::model::ContractRecord;
use crate::model::TokenRecord;
use crate::model::UNKNOWN;
use chrono::Local;
use chrono::SubsecRound;
use serde::Deserialize;
use url::Url;

use super::from_entry;
use super::lenient_string;
use super::Explorer;
use super::ExplorerResponseHandler;
use super::RequestHandler;

pub struct ExplorerClient {
    request_handler: RequestHandler,
    url: String,
}

#[derive(Deserialize)]
struct SourceCode {
    #[serde(rename = "ContractName", default, deserialize_with = "lenient_string")]
    contract_name: Option<String>,

    #[serde(rename = "CompilerVersion", default, deserialize_with = "lenient_string")]
    compiler_version: Option<String>,

    #[serde(rename = "OptimizationUsed", default, deserialize_with = "lenient_string")]
    optimization_used: Option<String>,

    #[serde(rename = "Runs", default, deserialize_with = "lenient_string")]
    runs: Option<String>,

    #[serde(rename = "ConstructorArguments", default, deserialize_with = "lenient_string")]
    constructor_arguments: Option<String>,

    #[serde(rename = "EVMVersion", default, deserialize_with = "lenient_string")]
    evm_version: Option<String>,

    #[serde(rename = "Library", default, deserialize_with = "lenient_string")]
    library: Option<String>,

    #[serde(rename = "LicenseType", default, deserialize_with = "lenient_string")]
    license_type: Option<String>,

    #[serde(rename = "Proxy", default, deserialize_with = "lenient_string")]
    proxy: Option<String>,

    #[serde(rename = "Implementation", default, deserialize_with = "lenient_string")]
    implementation: Option<String>,

    #[serde(rename = "SwarmSource", default, deserialize_with = "lenient_string")]
    swarm_source: Option<String>,

    #[serde(rename = "SourceCode", default, deserialize_with = "lenient_string")]
    source_code: Option<String>,

    #[serde(rename = "ABI", default, deserialize_with = "lenient_string")]
    abi: Option<String>,
}

#[derive(Deserialize)]
struct TokenInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    symbol: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    decimals: Option<String>,

    #[serde(rename = "totalSupply", default, deserialize_with = "lenient_string")]
    total_supply: Option<String>,
}

/// The `tokeninfo` endpoint returns either a list with one element or the element itself.
#[derive(Deserialize)]
#[serde(untagged)]
enum TokenInfoResult {
    List(Vec<serde_json::Value>),
    Single(serde_json::Map<String, serde_json::Value>),
}

impl SourceCode {
    fn into_record(self, address: &str) -> ContractRecord {
        let unknown = || UNKNOWN.to_string();
        let source_code = self.source_code.unwrap_or_default();

        ContractRecord {
            address: address.to_string(),
            contract_name: self.contract_name.unwrap_or_else(unknown),
            compiler_version: self.compiler_version.unwrap_or_else(unknown),
            optimization_used: self.optimization_used.unwrap_or_else(unknown),
            runs: self.runs.unwrap_or_else(unknown),
            constructor_arguments: self.constructor_arguments.unwrap_or_default(),
            evm_version: self.evm_version.unwrap_or_else(unknown),
            library: self.library.unwrap_or_default(),
            license_type: self.license_type.unwrap_or_else(unknown),
            proxy: self.proxy.unwrap_or_else(|| "0".to_string()),
            implementation: self.implementation.unwrap_or_default(),
            swarm_source: self.swarm_source.unwrap_or_default(),
            verified: !source_code.is_empty(),
            source_code,
            abi: self.abi.unwrap_or_default(),
            timestamp: Local::now().naive_local().trunc_subsecs(6),
        }
    }
}

impl TokenInfoResult {
    fn into_record(self) -> Result<Option<TokenRecord>, Error> {
        let entry = match self {
            TokenInfoResult::List(entries) => match entries.into_iter().next() {
                Some(entry) => entry,
                None => return Ok(None),
            },
            TokenInfoResult::Single(entry) => serde_json::Value::Object(entry),
        };

        let token = from_entry::<TokenInfo>(entry)?;
        Ok(Some(TokenRecord::new(
            token.name.unwrap_or_default(),
            token.symbol.unwrap_or_default(),
            token.decimals.unwrap_or_default(),
            token.total_supply.unwrap_or_default(),
        )))
    }
}

impl ExplorerClient {
    /// Returns a new explorer API client.
    pub fn new(config: &Config) -> Result<Self, Error> {
        // Fail early rather than on the first request
        Url::parse(&config.explorer_url).map_err(|why| Error::ExplorerUrl(config.explorer_url.clone(), why))?;

        Ok(ExplorerClient {
            request_handler: RequestHandler::new(config)?,
            url: config.explorer_url.clone(),
        })
    }

    fn url(&self, module: &str, action: &str, address_param: &str, address: &str) -> Result<Url, Error> {
        let params = [("module", module), ("action", action), (address_param, address)];
        Url::parse_with_params(&self.url, &params).map_err(|why| Error::ExplorerUrl(self.url.clone(), why))
    }
}

impl Explorer for ExplorerClient {
    fn get_contract_info(&self, address: &str) -> Result<Option<ContractRecord>, Error> {
        let url = self.url("contract", "getsourcecode", "address", address)?;
        let entries = self.request_handler.execute_deser::<ExplorerResponseHandler, Vec<serde_json::Value>>(&url)?;

        match entries.and_then(|entries| entries.into_iter().next()) {
            Some(entry) => Ok(Some(from_entry::<SourceCode>(entry)?.into_record(address))),
            None => Ok(None),
        }
    }

    fn get_token_info(&self, address: &str) -> Result<Option<TokenRecord>, Error> {
        let url = self.url("token", "tokeninfo", "contractaddress", address)?;
        let result = self.request_handler.execute_deser::<ExplorerResponseHandler, TokenInfoResult>(&url)?;

        match result {
            Some(result) => result.into_record(),
            None => Ok(None),
        }
    }
}
