//! Block explorer API client.

use crate::config::Config;
use crate::error::Error;
use crate::model::ContractRecord;
use crate::model::TokenRecord;
use log::debug;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use reqwest::blocking::Response;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Deserializer;
use url::Url;

pub mod explorer;

/// Source of contract and token metadata for a single address.
///
/// Both methods return `Ok(None)` if the explorer answered but has no data for the address, and an
/// error if the request itself failed or the response had an unexpected shape.
pub trait Explorer {
    fn get_contract_info(&self, address: &str) -> Result<Option<ContractRecord>, Error>;
    fn get_token_info(&self, address: &str) -> Result<Option<TokenRecord>, Error>;
}

struct RequestHandler {
    client: Client,
}

/// Handler responsible for Etherscan compatible explorers
struct ExplorerResponseHandler;

trait ResponseHandler {
    /// Prepares a request by i.e. setting it's headers or query parameters.
    fn prepare(request_handler: &RequestHandler, url: &Url) -> RequestBuilder {
        request_handler.client.get(url.as_str())
    }

    /// Given a response different error status codes are handled.
    fn process(response: Response) -> Result<ResponseHandlerResult, Error>;
}

enum ResponseHandlerResult {
    Ok(serde_json::Value),

    /// The request succeeded but yielded no data, with the explorer's explanation.
    Empty(String),
}

impl RequestHandler {
    fn new(config: &Config) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(RequestHandler { client })
    }

    #[inline]
    fn execute<T: ResponseHandler>(&self, url: &Url) -> Result<ResponseHandlerResult, Error> {
        debug!("Requesting {url}");

        let response = T::prepare(self, url).send().map_err(Error::HttpRequest)?;
        T::process(response)
    }

    /// Executes the request and deserializes its payload, returning `None` for responses without data.
    fn execute_deser<T: ResponseHandler, U: DeserializeOwned>(&self, url: &Url) -> Result<Option<U>, Error> {
        match self.execute::<T>(url)? {
            ResponseHandlerResult::Ok(content) => Ok(Some(serde_json::from_value(content)?)),

            ResponseHandlerResult::Empty(why) => {
                debug!("No data returned because of '{why}' ({url})");
                Ok(None)
            }
        }
    }
}

impl ResponseHandler for ExplorerResponseHandler {
    fn process(response: Response) -> Result<ResponseHandlerResult, Error> {
        #[derive(Deserialize)]
        struct Page {
            // Kept as is, only the string "1" marks a successful request
            #[serde(default)]
            status: serde_json::Value,

            #[serde(default, deserialize_with = "lenient_string")]
            message: Option<String>,

            #[serde(default)]
            result: serde_json::Value,
        }

        let url = response.url().to_string();
        if !response.status().is_success() {
            return Err(Error::HttpStatus(response.status().as_u16(), url));
        }

        let content = response.text().map_err(|why| Error::HttpBody(url, why))?;
        let page = serde_json::from_str::<Page>(&content)?;

        // Explorers answer with a 200 status code regardless of whether or not the request was successful,
        // the actual status is wrapped within the JSON body.
        match (page.status.as_str(), is_empty(&page.result)) {
            (Some("1"), false) => Ok(ResponseHandlerResult::Ok(page.result)),

            (_, _) => match page.result {
                serde_json::Value::String(result) if !result.is_empty() => Ok(ResponseHandlerResult::Empty(result)),
                _ => Ok(ResponseHandlerResult::Empty(page.message.unwrap_or_default())),
            },
        }
    }
}

/// Accepts any JSON scalar as string, treating `null` like an absent field.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(content)) => Some(content),
        Some(other) => Some(other.to_string()),
    })
}

/// Deserializes a single result entry, which unlike serde's derived deserializers must not be a
/// positional JSON array.
fn from_entry<T: DeserializeOwned>(entry: serde_json::Value) -> Result<T, Error> {
    match entry {
        serde_json::Value::Object(_) => Ok(serde_json::from_value(entry)?),
        other => Err(Error::UnexpectedResult(other.to_string())),
    }
}

fn is_empty(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(content) => content.is_empty(),
        serde_json::Value::Array(content) => content.is_empty(),
        serde_json::Value::Object(content) => content.is_empty(),
        _ => false,
    }
}
