//! Option resolution.
//!
//! Turns a declaration and an invocation into the concrete settings of a
//! single request. Pure: no I/O happens here, so every validation failure
//! is reported before the network is touched.

use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::{Error, InvocationRequest, NodeDeclaration, Result};

/// Name of the free-text query input.
pub const QUERY_INPUT: &str = "query";

/// Name of the endpoint input.
pub const API_URL_INPUT: &str = "api_url";

/// Name of the query parameter carrying the query text.
pub const TEXT_PARAM: &str = "text";

/// Fully resolved settings for one request to the correction service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuery {
    /// Query text, passed through untouched.
    pub query: String,
    /// Base URL of the query endpoint.
    pub api_url: Url,
    /// Deadline forwarded by the host.
    pub timeout: Option<Duration>,
}

impl ResolvedQuery {
    /// Builds the request URL: `api_url` with `text=<query>` appended.
    pub fn request_url(&self) -> Url {
        let mut url = self.api_url.clone();
        url.query_pairs_mut().append_pair(TEXT_PARAM, &self.query);
        url
    }
}

/// Resolves the query and endpoint of an invocation against its declaration.
///
/// `query` must be a non-empty string. `api_url` falls back to the declared
/// default when absent, null or empty.
pub fn resolve(declaration: &NodeDeclaration, invocation: &InvocationRequest) -> Result<ResolvedQuery> {
    let query = match non_empty_str(invocation.input(QUERY_INPUT), QUERY_INPUT)? {
        Some(query) => query.to_owned(),
        None => return Err(Error::validation("missing required query")),
    };

    let api_url = match non_empty_str(invocation.input(API_URL_INPUT), API_URL_INPUT)? {
        Some(api_url) => api_url,
        None => declaration
            .input(API_URL_INPUT)
            .and_then(|field| field.default_str())
            .ok_or_else(|| Error::validation("missing api_url and no default declared"))?,
    };

    let api_url = Url::parse(api_url)
        .map_err(|e| Error::validation(format!("invalid api_url '{api_url}': {e}")))?;
    if !matches!(api_url.scheme(), "http" | "https") {
        return Err(Error::validation(format!(
            "unsupported api_url scheme: {}",
            api_url.scheme()
        )));
    }

    Ok(ResolvedQuery {
        query,
        api_url,
        timeout: invocation.timeout,
    })
}

/// Reads an optional string input, treating null and empty as absent.
fn non_empty_str<'a>(value: Option<&'a Value>, name: &str) -> Result<Option<&'a str>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(Error::validation(format!(
            "input '{name}' must be a string, got {other}"
        ))),
    }
}
