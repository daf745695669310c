//! Request descriptions for sending a filter to a search endpoint.
//!
//! Nothing here performs I/O. The builders return plain values that an HTTP client
//! can turn into a real request.

use crate::errors::Result;
use crate::schema::FieldDef;
use crate::serializer::{encode_filter_param, to_json, SerializeOptions};
use crate::tree::Group;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{AsRefStr, Display, EnumString};
use url::Url;

pub const DEFAULT_QUERY_KEY: &str = "filter";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    /// Query parameter name for GET requests.
    pub query_key: String,
    /// Wraps the POST body as `{ body_key: filter }` when set.
    pub body_key: Option<String>,
    pub headers: BTreeMap<String, String>,
    /// When non-empty the filter is run through [`to_json`] first. Otherwise it is
    /// sent as is.
    pub fields: Vec<FieldDef>,
    pub use_symbol_ops: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            query_key: DEFAULT_QUERY_KEY.to_string(),
            body_key: None,
            headers: BTreeMap::new(),
            fields: Vec::new(),
            use_symbol_ops: false,
        }
    }
}

impl TransportOptions {
    pub fn with_fields(mut self, fields: &[FieldDef]) -> Self {
        self.fields = fields.to_vec();
        self
    }

    pub fn with_body_key(mut self, key: &str) -> Self {
        self.body_key = Some(key.to_string());
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetRequest {
    pub url: String,
    pub method: HttpMethod,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: BTreeMap<String, String>,
    /// JSON text.
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Request {
    Get(GetRequest),
    Post(PostRequest),
}

impl Request {
    pub fn url(&self) -> &str {
        match self {
            Request::Get(r) => &r.url,
            Request::Post(r) => &r.url,
        }
    }

    pub fn method(&self) -> HttpMethod {
        match self {
            Request::Get(r) => r.method,
            Request::Post(r) => r.method,
        }
    }
}

fn materialize(filter: &Group, fields: &[FieldDef], use_symbol_ops: bool) -> Result<Group> {
    if fields.is_empty() {
        return Ok(filter.clone());
    }
    to_json(filter, fields, &SerializeOptions { use_symbol_ops })
}

/// Set `key=value` on `endpoint`. `value` is plain text and gets encoded here.
///
/// Absolute URLs go through [`Url`], which replaces an existing parameter of the same
/// name and keeps the fragment. Relative paths cannot be parsed without a base, so the
/// pair is appended with `?` or `&`.
fn with_query(endpoint: &str, key: &str, value: &str) -> String {
    let Ok(mut url) = Url::parse(endpoint) else {
        let sep = if endpoint.contains('?') { '&' } else { '?' };
        return format!(
            "{}{}{}={}",
            endpoint,
            sep,
            urlencoding::encode(key),
            urlencoding::encode(value)
        );
    };

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| name != key)
        .map(|(name, v)| (name.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(key, value);
    url.into()
}

/// `GET endpoint?filter=<percent-encoded JSON>`.
pub fn build_get_request(endpoint: &str, filter: &Group, opts: &TransportOptions) -> Result<GetRequest> {
    let payload = materialize(filter, &opts.fields, opts.use_symbol_ops)?;
    let text = serde_json::to_string(&payload)?;
    let url = with_query(endpoint, &opts.query_key, &text);
    debug!("built GET request for {}", endpoint);
    Ok(GetRequest {
        url,
        method: HttpMethod::Get,
        headers: opts.headers.clone(),
    })
}

/// `POST endpoint` with the filter as a JSON body. Caller headers override the
/// default `Content-Type`.
pub fn build_post_request(endpoint: &str, filter: &Group, opts: &TransportOptions) -> Result<PostRequest> {
    let payload = materialize(filter, &opts.fields, opts.use_symbol_ops)?.to_json_value()?;
    let body = match &opts.body_key {
        Some(key) => {
            let mut wrapped = serde_json::Map::new();
            wrapped.insert(key.clone(), payload);
            serde_json::Value::Object(wrapped)
        }
        None => payload,
    };

    let mut headers = BTreeMap::from([(CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string())]);
    headers.extend(opts.headers.iter().map(|(k, v)| (k.clone(), v.clone())));

    debug!("built POST request for {}", endpoint);
    Ok(PostRequest {
        url: endpoint.to_string(),
        method: HttpMethod::Post,
        headers,
        body: serde_json::to_string(&body)?,
    })
}

pub fn create_request(
    endpoint: &str,
    method: HttpMethod,
    filter: &Group,
    opts: &TransportOptions,
) -> Result<Request> {
    match method {
        HttpMethod::Get => build_get_request(endpoint, filter, opts).map(Request::Get),
        HttpMethod::Post => build_post_request(endpoint, filter, opts).map(Request::Post),
    }
}

/// Just the `key=<encoded>` fragment, without a leading `?`.
pub fn to_query_string(filter: &Group, key: &str, fields: &[FieldDef], use_symbol_ops: bool) -> Result<String> {
    let payload = materialize(filter, fields, use_symbol_ops)?;
    Ok(format!(
        "{}={}",
        urlencoding::encode(key),
        encode_filter_param(&payload)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_query_relative_path_appends() {
        assert_eq!(with_query("/search", "filter", "x"), "/search?filter=x");
        assert_eq!(with_query("/search?page=2", "filter", "x"), "/search?page=2&filter=x");
        assert_eq!(with_query("/s", "my filter", "{\"a\"}"), "/s?my%20filter=%7B%22a%22%7D");
    }

    #[test]
    fn test_with_query_absolute_url_replaces() {
        let out = with_query("https://h.example/s?filter=old&page=2#top", "filter", "new");
        assert_eq!(out, "https://h.example/s?page=2&filter=new#top");
    }

    #[test]
    fn test_with_query_absolute_url_encodes_value() {
        let out = with_query("https://h.example/s", "filter", r#"{"and":[]}"#);
        let url = Url::parse(&out).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("filter".to_string(), r#"{"and":[]}"#.to_string())]);
        assert!(!out.contains('{'));
    }

    #[test]
    fn test_http_method_strings() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!("post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert_eq!(serde_json::to_value(HttpMethod::Post).unwrap(), "POST");
    }
}
