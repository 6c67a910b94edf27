//! Outbound request description handed to the [`ApiClient`](crate::http_client::ApiClient).

use std::fmt;

use error_stack::ResultExt;
use serde::Serialize;

use crate::{
    errors::{CustomResult, ParsingError},
    masking::{Maskable, PeekInterface, Secret},
};

pub type Headers = std::collections::HashSet<(String, Maskable<String>)>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

/// A request body, already encoded for the wire.
///
/// Encoding happens once, up front, so a retried request re-sends the
/// byte-identical payload. The encoded form is held as a [`Secret`] since it
/// carries credentials and card data.
#[derive(Clone)]
pub enum RequestContent {
    Json(Secret<String>),
    FormUrlEncoded(Secret<String>),
}

impl RequestContent {
    /// Serialize `body` as a JSON payload.
    pub fn json<T: Serialize>(body: &T) -> CustomResult<Self, ParsingError> {
        let encoded = serde_json::to_string(body).change_context(ParsingError::EncodeError("json"))?;
        Ok(Self::Json(Secret::new(encoded)))
    }

    /// Serialize `body` as a form-urlencoded payload.
    pub fn form_url_encoded<T: Serialize>(body: &T) -> CustomResult<Self, ParsingError> {
        let encoded = serde_urlencoded::to_string(body)
            .change_context(ParsingError::EncodeError("url-encoded"))?;
        Ok(Self::FormUrlEncoded(Secret::new(encoded)))
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json(_) => "application/json",
            Self::FormUrlEncoded(_) => "application/x-www-form-urlencoded",
        }
    }

    pub fn payload(&self) -> &str {
        match self {
            Self::Json(payload) | Self::FormUrlEncoded(payload) => payload.peek(),
        }
    }
}

impl fmt::Debug for RequestContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json(_) => "JsonRequestBody",
            Self::FormUrlEncoded(_) => "FormUrlEncodedRequestBody",
        })
    }
}

#[derive(Clone, Debug)]
pub struct Request {
    pub url: String,
    pub headers: Headers,
    pub method: Method,
    pub body: Option<RequestContent>,
}

#[derive(Debug)]
pub struct RequestBuilder {
    url: String,
    headers: Headers,
    method: Method,
    body: Option<RequestContent>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: Method::Get,
            url: String::new(),
            headers: std::collections::HashSet::new(),
            body: None,
        }
    }

    pub fn url(mut self, url: &str) -> Self {
        self.url = url.into();
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn headers(mut self, headers: Vec<(String, Maskable<String>)>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn set_body(mut self, body: RequestContent) -> Self {
        self.body.replace(body);
        self
    }

    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
