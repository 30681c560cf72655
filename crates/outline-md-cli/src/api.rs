//! Minimal client for the two Outline document endpoints the tool needs.

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{}", bad_request_message(.0))]
    BadRequest(String),
    #[error("unexpected status: {0}")]
    UnexpectedStatus(StatusCode),
    #[error("unexpected content-type: {0}")]
    UnexpectedContentType(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

fn bad_request_message(data: &str) -> String {
    if data.is_empty() {
        "Bad request".to_string()
    } else {
        format!("Bad request: {data}")
    }
}

/// Title and markdown body of a hosted document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentInfo {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct InfoResponse {
    data: DocumentInfo,
}

#[derive(Debug, Serialize)]
struct InfoRequest<'a> {
    id: &'a str,
}

/// Body of a `documents.update` call. An empty title leaves the hosted title unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateRequest {
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    pub text: String,
}

pub struct OutlineClient {
    http: Client,
    api_url: String,
    token: String,
}

impl OutlineClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(concat!("outline-md/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api_url: api_url.into(),
            token: token.into(),
        })
    }

    /// Fetch a document's title and markdown body.
    pub fn document_info(&self, id: &str) -> Result<DocumentInfo, ApiError> {
        let response: InfoResponse = self.post("documents.info", &InfoRequest { id })?;
        Ok(response.data)
    }

    /// Replace a document's body, and its title when one is given.
    pub fn update_document(&self, request: &UpdateRequest) -> Result<(), ApiError> {
        let _: serde_json::Value = self.post("documents.update", request)?;
        Ok(())
    }

    fn post<Req, Res>(&self, endpoint: &str, body: &Req) -> Result<Res, ApiError>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let url = format!("{}/{endpoint}", self.api_url);
        log::debug!("POST {url}");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text()?;

        decode_response(status, content_type.as_deref(), &body)
    }
}

/// Turn a raw API response into a value or a typed error.
///
/// Anything other than 200 is an error; a 400 carrying a JSON body surfaces
/// that body. Successful responses must be JSON.
fn decode_response<Res: DeserializeOwned>(
    status: StatusCode,
    content_type: Option<&str>,
    body: &str,
) -> Result<Res, ApiError> {
    if status != StatusCode::OK {
        if status == StatusCode::BAD_REQUEST
            && serde_json::from_str::<serde_json::Value>(body).is_ok()
        {
            return Err(ApiError::BadRequest(body.trim().to_string()));
        }
        return Err(ApiError::UnexpectedStatus(status));
    }

    let content_type = content_type.unwrap_or_default();
    if !content_type.starts_with("application/json") {
        return Err(ApiError::UnexpectedContentType(content_type.to_string()));
    }

    Ok(serde_json::from_str(body)?)
}

/// Extract the document id from a document URL or url-id.
///
/// Outline URLs end in `<slug>-<urlId>`, so the id is whatever follows the
/// last `-`; input without a `-` is taken as the id itself.
pub fn document_id(arg: &str) -> &str {
    arg.rsplit_once('-').map_or(arg, |(_, id)| id)
}
