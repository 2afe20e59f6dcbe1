//! Response helpers shared by handlers and the http boundary.

use http::header::CONTENT_TYPE;
use http::{HeaderValue, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;

/// The standard json reply handlers send back to scripts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T = Value> {
    pub error: bool,
    pub msg: String,
    pub data: T,
}

/// `{"error": false, "msg": .., "data": ..}`
///
/// # Errors
/// Fails only when `data` cannot be serialized.
pub fn success<T: Serialize>(msg: impl Into<String>, data: T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Envelope { error: false, msg: msg.into(), data })
}

/// `{"error": true, "msg": .., "data": ..}`
///
/// # Errors
/// Fails only when `data` cannot be serialized.
pub fn error<T: Serialize>(msg: impl Into<String>, data: T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&Envelope { error: true, msg: msg.into(), data })
}

/// Builds a response with an html content type.
pub fn html(status: StatusCode, body: String) -> Response<String> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    set_html_content_type(&mut response);
    response
}

pub(crate) fn set_html_content_type(response: &mut Response<String>) {
    if let Ok(value) = HeaderValue::from_str(mime::TEXT_HTML_UTF_8.as_ref()) {
        response.headers_mut().insert(CONTENT_TYPE, value);
    }
}
