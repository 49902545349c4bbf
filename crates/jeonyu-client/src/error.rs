use jeonyu_core::LookupError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("API error {code}: {message}")]
    Api { code: String, message: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("XML decoding error: {0}")]
    XmlEncoding(#[from] quick_xml::encoding::EncodingError),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<ClientError> for LookupError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Server { status, body } => LookupError::Status {
                code: status.to_string(),
                message: body,
            },
            ClientError::Api { code, message } => LookupError::Status { code, message },
            ClientError::Http(e) if e.is_timeout() => LookupError::Transport(format!("timed out: {e}")),
            ClientError::Http(e) => LookupError::Transport(e.to_string()),
            ClientError::Malformed(message) => LookupError::Malformed(message),
            ClientError::Json(_) | ClientError::Xml(_) | ClientError::XmlEncoding(_) => {
                LookupError::Malformed(err.to_string())
            }
        }
    }
}
