//! Outcome of a client API call, the message shown to the user for it, and
//! the page decisions that follow from it.

use crate::ApiErrorBody;

/// Why an API call from the browser did not succeed
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFailure {
    /// The request never completed
    Network(String),
    /// The server answered with a non-success status
    Rejected {
        status_text: String,
        body: Option<ApiErrorBody>,
    },
    /// A success response whose body could not be decoded
    Decode(String),
}

impl ApiFailure {
    /// Builds a rejection from the raw response body; bodies that are not an
    /// error document are kept as `None`.
    pub fn rejected(status_text: impl Into<String>, body_text: &str) -> Self {
        ApiFailure::Rejected {
            status_text: status_text.into(),
            body: serde_json::from_str::<ApiErrorBody>(body_text).ok(),
        }
    }

    fn server_message(&self) -> Option<&str> {
        match self {
            ApiFailure::Rejected { body: Some(body), .. } if !body.error.is_empty() => {
                Some(body.error.as_str())
            }
            _ => None,
        }
    }

    /// Alert text after a failed create or update
    pub fn save_message(&self) -> String {
        match self {
            ApiFailure::Rejected { status_text, .. } => self
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| format!("Failed to save: {}", status_text)),
            ApiFailure::Network(_) | ApiFailure::Decode(_) => {
                "An error occurred while saving".to_string()
            }
        }
    }

    /// Alert text after a failed delete
    pub fn delete_message(&self) -> String {
        match self {
            ApiFailure::Rejected { .. } => self
                .server_message()
                .unwrap_or("Failed to delete item")
                .to_string(),
            ApiFailure::Network(_) | ApiFailure::Decode(_) => {
                "An error occurred while deleting".to_string()
            }
        }
    }
}

/// Visibility of the page regions after a list fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub ready_banner: bool,
    pub not_ready_banner: bool,
    pub content_area: bool,
    pub create_button: bool,
}

impl PageState {
    pub const READY: PageState = PageState {
        ready_banner: true,
        not_ready_banner: false,
        content_area: true,
        create_button: true,
    };

    pub const NOT_READY: PageState = PageState {
        ready_banner: false,
        not_ready_banner: true,
        content_area: false,
        create_button: false,
    };

    /// Any failure to fetch the list, transport or status, is "not ready"
    pub fn after_load<T>(result: &Result<T, ApiFailure>) -> Self {
        match result {
            Ok(_) => PageState::READY,
            Err(_) => PageState::NOT_READY,
        }
    }
}

/// A delete the user has confirmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub id: String,
}

impl DeleteRequest {
    /// `None` when the user declined the confirmation; no request is sent
    pub fn after_confirm(id: impl Into<String>, confirmed: bool) -> Option<Self> {
        confirmed.then(|| DeleteRequest { id: id.into() })
    }

    pub fn path(&self) -> String {
        format!("/data/{}", self.id)
    }
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiFailure::Network(e) => write!(f, "network error: {}", e),
            ApiFailure::Rejected {
                status_text,
                body: Some(body),
            } => write!(
                f,
                "{} ({}): {}",
                body.error,
                status_text,
                body.details.as_deref().unwrap_or("")
            ),
            ApiFailure::Rejected { status_text, body: None } => write!(f, "rejected: {}", status_text),
            ApiFailure::Decode(e) => write!(f, "could not decode response: {}", e),
        }
    }
}
