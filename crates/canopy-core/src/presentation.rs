use serde::Deserialize;
use serde::Serialize;

use super::context::Generation;
use super::loading::MAX_FETCH_ATTEMPTS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    NotFound,
    Overload,
    ConnectionError,
    /// Anything the service reports that is not one of the above.
    #[serde(other)]
    GenericError,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::NotFound => "not-found",
            Self::Overload => "overload",
            Self::GenericError => "generic-error",
            Self::ConnectionError => "connection-error",
        }
    }
}

/// What the surface is asked to show for the thread as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    Loading(u8),
    Retry(u8),
    Complete,
    Error {
        category: ErrorCategory,
        message: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorImage {
    /// One of the remote service's own "not found" pictures, `a` through `e`.
    NotFound(char),
    Resource(&'static str),
}

impl ErrorImage {
    pub fn source(&self) -> String {
        match self {
            Self::NotFound(letter) => {
                format!("https://www.redditstatic.com/reddit404{letter}.png")
            }
            Self::Resource(name) => format!("res/{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorText {
    Key(&'static str),
    Message(String),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDisplay {
    pub category: ErrorCategory,
    pub image: ErrorImage,
    pub header_key: &'static str,
    pub text: ErrorText,
    pub retry_key: &'static str,
}

impl ErrorDisplay {
    pub fn for_category(
        category: ErrorCategory,
        message: Option<&str>,
        generation: Generation,
    ) -> Self {
        let (image, header_key, text) = match category {
            ErrorCategory::NotFound => {
                let letter = char::from(b'a' + (generation.0 % 5) as u8);
                (
                    ErrorImage::NotFound(letter),
                    "error_header_not_found",
                    ErrorText::Key("error_message_not_found"),
                )
            }
            ErrorCategory::Overload => (
                ErrorImage::Resource("redditoverload.svg"),
                "error_header_overloaded",
                ErrorText::Key("error_message_overloaded"),
            ),
            ErrorCategory::GenericError => (
                ErrorImage::Resource("redditbroken.svg"),
                "error_header_generic",
                message
                    .filter(|message| !message.is_empty())
                    .map(|message| ErrorText::Message(message.to_string()))
                    .unwrap_or(ErrorText::Empty),
            ),
            ErrorCategory::ConnectionError => (
                ErrorImage::Resource("redditbroken.svg"),
                "error_header_interrupted",
                ErrorText::Key("error_message_interrupted"),
            ),
        };
        Self {
            category,
            image,
            header_key,
            text,
            retry_key: "error_button_retry",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingDisplay {
    pub header_key: &'static str,
    pub text_key: &'static str,
    /// Arguments for `text_key`, e.g. `["2", "3"]` for the retry message.
    pub text_args: Vec<String>,
}

impl LoadingDisplay {
    pub fn for_presentation(presentation: &Presentation) -> Option<Self> {
        match presentation {
            Presentation::Loading(_) => Some(Self {
                header_key: "loading_generic_message",
                text_key: "loading_generic_text",
                text_args: Vec::new(),
            }),
            Presentation::Retry(attempt) => Some(Self {
                header_key: "loading_generic_message",
                text_key: "loading_retry_message",
                text_args: vec![attempt.to_string(), MAX_FETCH_ATTEMPTS.to_string()],
            }),
            Presentation::Complete | Presentation::Error { .. } => None,
        }
    }
}
