use std::error::Error;
use std::{fmt, io};

use crate::http::HttpClientError;

#[derive(Debug)]
pub enum KeyfoldError {
    AccessDenied(String),
    NotFound(String),
    InvalidArgument(String),
    Unavailable(String),
    Timeout,
    Config(String),
    Internal(String),
    Io(io::Error),
}

impl fmt::Display for KeyfoldError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeyfoldError::AccessDenied(s) => {
                write!(f, "Access denied: {}", s)
            }
            KeyfoldError::NotFound(s) => write!(f, "Not found: {}", s),
            KeyfoldError::InvalidArgument(s) => {
                write!(f, "Invalid argument: {}", s)
            }
            KeyfoldError::Unavailable(s) => {
                write!(f, "Service unavailable: {}", s)
            }
            KeyfoldError::Timeout => write!(f, "Timeout"),
            KeyfoldError::Config(s) => write!(f, "Config error: {}", s),
            KeyfoldError::Internal(s) => write!(f, "Internal error: {}", s),
            KeyfoldError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl Error for KeyfoldError {}

impl From<io::Error> for KeyfoldError {
    fn from(error: io::Error) -> Self {
        KeyfoldError::Io(error)
    }
}

impl From<&str> for KeyfoldError {
    fn from(error: &str) -> Self {
        KeyfoldError::Config(error.to_owned())
    }
}

impl From<String> for KeyfoldError {
    fn from(error: String) -> Self {
        KeyfoldError::Config(error)
    }
}

impl From<HttpClientError> for KeyfoldError {
    fn from(error: HttpClientError) -> Self {
        match error {
            HttpClientError::Timeout => KeyfoldError::Timeout,
            HttpClientError::ConnectionError(e) => {
                KeyfoldError::Unavailable(e)
            }
            HttpClientError::Utf8Error(e) => KeyfoldError::Internal(e),
            HttpClientError::Other(e) => KeyfoldError::Internal(e),
        }
    }
}
