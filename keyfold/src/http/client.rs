use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::header::{HeaderName, HeaderValue};
use hyper::{HeaderMap, Request, Uri};
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tokio::time::timeout;

use crate::DEFAULT_PAGE_TIMEOUT_SECS;

#[derive(Debug)]
pub struct HttpClientResponse {
    body: Bytes,
    status_code: u16,
    headers: HeaderMap,
}

impl HttpClientResponse {
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Debug, Clone)]
pub enum HttpClientError {
    ConnectionError(String),
    Timeout,
    Utf8Error(String),
    Other(String),
}

impl fmt::Display for HttpClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpClientError::ConnectionError(e) => {
                write!(f, "ConnectionError: {}", e)
            }
            HttpClientError::Timeout => write!(f, "Timeout"),
            HttpClientError::Utf8Error(e) => {
                write!(f, "Utf8Error: {}", e)
            }
            HttpClientError::Other(e) => write!(f, "Other: {}", e),
        }
    }
}

impl From<hyper::http::Error> for HttpClientError {
    fn from(err: hyper::http::Error) -> Self {
        HttpClientError::Other(err.to_string())
    }
}

pub type HttpClientResult =
    Result<HttpClientResponse, HttpClientError>;

/// One-shot GET client for the storage backend. Every request is
/// bounded by the configured timeout; non-2xx responses are returned
/// with their status code so callers can map them, only transport
/// failures surface as errors.
#[derive(Clone)]
pub struct HttpClient {
    client: Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
    timeout: Duration,
}

impl HttpClient {
    pub fn new() -> Self {
        let https = HttpsConnector::new();
        let client: Client<
            HttpsConnector<HttpConnector>,
            Empty<Bytes>,
        > = Client::builder(TokioExecutor::new())
            .build::<_, Empty<Bytes>>(https);

        HttpClient {
            client,
            timeout: Duration::from_secs(DEFAULT_PAGE_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn get(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> HttpClientResult {
        log::debug!("GET {}", url);
        let uri = Uri::from_str(url)
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        let mut req_builder = Request::get(uri);
        for (key, value) in headers.iter() {
            let header_name = HeaderName::from_str(key)
                .map_err(|e| HttpClientError::Other(e.to_string()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| HttpClientError::Other(e.to_string()))?;
            req_builder = req_builder.header(header_name, header_value);
        }
        let request = req_builder.body(Empty::new())?;

        let response =
            match timeout(self.timeout, self.client.request(request))
                .await
            {
                Ok(result) => result.map_err(|e| {
                    HttpClientError::ConnectionError(format!(
                        "{}: {}",
                        url, e
                    ))
                })?,
                Err(_) => return Err(HttpClientError::Timeout),
            };

        let status_code = response.status().as_u16();
        let headers = response.headers().clone();

        let body = match timeout(
            self.timeout,
            response.into_body().collect(),
        )
        .await
        {
            Ok(collected) => collected
                .map_err(|e| HttpClientError::Other(e.to_string()))?
                .to_bytes(),
            Err(_) => return Err(HttpClientError::Timeout),
        };

        Ok(HttpClientResponse {
            body,
            status_code,
            headers,
        })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
