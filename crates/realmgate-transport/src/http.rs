//! HTTP transport implementation using `reqwest`.

use std::time::Duration;

use crate::{Body, HttpRequest, HttpResponse, HttpTransport, Method, PartValue, TransportError};

/// A [`HttpTransport`] backed by a shared `reqwest::Client`.
///
/// Request paths are appended to `base_url`, which must be an absolute
/// `http(s)` origin such as `https://api.example.com`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Builds a transport with the given base URL and per-request timeout.
    ///
    /// # Errors
    /// Returns [`TransportError::InvalidRequest`] if `base_url` isn't an
    /// absolute URL, or if the client can't be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        check_base_url(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::InvalidRequest(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Wraps an existing client. `base_url` is taken as is.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Returns the base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build(&self, request: HttpRequest) -> Result<reqwest::RequestBuilder, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self.client.request(method, url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            Body::Empty => builder,
            Body::Json(bytes) => builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(bytes),
            Body::Multipart(parts) => {
                let mut form = reqwest::multipart::Form::new();
                for part in parts {
                    form = match part.value {
                        PartValue::Text(text) => form.text(part.name, text),
                        PartValue::File {
                            file_name,
                            content_type,
                            bytes,
                        } => {
                            let mut file = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
                            if let Some(content_type) = content_type {
                                file = file.mime_str(&content_type).map_err(|e| {
                                    TransportError::InvalidRequest(format!("invalid content type: {e}"))
                                })?;
                            }
                            form.part(part.name, file)
                        }
                    };
                }
                builder.multipart(form)
            }
        };

        Ok(builder)
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = request.method;
        let path = request.path.clone();
        let builder = self.build(request)?;

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(classify)?;

        tracing::debug!(%method, path = %path, status, "HTTP exchange completed");
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

fn check_base_url(base_url: &str) -> Result<(), TransportError> {
    let url = reqwest::Url::parse(base_url)
        .map_err(|e| TransportError::InvalidRequest(format!("invalid base URL {base_url:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(TransportError::InvalidRequest(format!("base URL {base_url:?} can't carry a path")));
    }
    Ok(())
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else if error.is_builder() {
        TransportError::InvalidRequest(error.to_string())
    } else {
        TransportError::Request(error.to_string())
    }
}
