//! The domain-scoped gateway.
//!
//! One [`Gateway`] per identity domain wraps every outbound call:
//!
//! 1. **Request**: attach the domain's token under the domain's header,
//!    read from the session at issue time (never cached across calls).
//! 2. **Response**: unwrap the `{ code, message, data }` envelope, pass
//!    non-envelope bodies through, and classify everything else into a
//!    [`GatewayError`].
//! 3. **Recovery**: on 401, clear this domain's credential and profile and
//!    send the user to this domain's login page (unless already there).
//!
//! Each gateway only ever touches its own domain: an admin 401 leaves the
//! account session alone, and vice versa.

use std::sync::Arc;

use realmgate_protocol::{Codec, Decoded, Domain, JsonCodec, PendingRedirect};
use realmgate_session::CredentialSource;
use realmgate_transport::{Body, HttpRequest, HttpTransport, Method, Part, TransportError};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{DomainPolicy, GatewayError, Messages, Navigator, Notice, NoticeKind, Notifier};

// ---------------------------------------------------------------------------
// CallOptions / ApiRequest
// ---------------------------------------------------------------------------

/// Per-call switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Don't raise a global notice for this call's failure. The call still
    /// rejects, and 401 recovery (clear + redirect) still runs.
    pub suppress_global_error_surface: bool,
}

impl CallOptions {
    /// Options with notices suppressed.
    pub fn silent() -> Self {
        Self {
            suppress_global_error_surface: true,
        }
    }
}

/// What to send as the request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    #[default]
    None,
    Json(Value),
    Multipart(Vec<Part>),
}

/// A call as the API layer describes it, before credentials and encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub payload: Payload,
    pub options: CallOptions,
}

impl ApiRequest {
    /// A request with no query, body or options.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            payload: Payload::None,
            options: CallOptions::default(),
        }
    }

    /// `GET path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// `POST path`.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// `PUT path`.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    /// `DELETE path`.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.payload = Payload::Json(body);
        self
    }

    /// Sets a multipart body.
    pub fn multipart(mut self, parts: Vec<Part>) -> Self {
        self.payload = Payload::Multipart(parts);
        self
    }

    /// Suppresses global notices for this call.
    pub fn silent(mut self) -> Self {
        self.options.suppress_global_error_surface = true;
        self
    }
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// The host surfaces a gateway reports to. Shared by all three gateways.
#[derive(Clone)]
pub struct Host {
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
    pub messages: Messages,
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host").field("messages", &self.messages).finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Wraps outbound calls for one identity domain.
pub struct Gateway<T: HttpTransport, C: Codec = JsonCodec> {
    transport: Arc<T>,
    codec: C,
    policy: DomainPolicy,
    credentials: Option<Arc<dyn CredentialSource>>,
    host: Host,
}

impl<T: HttpTransport> Gateway<T, JsonCodec> {
    /// A gateway using JSON bodies.
    pub fn new(transport: Arc<T>, policy: DomainPolicy, host: Host) -> Self {
        Self::with_codec(transport, JsonCodec, policy, host)
    }
}

impl<T: HttpTransport, C: Codec> Gateway<T, C> {
    /// A gateway using a custom codec.
    pub fn with_codec(transport: Arc<T>, codec: C, policy: DomainPolicy, host: Host) -> Self {
        Self {
            transport,
            codec,
            policy,
            credentials: None,
            host,
        }
    }

    /// Attaches the session whose credential this gateway sends and clears.
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialSource>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// The domain this gateway serves.
    pub fn domain(&self) -> Domain {
        self.policy.domain
    }

    /// The policy in effect.
    pub fn policy(&self) -> &DomainPolicy {
        &self.policy
    }

    /// Performs a call and returns the unwrapped payload.
    ///
    /// # Errors
    /// Every failure branch rejects; see [`GatewayError`] for the kinds.
    pub async fn call(&self, request: ApiRequest) -> Result<Value, GatewayError> {
        let options = request.options;
        let method = request.method;
        let path = request.path.clone();
        let http = self.prepare(request)?;

        tracing::debug!(domain = %self.domain(), %method, path = %path, "gateway call");

        let response = match self.transport.send(http).await {
            Ok(response) => response,
            Err(e) => return Err(self.transport_failure(options, e)),
        };

        match response.status {
            401 if self.domain().is_authenticated() => return Err(self.unauthorized(options)),
            403 => {
                tracing::warn!(domain = %self.domain(), path = %path, "request forbidden");
                self.surface(options, NoticeKind::Forbidden, self.host.messages.forbidden.clone());
                return Err(GatewayError::Forbidden);
            }
            status if !(200..300).contains(&status) => {
                let message = format!("Request failed with status code {status}");
                tracing::warn!(domain = %self.domain(), path = %path, status, "request failed");
                self.surface(options, NoticeKind::Network, message.clone());
                return Err(GatewayError::Transport {
                    status: Some(status),
                    message,
                });
            }
            _ => {}
        }

        match Decoded::from_bytes(&self.codec, &response.body) {
            Decoded::Success(data) | Decoded::PassThrough(data) => Ok(data),
            Decoded::Failure { code, message } => {
                let shown = if message.is_empty() {
                    self.host.messages.request_failed.clone()
                } else {
                    message.clone()
                };
                self.surface(options, NoticeKind::LogicalFailure, shown);
                let message = if message.is_empty() {
                    "Request error".to_string()
                } else {
                    message
                };
                tracing::debug!(domain = %self.domain(), path = %path, ?code, "logical failure");
                Err(GatewayError::Logical { code, message })
            }
        }
    }

    /// Performs a call and decodes the payload into `R`.
    ///
    /// # Errors
    /// As [`Gateway::call`], plus [`GatewayError::Protocol`] if the payload
    /// doesn't match `R`.
    pub async fn call_as<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, GatewayError> {
        let value = self.call(request).await?;
        Ok(self.codec.from_value(value)?)
    }

    /// `GET path` with query parameters.
    pub async fn get(&self, path: &str, query: &[(&str, &str)], options: CallOptions) -> Result<Value, GatewayError> {
        let mut request = ApiRequest::get(path);
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        request.options = options;
        self.call(request).await
    }

    /// `POST path` with a JSON body.
    pub async fn post(&self, path: &str, body: Value, options: CallOptions) -> Result<Value, GatewayError> {
        let mut request = ApiRequest::post(path).json(body);
        request.options = options;
        self.call(request).await
    }

    /// `PUT path` with a JSON body.
    pub async fn put(&self, path: &str, body: Value, options: CallOptions) -> Result<Value, GatewayError> {
        let mut request = ApiRequest::put(path).json(body);
        request.options = options;
        self.call(request).await
    }

    /// `DELETE path`.
    pub async fn delete(&self, path: &str, options: CallOptions) -> Result<Value, GatewayError> {
        let mut request = ApiRequest::delete(path);
        request.options = options;
        self.call(request).await
    }

    fn prepare(&self, request: ApiRequest) -> Result<HttpRequest, GatewayError> {
        let mut http = HttpRequest::new(request.method, request.path);
        http.query = request.query;
        http.body = match request.payload {
            Payload::None => Body::Empty,
            Payload::Json(value) => Body::Json(self.codec.encode(&value)?),
            Payload::Multipart(parts) => Body::Multipart(parts),
        };

        // Read at issue time: a token set or cleared a moment ago counts.
        if let (Some(header), Some(source)) = (&self.policy.token_header, &self.credentials) {
            if let Some(token) = source.credential() {
                http = http.with_header(header.as_str(), token);
            }
        }
        Ok(http)
    }

    fn unauthorized(&self, options: CallOptions) -> GatewayError {
        let domain = self.domain();
        if let Some(source) = &self.credentials {
            source.invalidate();
        }
        tracing::warn!(%domain, "credential rejected, session cleared");
        self.surface(options, NoticeKind::SessionExpired, self.host.messages.session_expired.clone());

        if let Some(login_path) = &self.policy.login_path {
            let here = self.host.navigator.current();
            // Path-prefix check only; the query is deliberately ignored.
            if !here.is_under(login_path) {
                let target = PendingRedirect::new(&here).login_url(login_path, &self.policy.redirect_param);
                tracing::info!(%domain, target = %target, "redirecting to login");
                self.host.navigator.go(&target);
            }
        }
        GatewayError::Unauthorized
    }

    fn transport_failure(&self, options: CallOptions, error: TransportError) -> GatewayError {
        let message = error.to_string();
        tracing::warn!(domain = %self.domain(), error = %message, "transport failure");
        let shown = if message.is_empty() {
            self.host.messages.network_error.clone()
        } else {
            message.clone()
        };
        self.surface(options, NoticeKind::Network, shown);
        GatewayError::Transport { status: None, message }
    }

    fn surface(&self, options: CallOptions, kind: NoticeKind, message: String) {
        if options.suppress_global_error_surface {
            return;
        }
        self.host.notifier.notify(Notice {
            domain: self.domain(),
            kind,
            message,
        });
    }
}

impl<T: HttpTransport, C: Codec> std::fmt::Debug for Gateway<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("policy", &self.policy)
            .field("has_credentials", &self.credentials.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use realmgate_session::{CredentialStore, SessionCell};
    use realmgate_transport::HttpResponse;
    use serde_json::json;

    use super::*;
    use crate::{MemoryNavigator, NoticeQueue};

    /// Replies with one canned response and remembers the request.
    struct Canned {
        response: Mutex<Option<Result<HttpResponse, TransportError>>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Canned {
        fn new(response: Result<HttpResponse, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(response)),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn json(status: u16, body: Value) -> Arc<Self> {
            Self::new(Ok(HttpResponse::new(status, body.to_string())))
        }
    }

    impl HttpTransport for Canned {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().push(request);
            self.response
                .lock()
                .take()
                .unwrap_or_else(|| Err(TransportError::Request("no more responses".into())))
        }
    }

    struct Fixture {
        notices: Arc<NoticeQueue>,
        navigator: Arc<MemoryNavigator>,
        cell: Arc<SessionCell<()>>,
    }

    fn fixture(at: &str) -> Fixture {
        let cell = Arc::new(SessionCell::new(Domain::Admin, CredentialStore::in_memory()));
        cell.set_token("adm-1");
        Fixture {
            notices: Arc::new(NoticeQueue::new()),
            navigator: Arc::new(MemoryNavigator::new(at)),
            cell,
        }
    }

    fn admin_gateway(transport: Arc<Canned>, fx: &Fixture) -> Gateway<Canned> {
        let host = Host {
            notifier: fx.notices.clone(),
            navigator: fx.navigator.clone(),
            messages: Messages::default(),
        };
        Gateway::new(transport, DomainPolicy::admin(), host).with_credentials(fx.cell.clone())
    }

    #[tokio::test]
    async fn test_call_attaches_domain_header() {
        let fx = fixture("/admin");
        let transport = Canned::json(200, json!({ "code": 0, "message": "ok", "data": 1 }));
        let gateway = admin_gateway(transport.clone(), &fx);

        gateway.call(ApiRequest::get("/api/auth/me")).await.expect("should succeed");

        let seen = transport.seen.lock();
        assert_eq!(seen[0].header("gm-token"), Some("adm-1"));
        assert_eq!(seen[0].header("satoken"), None);
    }

    #[tokio::test]
    async fn test_call_success_unwraps_data() {
        let fx = fixture("/admin");
        let gateway = admin_gateway(Canned::json(200, json!({ "code": 0, "data": { "id": 4 } })), &fx);

        let data = gateway.call(ApiRequest::get("/api/users/4")).await.expect("should succeed");

        assert_eq!(data, json!({ "id": 4 }));
        assert!(fx.notices.is_empty());
    }

    #[tokio::test]
    async fn test_call_non_envelope_passes_through() {
        let fx = fixture("/admin");
        let gateway = admin_gateway(Canned::json(200, json!({ "version": "1.2.0" })), &fx);

        let data = gateway.call(ApiRequest::get("/version.json")).await.expect("should succeed");

        assert_eq!(data, json!({ "version": "1.2.0" }));
    }

    #[tokio::test]
    async fn test_call_logical_failure_notifies_and_rejects() {
        let fx = fixture("/admin/users");
        let gateway = admin_gateway(Canned::json(200, json!({ "code": 40001, "message": "name taken" })), &fx);

        let err = gateway.call(ApiRequest::post("/api/users")).await.expect_err("should reject");

        assert!(matches!(err, GatewayError::Logical { code: Some(40001), .. }));
        let notices = fx.notices.drain();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::LogicalFailure);
        assert_eq!(notices[0].message, "name taken");
    }

    #[tokio::test]
    async fn test_call_logical_failure_without_message_uses_defaults() {
        let fx = fixture("/admin");
        let gateway = admin_gateway(Canned::json(200, json!({ "code": 7 })), &fx);

        let err = gateway.call(ApiRequest::get("/api/roles")).await.expect_err("should reject");

        assert_eq!(err.to_string(), "Request error");
        assert_eq!(fx.notices.drain()[0].message, Messages::default().request_failed);
    }

    #[tokio::test]
    async fn test_call_forbidden_keeps_credential() {
        let fx = fixture("/admin/roles");
        let gateway = admin_gateway(Canned::json(403, json!({ "code": 403, "message": "no" })), &fx);

        let err = gateway.call(ApiRequest::delete("/api/roles/2")).await.expect_err("should reject");

        assert!(matches!(err, GatewayError::Forbidden));
        assert!(fx.cell.is_authenticated());
        assert!(fx.navigator.history().is_empty());
        assert_eq!(fx.notices.drain()[0].kind, NoticeKind::Forbidden);
    }

    #[tokio::test]
    async fn test_call_unauthorized_clears_and_redirects() {
        let fx = fixture("/admin/users?page=2#top");
        let gateway = admin_gateway(Canned::json(401, json!({ "code": 401, "message": "expired" })), &fx);

        let err = gateway.call(ApiRequest::get("/api/users")).await.expect_err("should reject");

        assert!(err.is_unauthorized());
        assert!(!fx.cell.is_authenticated());
        assert_eq!(
            fx.navigator.history(),
            vec!["/admin/login?redirect=%2Fadmin%2Fusers%3Fpage%3D2%23top".to_string()]
        );
        assert_eq!(fx.notices.drain()[0].kind, NoticeKind::SessionExpired);
    }

    #[tokio::test]
    async fn test_call_unauthorized_on_login_page_does_not_redirect() {
        let fx = fixture("/admin/login?redirect=%2Fadmin");
        let gateway = admin_gateway(Canned::json(401, json!({})), &fx);

        gateway.call(ApiRequest::get("/api/auth/me")).await.expect_err("should reject");

        assert!(!fx.cell.is_authenticated());
        assert!(fx.navigator.history().is_empty());
    }

    #[tokio::test]
    async fn test_call_suppressed_unauthorized_still_clears_and_redirects() {
        let fx = fixture("/admin/items");
        let gateway = admin_gateway(Canned::json(401, json!({})), &fx);

        gateway.call(ApiRequest::get("/api/items").silent()).await.expect_err("should reject");

        assert!(fx.notices.is_empty());
        assert!(!fx.cell.is_authenticated());
        assert_eq!(fx.navigator.history().len(), 1);
    }

    #[tokio::test]
    async fn test_call_server_error_is_transport_failure() {
        let fx = fixture("/admin");
        let gateway = admin_gateway(Canned::new(Ok(HttpResponse::new(502, "bad gateway"))), &fx);

        let err = gateway.call(ApiRequest::get("/api/users")).await.expect_err("should reject");

        assert!(matches!(err, GatewayError::Transport { status: Some(502), .. }));
        assert!(fx.cell.is_authenticated());
        assert_eq!(fx.notices.drain()[0].message, "Request failed with status code 502");
    }

    #[tokio::test]
    async fn test_call_network_error_surfaces_underlying_message() {
        let fx = fixture("/admin");
        let gateway = admin_gateway(Canned::new(Err(TransportError::Timeout("15s elapsed".into()))), &fx);

        let err = gateway.call(ApiRequest::get("/api/users")).await.expect_err("should reject");

        assert!(matches!(err, GatewayError::Transport { status: None, .. }));
        let notices = fx.notices.drain();
        assert_eq!(notices[0].kind, NoticeKind::Network);
        assert!(notices[0].message.contains("15s elapsed"));
    }

    #[tokio::test]
    async fn test_call_as_wrong_shape_is_protocol_error() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Grant {
            token: String,
        }

        let fx = fixture("/admin");
        let gateway = admin_gateway(Canned::json(200, json!({ "code": 0, "data": [1, 2] })), &fx);

        let result: Result<Grant, _> = gateway.call_as(ApiRequest::post("/api/auth/login")).await;

        assert!(matches!(result, Err(GatewayError::Protocol(_))));
    }

    #[tokio::test]
    async fn test_call_json_body_is_encoded() {
        let fx = fixture("/admin");
        let transport = Canned::json(200, json!({ "code": 0, "data": null }));
        let gateway = admin_gateway(transport.clone(), &fx);

        gateway
            .post("/api/roles", json!({ "name": "ops" }), CallOptions::default())
            .await
            .expect("should succeed");

        let seen = transport.seen.lock();
        assert_eq!(seen[0].body, Body::Json(br#"{"name":"ops"}"#.to_vec()));
    }
}
