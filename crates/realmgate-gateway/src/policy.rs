//! Per-domain gateway settings and notification texts.

use realmgate_protocol::{Domain, DEFAULT_REDIRECT_PARAM};

/// Header the admin realm sends its token under.
pub const ADMIN_TOKEN_HEADER: &str = "gm-token";

/// Header the account realm sends its token under.
pub const ACCOUNT_TOKEN_HEADER: &str = "satoken";

/// How one domain's gateway talks to the API.
///
/// The two authenticated realms use different header names on purpose;
/// don't point them at the same one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainPolicy {
    /// The realm this gateway serves.
    pub domain: Domain,
    /// Header carrying the token; `None` for the public realm.
    pub token_header: Option<String>,
    /// Login page for 401 redirects; `None` for the public realm.
    pub login_path: Option<String>,
    /// Query parameter that carries the pending redirect.
    pub redirect_param: String,
}

impl DomainPolicy {
    /// The admin back office: `gm-token` header, `/admin/login`.
    pub fn admin() -> Self {
        Self {
            domain: Domain::Admin,
            token_header: Some(ADMIN_TOKEN_HEADER.to_string()),
            login_path: Some("/admin/login".to_string()),
            redirect_param: DEFAULT_REDIRECT_PARAM.to_string(),
        }
    }

    /// The community front end: `satoken` header, `/account/login`.
    pub fn account() -> Self {
        Self {
            domain: Domain::Account,
            token_header: Some(ACCOUNT_TOKEN_HEADER.to_string()),
            login_path: Some("/account/login".to_string()),
            redirect_param: DEFAULT_REDIRECT_PARAM.to_string(),
        }
    }

    /// Anonymous endpoints: no header, no login page.
    pub fn public() -> Self {
        Self {
            domain: Domain::Public,
            token_header: None,
            login_path: None,
            redirect_param: DEFAULT_REDIRECT_PARAM.to_string(),
        }
    }

    /// Overrides the login path.
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = Some(path.into());
        self
    }

    /// Overrides the token header.
    pub fn with_token_header(mut self, header: impl Into<String>) -> Self {
        self.token_header = Some(header.into());
        self
    }

    /// Overrides the query parameter a 401 redirect stores the location in.
    pub fn with_redirect_param(mut self, param: impl Into<String>) -> Self {
        self.redirect_param = param.into();
        self
    }
}

/// Texts for the notices the gateways raise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messages {
    /// Logical failure whose envelope carried no message.
    pub request_failed: String,
    /// HTTP 401.
    pub session_expired: String,
    /// HTTP 403.
    pub forbidden: String,
    /// Network failure with no usable error text.
    pub network_error: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            request_failed: "Request failed".to_string(),
            session_expired: "Your session has expired, please sign in again".to_string(),
            forbidden: "You don't have permission to do that".to_string(),
            network_error: "Network error".to_string(),
        }
    }
}
