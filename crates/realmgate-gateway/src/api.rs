//! Request builders for the endpoints the session core itself calls.
//!
//! Everything here is a pure function returning an [`ApiRequest`]; nothing
//! talks to the network until a gateway runs it. Login-style calls are
//! pre-marked silent so the login form chooses its own error text.

use realmgate_transport::Part;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ApiRequest;

/// The `{ token }` payload returned by login and register.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    /// The opaque bearer credential. Missing or empty means none was issued.
    #[serde(default)]
    pub token: Option<String>,
}

impl TokenGrant {
    /// The token, if one was actually issued.
    pub fn into_token(self) -> Option<String> {
        self.token.filter(|t| !t.is_empty())
    }
}

fn credentials(username: &str, password: &str) -> Value {
    json!({ "username": username, "password": password })
}

/// Admin back-office endpoints.
pub mod admin {
    use super::*;

    /// `POST /api/auth/login` (silent).
    pub fn login(username: &str, password: &str) -> ApiRequest {
        ApiRequest::post("/api/auth/login")
            .json(credentials(username, password))
            .silent()
    }

    /// `GET /api/auth/me`.
    pub fn me() -> ApiRequest {
        ApiRequest::get("/api/auth/me")
    }

    /// `POST /api/auth/logout`.
    pub fn logout() -> ApiRequest {
        ApiRequest::post("/api/auth/logout")
    }
}

/// Community account endpoints.
pub mod account {
    use super::*;

    /// `POST /api/account/login` (silent).
    pub fn login(username: &str, password: &str) -> ApiRequest {
        ApiRequest::post("/api/account/login")
            .json(credentials(username, password))
            .silent()
    }

    /// `POST /api/account/register` (silent).
    pub fn register(username: &str, password: &str, display_name: &str) -> ApiRequest {
        ApiRequest::post("/api/account/register")
            .json(json!({
                "username": username,
                "password": password,
                "displayName": display_name,
            }))
            .silent()
    }

    /// `GET /api/account/me`.
    pub fn me() -> ApiRequest {
        ApiRequest::get("/api/account/me")
    }

    /// `PUT /api/account/me`.
    pub fn update_me(payload: Value) -> ApiRequest {
        ApiRequest::put("/api/account/me").json(payload)
    }

    /// `POST /api/account/logout`.
    pub fn logout() -> ApiRequest {
        ApiRequest::post("/api/account/logout")
    }
}

/// Admin file management. Only the request shapes live here.
pub mod files {
    use super::*;

    /// A file to upload.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FileUpload {
        /// Business bucket the file belongs to (e.g. `hero-avatar`).
        pub biz: String,
        /// Optional sub-type within the bucket.
        pub kind: Option<String>,
        pub file_name: String,
        pub content_type: Option<String>,
        pub bytes: Vec<u8>,
    }

    /// `GET /api/files` with filter parameters.
    pub fn list(params: &[(&str, &str)]) -> ApiRequest {
        params
            .iter()
            .fold(ApiRequest::get("/api/files"), |req, (k, v)| req.query(*k, *v))
    }

    /// `POST /api/files/upload` as `multipart/form-data` with parts
    /// `biz`, optional `type`, and `file`.
    pub fn upload(upload: FileUpload) -> ApiRequest {
        let mut parts = vec![Part::text("biz", upload.biz)];
        if let Some(kind) = upload.kind {
            parts.push(Part::text("type", kind));
        }
        parts.push(Part::file("file", upload.file_name, upload.content_type, upload.bytes));
        ApiRequest::post("/api/files/upload").multipart(parts)
    }

    /// `DELETE /api/files/{id}`.
    pub fn delete(id: u64) -> ApiRequest {
        ApiRequest::delete(format!("/api/files/{id}"))
    }
}
