//! Core protocol types: identity domains and the response envelope.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Codec;

/// The envelope `code` that marks a successful call.
pub const OK_CODE: i64 = 0;

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// An independently authenticated realm.
///
/// Each domain has its own credential slot, its own header convention and
/// its own login path. Nothing one domain does may touch another domain's
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// The administrative back office.
    Admin,
    /// The community front end (player accounts).
    Account,
    /// Anonymous read endpoints. Never carries a credential.
    Public,
}

impl Domain {
    /// Returns the lowercase name used in logs and storage keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Account => "account",
            Self::Public => "public",
        }
    }

    /// Returns `true` for the domains that carry a bearer credential.
    pub fn is_authenticated(self) -> bool {
        !matches!(self, Self::Public)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The uniform `{ code, message, data }` wrapper every API response uses.
///
/// `code == 0` means success and `data` is what the caller actually wants.
/// Any other code is a logical failure described by `message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// `0` on success, anything else is a logical failure.
    pub code: i64,
    /// Human-readable message from the server.
    #[serde(default)]
    pub message: String,
    /// The payload handed to the caller on success.
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// Builds a success envelope around `data`.
    pub fn ok(data: Value) -> Self {
        Self {
            code: OK_CODE,
            message: "ok".to_string(),
            data,
        }
    }

    /// Builds a logical-failure envelope.
    pub fn failure(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: Value::Null,
        }
    }

    /// Returns `true` if the envelope carries the success code.
    pub fn is_ok(&self) -> bool {
        self.code == OK_CODE
    }
}

// ---------------------------------------------------------------------------
// Decoded
// ---------------------------------------------------------------------------

/// What a successful HTTP response body turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// An envelope with the success code; holds the unwrapped `data`.
    Success(Value),

    /// An envelope with any other code.
    Failure {
        /// The envelope code, or `None` if the `code` field wasn't an integer.
        code: Option<i64>,
        /// The envelope message; empty if the server sent none.
        message: String,
    },

    /// Not an envelope at all (no `code` field, not an object, or not
    /// JSON). Handed to the caller unchanged.
    PassThrough(Value),
}

impl Decoded {
    /// Classifies a response body.
    ///
    /// Empty bodies become `PassThrough(Null)`; bodies that aren't JSON
    /// become `PassThrough(String)` so static responses still reach the
    /// caller.
    pub fn from_bytes<C: Codec>(codec: &C, body: &[u8]) -> Self {
        if body.is_empty() {
            return Self::PassThrough(Value::Null);
        }
        match codec.decode::<Value>(body) {
            Ok(value) => Self::classify(value),
            Err(_) => Self::PassThrough(Value::String(String::from_utf8_lossy(body).into_owned())),
        }
    }

    /// Classifies an already-parsed JSON value.
    ///
    /// Only an object with a `code` key counts as an envelope; everything
    /// else passes through.
    pub fn classify(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return Self::PassThrough(value);
        };
        let Some(code) = map.get("code") else {
            return Self::PassThrough(Value::Object(map));
        };

        let code = code.as_i64();
        if code == Some(OK_CODE) {
            return Self::Success(map.remove("data").unwrap_or(Value::Null));
        }

        let message = map
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Self::Failure { code, message }
    }
}
