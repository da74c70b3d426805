//! Shared fixtures: a scripted transport and a wired-up context.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use realmgate::gateway::{MemoryNavigator, NoticeQueue};
use realmgate::guard::{RouteRecord, RouteTable};
use realmgate::session::CredentialStore;
use realmgate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use realmgate::{RealmgateConfig, SessionContext};
use serde_json::{json, Value};
use tokio::sync::oneshot;

enum Reply {
    Now(HttpResponse),
    Fail(TransportError),
    Held(oneshot::Receiver<HttpResponse>),
}

/// Replies per `"METHOD /path"` key, in the order they were queued.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, key: &str, reply: Reply) {
        self.replies.lock().entry(key.to_string()).or_default().push_back(reply);
    }

    /// Queues a JSON reply.
    pub fn reply(&self, key: &str, status: u16, body: Value) {
        self.push(key, Reply::Now(HttpResponse::new(status, body.to_string())));
    }

    /// Queues a `{ code: 0, data }` envelope.
    pub fn ok(&self, key: &str, data: Value) {
        self.reply(key, 200, json!({ "code": 0, "message": "ok", "data": data }));
    }

    /// Queues a network failure.
    pub fn fail(&self, key: &str, error: TransportError) {
        self.push(key, Reply::Fail(error));
    }

    /// Queues a reply that arrives when the returned sender fires.
    pub fn hold(&self, key: &str) -> oneshot::Sender<HttpResponse> {
        let (tx, rx) = oneshot::channel();
        self.push(key, Reply::Held(rx));
        tx
    }

    /// Requests sent so far.
    pub fn seen(&self) -> Vec<HttpRequest> {
        self.seen.lock().clone()
    }

    /// How many requests went to `key`.
    pub fn count(&self, key: &str) -> usize {
        self.seen
            .lock()
            .iter()
            .filter(|r| format!("{} {}", r.method.as_str(), r.path) == key)
            .count()
    }
}

impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let key = format!("{} {}", request.method.as_str(), request.path);
        self.seen.lock().push(request);
        let reply = self.replies.lock().get_mut(&key).and_then(VecDeque::pop_front);
        match reply {
            Some(Reply::Now(response)) => Ok(response),
            Some(Reply::Fail(error)) => Err(error),
            Some(Reply::Held(rx)) => rx
                .await
                .map_err(|_| TransportError::Request("held reply dropped".into())),
            None => Err(TransportError::Request(format!("no reply scripted for {key}"))),
        }
    }
}

/// An envelope body for a held reply.
pub fn envelope(data: Value) -> HttpResponse {
    HttpResponse::new(200, json!({ "code": 0, "message": "ok", "data": data }).to_string())
}

pub fn routes() -> RouteTable {
    RouteTable::new(vec![
        RouteRecord::new("/").name("home"),
        RouteRecord::new("/403").name("forbidden"),
        RouteRecord::new("/admin/login").name("admin-login"),
        RouteRecord::new("/account/login").name("account-login"),
        RouteRecord::new("/admin").requires_auth().children(vec![
            RouteRecord::new("").name("dashboard"),
            RouteRecord::new("users").perm("user:list").children(vec![
                RouteRecord::new("create").name("user-create").perm("user:create"),
            ]),
        ]),
        RouteRecord::new("/lfg").requires_account_auth().name("lfg"),
    ])
}

pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub store: CredentialStore,
    pub notices: Arc<NoticeQueue>,
    pub navigator: Arc<MemoryNavigator>,
    pub ctx: SessionContext<ScriptedTransport>,
}

/// A context at `at`, with tokens already persisted.
pub fn harness(at: &str, admin_token: Option<&str>, account_token: Option<&str>) -> Harness {
    harness_with(at, admin_token, account_token, &RealmgateConfig::default())
}

/// Like [`harness`], with paths and homes taken from `config`.
pub fn harness_with(
    at: &str,
    admin_token: Option<&str>,
    account_token: Option<&str>,
    config: &RealmgateConfig,
) -> Harness {
    let transport = ScriptedTransport::new();
    let store = CredentialStore::in_memory();
    if let Some(token) = admin_token {
        store.set(realmgate::protocol::Domain::Admin, token);
    }
    if let Some(token) = account_token {
        store.set(realmgate::protocol::Domain::Account, token);
    }
    let notices = Arc::new(NoticeQueue::new());
    let navigator = Arc::new(MemoryNavigator::new(at));

    let ctx = SessionContext::builder(transport.clone())
        .config(config)
        .store(store.clone())
        .routes(routes())
        .navigator(navigator.clone())
        .notifier(notices.clone())
        .build();

    Harness {
        transport,
        store,
        notices,
        navigator,
        ctx,
    }
}

pub fn admin_profile(codes: &[&str], is_admin: bool) -> Value {
    json!({ "id": 1, "username": "ops", "permissionCodes": codes, "isAdmin": is_admin })
}
