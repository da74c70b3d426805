//! Route table + guard together, with the admin realm backed by a real
//! `SessionCell` and hydration scripted in the test.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use realmgate_guard::{Decision, PermissionCheck, Realm, RedirectReason, RouteGuard, RouteRecord, RouteTable};
use realmgate_protocol::{Domain, Location};
use realmgate_session::{AdminIdentity, AdminProfile, CredentialStore, SessionCell};

struct ScriptedAdmin {
    cell: Arc<SessionCell<AdminIdentity>>,
    profile: AdminProfile,
    calls: AtomicUsize,
}

impl Realm for ScriptedAdmin {
    type Error = String;

    fn domain(&self) -> Domain {
        Domain::Admin
    }

    fn is_authenticated(&self) -> bool {
        self.cell.is_authenticated()
    }

    fn is_hydrated(&self) -> bool {
        self.cell.is_hydrated()
    }

    async fn bootstrap(&self) -> Result<bool, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let Some(ticket) = self.cell.begin_hydration() else {
            return Ok(false);
        };
        self.cell.commit(&ticket, AdminIdentity::from(self.profile.clone()));
        Ok(true)
    }
}

impl PermissionCheck for ScriptedAdmin {
    fn has_permission(&self, code: &str) -> bool {
        self.cell.has_permission(code)
    }
}

struct NoAccount;

impl Realm for NoAccount {
    type Error = String;

    fn domain(&self) -> Domain {
        Domain::Account
    }

    fn is_authenticated(&self) -> bool {
        false
    }

    fn is_hydrated(&self) -> bool {
        false
    }

    async fn bootstrap(&self) -> Result<bool, String> {
        Ok(false)
    }
}

fn routes() -> RouteTable {
    RouteTable::new(vec![
        RouteRecord::new("/admin/login").name("admin-login"),
        RouteRecord::new("/403").name("forbidden"),
        RouteRecord::new("/admin").requires_auth().children(vec![
            RouteRecord::new("").name("dashboard"),
            RouteRecord::new("users").perm("user:list").children(vec![
                RouteRecord::new("create").perm("user:create"),
            ]),
        ]),
        RouteRecord::new("/ow").name("ow-home"),
    ])
}

fn admin(token: Option<&str>, codes: &[&str]) -> ScriptedAdmin {
    let cell = Arc::new(SessionCell::new(Domain::Admin, CredentialStore::in_memory()));
    if let Some(token) = token {
        cell.set_token(token);
    }
    ScriptedAdmin {
        cell,
        profile: AdminProfile {
            permission_codes: codes.iter().map(|c| c.to_string()).collect(),
            is_admin: false,
            ..AdminProfile::default()
        },
        calls: AtomicUsize::new(0),
    }
}

async fn navigate(table: &RouteTable, admin: &ScriptedAdmin, to: &str) -> Decision {
    let target = Location::parse(to);
    let chain = table.resolve_meta(target.path());
    RouteGuard::default().check(&target, &chain, admin, &NoAccount).await
}

#[tokio::test]
async fn test_logged_out_admin_is_sent_to_login_with_encoded_target() {
    let table = routes();
    let admin = admin(None, &[]);

    let decision = navigate(&table, &admin, "/admin/users?page=2#list").await;

    assert_eq!(
        decision,
        Decision::Redirect {
            target: "/admin/login?redirect=%2Fadmin%2Fusers%3Fpage%3D2%23list".to_string(),
            reason: RedirectReason::LoginRequired(Domain::Admin),
        }
    );
    let login = Location::parse(decision.target().unwrap_or_default());
    assert_eq!(login.query_param("redirect").as_deref(), Some("/admin/users?page=2#list"));
}

#[tokio::test]
async fn test_missing_code_is_forbidden_and_granted_code_proceeds() {
    let table = routes();
    let admin = admin(Some("adm-1"), &["user:list"]);

    let denied = navigate(&table, &admin, "/admin/users/create").await;
    assert_eq!(denied.target(), Some("/403"));

    let allowed = navigate(&table, &admin, "/admin/users").await;
    assert!(allowed.is_proceed());

    // Hydrated on the first navigation only.
    assert_eq!(admin.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unmatched_and_public_paths_proceed() {
    let table = routes();
    let admin = admin(None, &[]);

    assert!(navigate(&table, &admin, "/ow").await.is_proceed());
    assert!(navigate(&table, &admin, "/no/such/page").await.is_proceed());
    assert_eq!(admin.calls.load(Ordering::SeqCst), 0);
}
