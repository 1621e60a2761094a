//! End-to-end login flow against in-memory collaborators: an identity
//! provider whose login settles asynchronously, a connection manager
//! that rebuilds the actor after authentication, and the session store
//! plus cache sink the UI depends on.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use auth_core::common::{AuthError, ConnectionStatus};
use auth_core::domains::login::session::{load_verified_mobile, OtpSession};
use auth_core::domains::login::MobileAuth;
use auth_core::kernel::{
    ActorHandle, AuthDeps, CacheInvalidator, CacheKey, Identity, IdentityProvider, LoginError,
    LoginStatus, MemoryStore, OtpActor,
};
use auth_core::AuthConfig;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Identity provider whose login completes after a delay, driven by a
/// background task the way a real provider popup would be.
struct SlowProvider {
    identity: Mutex<Option<Identity>>,
    status: Mutex<LoginStatus>,
    login_calls: AtomicU32,
    settle_after: Duration,
}

impl SlowProvider {
    fn new(settle_after: Duration) -> Arc<Self> {
        Arc::new(Self {
            identity: Mutex::new(None),
            status: Mutex::new(LoginStatus::Idle),
            login_calls: AtomicU32::new(0),
            settle_after,
        })
    }
}

impl IdentityProvider for SlowProvider {
    fn login(&self) {
        // Fire-and-forget: the background task in the test plays the
        // role of the provider popup completing later.
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        *self.status.lock().unwrap() = LoginStatus::LoggingIn;
    }

    fn identity(&self) -> Option<Identity> {
        self.identity.lock().unwrap().clone()
    }

    fn login_status(&self) -> LoginStatus {
        *self.status.lock().unwrap()
    }

    fn login_error(&self) -> Option<LoginError> {
        None
    }
}

struct CountingActor {
    generate_calls: AtomicU32,
    verify_calls: AtomicU32,
}

#[async_trait]
impl OtpActor for CountingActor {
    async fn generate_otp(&self, _mobile: &str) -> Result<String, AuthError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        Ok("918273".to_string())
    }

    async fn verify_otp(&self, _mobile: &str, otp: &str) -> Result<bool, AuthError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        Ok(otp == "918273")
    }
}

#[derive(Default)]
struct RecordingCache {
    invalidations: Mutex<Vec<CacheKey>>,
}

impl CacheInvalidator for RecordingCache {
    fn invalidate(&self, key: CacheKey) {
        self.invalidations.lock().unwrap().push(key);
    }
}

#[tokio::test(start_paused = true)]
async fn test_full_login_from_anonymous_to_verified_session() {
    init_tracing();
    let provider = SlowProvider::new(Duration::from_secs(3));
    let handle = ActorHandle::new();
    let actor = Arc::new(CountingActor {
        generate_calls: AtomicU32::new(0),
        verify_calls: AtomicU32::new(0),
    });
    let store = MemoryStore::shared();
    let cache = Arc::new(RecordingCache::default());

    // Background "user + connection manager": the login settles after a
    // few seconds, then the actor is rebuilt a little later.
    {
        let provider = provider.clone();
        let handle = handle.clone();
        let actor = actor.clone();
        let settle_after = provider.settle_after;
        tokio::spawn(async move {
            sleep(settle_after).await;
            *provider.identity.lock().unwrap() = Some(Identity::named("user-1"));
            *provider.status.lock().unwrap() = LoginStatus::Idle;

            sleep(Duration::from_secs(2)).await;
            handle.set(actor);
        });
    }

    let deps = AuthDeps {
        identity: provider.clone(),
        actor: handle,
        store: store.clone(),
        cache: cache.clone(),
    };
    let auth = MobileAuth::new(deps, AuthConfig::default());

    // Send: triggers the login, waits out the actor rebuild, issues OTP
    assert!(auth.send_otp("9455134315").await);
    assert_eq!(provider.login_calls.load(Ordering::SeqCst), 1);
    assert_eq!(actor.generate_calls.load(Ordering::SeqCst), 1);
    assert!(auth.otp_sent());
    assert_eq!(auth.connection_status(), ConnectionStatus::Idle);

    let issued = auth.generated_otp().expect("self-serve mode surfaces the code");
    let session = OtpSession::load(store.as_ref()).expect("session persisted");
    assert_eq!(session.mobile, "9455134315");
    assert_eq!(session.otp.as_deref(), Some(issued.as_str()));

    // Verify: same actor path, then session anchor + cache invalidation
    assert!(auth.verify_otp("9455134315", &issued).await);
    assert_eq!(actor.verify_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        load_verified_mobile(store.as_ref()).as_deref(),
        Some("9455134315")
    );
    assert_eq!(
        *cache.invalidations.lock().unwrap(),
        vec![CacheKey::SessionState, CacheKey::CurrentUserProfile]
    );
    assert_eq!(auth.error(), None);
    assert_eq!(auth.connection_status(), ConnectionStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_wrong_code_leaves_no_session_anchor() {
    init_tracing();
    let provider = SlowProvider::new(Duration::ZERO);
    *provider.identity.lock().unwrap() = Some(Identity::named("user-1"));

    let handle = ActorHandle::new();
    handle.set(Arc::new(CountingActor {
        generate_calls: AtomicU32::new(0),
        verify_calls: AtomicU32::new(0),
    }));
    let store = MemoryStore::shared();
    let cache = Arc::new(RecordingCache::default());

    let deps = AuthDeps {
        identity: provider,
        actor: handle,
        store: store.clone(),
        cache: cache.clone(),
    };
    let auth = MobileAuth::new(deps, AuthConfig::default());

    assert!(!auth.verify_otp("9455134315", "000000").await);

    assert_eq!(auth.error_kind(), Some(AuthError::InvalidCredential));
    assert_eq!(load_verified_mobile(store.as_ref()), None);
    assert!(cache.invalidations.lock().unwrap().is_empty());
}
