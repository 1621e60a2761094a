//! Persisted OTP session record.
//!
//! Survives page reloads for the duration of a login attempt. Owned by
//! the orchestrator: created on a successful send, overwritten by each
//! new send, read by the profile/setup flow to pre-fill the mobile
//! field. Expiry is a UI countdown concern, not enforced here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::kernel::SessionStore;

pub const OTP_SESSION_KEY: &str = "otp_session";
pub const VERIFIED_MOBILE_KEY: &str = "verified_mobile";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OtpSession {
    pub mobile: String,
    pub issued_at: DateTime<Utc>,
    /// Present only in self-serve OTP deployments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

impl OtpSession {
    /// Read the current session; a corrupt record reads as absent.
    pub fn load(store: &dyn SessionStore) -> Option<Self> {
        let raw = store.get(OTP_SESSION_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(err) => {
                warn!("discarding corrupt OTP session record: {}", err);
                None
            }
        }
    }

    /// Persist this session, overwriting any previous record.
    pub fn save(&self, store: &dyn SessionStore) {
        match serde_json::to_string(self) {
            Ok(raw) => store.set(OTP_SESSION_KEY, &raw),
            Err(err) => warn!("failed to serialize OTP session: {}", err),
        }
    }

    pub fn clear(store: &dyn SessionStore) {
        store.remove(OTP_SESSION_KEY);
    }
}

/// Record the verified mobile number as the session anchor.
pub fn save_verified_mobile(store: &dyn SessionStore, mobile: &str) {
    store.set(VERIFIED_MOBILE_KEY, mobile);
}

pub fn load_verified_mobile(store: &dyn SessionStore) -> Option<String> {
    store.get(VERIFIED_MOBILE_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::MemoryStore;

    #[test]
    fn test_save_load_roundtrip() {
        let store = MemoryStore::new();
        let session = OtpSession {
            mobile: "9455134315".to_string(),
            issued_at: Utc::now(),
            otp: Some("123456".to_string()),
        };

        session.save(&store);
        assert_eq!(OtpSession::load(&store), Some(session));
    }

    #[test]
    fn test_save_overwrites_previous_record() {
        let store = MemoryStore::new();
        let first = OtpSession {
            mobile: "9455134315".to_string(),
            issued_at: Utc::now(),
            otp: Some("111111".to_string()),
        };
        first.save(&store);

        let second = OtpSession {
            mobile: "9455134315".to_string(),
            issued_at: Utc::now(),
            otp: Some("222222".to_string()),
        };
        second.save(&store);

        let loaded = OtpSession::load(&store).expect("record present");
        assert_eq!(loaded.otp.as_deref(), Some("222222"));
    }

    #[test]
    fn test_corrupt_record_reads_as_absent() {
        let store = MemoryStore::new();
        store.set(OTP_SESSION_KEY, "{not json");
        assert_eq!(OtpSession::load(&store), None);
    }

    #[test]
    fn test_otp_omitted_when_not_self_serve() {
        let session = OtpSession {
            mobile: "9455134315".to_string(),
            issued_at: Utc::now(),
            otp: None,
        };
        let raw = serde_json::to_string(&session).expect("serializes");
        assert!(!raw.contains("otp"), "absent otp must not be serialized");
    }

    #[test]
    fn test_verified_mobile_anchor() {
        let store = MemoryStore::new();
        assert_eq!(load_verified_mobile(&store), None);

        save_verified_mobile(&store, "9455134315");
        assert_eq!(load_verified_mobile(&store).as_deref(), Some("9455134315"));
    }

    #[test]
    fn test_clear_removes_session() {
        let store = MemoryStore::new();
        let session = OtpSession {
            mobile: "9455134315".to_string(),
            issued_at: Utc::now(),
            otp: None,
        };
        session.save(&store);

        OtpSession::clear(&store);
        assert_eq!(OtpSession::load(&store), None);
    }
}
