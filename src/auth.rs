//! Authentication provider boundary.
//!
//! The core only ever reads `current_user().id` to stamp ownership on
//! writes. Which sign-in strategy produced that identity (phone OTP,
//! email/password, or federated sign-in) is resolved once from the
//! feature flags at configuration time; the lifecycle code never
//! branches on it.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::config::FeatureFlags;

/// Identity exposed by the provider after a successful sign-in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub display_name: String,
    pub phone_number: String,
}

/// Narrow contract over the external authentication service.
pub trait AuthProvider: Send + Sync {
    fn current_user(&self) -> Option<AuthUser>;
    fn sign_out(&self);
}

/// Sign-in strategies the app can be configured with. Each strategy
/// ultimately yields the same `AuthUser`; selection is a configuration
/// concern, not a lifecycle one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    PhoneOtp,
    EmailPassword,
    Federated,
}

impl AuthMethod {
    /// The strategy used for first-party sign-up/sign-in.
    pub fn primary(flags: &FeatureFlags) -> Self {
        if flags.enable_phone_otp {
            Self::PhoneOtp
        } else {
            Self::EmailPassword
        }
    }

    /// All strategies the sign-in screen may offer.
    pub fn available(flags: &FeatureFlags) -> Vec<Self> {
        let mut methods = vec![Self::primary(flags)];
        if flags.enable_google_signin {
            methods.push(Self::Federated);
        }
        methods
    }
}

/// In-process provider holding at most one signed-in identity. Used by
/// tests and by embeddings that manage sessions themselves.
#[derive(Default)]
pub struct StaticAuthProvider {
    user: RwLock<Option<AuthUser>>,
}

impl StaticAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(user: AuthUser) -> Self {
        Self {
            user: RwLock::new(Some(user)),
        }
    }

    pub fn sign_in(&self, user: AuthUser) {
        *self.user.write().expect("auth lock") = Some(user);
    }
}

impl AuthProvider for StaticAuthProvider {
    fn current_user(&self) -> Option<AuthUser> {
        self.user.read().expect("auth lock").clone()
    }

    fn sign_out(&self) {
        *self.user.write().expect("auth lock") = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> AuthUser {
        AuthUser {
            id: id.into(),
            display_name: "Budi".into(),
            phone_number: "0812".into(),
        }
    }

    #[test]
    fn default_flags_select_email_password() {
        let flags = FeatureFlags::default();
        assert_eq!(AuthMethod::primary(&flags), AuthMethod::EmailPassword);
        assert_eq!(
            AuthMethod::available(&flags),
            vec![AuthMethod::EmailPassword, AuthMethod::Federated]
        );
    }

    #[test]
    fn phone_otp_flag_switches_primary_strategy() {
        let flags = FeatureFlags {
            enable_phone_otp: true,
            enable_google_signin: false,
            ..Default::default()
        };
        assert_eq!(AuthMethod::primary(&flags), AuthMethod::PhoneOtp);
        assert_eq!(AuthMethod::available(&flags), vec![AuthMethod::PhoneOtp]);
    }

    #[test]
    fn static_provider_sign_in_and_out() {
        let provider = StaticAuthProvider::new();
        assert!(provider.current_user().is_none());

        provider.sign_in(user("u1"));
        assert_eq!(provider.current_user().unwrap().id, "u1");

        provider.sign_out();
        assert!(provider.current_user().is_none());
    }
}
