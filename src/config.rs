/// Application-level constants
pub const APP_NAME: &str = "Medica";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "info,medica_core=debug"
}

/// Feature toggles resolved once at startup.
///
/// `enable_phone_otp` requires the paid SMS plan; with it off the app
/// falls back to email/password. Phone numbers can still be collected
/// at sign-up either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureFlags {
    pub enable_phone_otp: bool,
    pub collect_phone_number: bool,
    pub enable_google_signin: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_phone_otp: false,
            collect_phone_number: true,
            enable_google_signin: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_medica() {
        assert_eq!(APP_NAME, "Medica");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.3.0");
    }

    #[test]
    fn default_flags() {
        let flags = FeatureFlags::default();
        assert!(!flags.enable_phone_otp);
        assert!(flags.collect_phone_number);
        assert!(flags.enable_google_signin);
    }
}
