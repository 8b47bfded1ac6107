use serde::{Deserialize, Serialize};

/// Registered patient account. Created once at sign-up; afterwards only
/// the favorite-doctor set mutates (via array union/remove).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: String,
    pub name: String,
    /// National identity number (NIK), kept as an opaque string.
    pub nik: String,
    pub email: String,
    pub dob: String,
    pub gender: String,
    pub phone: String,
    pub favorite_doctors: Vec<String>,
}
