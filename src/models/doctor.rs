use serde::{Deserialize, Serialize};

/// Directory entry for one doctor. Read-mostly reference data; favorite
/// membership lives on the user document, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub hospital: String,
    pub rating: f64,
    pub patients_count: u32,
    pub years_experience: u32,
    pub image_url: String,
    pub is_available: bool,
    pub working_time: String,
}

impl Default for Doctor {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            specialty: String::new(),
            hospital: String::new(),
            rating: 0.0,
            patients_count: 0,
            years_experience: 0,
            image_url: String::new(),
            is_available: true,
            working_time: String::new(),
        }
    }
}
