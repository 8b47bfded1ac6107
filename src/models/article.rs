use serde::{Deserialize, Serialize};

/// Editorial content shown on the home and article screens. Pure
/// content: no lifecycle beyond admin CRUD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
    /// One of the `ArticleCategory` labels, stored as written by admins.
    pub category: String,
    pub image_url: String,
    pub date: String,
    pub read_time: String,
    pub is_trending: bool,
}

impl Default for Article {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            content: String::new(),
            category: String::new(),
            image_url: String::new(),
            date: String::new(),
            read_time: "5 min read".into(),
            is_trending: false,
        }
    }
}
