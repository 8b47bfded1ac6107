//! Editorial articles: home-screen trending strip, category browsing,
//! and the admin CRUD behind both.

use std::sync::Arc;

use crate::models::{Article, ArticleCategory};
use crate::store::{self, DataError, Direction, DocumentStore, Query, ARTICLES};

pub struct ArticleService<S> {
    store: Arc<S>,
}

impl<S: DocumentStore> ArticleService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The two articles pinned to the home screen.
    pub async fn trending(&self) -> Result<Vec<Article>, DataError> {
        let docs = self
            .store
            .query(
                ARTICLES,
                &Query::new().filter_eq("isTrending", true).limit(2),
            )
            .await?;
        Ok(store::decode_all(ARTICLES, &docs))
    }

    /// Category tab contents. `Newest` is not a stored label: it means
    /// everything, freshest first. The other tabs filter on the stored
    /// category string.
    pub async fn by_category(&self, category: ArticleCategory) -> Result<Vec<Article>, DataError> {
        let query = match category {
            ArticleCategory::Newest => Query::new().order_by("date", Direction::Descending),
            other => Query::new().filter_eq("category", other.as_str()),
        };
        let docs = self.store.query(ARTICLES, &query).await?;
        Ok(store::decode_all(ARTICLES, &docs))
    }

    pub async fn get(&self, article_id: &str) -> Result<Article, DataError> {
        self.store.get(ARTICLES, article_id).await?.decode(ARTICLES)
    }

    // ─── Admin CRUD ───────────────────────────────────────────────────────────

    pub async fn add(&self, article: &Article) -> Result<String, DataError> {
        self.store.add(ARTICLES, store::encode(article)?).await
    }

    pub async fn update(&self, article: &Article) -> Result<(), DataError> {
        self.store
            .set(ARTICLES, &article.id, store::encode(article)?)
            .await
    }

    pub async fn delete(&self, article_id: &str) -> Result<(), DataError> {
        self.store.delete(ARTICLES, article_id).await
    }
}
