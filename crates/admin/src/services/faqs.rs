//! FAQ management for the fixed hardware and software categories.

use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use taskmaster_core::FaqCategory;

use crate::db::{DocumentStore, StoreError, child_path};
use crate::error::AppError;
use crate::models::{Faq, FaqList};

/// Store path holding the FAQ categories.
pub const FAQ_ROOT: &str = "faqs";

/// Errors from FAQ operations.
#[derive(Debug, Error)]
pub enum FaqError {
    #[error("question and answer are required")]
    Blank,

    #[error("no {category} FAQ at index {index}")]
    NotFound { category: FaqCategory, index: usize },

    #[error("failed to {action}: {source}")]
    Store {
        action: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("failed to encode FAQ list: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<FaqError> for AppError {
    fn from(err: FaqError) -> Self {
        match err {
            FaqError::Blank => Self::BadRequest("Question and answer are required".to_string()),
            FaqError::NotFound { .. } => Self::NotFound("FAQ not found".to_string()),
            FaqError::Store { action, source } => Self::operation(action, source),
            FaqError::Serialization(e) => Self::operation("save FAQs", e),
        }
    }
}

/// FAQ lists of every category.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FaqCatalog {
    pub hardware: FaqList,
    pub software: FaqList,
}

/// FAQ management service.
pub struct FaqService<'a> {
    store: &'a dyn DocumentStore,
}

fn category_path(category: FaqCategory) -> String {
    child_path(FAQ_ROOT, category.as_str())
}

fn validated(faq: Faq) -> Result<Faq, FaqError> {
    let question = faq.question.trim().to_string();
    let answer = faq.answer.trim().to_string();
    if question.is_empty() || answer.is_empty() {
        return Err(FaqError::Blank);
    }
    Ok(Faq { question, answer })
}

impl<'a> FaqService<'a> {
    /// Create a new FAQ service.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Load both categories.
    ///
    /// # Errors
    ///
    /// Returns `FaqError::Store` if a read fails.
    pub async fn list(&self) -> Result<FaqCatalog, FaqError> {
        let (hardware, software) = tokio::try_join!(
            self.category(FaqCategory::Hardware),
            self.category(FaqCategory::Software),
        )?;
        Ok(FaqCatalog { hardware, software })
    }

    /// Load one category; a missing category is an empty list.
    ///
    /// # Errors
    ///
    /// Returns `FaqError::Store` if the read fails.
    pub async fn category(&self, category: FaqCategory) -> Result<FaqList, FaqError> {
        let node = self
            .store
            .read(&category_path(category))
            .await
            .map_err(|source| FaqError::Store {
                action: "load FAQs",
                source,
            })?;
        Ok(FaqList::from_node(node))
    }

    /// Replace a category with a dense list.
    async fn write_all(&self, category: FaqCategory, faqs: &[Faq]) -> Result<(), FaqError> {
        let value = serde_json::to_value(faqs)?;
        self.store
            .set(&category_path(category), &value)
            .await
            .map_err(|source| FaqError::Store {
                action: "save FAQs",
                source,
            })
    }

    /// Append an entry to a category.
    ///
    /// # Errors
    ///
    /// Returns `FaqError::Blank` for blank input, or a store error.
    #[tracing::instrument(skip(self, faq))]
    pub async fn add(&self, category: FaqCategory, faq: Faq) -> Result<FaqList, FaqError> {
        let faq = validated(faq)?;
        let mut faqs = self.category(category).await?.to_dense();
        faqs.push(faq);
        self.write_all(category, &faqs).await?;
        self.category(category).await
    }

    /// Edit the entry stored at `index`.
    ///
    /// # Errors
    ///
    /// Returns `FaqError::Blank`, `FaqError::NotFound`, or a store error.
    #[tracing::instrument(skip(self, faq))]
    pub async fn update(
        &self,
        category: FaqCategory,
        index: usize,
        faq: Faq,
    ) -> Result<FaqList, FaqError> {
        let faq = validated(faq)?;
        if self.category(category).await?.get(index).is_none() {
            return Err(FaqError::NotFound { category, index });
        }

        let path = child_path(&category_path(category), &index.to_string());
        self.store
            .update(
                &path,
                &json!({ "question": faq.question, "answer": faq.answer }),
            )
            .await
            .map_err(|source| FaqError::Store {
                action: "update FAQ",
                source,
            })?;
        self.category(category).await
    }

    /// Remove the entry stored at `index`, rewriting the category densely.
    ///
    /// # Errors
    ///
    /// Returns `FaqError::NotFound` or a store error.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, category: FaqCategory, index: usize) -> Result<FaqList, FaqError> {
        let list = self.category(category).await?;
        if list.get(index).is_none() {
            return Err(FaqError::NotFound { category, index });
        }

        let remaining: Vec<Faq> = list
            .entries
            .into_iter()
            .filter(|e| e.index != index)
            .map(|e| e.faq)
            .collect();
        self.write_all(category, &remaining).await?;
        self.category(category).await
    }
}
