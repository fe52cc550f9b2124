//! Banner management: records in the document store, images in the blob store.

use serde_json::{Map, Value, json};
use thiserror::Error;

use taskmaster_core::BannerKey;

use crate::blob::{BlobError, BlobStore, banner_image_path};
use crate::collection::CollectionMirror;
use crate::db::{DocumentStore, Repository, RepositoryError};
use crate::error::AppError;
use crate::models::{Banner, Keyed};

/// Errors from banner operations.
#[derive(Debug, Error)]
pub enum BannerError {
    #[error("title is required")]
    TitleRequired,

    #[error("image is required")]
    ImageRequired,

    #[error("banner not found")]
    NotFound,

    /// Neither a recorded path nor a parseable download URL.
    #[error("cannot determine image path of banner")]
    UnresolvableImage,

    #[error("image upload failed: {0}")]
    Upload(#[source] BlobError),

    #[error("image delete failed: {0}")]
    ImageDelete(#[source] BlobError),

    #[error("failed to {action}: {source}")]
    Store {
        action: &'static str,
        #[source]
        source: RepositoryError,
    },
}

impl From<BannerError> for AppError {
    fn from(err: BannerError) -> Self {
        match err {
            BannerError::TitleRequired => Self::BadRequest("Title is required".to_string()),
            BannerError::ImageRequired => Self::BadRequest("Image is required".to_string()),
            BannerError::NotFound => Self::NotFound("Banner not found".to_string()),
            BannerError::Upload(source) => Self::operation("upload banner image", source),
            err @ (BannerError::UnresolvableImage | BannerError::ImageDelete(_)) => {
                Self::operation("delete banner", err)
            }
            BannerError::Store { action, source } => Self::operation(action, source),
        }
    }
}

/// An uploaded image file.
#[derive(Debug, Clone)]
pub struct BannerImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Fields submitted when creating or editing a banner.
#[derive(Debug, Clone, Default)]
pub struct BannerInput {
    pub title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    /// `None` keeps the current state (new banners start active).
    pub active: Option<bool>,
    pub image: Option<BannerImage>,
}

/// Banner management service.
pub struct BannerService<'a> {
    banners: Repository<'a, Banner>,
    blobs: &'a dyn BlobStore,
    mirror: &'a CollectionMirror<Banner>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn store_err(action: &'static str) -> impl FnOnce(RepositoryError) -> BannerError {
    move |source| BannerError::Store { action, source }
}

impl<'a> BannerService<'a> {
    /// Create a new banner service.
    #[must_use]
    pub const fn new(
        store: &'a dyn DocumentStore,
        blobs: &'a dyn BlobStore,
        mirror: &'a CollectionMirror<Banner>,
    ) -> Self {
        Self {
            banners: Repository::new(store),
            blobs,
            mirror,
        }
    }

    /// Upload an image, returning its download URL and blob path.
    async fn upload(&self, image: BannerImage) -> Result<(String, String), BannerError> {
        let path = banner_image_path(chrono::Utc::now().timestamp_millis(), &image.file_name);
        let url = self
            .blobs
            .upload(&path, image.bytes, &image.content_type)
            .await
            .map_err(BannerError::Upload)?;
        Ok((url, path))
    }

    /// Delete a blob that is no longer referenced, logging failures.
    async fn discard_blob(&self, path: &str) {
        if let Err(e) = self.blobs.delete(path).await {
            tracing::warn!(path, error = %e, "Failed to delete unreferenced banner image");
        }
    }

    async fn current(&self, key: &BannerKey) -> Result<Banner, BannerError> {
        self.banners
            .get(key)
            .await
            .map_err(store_err("load banner"))?
            .ok_or(BannerError::NotFound)
    }

    /// Create a banner with an uploaded image.
    ///
    /// If the record write fails the uploaded image is deleted again.
    ///
    /// # Errors
    ///
    /// Returns `BannerError::TitleRequired` / `ImageRequired` for missing
    /// input, or an upload/store error.
    #[tracing::instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, input: BannerInput) -> Result<Keyed<BannerKey, Banner>, BannerError> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(BannerError::TitleRequired);
        }
        let image = input
            .image
            .filter(|i| !i.bytes.is_empty())
            .ok_or(BannerError::ImageRequired)?;

        let (image_url, image_path) = self.upload(image).await?;

        let key = Repository::<Banner>::next_key().map_err(store_err("create banner"))?;
        let banner = Banner {
            id: key.to_string(),
            title,
            description: non_blank(input.description),
            link: non_blank(input.link),
            image_url,
            image_path: Some(image_path.clone()),
            active: input.active.unwrap_or(true),
            created_at: Some(chrono::Utc::now().timestamp_millis()),
        };

        if let Err(e) = self.banners.set(&key, &banner).await {
            self.discard_blob(&image_path).await;
            return Err(store_err("create banner")(e));
        }

        tracing::info!(banner = %key, "Banner created");
        let banner = self
            .mirror
            .sync_record(&self.banners, &key, Some(banner.clone()))
            .await
            .unwrap_or(banner);
        Ok(Keyed::new(key, banner))
    }

    /// Edit a banner, optionally replacing its image.
    ///
    /// `id` and `createdAt` are left untouched. The old image is deleted
    /// only after the record points at the new one.
    ///
    /// # Errors
    ///
    /// Returns `BannerError::TitleRequired`, `BannerError::NotFound`, or an
    /// upload/store error.
    #[tracing::instrument(skip(self, input), fields(banner = %key))]
    pub async fn update(
        &self,
        key: &BannerKey,
        input: BannerInput,
    ) -> Result<Keyed<BannerKey, Banner>, BannerError> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(BannerError::TitleRequired);
        }
        let current = self.current(key).await?;

        // Null members delete optional fields cleared in the form
        let mut patch = Map::new();
        patch.insert("title".to_string(), Value::String(title));
        patch.insert("description".to_string(), json!(non_blank(input.description)));
        patch.insert("link".to_string(), json!(non_blank(input.link)));
        if let Some(active) = input.active {
            patch.insert("active".to_string(), Value::Bool(active));
        }

        let replacement = match input.image.filter(|i| !i.bytes.is_empty()) {
            Some(image) => {
                let (url, path) = self.upload(image).await?;
                patch.insert("imageUrl".to_string(), Value::String(url));
                patch.insert("imagePath".to_string(), Value::String(path.clone()));
                Some(path)
            }
            None => None,
        };
        let patch = Value::Object(patch);

        if let Err(e) = self.banners.update(key, &patch).await {
            if let Some(path) = &replacement {
                self.discard_blob(path).await;
            }
            return Err(store_err("update banner")(e));
        }

        if replacement.is_some() {
            match current.blob_path() {
                Some(old) => self.discard_blob(&old).await,
                None => tracing::warn!("Previous banner image path unknown, leaving blob"),
            }
        }

        let local = local_patch(current, &patch);
        let banner = self
            .mirror
            .sync_record(&self.banners, key, Some(local.clone()))
            .await
            .unwrap_or(local);
        Ok(Keyed::new(key.clone(), banner))
    }

    /// Flip a banner's `active` flag.
    ///
    /// # Errors
    ///
    /// Returns `BannerError::NotFound` or a store error.
    #[tracing::instrument(skip(self), fields(banner = %key))]
    pub async fn toggle(&self, key: &BannerKey) -> Result<Keyed<BannerKey, Banner>, BannerError> {
        let mut banner = self.current(key).await?;
        banner.active = !banner.active;
        self.banners
            .update(key, &json!({ "active": banner.active }))
            .await
            .map_err(store_err("update banner"))?;

        let banner = self
            .mirror
            .sync_record(&self.banners, key, Some(banner.clone()))
            .await
            .unwrap_or(banner);
        Ok(Keyed::new(key.clone(), banner))
    }

    /// Delete a banner and its image.
    ///
    /// The image is deleted first; if that fails the record is kept.
    ///
    /// # Errors
    ///
    /// Returns `BannerError::NotFound`, `BannerError::UnresolvableImage`,
    /// `BannerError::ImageDelete`, or a store error.
    #[tracing::instrument(skip(self), fields(banner = %key))]
    pub async fn delete(&self, key: &BannerKey) -> Result<(), BannerError> {
        let banner = self.current(key).await?;
        let path = banner.blob_path().ok_or(BannerError::UnresolvableImage)?;

        self.blobs
            .delete(&path)
            .await
            .map_err(BannerError::ImageDelete)?;
        self.banners
            .delete(key)
            .await
            .map_err(store_err("delete banner"))?;

        self.mirror.remove(key).await;
        tracing::info!("Banner deleted");
        Ok(())
    }
}

/// Apply a write patch to a local copy, for use when the re-read fails.
fn local_patch(mut banner: Banner, patch: &Value) -> Banner {
    let text = |field: &str| patch.get(field).and_then(Value::as_str).map(String::from);
    if let Some(title) = text("title") {
        banner.title = title;
    }
    banner.description = text("description");
    banner.link = text("link");
    if let Some(url) = text("imageUrl") {
        banner.image_url = url;
        banner.image_path = text("imagePath");
    }
    if let Some(active) = patch.get("active").and_then(Value::as_bool) {
        banner.active = active;
    }
    banner
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::fake::{FakeBackends, FakeBlobStore};
    use taskmaster_core::RecordKey;

    fn image(name: &str) -> BannerImage {
        BannerImage {
            file_name: name.to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }
    }

    fn input(title: &str, image: Option<BannerImage>) -> BannerInput {
        BannerInput {
            title: title.to_string(),
            description: Some("Spring deals".to_string()),
            link: Some("  ".to_string()),
            active: None,
            image,
        }
    }

    fn mirror() -> CollectionMirror<Banner> {
        CollectionMirror::new(Duration::from_secs(60))
    }

    fn service<'a>(fakes: &'a FakeBackends, mirror: &'a CollectionMirror<Banner>) -> BannerService<'a> {
        BannerService::new(fakes.store.as_ref(), fakes.blobs.as_ref(), mirror)
    }

    #[tokio::test]
    async fn test_create_uploads_and_records_path() {
        let fakes = FakeBackends::new();
        let mirror = mirror();
        let created = service(&fakes, &mirror)
            .create(input("  Spring Sale ", Some(image("sale promo.png"))))
            .await
            .unwrap();

        let banner = &created.record;
        assert_eq!(banner.id, created.key.as_str());
        assert_eq!(banner.title, "Spring Sale");
        assert_eq!(banner.link, None);
        assert!(banner.active);
        assert!(banner.created_at.is_some());
        let path = banner.image_path.clone().unwrap();
        assert!(path.starts_with("banner_images/") && path.ends_with("_sale_promo.png"));
        assert!(fakes.blobs.contains(&path));
        assert_eq!(banner.image_url, FakeBlobStore::download_url(&path));
    }

    #[tokio::test]
    async fn test_create_requires_title_and_image() {
        let fakes = FakeBackends::new();
        let mirror = mirror();
        let svc = service(&fakes, &mirror);
        assert!(matches!(
            svc.create(input(" ", Some(image("a.png")))).await,
            Err(BannerError::TitleRequired)
        ));
        assert!(matches!(
            svc.create(input("Sale", None)).await,
            Err(BannerError::ImageRequired)
        ));
        assert!(fakes.blobs.paths().is_empty());
    }

    #[tokio::test]
    async fn test_create_write_failure_removes_uploaded_image() {
        let fakes = FakeBackends::new();
        fakes.store.fail_writes(true);
        let mirror = mirror();
        let result = service(&fakes, &mirror)
            .create(input("Sale", Some(image("a.png"))))
            .await;
        assert!(matches!(result, Err(BannerError::Store { .. })));
        assert!(fakes.blobs.paths().is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_image_and_keeps_identity() {
        let fakes = FakeBackends::new();
        let mirror = mirror();
        let svc = service(&fakes, &mirror);
        let created = svc
            .create(input("Sale", Some(image("old.png"))))
            .await
            .unwrap();
        let old_path = created.record.image_path.clone().unwrap();

        let updated = svc
            .update(
                &created.key,
                BannerInput {
                    title: "Bigger Sale".to_string(),
                    image: Some(image("new.png")),
                    ..BannerInput::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.record.title, "Bigger Sale");
        assert_eq!(updated.record.id, created.record.id);
        assert_eq!(updated.record.created_at, created.record.created_at);
        assert_eq!(updated.record.description, None);
        assert!(!fakes.blobs.contains(&old_path));
        let new_path = updated.record.image_path.unwrap();
        assert!(new_path.ends_with("_new.png"));
        assert!(fakes.blobs.contains(&new_path));
    }

    #[tokio::test]
    async fn test_update_missing_banner() {
        let fakes = FakeBackends::new();
        let mirror = mirror();
        let key = BannerKey::parse("missing").unwrap();
        let result = service(&fakes, &mirror)
            .update(&key, input("Sale", None))
            .await;
        assert!(matches!(result, Err(BannerError::NotFound)));
    }

    #[tokio::test]
    async fn test_toggle_flips_active() {
        let fakes = FakeBackends::new();
        let mirror = mirror();
        let svc = service(&fakes, &mirror);
        let created = svc.create(input("Sale", Some(image("a.png")))).await.unwrap();

        let toggled = svc.toggle(&created.key).await.unwrap();
        assert!(!toggled.record.active);
        let toggled = svc.toggle(&created.key).await.unwrap();
        assert!(toggled.record.active);
    }

    #[tokio::test]
    async fn test_delete_removes_blob_then_record() {
        let fakes = FakeBackends::new();
        let mirror = mirror();
        let svc = service(&fakes, &mirror);
        let created = svc.create(input("Sale", Some(image("a.png")))).await.unwrap();

        svc.delete(&created.key).await.unwrap();
        assert!(fakes.blobs.paths().is_empty());
        assert!(fakes.store.snapshot("banners").is_none());
    }

    #[tokio::test]
    async fn test_delete_legacy_banner_resolves_path_from_url() {
        let fakes = FakeBackends::new();
        let url = fakes.blobs.insert("banner_images/17_old.jpg", b"jpg");
        fakes
            .store
            .set(
                "banners/legacy",
                &json!({"id": "legacy", "title": "Old", "imageUrl": url}),
            )
            .await
            .unwrap();
        let mirror = mirror();

        service(&fakes, &mirror)
            .delete(&BannerKey::parse("legacy").unwrap())
            .await
            .unwrap();
        assert!(!fakes.blobs.contains("banner_images/17_old.jpg"));
    }

    #[tokio::test]
    async fn test_delete_keeps_record_when_blob_delete_fails() {
        let fakes = FakeBackends::new();
        let mirror = mirror();
        let svc = service(&fakes, &mirror);
        let created = svc.create(input("Sale", Some(image("a.png")))).await.unwrap();

        fakes.blobs.fail_deletes(true);
        let result = svc.delete(&created.key).await;
        assert!(matches!(result, Err(BannerError::ImageDelete(_))));
        assert!(fakes.store.snapshot(&format!("banners/{}", created.key)).is_some());
    }

    #[tokio::test]
    async fn test_delete_keeps_record_with_unparseable_url() {
        let fakes = FakeBackends::new();
        fakes
            .store
            .set(
                "banners/b1",
                &json!({"id": "b1", "title": "Odd", "imageUrl": "data:image/png;base64,AAAA"}),
            )
            .await
            .unwrap();
        let mirror = mirror();

        let result = service(&fakes, &mirror)
            .delete(&BannerKey::parse("b1").unwrap())
            .await;
        assert!(matches!(result, Err(BannerError::UnresolvableImage)));
        assert!(fakes.store.snapshot("banners/b1").is_some());
        assert_eq!(fakes.blobs.deletes(), 0);
    }
}
