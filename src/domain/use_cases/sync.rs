use std::sync::Arc;

use crate::{
    entities::image::{NewImageRecord, SyncReport},
    errors::AppError,
    repositories::{
        image::ImageRepository,
        storage::{ObjectStorage, StoredObject},
    },
    use_cases::gallery::GALLERY_PREFIX,
};

enum Outcome {
    Added,
    Skipped,
}

/// Reconciles the object store with the image table.
pub struct SyncHandler {
    pub image_repo: Arc<dyn ImageRepository>,
    pub storage: Arc<dyn ObjectStorage>,
}

impl SyncHandler {
    /// Lists `gallery/` recursively plus loose files at the store root and inserts
    /// a review-pending record for every object that has none.
    ///
    /// A failing object is logged and counted; the sweep carries on.
    pub async fn run_sweep(&self) -> Result<SyncReport, AppError> {
        let mut objects = self.storage.list(GALLERY_PREFIX, true).await?;
        objects.extend(self.storage.list("", false).await?);

        let mut report = SyncReport { total: objects.len(), ..Default::default() };

        for object in &objects {
            match self.reconcile(object).await {
                Ok(Outcome::Added) => report.added += 1,
                Ok(Outcome::Skipped) => report.skipped += 1,
                Err(e) => {
                    tracing::error!(key = %object.key, "Failed to reconcile object: {}", e);
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            total = report.total,
            added = report.added,
            skipped = report.skipped,
            failed = report.failed,
            "Storage sweep finished"
        );
        Ok(report)
    }

    async fn reconcile(&self, object: &StoredObject) -> Result<Outcome, AppError> {
        let url = self.storage.download_url(&object.key)?;

        if self.image_repo.exists_by_url(&url).await? {
            return Ok(Outcome::Skipped);
        }

        let record = NewImageRecord::discovered(url, &object.key, object.size);
        match self.image_repo.insert_if_absent(&record).await? {
            Some(id) => {
                tracing::info!(%id, key = %object.key, "Registered stored object");
                Ok(Outcome::Added)
            }
            // Lost a race with an upload or a concurrent sweep
            None => Ok(Outcome::Skipped),
        }
    }
}
