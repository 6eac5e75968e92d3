use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::assets::{AssetLocation, AssetSource};
use crate::error::{AppServicesError, QuizError};
use crate::quiz::QuizController;

/// Assembles storage, the asset source and the clock for the app.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    assets: Arc<dyn AssetSource>,
    clock: Clock,
}

impl AppServices {
    #[must_use]
    pub fn new(storage: Storage, assets: Arc<dyn AssetSource>, clock: Clock) -> Self {
        Self {
            storage,
            assets,
            clock,
        }
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        assets: AssetLocation,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let assets: Arc<dyn AssetSource> = Arc::from(assets.into_source(clock));
        Ok(Self::new(storage, assets, clock))
    }

    /// Start a quiz session over the configured assets and storage.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the question list cannot be loaded.
    pub async fn start_quiz(&self) -> Result<QuizController, QuizError> {
        QuizController::initialize(self.assets.as_ref(), &self.storage, self.clock).await
    }
}
