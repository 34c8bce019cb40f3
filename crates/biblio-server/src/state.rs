use std::sync::Arc;

use tracing::error;

use biblio_core::{
    application::{ApplicationError, Library},
    error::LibraryResult,
};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub library: Arc<Library>,
    /// Bearer token for the private endpoints. `None` leaves them open.
    pub api_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(library: Arc<Library>, api_token: Option<String>) -> Self {
        Self {
            library,
            api_token: api_token
                .filter(|t| !t.trim().is_empty())
                .map(Arc::from),
        }
    }

    /// Run library work on the blocking pool.
    ///
    /// Writes hold the store lock while the snapshot is saved to disk, so
    /// handlers never call the library on an async worker.
    pub async fn with_library<T, F>(&self, work: F) -> LibraryResult<T>
    where
        F: FnOnce(&Library) -> LibraryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let library = Arc::clone(&self.library);
        match tokio::task::spawn_blocking(move || work(&library)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Library task panicked");
                Err(ApplicationError::Storage {
                    reason: format!("library task failed: {e}"),
                }
                .into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use biblio_adapters::{InMemoryStore, SystemClock};
    use biblio_core::{application::LibrarySettings, error::ErrorCategory};

    use super::*;

    fn state() -> AppState {
        let library = biblio_adapters::library(
            InMemoryStore::new(),
            Arc::new(SystemClock),
            LibrarySettings::default(),
        );
        AppState::new(Arc::new(library), None)
    }

    #[tokio::test]
    async fn work_sees_the_shared_library() {
        let state = state();
        let count = state
            .with_library(|library| {
                library
                    .catalog
                    .create_book(biblio_core::domain::BookDraft::new("Rayuela"))?;
                Ok(library.catalog.list_books(&Default::default())?.len())
            })
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn panicking_work_becomes_an_internal_error() {
        let err = state()
            .with_library(|_| -> LibraryResult<()> { panic!("boom") })
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Internal);
    }
}
