//! Screen orchestration
//!
//! Each screen sequences its catalog calls and feeds the results through
//! the resolution core. The primary request of a screen decides whether it
//! loads at all; secondary requests (favorites, watchlist) degrade to empty
//! results when they fail.

pub mod category_sync;
pub mod detail;
pub mod home;
pub mod login;

use crate::catalog::CatalogError;

/// Unwraps a secondary result, logging and defaulting on failure.
pub(crate) fn secondary<T: Default>(what: &str, result: Result<T, CatalogError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(request = what, error = %e, "secondary request failed, using empty result");
            T::default()
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory catalog for screen tests.

    use crate::catalog::{
        CatalogError, CatalogService, Category, ContentEntry, ContentKind, LoginRequest,
        LoginResponse, MovieInfo, PlaybackSaveRequest, SeriesInfo, WatchRecord,
    };
    use crate::resolution::identity::MediaKey;
    use std::sync::{Mutex, MutexGuard};

    #[derive(Default)]
    pub(crate) struct FakeState {
        pub watchlist: Vec<WatchRecord>,
        pub favorites: Vec<WatchRecord>,
        pub saved: Vec<PlaybackSaveRequest>,
        pub posted_categories: Option<(ContentKind, Vec<Category>)>,
        pub logins: Vec<LoginRequest>,
        pub calls: Vec<String>,
    }

    #[derive(Default)]
    pub(crate) struct FakeCatalog {
        pub login_response: LoginResponse,
        pub categories: Vec<(String, Vec<ContentEntry>)>,
        pub movie_info: MovieInfo,
        pub series_info: SeriesInfo,
        pub all_categories: Vec<Category>,
        /// Endpoints that answer with HTTP 500
        pub failing: Vec<&'static str>,
        pub state: Mutex<FakeState>,
    }

    impl FakeCatalog {
        pub fn state(&self) -> MutexGuard<'_, FakeState> {
            self.state.lock().unwrap()
        }

        pub fn with_watch(self, record: WatchRecord) -> Self {
            self.state().watchlist.push(record);
            self
        }

        pub fn with_favorite(self, record: WatchRecord) -> Self {
            self.state().favorites.push(record);
            self
        }

        fn call(&self, endpoint: &'static str) -> Result<(), CatalogError> {
            self.state().calls.push(endpoint.to_string());
            if self.failing.contains(&endpoint) {
                Err(CatalogError::Status {
                    status: 500,
                    message: format!("{endpoint} unavailable"),
                })
            } else {
                Ok(())
            }
        }
    }

    pub(crate) fn record(key: &MediaKey) -> WatchRecord {
        WatchRecord {
            media_key: key.as_str().to_string(),
            ..Default::default()
        }
    }

    fn of_kind(records: &[WatchRecord], kind: ContentKind) -> Vec<WatchRecord> {
        let prefix = format!("{}:", kind.plural());
        records
            .iter()
            .filter(|r| r.media_key.starts_with(&prefix))
            .cloned()
            .collect()
    }

    impl CatalogService for FakeCatalog {
        fn login(&self, request: &LoginRequest) -> Result<LoginResponse, CatalogError> {
            self.call("login")?;
            self.state().logins.push(request.clone());
            Ok(self.login_response.clone())
        }

        fn load_categories(
            &self,
            _kind: ContentKind,
        ) -> Result<Vec<(String, Vec<ContentEntry>)>, CatalogError> {
            self.call("load_categories")?;
            Ok(self.categories.clone())
        }

        fn movie_info(&self, _stream_id: u64) -> Result<MovieInfo, CatalogError> {
            self.call("movie_info")?;
            Ok(self.movie_info.clone())
        }

        fn series_info(&self, _series_id: u64) -> Result<SeriesInfo, CatalogError> {
            self.call("series_info")?;
            Ok(self.series_info.clone())
        }

        fn watchlist(&self, kind: ContentKind) -> Result<Vec<WatchRecord>, CatalogError> {
            self.call("watchlist")?;
            Ok(of_kind(&self.state().watchlist, kind))
        }

        fn save_playback(&self, request: &PlaybackSaveRequest) -> Result<bool, CatalogError> {
            self.call("save_playback")?;
            let mut state = self.state();
            state.saved.push(request.clone());
            state.watchlist.retain(|r| r.media_key != request.media_key);
            state.watchlist.push(WatchRecord {
                media_key: request.media_key.clone(),
                position: Some(request.position),
                duration: Some(request.duration),
                file: request.file.clone(),
                ..Default::default()
            });
            Ok(true)
        }

        fn playback(&self, key: &MediaKey) -> Result<Option<WatchRecord>, CatalogError> {
            self.call("playback")?;
            Ok(self.state().watchlist.iter().find(|r| r.is_for(key)).cloned())
        }

        fn remove_playback(&self, key: &MediaKey) -> Result<bool, CatalogError> {
            self.call("remove_playback")?;
            self.state().watchlist.retain(|r| !r.is_for(key));
            Ok(true)
        }

        fn favorites(&self, kind: ContentKind) -> Result<Vec<WatchRecord>, CatalogError> {
            self.call("favorites")?;
            Ok(of_kind(&self.state().favorites, kind))
        }

        fn add_favorite(&self, key: &MediaKey) -> Result<bool, CatalogError> {
            self.call("add_favorite")?;
            let mut state = self.state();
            if !state.favorites.iter().any(|r| r.is_for(key)) {
                state.favorites.push(record(key));
            }
            Ok(true)
        }

        fn remove_favorite(&self, key: &MediaKey) -> Result<bool, CatalogError> {
            self.call("remove_favorite")?;
            self.state().favorites.retain(|r| !r.is_for(key));
            Ok(true)
        }

        fn all_categories(&self, _kind: ContentKind) -> Result<Vec<Category>, CatalogError> {
            self.call("all_categories")?;
            Ok(self.all_categories.clone())
        }

        fn set_categories(
            &self,
            kind: ContentKind,
            categories: &[Category],
        ) -> Result<bool, CatalogError> {
            self.call("set_categories")?;
            self.state().posted_categories = Some((kind, categories.to_vec()));
            Ok(true)
        }
    }
}
