/// HTTP implementation of the catalog service.
use super::wire::{FavoriteBody, PlaybackEnvelope, SeriesIdBody, StreamIdBody, SuccessEnvelope};
use super::{
    CatalogError, CatalogService, Category, ContentEntry, ContentKind, LoginRequest,
    LoginResponse, MovieInfo, OrderedMap, PlaybackSaveRequest, SeriesInfo, WatchRecord,
};
use crate::credentials::Credentials;
use crate::resolution::identity::MediaKey;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Client for the stream viewer backend REST API.
///
/// Every request carries the `X-Stream-*` headers derived from the
/// credentials the client was built with. After a login with new credentials
/// build a new client.
pub struct HttpCatalogClient {
    http: Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpCatalogClient {
    /// Creates a client for `credentials.base_url`.
    pub fn new(credentials: Credentials, timeout: Duration) -> Result<Self, CatalogError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: credentials.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attaches the provider headers when all three values are known.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.credentials.stream_headers() {
            Some(headers) => headers
                .into_iter()
                .fold(request, |request, (name, value)| request.header(name, value)),
            None => request,
        }
    }

    fn check_response(response: Response) -> Result<Response, CatalogError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let message = response.text().unwrap_or_default();
            tracing::warn!(status, "catalog backend returned an error status");
            Err(CatalogError::Status { status, message })
        }
    }

    fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, CatalogError> {
        tracing::debug!(path, "catalog request");
        let response = Self::check_response(self.authorize(request).send()?)?;
        response.json().map_err(|e| CatalogError::Parse {
            endpoint: path.to_string(),
            reason: e.to_string(),
        })
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, CatalogError> {
        self.send(path, self.http.get(self.url(path)).query(query))
    }

    fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<T, CatalogError> {
        self.send(path, self.http.post(self.url(path)).query(query).json(body))
    }

    fn acknowledged(envelope: SuccessEnvelope) -> bool {
        envelope.success
    }
}

impl CatalogService for HttpCatalogClient {
    fn login(&self, request: &LoginRequest) -> Result<LoginResponse, CatalogError> {
        self.post("/api/login", &[], request)
    }

    fn load_categories(
        &self,
        kind: ContentKind,
    ) -> Result<Vec<(String, Vec<ContentEntry>)>, CatalogError> {
        let rows: OrderedMap<Vec<ContentEntry>> =
            self.get("/api/load-categories", &[("type", kind.plural())])?;
        Ok(rows.into_vec())
    }

    fn movie_info(&self, stream_id: u64) -> Result<MovieInfo, CatalogError> {
        self.post("/api/get-movie-info", &[], &StreamIdBody { stream_id })
    }

    fn series_info(&self, series_id: u64) -> Result<SeriesInfo, CatalogError> {
        let info: SeriesInfo =
            self.post("/api/get-series-info", &[], &SeriesIdBody { series_id })?;
        match info.error.as_deref() {
            Some(error) if !error.is_empty() => Err(CatalogError::Backend(error.to_string())),
            _ => Ok(info),
        }
    }

    fn watchlist(&self, kind: ContentKind) -> Result<Vec<WatchRecord>, CatalogError> {
        self.get("/api/playback/list", &[("type", kind.plural())])
    }

    fn save_playback(&self, request: &PlaybackSaveRequest) -> Result<bool, CatalogError> {
        self.post("/api/playback/save", &[], request)
            .map(Self::acknowledged)
    }

    fn playback(&self, key: &MediaKey) -> Result<Option<WatchRecord>, CatalogError> {
        let envelope: PlaybackEnvelope =
            self.get("/api/playback", &[("media_key", key.as_str())])?;
        Ok(envelope.entry.filter(|_| envelope.success))
    }

    fn remove_playback(&self, key: &MediaKey) -> Result<bool, CatalogError> {
        self.get("/api/remove-playback", &[("media_key", key.as_str())])
            .map(Self::acknowledged)
    }

    fn favorites(&self, kind: ContentKind) -> Result<Vec<WatchRecord>, CatalogError> {
        self.get("/api/favorites/list", &[("type", kind.plural())])
    }

    fn add_favorite(&self, key: &MediaKey) -> Result<bool, CatalogError> {
        let body = FavoriteBody {
            media_key: key.as_str(),
        };
        self.post("/api/favorites/save", &[], &body)
            .map(Self::acknowledged)
    }

    fn remove_favorite(&self, key: &MediaKey) -> Result<bool, CatalogError> {
        self.get("/api/remove-favorite", &[("media_key", key.as_str())])
            .map(Self::acknowledged)
    }

    fn all_categories(&self, kind: ContentKind) -> Result<Vec<Category>, CatalogError> {
        self.get("/api/get-all-categories", &[("type", kind.plural())])
    }

    fn set_categories(
        &self,
        kind: ContentKind,
        categories: &[Category],
    ) -> Result<bool, CatalogError> {
        self.post("/api/set-categories", &[("type", kind.plural())], categories)
            .map(Self::acknowledged)
    }
}
