//! Navigation routes
//!
//! Screens are addressed by path-like route strings: `login`, `home`,
//! `sync`, `detail/{type}/{id}` and `player?url={url}&start={ms}`. The
//! stream URL inside a player route is percent-encoded as one token so its
//! own `/`, `?` and `&` characters survive the trip.

use crate::catalog::ContentKind;
use crate::resolution::identity::encode_for_transport;
use thiserror::Error;

/// Errors that can occur while parsing a route
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("Unknown route: {0}")]
    Unknown(String),

    #[error("Unknown content type in route: {0}")]
    InvalidKind(String),

    #[error("Invalid content id in route: {0}")]
    InvalidId(String),

    #[error("Player route without a url")]
    MissingUrl,
}

/// What the player screen is asked to play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRequest {
    /// Raw, decoded stream URL
    pub url: String,
    pub start_offset_ms: u64,
}

impl PlayRequest {
    pub fn new(url: impl Into<String>, start_offset_ms: u64) -> Self {
        Self {
            url: url.into(),
            start_offset_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Home { kind: ContentKind },
    Sync { kind: ContentKind },
    Detail { kind: ContentKind, id: u64 },
    Player(PlayRequest),
}

impl Route {
    /// Renders the route string.
    pub fn to_path(&self) -> String {
        match self {
            Self::Login => "login".to_string(),
            Self::Home { kind } => with_kind("home", *kind),
            Self::Sync { kind } => with_kind("sync", *kind),
            Self::Detail { kind, id } => format!("detail/{}/{}", kind.singular(), id),
            Self::Player(request) => format!(
                "player?url={}&start={}",
                encode_for_transport(&request.url),
                request.start_offset_ms
            ),
        }
    }

    /// Parses a route string produced by [`Route::to_path`] or typed by hand.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let path = path.trim().trim_start_matches('/');
        let (base, query) = path.split_once('?').unwrap_or((path, ""));
        let params = QueryParams::parse(query);

        let segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["login"] => Ok(Self::Login),
            ["home"] => Ok(Self::Home {
                kind: params.kind()?,
            }),
            ["sync"] => Ok(Self::Sync {
                kind: params.kind()?,
            }),
            ["detail", kind, id] => Ok(Self::Detail {
                kind: kind
                    .parse()
                    .map_err(|_| RouteError::InvalidKind(kind.to_string()))?,
                id: id
                    .parse()
                    .map_err(|_| RouteError::InvalidId(id.to_string()))?,
            }),
            ["player"] => {
                let url = params
                    .get("url")
                    .filter(|url| !url.is_empty())
                    .ok_or(RouteError::MissingUrl)?;
                // A malformed offset plays from the start
                let start_offset_ms = params
                    .get("start")
                    .and_then(|ms| ms.parse().ok())
                    .unwrap_or(0);
                Ok(Self::Player(PlayRequest {
                    url,
                    start_offset_ms,
                }))
            }
            _ => Err(RouteError::Unknown(path.to_string())),
        }
    }
}

fn with_kind(base: &str, kind: ContentKind) -> String {
    match kind {
        ContentKind::Movie => base.to_string(),
        ContentKind::Series => format!("{base}?type={}", kind.plural()),
    }
}

struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    fn parse(query: &str) -> Self {
        Self(
            url::form_urlencoded::parse(query.as_bytes())
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect(),
        )
    }

    fn get(&self, key: &str) -> Option<String> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// `type` parameter, movies when absent.
    fn kind(&self) -> Result<ContentKind, RouteError> {
        match self.get("type") {
            None => Ok(ContentKind::Movie),
            Some(kind) => kind.parse().map_err(|_| RouteError::InvalidKind(kind)),
        }
    }
}
