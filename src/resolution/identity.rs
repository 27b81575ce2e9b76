use crate::catalog::{ContentKind, Episode};
use crate::credentials::Credentials;
use std::fmt;

/// Extension used when the catalog does not name a container
pub const DEFAULT_CONTAINER_EXTENSION: &str = "mkv";

/// Identity of a catalog item.
///
/// Movies and series live in separate id spaces; an item carries exactly one
/// of them, or none while it is unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentId {
    Movie(u64),
    Series(u64),
    #[default]
    Unresolved,
}

impl ContentId {
    pub fn new(kind: ContentKind, id: u64) -> Self {
        match kind {
            ContentKind::Movie => Self::Movie(id),
            ContentKind::Series => Self::Series(id),
        }
    }

    /// Builds an identity from typed wire ids. The movie id wins when both are present.
    ///
    /// An id of `0` counts as absent; backends use it as a placeholder.
    pub fn from_typed(movie_id: Option<u64>, series_id: Option<u64>) -> Self {
        let present = |id: &u64| *id != 0;
        match (movie_id.filter(present), series_id.filter(present)) {
            (Some(id), _) => Self::Movie(id),
            (None, Some(id)) => Self::Series(id),
            (None, None) => Self::Unresolved,
        }
    }

    /// The numeric id, or `0` when no identity is known.
    pub fn canonical(&self) -> u64 {
        match self {
            Self::Movie(id) | Self::Series(id) => *id,
            Self::Unresolved => 0,
        }
    }

    pub fn kind(&self) -> Option<ContentKind> {
        match self {
            Self::Movie(_) => Some(ContentKind::Movie),
            Self::Series(_) => Some(ContentKind::Series),
            Self::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }

    /// Media key for this identity, `None` while unresolved.
    pub fn media_key(&self) -> Option<MediaKey> {
        self.kind().map(|kind| MediaKey::new(kind, self.canonical()))
    }
}

/// Composite `"<kind-plural>:<id>"` key the backend uses for watch state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaKey(String);

impl MediaKey {
    pub fn new(kind: ContentKind, id: u64) -> Self {
        Self(format!("{}:{}", kind.plural(), id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits a raw key into its kind and id.
    ///
    /// Both halves are `None` unless the key has exactly two `:`-separated
    /// parts. Within a well-formed key each half is parsed on its own, so
    /// `"movies:abc"` yields a kind without an id.
    pub fn split(raw: &str) -> (Option<ContentKind>, Option<u64>) {
        let parts: Vec<&str> = raw.split(':').collect();
        match parts.as_slice() {
            [kind, id] => (ContentKind::from_plural(kind), id.parse().ok()),
            _ => (None, None),
        }
    }
}

impl fmt::Display for MediaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Recipe for direct stream URLs on the upstream provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamUrls {
    provider_url: String,
    username: String,
    password: String,
}

impl StreamUrls {
    /// Creates a URL builder for one provider account.
    ///
    /// # Arguments
    ///
    /// * `provider_url` - Base URL of the Xtream provider. A single trailing
    ///   `/` is dropped.
    /// * `username` - Provider account name, inserted verbatim
    /// * `password` - Provider account password, inserted verbatim
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let urls = StreamUrls::new("http://provider.tv:8080/", "alice", "s3cret");
    /// let url = urls.movie_url(42, Some("mkv"));
    /// assert_eq!(url, "http://provider.tv:8080/movie/alice/s3cret/42.mkv");
    /// ```
    pub fn new(
        provider_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let provider_url = provider_url.into();
        let provider_url = match provider_url.strip_suffix('/') {
            Some(trimmed) => trimmed.to_string(),
            None => provider_url,
        };
        Self {
            provider_url,
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_credentials(credentials: &Credentials) -> Self {
        Self::new(
            credentials.provider_url.as_str(),
            credentials.username.as_str(),
            credentials.password.as_str(),
        )
    }

    /// `<provider>/movie/<user>/<pass>/<id>.<ext>`
    pub fn movie_url(&self, movie_id: u64, extension: Option<&str>) -> String {
        let extension = extension
            .filter(|ext| !ext.is_empty())
            .unwrap_or(DEFAULT_CONTAINER_EXTENSION);
        self.build("movie", movie_id, extension)
    }

    /// `<provider>/series/<user>/<pass>/<episodeId>.<ext>`
    pub fn episode_url(&self, episode: &Episode) -> String {
        let extension = if episode.container_extension.is_empty() {
            DEFAULT_CONTAINER_EXTENSION
        } else {
            episode.container_extension.as_str()
        };
        self.build("series", episode.id, extension)
    }

    fn build(&self, segment: &str, id: u64, extension: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}.{}",
            self.provider_url, segment, self.username, self.password, id, extension
        )
    }
}

/// Percent-encodes a URL so it travels as one opaque token.
pub fn encode_for_transport(url: &str) -> String {
    urlencoding::encode(url).into_owned()
}

/// Reverses [`encode_for_transport`]. Invalid UTF-8 escapes are replaced
/// rather than rejected.
pub fn decode_from_transport(token: &str) -> String {
    match urlencoding::decode(token) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(token.as_bytes()))
            .into_owned(),
    }
}
