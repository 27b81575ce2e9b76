/// Data structures and the service trait for the remote catalog.
///
/// This module provides the typed shapes of everything the stream viewer
/// backend returns (catalog entries, series details, watch records,
/// categories, login results) and the `CatalogService` trait through which
/// screens talk to the backend.
mod client;
mod wire;

pub use client::HttpCatalogClient;
pub use wire::OrderedMap;

use crate::resolution::identity::{ContentId, MediaKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while talking to the catalog backend.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The HTTP request could not be performed
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("Backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Failed to parse the backend's JSON response
    #[error("Failed to parse response from {endpoint}: {reason}")]
    Parse { endpoint: String, reason: String },

    /// The backend reported an error inside a successful response
    #[error("Backend error: {0}")]
    Backend(String),
}

/// The two kinds of catalog content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Movie,
    Series,
}

impl ContentKind {
    /// Plural name used in media keys and `type=` query parameters.
    pub fn plural(self) -> &'static str {
        match self {
            Self::Movie => "movies",
            Self::Series => "series",
        }
    }

    /// Singular name used in routes.
    pub fn singular(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
        }
    }

    /// Parses the plural wire name. Only the exact names are accepted.
    pub fn from_plural(name: &str) -> Option<Self> {
        match name {
            "movies" => Some(Self::Movie),
            "series" => Some(Self::Series),
            _ => None,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::Movie => Self::Series,
            Self::Series => Self::Movie,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.singular())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" | "movies" => Ok(Self::Movie),
            "series" => Ok(Self::Series),
            other => Err(format!("unknown content kind '{other}'")),
        }
    }
}

/// A field the upstream provider sends either as a number or as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericOrText {
    Number(f64),
    Text(String),
}

impl NumericOrText {
    /// Numeric value, parsing text when it holds a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n).filter(|n| n.is_finite()),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    /// Canonical display text: numbers without trailing zeros, other text trimmed.
    pub fn display(&self) -> String {
        match self.as_number() {
            Some(n) => format_number(n),
            None => match self {
                Self::Text(s) => s.trim().to_string(),
                Self::Number(_) => String::new(),
            },
        }
    }
}

impl fmt::Display for NumericOrText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        let text = format!("{n:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Decodes a loosely typed field; values that are neither numbers nor
/// strings are treated as absent.
pub(crate) fn loose_numeric<'de, D>(deserializer: D) -> Result<Option<NumericOrText>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().map(NumericOrText::Number),
        Value::String(s) => Some(NumericOrText::Text(s)),
        _ => None,
    })
}

/// A catalog item: one movie or one series.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "StreamEntryWire")]
pub struct ContentEntry {
    pub id: ContentId,
    pub name: String,
    pub category_id: Option<String>,
    pub cover: Option<String>,
    pub rating: Option<NumericOrText>,
    pub plot: Option<String>,
    pub cast: Option<String>,
    pub director: Option<String>,
    pub container_extension: Option<String>,
    /// Opaque display value, never parsed as a date
    pub added: Option<String>,
    pub release_date: Option<String>,
    pub num: Option<NumericOrText>,
    pub stream_type: Option<String>,
}

impl ContentEntry {
    pub fn new(id: ContentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Default::default()
        }
    }

    /// Movie id if present, else series id, else `0` for "unresolved".
    pub fn canonical_id(&self) -> u64 {
        self.id.canonical()
    }

    pub fn kind(&self) -> Option<ContentKind> {
        self.id.kind()
    }

    pub fn image_url(&self) -> &str {
        self.cover.as_deref().unwrap_or("")
    }

    /// Rating in display form, empty when absent.
    pub fn rating_text(&self) -> String {
        self.rating.as_ref().map(NumericOrText::display).unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct StreamEntryWire {
    #[serde(default, deserialize_with = "wire::optional_u64")]
    stream_id: Option<u64>,
    #[serde(default, deserialize_with = "wire::optional_u64")]
    series_id: Option<u64>,
    #[serde(default, deserialize_with = "wire::string_or_number")]
    name: String,
    #[serde(default, deserialize_with = "wire::optional_string")]
    category_id: Option<String>,
    #[serde(default)]
    cover: Option<String>,
    #[serde(default)]
    stream_icon: Option<String>,
    #[serde(default, deserialize_with = "loose_numeric")]
    rating: Option<NumericOrText>,
    #[serde(default)]
    plot: Option<String>,
    #[serde(default)]
    cast: Option<String>,
    #[serde(default)]
    director: Option<String>,
    #[serde(default)]
    container_extension: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    added: Option<String>,
    #[serde(default, rename = "releaseDate")]
    release_date: Option<String>,
    #[serde(default, deserialize_with = "loose_numeric")]
    num: Option<NumericOrText>,
    #[serde(default)]
    stream_type: Option<String>,
}

impl From<StreamEntryWire> for ContentEntry {
    fn from(wire: StreamEntryWire) -> Self {
        Self {
            id: ContentId::from_typed(wire.stream_id, wire.series_id),
            name: wire.name,
            category_id: wire.category_id,
            cover: wire.cover.or(wire.stream_icon),
            rating: wire.rating,
            plot: wire.plot,
            cast: wire.cast,
            director: wire.director,
            container_extension: wire.container_extension,
            added: wire.added,
            release_date: wire.release_date,
            num: wire.num,
            stream_type: wire.stream_type,
        }
    }
}

/// A denormalized playback or favorite record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct WatchRecord {
    #[serde(default)]
    pub media_key: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Seconds elapsed
    #[serde(default, deserialize_with = "wire::optional_f64")]
    pub position: Option<f64>,
    /// Seconds total
    #[serde(default, deserialize_with = "wire::optional_f64")]
    pub duration: Option<f64>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default, deserialize_with = "loose_numeric")]
    pub rating: Option<NumericOrText>,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default)]
    pub cast: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub stream_type: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_u64")]
    pub stream_id: Option<u64>,
    #[serde(default, deserialize_with = "wire::optional_u64")]
    pub series_id: Option<u64>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub container_extension: Option<String>,
    /// Episode file reference, e.g. `"<episodeId>.<ext>"` or `"<episodeId>"`
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub file: Option<String>,
}

impl WatchRecord {
    pub fn position_secs(&self) -> f64 {
        self.position.unwrap_or(0.0)
    }

    pub fn is_for(&self, key: &MediaKey) -> bool {
        self.media_key == key.as_str()
    }
}

/// A season listing of a series.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Season {
    #[serde(default, deserialize_with = "wire::lenient_u32_or_zero")]
    pub season_number: u32,
    #[serde(default, deserialize_with = "wire::string_or_number")]
    pub name: String,
    #[serde(default, deserialize_with = "wire::lenient_u32_or_zero")]
    pub episode_count: u32,
    #[serde(default, deserialize_with = "wire::optional_u64")]
    pub id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct EpisodeInfo {
    #[serde(default)]
    pub movie_image: Option<String>,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_u64")]
    pub duration_secs: Option<u64>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub duration: Option<String>,
}

/// A single episode of a series. Episode ids are globally unique.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Episode {
    #[serde(deserialize_with = "wire::lenient_u64")]
    pub id: u64,
    #[serde(default, deserialize_with = "wire::lenient_u32_or_zero")]
    pub season: u32,
    #[serde(default, deserialize_with = "wire::lenient_u32_or_zero")]
    pub episode_num: u32,
    #[serde(default, deserialize_with = "wire::string_or_number")]
    pub title: String,
    #[serde(default)]
    pub container_extension: String,
    #[serde(default, deserialize_with = "lenient_info")]
    pub info: Option<EpisodeInfo>,
    #[serde(default)]
    pub movie_image: Option<String>,
}

/// Xtream providers send `"info": []` for episodes without details.
fn lenient_info<'de, D>(deserializer: D) -> Result<Option<EpisodeInfo>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

/// Response of `get-series-info`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SeriesInfo {
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub seasons: Vec<Season>,
    /// Episodes keyed by season number as string, in backend order
    #[serde(default)]
    pub episodes: OrderedMap<Vec<Episode>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SeriesInfo {
    /// Episodes of one season, empty when the season is unknown.
    pub fn episodes_in(&self, season_number: u32) -> &[Episode] {
        self.episodes
            .get(&season_number.to_string())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Seasons to offer for this series.
    ///
    /// Some providers leave `seasons` empty while still listing episodes.
    /// Every numeric episode group without a listed season gets a
    /// synthesized entry, so the result covers everything that can be
    /// played. Listed seasons keep their order; synthesized ones follow
    /// in episode-map order.
    pub fn season_list(&self) -> Vec<Season> {
        let mut seasons = self.seasons.clone();
        for (key, episodes) in self.episodes.iter() {
            let Ok(number) = key.trim().parse::<u32>() else {
                continue;
            };
            if seasons.iter().any(|s| s.season_number == number) {
                continue;
            }
            seasons.push(Season {
                season_number: number,
                name: format!("Season {number}"),
                episode_count: u32::try_from(episodes.len()).unwrap_or(u32::MAX),
                id: None,
            });
        }
        seasons
    }

    pub fn find_episode(&self, episode_id: u64) -> Option<&Episode> {
        self.episodes
            .iter()
            .flat_map(|(_, episodes)| episodes.iter())
            .find(|ep| ep.id == episode_id)
    }
}

/// Response of `get-movie-info`: a loosely typed string mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MovieInfo {
    fields: BTreeMap<String, String>,
}

impl MovieInfo {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn plot(&self) -> Option<&str> {
        self.get("plot")
    }

    pub fn cast(&self) -> Option<&str> {
        self.get("cast")
    }

    pub fn director(&self) -> Option<&str> {
        self.get("director")
    }
}

impl FromIterator<(String, String)> for MovieInfo {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl<'de> Deserialize<'de> for MovieInfo {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(k, v)| wire::value_as_string(v).map(|v| (k, v)))
            .collect())
    }
}

/// A provider category, as used by the category sync screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "wire::string_or_number")]
    pub category_id: String,
    #[serde(default, deserialize_with = "wire::string_or_number")]
    pub category_name: String,
    #[serde(default, deserialize_with = "wire::optional_i64")]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub custom_name: Option<String>,
    #[serde(default, deserialize_with = "wire::lenient_bool")]
    pub preselected: bool,
}

impl Category {
    /// Custom name if one was assigned, else the provider's name.
    pub fn display_name(&self) -> &str {
        self.custom_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.category_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default, deserialize_with = "wire::lenient_bool")]
    pub success: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub user_info: Option<UserInfo>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Provider account details echoed by the backend on login.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct UserInfo {
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub message: Option<String>,
    #[serde(default, rename = "auth", deserialize_with = "wire::optional_i64")]
    pub auth_status: Option<i64>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub exp_date: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub is_trial: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub active_cons: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "wire::optional_string")]
    pub max_connections: Option<String>,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub allowed_output_formats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSaveRequest {
    pub media_key: String,
    pub position: f64,
    pub duration: f64,
    /// Episode file reference, e.g. `"123.mkv"`
    pub file: Option<String>,
}

/// Trait for the backend the screens are built on.
///
/// `HttpCatalogClient` talks to the real REST API; tests substitute an
/// in-memory implementation.
pub trait CatalogService {
    /// `POST /api/login`
    fn login(&self, request: &LoginRequest) -> Result<LoginResponse, CatalogError>;

    /// `GET /api/load-categories`: category display name to entries, in order.
    fn load_categories(
        &self,
        kind: ContentKind,
    ) -> Result<Vec<(String, Vec<ContentEntry>)>, CatalogError>;

    /// `POST /api/get-movie-info`
    fn movie_info(&self, stream_id: u64) -> Result<MovieInfo, CatalogError>;

    /// `POST /api/get-series-info`
    fn series_info(&self, series_id: u64) -> Result<SeriesInfo, CatalogError>;

    /// `GET /api/playback/list`
    fn watchlist(&self, kind: ContentKind) -> Result<Vec<WatchRecord>, CatalogError>;

    /// `POST /api/playback/save`
    fn save_playback(&self, request: &PlaybackSaveRequest) -> Result<bool, CatalogError>;

    /// `GET /api/playback`: `None` when the backend has no record.
    fn playback(&self, key: &MediaKey) -> Result<Option<WatchRecord>, CatalogError>;

    /// `GET /api/remove-playback`
    fn remove_playback(&self, key: &MediaKey) -> Result<bool, CatalogError>;

    /// `GET /api/favorites/list`
    fn favorites(&self, kind: ContentKind) -> Result<Vec<WatchRecord>, CatalogError>;

    /// `POST /api/favorites/save`
    fn add_favorite(&self, key: &MediaKey) -> Result<bool, CatalogError>;

    /// `GET /api/remove-favorite`
    fn remove_favorite(&self, key: &MediaKey) -> Result<bool, CatalogError>;

    /// `GET /api/get-all-categories`
    fn all_categories(&self, kind: ContentKind) -> Result<Vec<Category>, CatalogError>;

    /// `POST /api/set-categories`: replaces the selection with `categories`.
    fn set_categories(
        &self,
        kind: ContentKind,
        categories: &[Category],
    ) -> Result<bool, CatalogError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_or_text_display() {
        assert_eq!(NumericOrText::Number(5.0).display(), "5");
        assert_eq!(NumericOrText::Number(7.25).display(), "7.25");
        assert_eq!(NumericOrText::Text("7.50".into()).display(), "7.5");
        assert_eq!(NumericOrText::Text(" 8 ".into()).display(), "8");
        assert_eq!(NumericOrText::Text("N/A".into()).display(), "N/A");
        assert_eq!(NumericOrText::Text("6.5".into()).as_number(), Some(6.5));
        assert_eq!(NumericOrText::Text("".into()).as_number(), None);
    }

    #[test]
    fn test_content_entry_from_movie_wire() {
        let entry: ContentEntry = serde_json::from_value(json!({
            "stream_id": 101,
            "name": "Heat",
            "category_id": 4,
            "rating": "7.5",
            "num": 3,
            "container_extension": "mp4",
            "added": "1700000000",
            "stream_type": "movie"
        }))
        .unwrap();

        assert_eq!(entry.id, ContentId::Movie(101));
        assert_eq!(entry.canonical_id(), 101);
        assert_eq!(entry.kind(), Some(ContentKind::Movie));
        assert_eq!(entry.category_id.as_deref(), Some("4"));
        assert_eq!(entry.rating_text(), "7.5");
        assert_eq!(entry.num, Some(NumericOrText::Number(3.0)));
    }

    #[test]
    fn test_content_entry_series_and_odd_rating() {
        let entry: ContentEntry = serde_json::from_value(json!({
            "series_id": "77",
            "name": "Dark",
            "cover": "http://img/dark.jpg",
            "rating": {"nested": true}
        }))
        .unwrap();

        assert_eq!(entry.id, ContentId::Series(77));
        assert_eq!(entry.rating, None);
        assert_eq!(entry.rating_text(), "");
        assert_eq!(entry.image_url(), "http://img/dark.jpg");
    }

    #[test]
    fn test_content_entry_without_ids_is_unresolved() {
        let entry: ContentEntry = serde_json::from_value(json!({"name": "Ghost"})).unwrap();
        assert_eq!(entry.canonical_id(), 0);
        assert_eq!(entry.kind(), None);
    }

    #[test]
    fn test_series_info_parses_xtream_shapes() {
        let info: SeriesInfo = serde_json::from_value(json!({
            "seasons": [
                {"season_number": 1, "name": "Season 1", "episode_count": "2", "id": 9}
            ],
            "episodes": {
                "1": [
                    {"id": "5", "season": 1, "episode_num": "1", "title": "Pilot",
                     "container_extension": "mkv", "info": []},
                    {"id": 6, "season": "1", "episode_num": 2, "title": "Second",
                     "container_extension": "mp4",
                     "info": {"plot": "More", "duration_secs": 2400}}
                ]
            }
        }))
        .unwrap();

        assert_eq!(info.seasons[0].episode_count, 2);
        let episodes = info.episodes_in(1);
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].id, 5);
        assert_eq!(episodes[0].info, None);
        assert_eq!(
            episodes[1].info.as_ref().and_then(|i| i.duration_secs),
            Some(2400)
        );
        assert!(info.episodes_in(2).is_empty());
        assert_eq!(info.find_episode(6).map(|e| e.title.as_str()), Some("Second"));
    }

    #[test]
    fn test_series_info_empty_containers() {
        let info: SeriesInfo =
            serde_json::from_value(json!({"seasons": [], "episodes": []})).unwrap();
        assert!(info.seasons.is_empty());
        assert!(info.episodes.is_empty());
        assert!(info.season_list().is_empty());
    }

    #[test]
    fn test_series_info_null_seasons() {
        let info: SeriesInfo =
            serde_json::from_value(json!({"seasons": null, "episodes": {"1": []}})).unwrap();
        assert!(info.seasons.is_empty());
        assert_eq!(info.episodes.keys().collect::<Vec<_>>(), vec!["1"]);
    }

    #[test]
    fn test_season_list_falls_back_to_episode_groups() {
        let info: SeriesInfo = serde_json::from_value(json!({
            "seasons": [{"season_number": 2, "name": "Finale"}],
            "episodes": {
                "1": [{"id": 1}, {"id": 2}],
                "2": [{"id": 3}],
                "extras": [{"id": 4}]
            }
        }))
        .unwrap();

        let seasons = info.season_list();
        let numbers: Vec<u32> = seasons.iter().map(|s| s.season_number).collect();
        assert_eq!(numbers, vec![2, 1]);
        assert_eq!(seasons[0].name, "Finale");
        assert_eq!(seasons[1].name, "Season 1");
        assert_eq!(seasons[1].episode_count, 2);
        assert_eq!(seasons[1].id, None);
    }

    #[test]
    fn test_user_info_null_formats() {
        let user: UserInfo = serde_json::from_value(json!({
            "username": "alice",
            "auth": 1,
            "allowed_output_formats": null
        }))
        .unwrap();
        assert!(user.allowed_output_formats.is_empty());
        assert_eq!(user.auth_status, Some(1));
    }

    #[test]
    fn test_movie_info_stringifies_values() {
        let info: MovieInfo = serde_json::from_value(json!({
            "plot": "A heist.",
            "cast": "",
            "duration_secs": 6000,
            "director": null
        }))
        .unwrap();

        assert_eq!(info.plot(), Some("A heist."));
        assert_eq!(info.cast(), None);
        assert_eq!(info.director(), None);
        assert_eq!(info.get("duration_secs"), Some("6000"));
    }

    #[test]
    fn test_watch_record_lenient_fields() {
        let record: WatchRecord = serde_json::from_value(json!({
            "media_key": "series:12",
            "position": "125.5",
            "category_id": 3,
            "file": 991
        }))
        .unwrap();

        assert_eq!(record.position_secs(), 125.5);
        assert_eq!(record.category_id.as_deref(), Some("3"));
        assert_eq!(record.file.as_deref(), Some("991"));
        assert!(record.is_for(&MediaKey::new(ContentKind::Series, 12)));
    }

    #[test]
    fn test_content_kind_names() {
        assert_eq!("movies".parse::<ContentKind>(), Ok(ContentKind::Movie));
        assert_eq!("Movie".parse::<ContentKind>(), Ok(ContentKind::Movie));
        assert_eq!("series".parse::<ContentKind>(), Ok(ContentKind::Series));
        assert!("live".parse::<ContentKind>().is_err());
        assert_eq!(ContentKind::from_plural("movie"), None);
        assert_eq!(ContentKind::Series.plural(), "series");
        assert_eq!(ContentKind::Movie.to_string(), "movie");
    }

    #[test]
    fn test_category_display_name() {
        let category: Category = serde_json::from_value(json!({
            "category_id": 12,
            "category_name": "Action",
            "parent_id": 0,
            "custom_name": "Action & Adventure",
            "preselected": 1
        }))
        .unwrap();

        assert_eq!(category.category_id, "12");
        assert_eq!(category.display_name(), "Action & Adventure");
        assert!(category.preselected);
    }
}
