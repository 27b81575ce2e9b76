use crate::catalog::{Episode, OrderedMap, SeriesInfo, WatchRecord};

/// Whether a watch record's file reference points at this episode.
///
/// Accepts `"<id>.<ext>"`, a bare `"<id>"`, and any `"<id>."` prefixed
/// variant so a changed container extension still matches.
pub fn episode_matches_file(episode: &Episode, file: &str) -> bool {
    let id = episode.id.to_string();
    file == format!("{}.{}", id, episode.container_extension)
        || file == id
        || file
            .strip_prefix(id.as_str())
            .is_some_and(|rest| rest.starts_with('.'))
}

/// Finds the episode a file reference points at.
///
/// Seasons are searched in map order and episodes in listed order; the
/// first match wins.
pub fn find_active_episode<'a>(
    episodes: &'a OrderedMap<Vec<Episode>>,
    file: &str,
) -> Option<&'a Episode> {
    episodes
        .iter()
        .flat_map(|(_, season)| season.iter())
        .find(|episode| episode_matches_file(episode, file))
}

/// Where a series' stored progress points.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressLocation {
    /// The episode the user is part-way through, if any
    pub active_episode: Option<Episode>,
    /// Season to show first on the detail page
    pub selected_season: Option<u32>,
}

/// Locates the active episode of a series and picks the season to show.
///
/// The selected season is the active episode's season, else the first
/// listed season, else the first numeric key of the episode map.
pub fn locate_progress(series: &SeriesInfo, record: Option<&WatchRecord>) -> ProgressLocation {
    let active_episode = record
        .and_then(|r| r.file.as_deref())
        .filter(|file| !file.is_empty())
        .and_then(|file| find_active_episode(&series.episodes, file))
        .cloned();

    let selected_season = active_episode
        .as_ref()
        .map(|episode| episode.season)
        .or_else(|| series.seasons.first().map(|s| s.season_number))
        .or_else(|| series.episodes.keys().find_map(|key| key.parse().ok()));

    if let Some(episode) = &active_episode {
        tracing::debug!(
            episode_id = episode.id,
            season = episode.season,
            "located active episode"
        );
    }

    ProgressLocation {
        active_episode,
        selected_season,
    }
}
