use super::home::join;
use super::secondary;
use crate::catalog::{
    CatalogError, CatalogService, ContentKind, Episode, MovieInfo, PlaybackSaveRequest, Season,
    SeriesInfo, WatchRecord,
};
use crate::navigation::PlayRequest;
use crate::resolution::identity::{MediaKey, StreamUrls};
use crate::resolution::{
    EpisodeStart, MovieResume, PlayLabel, ResumeState, Selection, locate_progress,
};
use std::thread;

/// Kind-specific part of a detail page.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailContent {
    Movie {
        info: MovieInfo,
        resume: MovieResume,
    },
    Series {
        info: SeriesInfo,
        resume: ResumeState,
        selected_season: Option<u32>,
    },
}

/// What picking an episode asks the screen to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum EpisodeAction {
    Play(PlayRequest),
    /// Ask "Overwrite current Playback?" before playing
    ConfirmOverwrite,
}

/// State of one detail page.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub kind: ContentKind,
    pub id: u64,
    pub key: MediaKey,
    pub is_favorite: bool,
    /// Watchlist record of this item, if it is on the watchlist
    pub watch_record: Option<WatchRecord>,
    pub content: DetailContent,
}

/// Loads a detail page.
///
/// Movie or series info is required. Favorite and watchlist membership are
/// fetched concurrently afterwards and degrade to "not a member" on
/// failure. Episode matching runs once both series info and the watchlist
/// record are in.
///
/// # Arguments
///
/// * `catalog` - Backend to query
/// * `kind` - Whether `id` is a movie stream id or a series id
/// * `id` - Catalog id of the item
///
/// # Returns
///
/// The populated [`DetailView`], or the error of the movie or series info
/// request. Favorite and watchlist failures never surface here.
pub fn load_detail<C>(catalog: &C, kind: ContentKind, id: u64) -> Result<DetailView, CatalogError>
where
    C: CatalogService + Sync + ?Sized,
{
    tracing::info!(%kind, id, "loading detail screen");
    let key = MediaKey::new(kind, id);

    enum Primary {
        Movie(MovieInfo),
        Series(SeriesInfo),
    }
    let primary = match kind {
        ContentKind::Movie => Primary::Movie(catalog.movie_info(id)?),
        ContentKind::Series => Primary::Series(catalog.series_info(id)?),
    };

    let (favorites, watchlist) = thread::scope(|s| {
        let favorites = s.spawn(|| catalog.favorites(kind));
        let watchlist = s.spawn(|| catalog.watchlist(kind));
        (join(favorites), join(watchlist))
    });

    let is_favorite = secondary("favorites", favorites)
        .iter()
        .any(|r| r.is_for(&key));
    let watch_record = secondary("watchlist", watchlist)
        .into_iter()
        .find(|r| r.is_for(&key));

    let content = match primary {
        Primary::Movie(info) => DetailContent::Movie {
            info,
            resume: MovieResume::from_record(watch_record.as_ref()),
        },
        Primary::Series(info) => {
            let location = locate_progress(&info, watch_record.as_ref());
            DetailContent::Series {
                resume: ResumeState::from_progress(location.active_episode, watch_record.as_ref()),
                selected_season: location.selected_season,
                info,
            }
        }
    };

    Ok(DetailView {
        kind,
        id,
        key,
        is_favorite,
        watch_record,
        content,
    })
}

impl DetailView {
    pub fn is_in_watchlist(&self) -> bool {
        self.watch_record.is_some()
    }

    pub fn plot(&self) -> Option<&str> {
        match &self.content {
            DetailContent::Movie { info, .. } => info.plot(),
            DetailContent::Series { .. } => None,
        }
    }

    pub fn cast(&self) -> Option<&str> {
        match &self.content {
            DetailContent::Movie { info, .. } => info.cast(),
            DetailContent::Series { .. } => None,
        }
    }

    pub fn director(&self) -> Option<&str> {
        match &self.content {
            DetailContent::Movie { info, .. } => info.director(),
            DetailContent::Series { .. } => None,
        }
    }

    /// Label of the movie play button; `None` for series.
    pub fn play_label(&self) -> Option<PlayLabel> {
        match &self.content {
            DetailContent::Movie { resume, .. } => Some(resume.label),
            DetailContent::Series { .. } => None,
        }
    }

    /// Plays the movie from its stored position. `None` for series.
    ///
    /// The extension falls back to the watch record's, then to the default.
    pub fn movie_play(&self, urls: &StreamUrls, extension: Option<&str>) -> Option<PlayRequest> {
        let DetailContent::Movie { resume, .. } = &self.content else {
            return None;
        };
        let extension = extension.or_else(|| {
            self.watch_record
                .as_ref()
                .and_then(|r| r.container_extension.as_deref())
        });
        Some(PlayRequest::new(
            urls.movie_url(self.id, extension),
            resume.offset_ms,
        ))
    }

    fn resume_state(&self) -> Option<&ResumeState> {
        match &self.content {
            DetailContent::Series { resume, .. } => Some(resume),
            DetailContent::Movie { .. } => None,
        }
    }

    pub fn active_episode(&self) -> Option<&Episode> {
        self.resume_state().and_then(ResumeState::active_episode)
    }

    /// `"Resume S1E3 02:05"` while a series has an active episode.
    pub fn resume_caption(&self) -> Option<String> {
        self.resume_state().and_then(ResumeState::resume_caption)
    }

    /// Resumes the active episode at its stored position.
    pub fn resume_play(&self, urls: &StreamUrls) -> Option<PlayRequest> {
        self.resume_state()
            .and_then(ResumeState::resume)
            .map(|start| play_request(urls, &start))
    }

    /// Picks an episode by id. `None` if this is not a series or the
    /// episode is unknown.
    pub fn select_episode(&mut self, episode_id: u64, urls: &StreamUrls) -> Option<EpisodeAction> {
        let DetailContent::Series { info, resume, .. } = &mut self.content else {
            return None;
        };
        let episode = info.find_episode(episode_id)?.clone();
        Some(match resume.select(&episode) {
            Selection::Start(start) => EpisodeAction::Play(play_request(urls, &start)),
            Selection::ConfirmOverwrite => EpisodeAction::ConfirmOverwrite,
        })
    }

    /// Plays the episode waiting for confirmation from position zero.
    pub fn confirm_overwrite(&mut self, urls: &StreamUrls) -> Option<PlayRequest> {
        let DetailContent::Series { resume, .. } = &mut self.content else {
            return None;
        };
        resume
            .confirm_overwrite()
            .map(|start| play_request(urls, &start))
    }

    pub fn cancel_overwrite(&mut self) {
        if let DetailContent::Series { resume, .. } = &mut self.content {
            resume.cancel_overwrite();
        }
    }

    /// Seasons to offer, including ones known only from the episode map.
    pub fn seasons(&self) -> Vec<Season> {
        match &self.content {
            DetailContent::Series { info, .. } => info.season_list(),
            DetailContent::Movie { .. } => Vec::new(),
        }
    }

    pub fn selected_season(&self) -> Option<u32> {
        match &self.content {
            DetailContent::Series {
                selected_season, ..
            } => *selected_season,
            DetailContent::Movie { .. } => None,
        }
    }

    pub fn select_season(&mut self, season_number: u32) {
        if let DetailContent::Series {
            selected_season, ..
        } = &mut self.content
        {
            *selected_season = Some(season_number);
        }
    }

    pub fn episodes_in_selected_season(&self) -> &[Episode] {
        match &self.content {
            DetailContent::Series {
                info,
                selected_season: Some(season),
                ..
            } => info.episodes_in(*season),
            _ => &[],
        }
    }

    /// Adds or removes the favorite. Returns the new membership.
    pub fn toggle_favorite<C>(&mut self, catalog: &C) -> Result<bool, CatalogError>
    where
        C: CatalogService + ?Sized,
    {
        let acknowledged = if self.is_favorite {
            catalog.remove_favorite(&self.key)?
        } else {
            catalog.add_favorite(&self.key)?
        };

        if acknowledged {
            self.is_favorite = !self.is_favorite;
            tracing::info!(key = %self.key, favorite = self.is_favorite, "favorite toggled");
        } else {
            tracing::warn!(key = %self.key, "backend did not acknowledge favorite change");
        }
        Ok(self.is_favorite)
    }

    /// Adds the item to the watchlist with no progress, or removes it along
    /// with its progress. Returns the new membership.
    pub fn toggle_watchlist<C>(&mut self, catalog: &C) -> Result<bool, CatalogError>
    where
        C: CatalogService + ?Sized,
    {
        let new_record = if self.is_in_watchlist() {
            if !catalog.remove_playback(&self.key)? {
                tracing::warn!(key = %self.key, "backend did not acknowledge watchlist removal");
                return Ok(true);
            }
            None
        } else {
            let request = PlaybackSaveRequest {
                media_key: self.key.as_str().to_string(),
                position: 0.0,
                duration: 0.0,
                file: None,
            };
            if !catalog.save_playback(&request)? {
                tracing::warn!(key = %self.key, "backend did not acknowledge watchlist addition");
                return Ok(false);
            }
            Some(WatchRecord {
                media_key: request.media_key,
                position: Some(0.0),
                duration: Some(0.0),
                ..Default::default()
            })
        };

        // Progress goes with the record
        match &mut self.content {
            DetailContent::Movie { resume, .. } => {
                *resume = MovieResume::from_record(new_record.as_ref())
            }
            DetailContent::Series { resume, .. } => *resume = ResumeState::NoProgress,
        }
        self.watch_record = new_record;
        tracing::info!(key = %self.key, watchlist = self.is_in_watchlist(), "watchlist toggled");
        Ok(self.is_in_watchlist())
    }
}

fn play_request(urls: &StreamUrls, start: &EpisodeStart) -> PlayRequest {
    PlayRequest::new(urls.episode_url(&start.episode), start.offset_ms)
}
