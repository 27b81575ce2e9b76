use crate::catalog::{Episode, WatchRecord};
use std::fmt;

/// Converts a stored position in seconds to a player offset in milliseconds.
///
/// Absent, negative and non-finite positions start from the beginning.
pub fn resume_offset_ms(position_secs: Option<f64>) -> u64 {
    match position_secs {
        Some(secs) if secs.is_finite() && secs > 0.0 => (secs * 1000.0) as u64,
        _ => 0,
    }
}

/// Formats seconds as `HH:MM:SS`, or `MM:SS` below one hour.
pub fn format_position(position_secs: f64) -> String {
    let total = if position_secs.is_finite() && position_secs > 0.0 {
        position_secs as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Label of the primary play button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayLabel {
    Play,
    Resume,
}

impl PlayLabel {
    /// `Resume` once any progress has been stored.
    pub fn for_position(position_secs: Option<f64>) -> Self {
        match position_secs {
            Some(secs) if secs.is_finite() && secs > 0.0 => Self::Resume,
            _ => Self::Play,
        }
    }
}

impl fmt::Display for PlayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Play => f.write_str("Play"),
            Self::Resume => f.write_str("Resume"),
        }
    }
}

/// Where a movie starts and how its play button reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovieResume {
    pub offset_ms: u64,
    pub label: PlayLabel,
}

impl MovieResume {
    pub fn from_record(record: Option<&WatchRecord>) -> Self {
        let position = record.and_then(|r| r.position);
        Self {
            offset_ms: resume_offset_ms(position),
            label: PlayLabel::for_position(position),
        }
    }
}

/// An episode to hand to the player.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeStart {
    pub episode: Episode,
    pub offset_ms: u64,
}

/// Outcome of picking an episode.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Play right away
    Start(EpisodeStart),
    /// Another episode has progress; ask before replacing it
    ConfirmOverwrite,
}

/// Resume state of a series detail page.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResumeState {
    #[default]
    NoProgress,
    HasProgress {
        active: Episode,
        position_secs: f64,
    },
    PendingOverwrite {
        active: Episode,
        position_secs: f64,
        requested: Episode,
    },
}

impl ResumeState {
    /// State for a series whose progress record matched `active`.
    pub fn from_progress(active: Option<Episode>, record: Option<&WatchRecord>) -> Self {
        match active {
            Some(active) => Self::HasProgress {
                active,
                position_secs: record.map(WatchRecord::position_secs).unwrap_or(0.0),
            },
            None => Self::NoProgress,
        }
    }

    /// Picks an episode to play.
    ///
    /// Selecting while a confirmation is pending replaces the pending request.
    pub fn select(&mut self, episode: &Episode) -> Selection {
        let (active, position_secs) = match std::mem::take(self) {
            Self::NoProgress => {
                return Selection::Start(EpisodeStart {
                    episode: episode.clone(),
                    offset_ms: 0,
                });
            }
            Self::HasProgress {
                active,
                position_secs,
            }
            | Self::PendingOverwrite {
                active,
                position_secs,
                ..
            } => (active, position_secs),
        };

        if active.id == episode.id {
            let start = EpisodeStart {
                episode: episode.clone(),
                offset_ms: resume_offset_ms(Some(position_secs)),
            };
            *self = Self::HasProgress {
                active,
                position_secs,
            };
            Selection::Start(start)
        } else {
            tracing::info!(
                active = active.id,
                requested = episode.id,
                "episode selection needs overwrite confirmation"
            );
            *self = Self::PendingOverwrite {
                active,
                position_secs,
                requested: episode.clone(),
            };
            Selection::ConfirmOverwrite
        }
    }

    /// Accepts a pending overwrite. The requested episode becomes active at
    /// position zero.
    pub fn confirm_overwrite(&mut self) -> Option<EpisodeStart> {
        match std::mem::take(self) {
            Self::PendingOverwrite { requested, .. } => {
                *self = Self::HasProgress {
                    active: requested.clone(),
                    position_secs: 0.0,
                };
                Some(EpisodeStart {
                    episode: requested,
                    offset_ms: 0,
                })
            }
            other => {
                *self = other;
                None
            }
        }
    }

    /// Declines a pending overwrite, keeping the original progress.
    pub fn cancel_overwrite(&mut self) {
        *self = match std::mem::take(self) {
            Self::PendingOverwrite {
                active,
                position_secs,
                ..
            } => Self::HasProgress {
                active,
                position_secs,
            },
            other => other,
        };
    }

    pub fn active_episode(&self) -> Option<&Episode> {
        match self {
            Self::NoProgress => None,
            Self::HasProgress { active, .. } | Self::PendingOverwrite { active, .. } => {
                Some(active)
            }
        }
    }

    pub fn position_secs(&self) -> f64 {
        match self {
            Self::NoProgress => 0.0,
            Self::HasProgress { position_secs, .. }
            | Self::PendingOverwrite { position_secs, .. } => *position_secs,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::PendingOverwrite { .. })
    }

    /// `"Resume S<season>E<episode> <time>"` while an episode is active.
    pub fn resume_caption(&self) -> Option<String> {
        self.active_episode().map(|episode| {
            format!(
                "Resume S{}E{} {}",
                episode.season,
                episode.episode_num,
                format_position(self.position_secs())
            )
        })
    }

    /// Start of the active episode at its stored position.
    pub fn resume(&self) -> Option<EpisodeStart> {
        self.active_episode().map(|episode| EpisodeStart {
            episode: episode.clone(),
            offset_ms: resume_offset_ms(Some(self.position_secs())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(id: u64, season: u32, num: u32) -> Episode {
        Episode {
            id,
            season,
            episode_num: num,
            ..Default::default()
        }
    }

    fn progress_on(id: u64, position_secs: f64) -> ResumeState {
        ResumeState::HasProgress {
            active: episode(id, 1, 3),
            position_secs,
        }
    }

    #[test]
    fn test_resume_offset() {
        assert_eq!(resume_offset_ms(Some(125.0)), 125_000);
        assert_eq!(resume_offset_ms(Some(1.9999)), 1999);
        assert_eq!(resume_offset_ms(Some(0.0)), 0);
        assert_eq!(resume_offset_ms(Some(-4.0)), 0);
        assert_eq!(resume_offset_ms(Some(f64::NAN)), 0);
        assert_eq!(resume_offset_ms(None), 0);
    }

    #[test]
    fn test_movie_resume_label() {
        let mut record = WatchRecord {
            position: Some(125.0),
            ..Default::default()
        };
        let resume = MovieResume::from_record(Some(&record));
        assert_eq!(resume.offset_ms, 125_000);
        assert_eq!(resume.label, PlayLabel::Resume);
        assert_eq!(resume.label.to_string(), "Resume");

        record.position = Some(0.0);
        let resume = MovieResume::from_record(Some(&record));
        assert_eq!(resume.offset_ms, 0);
        assert_eq!(resume.label.to_string(), "Play");

        assert_eq!(MovieResume::from_record(None).label, PlayLabel::Play);

        record.position = Some(0.0004);
        let resume = MovieResume::from_record(Some(&record));
        assert_eq!(resume.offset_ms, 0);
        assert_eq!(resume.label, PlayLabel::Resume);
    }

    #[test]
    fn test_no_progress_starts_at_zero() {
        let mut state = ResumeState::NoProgress;
        let selection = state.select(&episode(12, 1, 1));
        assert_eq!(
            selection,
            Selection::Start(EpisodeStart {
                episode: episode(12, 1, 1),
                offset_ms: 0
            })
        );
        assert_eq!(state, ResumeState::NoProgress);
    }

    #[test]
    fn test_same_episode_resumes() {
        let mut state = progress_on(5, 61.5);
        match state.select(&episode(5, 1, 3)) {
            Selection::Start(start) => assert_eq!(start.offset_ms, 61_500),
            other => panic!("unexpected selection: {other:?}"),
        }
        assert_eq!(state, progress_on(5, 61.5));
    }

    #[test]
    fn test_overwrite_confirmed() {
        let mut state = progress_on(5, 61.5);
        assert_eq!(state.select(&episode(12, 2, 1)), Selection::ConfirmOverwrite);
        assert!(state.is_pending());
        assert_eq!(state.active_episode().map(|e| e.id), Some(5));

        let start = state.confirm_overwrite().unwrap();
        assert_eq!(start.episode.id, 12);
        assert_eq!(start.offset_ms, 0);
        assert_eq!(
            state,
            ResumeState::HasProgress {
                active: episode(12, 2, 1),
                position_secs: 0.0
            }
        );
    }

    #[test]
    fn test_overwrite_cancelled() {
        let mut state = progress_on(5, 61.5);
        state.select(&episode(12, 2, 1));
        state.cancel_overwrite();
        assert_eq!(state, progress_on(5, 61.5));
        assert_eq!(state.confirm_overwrite(), None);
        assert_eq!(state, progress_on(5, 61.5));
    }

    #[test]
    fn test_reselect_while_pending_replaces_request() {
        let mut state = progress_on(5, 10.0);
        state.select(&episode(12, 2, 1));
        state.select(&episode(13, 2, 2));
        assert_eq!(state.confirm_overwrite().map(|s| s.episode.id), Some(13));

        let mut state = progress_on(5, 10.0);
        state.select(&episode(12, 2, 1));
        assert!(matches!(state.select(&episode(5, 1, 3)), Selection::Start(_)));
        assert!(!state.is_pending());
    }

    #[test]
    fn test_caption_and_format() {
        assert_eq!(format_position(65.0), "01:05");
        assert_eq!(format_position(3725.9), "01:02:05");
        assert_eq!(format_position(-3.0), "00:00");

        assert_eq!(
            progress_on(5, 125.0).resume_caption().as_deref(),
            Some("Resume S1E3 02:05")
        );
        assert_eq!(ResumeState::NoProgress.resume_caption(), None);
        assert_eq!(progress_on(5, 2.0).resume().map(|s| s.offset_ms), Some(2000));
    }
}
