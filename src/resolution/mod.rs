//! Content resolution and watch-state reconciliation
//!
//! Pure functions that turn what the backend returns into what the screens
//! show: canonical identities and stream URLs, catalog entries rebuilt from
//! watch records, the episode a series is paused on, and whether starting an
//! episode resumes, restarts or needs confirmation first.

pub mod episodes;
pub mod identity;
pub mod reconcile;
pub mod resume;

pub use episodes::{ProgressLocation, episode_matches_file, find_active_episode, locate_progress};
pub use identity::{
    ContentId, DEFAULT_CONTAINER_EXTENSION, MediaKey, StreamUrls, decode_from_transport,
    encode_for_transport,
};
pub use reconcile::{reconcile, resolve_identity};
pub use resume::{
    EpisodeStart, MovieResume, PlayLabel, ResumeState, Selection, format_position,
    resume_offset_ms,
};
