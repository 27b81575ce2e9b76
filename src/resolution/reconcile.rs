use super::identity::{ContentId, MediaKey};
use crate::catalog::{ContentEntry, WatchRecord};

/// Resolves the identity of a watch record.
///
/// Non-zero typed ids on the record win. Without them the media key is
/// split; a key that is malformed, names an unknown kind or carries a
/// non-numeric or zero id leaves the identity unresolved.
pub fn resolve_identity(record: &WatchRecord) -> ContentId {
    let typed = ContentId::from_typed(record.stream_id, record.series_id);
    if typed.is_resolved() {
        return typed;
    }

    match MediaKey::split(&record.media_key) {
        (Some(kind), Some(id)) if id != 0 => ContentId::new(kind, id),
        _ => {
            tracing::debug!(media_key = %record.media_key, "watch record has no resolvable identity");
            ContentId::Unresolved
        }
    }
}

/// Rebuilds a catalog entry from a denormalized watch or favorite record.
///
/// Never fails: an unresolvable record yields an entry with canonical id `0`
/// that can still be rendered from its display fields.
pub fn reconcile(record: &WatchRecord) -> ContentEntry {
    ContentEntry {
        id: resolve_identity(record),
        name: record.name.clone().unwrap_or_default(),
        category_id: record.category_id.clone(),
        cover: record.cover.clone(),
        rating: record.rating.clone(),
        plot: record.plot.clone(),
        cast: record.cast.clone(),
        director: record.director.clone(),
        container_extension: record.container_extension.clone(),
        added: record.updated_at.clone(),
        release_date: record.updated_at.clone(),
        num: None,
        stream_type: record.stream_type.clone(),
    }
}
