use super::secondary;
use crate::catalog::{CatalogError, CatalogService, ContentEntry, ContentKind};
use crate::resolution::reconcile;
use std::thread;

/// Everything the home screen shows for one content kind.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeView {
    pub kind: ContentKind,
    /// Category name to entries, in backend order
    pub categories: Vec<(String, Vec<ContentEntry>)>,
    pub watchlist: Vec<ContentEntry>,
    pub favorites: Vec<ContentEntry>,
}

impl HomeView {
    /// Rows in display order: watchlist and favorites when non-empty, then
    /// every category.
    pub fn rows(&self) -> Vec<(&str, &[ContentEntry])> {
        let mut rows: Vec<(&str, &[ContentEntry])> = Vec::new();
        if !self.watchlist.is_empty() {
            rows.push(("Watchlist", self.watchlist.as_slice()));
        }
        if !self.favorites.is_empty() {
            rows.push(("Favorites", self.favorites.as_slice()));
        }
        rows.extend(
            self.categories
                .iter()
                .map(|(name, entries)| (name.as_str(), entries.as_slice())),
        );
        rows
    }
}

/// Loads the home screen.
///
/// Categories are required. Watchlist and favorites are fetched
/// concurrently and reconciled into entries; either one failing leaves its
/// row empty.
///
/// # Returns
///
/// The populated [`HomeView`], or the error of the category request.
pub fn load_home<C>(catalog: &C, kind: ContentKind) -> Result<HomeView, CatalogError>
where
    C: CatalogService + Sync + ?Sized,
{
    tracing::info!(%kind, "loading home screen");
    let categories = catalog.load_categories(kind)?;

    let (watchlist, favorites) = thread::scope(|s| {
        let watchlist = s.spawn(|| catalog.watchlist(kind));
        let favorites = s.spawn(|| catalog.favorites(kind));
        (join(watchlist), join(favorites))
    });

    let watchlist = secondary("watchlist", watchlist);
    let favorites = secondary("favorites", favorites);

    Ok(HomeView {
        kind,
        categories,
        watchlist: watchlist.iter().map(reconcile).collect(),
        favorites: favorites.iter().map(reconcile).collect(),
    })
}

/// Joins a scoped request, turning a panicked worker into a failed request.
pub(crate) fn join<T>(
    handle: thread::ScopedJoinHandle<'_, Result<T, CatalogError>>,
) -> Result<T, CatalogError> {
    handle
        .join()
        .unwrap_or_else(|_| Err(CatalogError::Backend("request worker panicked".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::identity::{ContentId, MediaKey};
    use crate::screens::testing::{FakeCatalog, record};

    fn catalog() -> FakeCatalog {
        FakeCatalog {
            categories: vec![
                (
                    "Drama".to_string(),
                    vec![ContentEntry::new(ContentId::Movie(1), "Heat")],
                ),
                (
                    "Action".to_string(),
                    vec![ContentEntry::new(ContentId::Movie(2), "Ronin")],
                ),
            ],
            ..Default::default()
        }
        .with_watch(record(&MediaKey::new(ContentKind::Movie, 42)))
        .with_watch(record(&MediaKey::new(ContentKind::Series, 7)))
        .with_favorite(record(&MediaKey::new(ContentKind::Movie, 2)))
    }

    #[test]
    fn test_home_reconciles_watch_rows() {
        let view = load_home(&catalog(), ContentKind::Movie).unwrap();

        assert_eq!(view.watchlist.len(), 1);
        assert_eq!(view.watchlist[0].id, ContentId::Movie(42));
        assert_eq!(view.favorites[0].canonical_id(), 2);

        let names: Vec<&str> = view.rows().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["Watchlist", "Favorites", "Drama", "Action"]);
    }

    #[test]
    fn test_secondary_failures_leave_rows_empty() {
        let catalog = FakeCatalog {
            failing: vec!["watchlist", "favorites"],
            ..catalog()
        };

        let view = load_home(&catalog, ContentKind::Movie).unwrap();
        assert!(view.watchlist.is_empty());
        assert!(view.favorites.is_empty());
        assert_eq!(view.categories.len(), 2);

        let names: Vec<&str> = view.rows().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["Drama", "Action"]);
    }

    #[test]
    fn test_primary_failure_is_an_error() {
        let catalog = FakeCatalog {
            failing: vec!["load_categories"],
            ..catalog()
        };

        assert!(load_home(&catalog, ContentKind::Series).is_err());
        // Nothing else is requested once the primary load fails
        assert_eq!(catalog.state().calls, vec!["load_categories"]);
    }
}
