use crate::catalog::{CatalogError, CatalogService, Category, ContentKind};
use std::collections::HashSet;

/// Which provider categories the backend should sync for one kind.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySelection {
    pub kind: ContentKind,
    categories: Vec<Category>,
    selected: HashSet<String>,
}

/// Loads every provider category, preselecting the ones the backend
/// already syncs.
pub fn load_category_selection<C>(
    catalog: &C,
    kind: ContentKind,
) -> Result<CategorySelection, CatalogError>
where
    C: CatalogService + ?Sized,
{
    tracing::info!(%kind, "loading category selection");
    let categories = catalog.all_categories(kind)?;
    let selected = categories
        .iter()
        .filter(|c| c.preselected)
        .map(|c| c.category_id.clone())
        .collect();

    Ok(CategorySelection {
        kind,
        categories,
        selected,
    })
}

impl CategorySelection {
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_selected(&self, category_id: &str) -> bool {
        self.selected.contains(category_id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Flips one category. Unknown ids are ignored. Returns whether the
    /// category is now selected.
    pub fn toggle(&mut self, category_id: &str) -> bool {
        if !self.categories.iter().any(|c| c.category_id == category_id) {
            return false;
        }
        if !self.selected.remove(category_id) {
            self.selected.insert(category_id.to_string());
            true
        } else {
            false
        }
    }

    /// Replaces the selection; ids that name no category are dropped.
    pub fn set_selected<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        let wanted: HashSet<&str> = ids.into_iter().collect();
        self.selected = self
            .categories
            .iter()
            .filter(|c| wanted.contains(c.category_id.as_str()))
            .map(|c| c.category_id.clone())
            .collect();
    }

    /// Selected categories in list order.
    pub fn selected_categories(&self) -> Vec<Category> {
        self.categories
            .iter()
            .filter(|c| self.selected.contains(&c.category_id))
            .cloned()
            .collect()
    }

    /// Replaces the backend's selection with this one.
    pub fn save<C>(&self, catalog: &C) -> Result<bool, CatalogError>
    where
        C: CatalogService + ?Sized,
    {
        let selected = self.selected_categories();
        tracing::info!(kind = %self.kind, count = selected.len(), "saving category selection");
        catalog.set_categories(self.kind, &selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::testing::FakeCatalog;
    use serde_json::json;

    fn catalog() -> FakeCatalog {
        FakeCatalog {
            all_categories: serde_json::from_value(json!([
                {"category_id": "1", "category_name": "Action", "preselected": true},
                {"category_id": 2, "category_name": "Comedy"},
                {"category_id": "3", "category_name": "Drama", "preselected": 1}
            ]))
            .unwrap(),
            ..Default::default()
        }
    }

    fn ids(categories: &[Category]) -> Vec<&str> {
        categories.iter().map(|c| c.category_id.as_str()).collect()
    }

    #[test]
    fn test_preselected_categories() {
        let selection = load_category_selection(&catalog(), ContentKind::Movie).unwrap();
        assert_eq!(selection.categories().len(), 3);
        assert!(selection.is_selected("1"));
        assert!(!selection.is_selected("2"));
        assert!(selection.is_selected("3"));
        assert_eq!(selection.selected_count(), 2);
    }

    #[test]
    fn test_toggle_and_save_posts_selected_in_order() {
        let catalog = catalog();
        let mut selection = load_category_selection(&catalog, ContentKind::Series).unwrap();

        assert!(selection.toggle("2"));
        assert!(!selection.toggle("1"));
        assert!(!selection.toggle("99"));
        assert!(selection.save(&catalog).unwrap());

        let state = catalog.state();
        let (kind, posted) = state.posted_categories.as_ref().unwrap();
        assert_eq!(*kind, ContentKind::Series);
        assert_eq!(ids(posted), vec!["2", "3"]);
    }

    #[test]
    fn test_set_selected_ignores_unknown_ids() {
        let mut selection = load_category_selection(&catalog(), ContentKind::Movie).unwrap();
        selection.set_selected(["3", "42"]);
        assert_eq!(ids(&selection.selected_categories()), vec!["3"]);
    }

    #[test]
    fn test_load_failure_is_an_error() {
        let catalog = FakeCatalog {
            failing: vec!["all_categories"],
            ..catalog()
        };
        assert!(load_category_selection(&catalog, ContentKind::Movie).is_err());
    }
}
