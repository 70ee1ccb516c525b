use crate::content::{CatalogEntry, ALL_CATEGORY};
use crate::media::MediaItem;

/// Items shown on the unfiltered home grid.
pub const HOME_ITEM_LIMIT: usize = 3;

/// Categories laid out as a centered column instead of the masonry grid.
const CENTERED_CATEGORIES: &[&str] = &["cinematics"];

pub fn is_centered_category(category: &str) -> bool {
    CENTERED_CATEGORIES.contains(&category)
}

/// Observer margin and visible fraction below which a grid video counts as scrolled away.
pub const GRID_VIDEO_ROOT_MARGIN: &str = "50px 0px";
pub const GRID_VIDEO_VISIBLE_THRESHOLD: f64 = 0.1;

/// A grid video that left the viewport while playing gets paused.
pub fn pauses_offscreen(is_intersecting: bool, paused: bool) -> bool {
    !is_intersecting && !paused
}

#[derive(Clone, Debug, PartialEq)]
pub struct GalleryEntry {
    pub item: MediaItem,
    pub preview: bool,
    pub original_index: usize,
    pub visible: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    pub shown: usize,
    /// A matching item was held back, so the "load more" affordance applies.
    pub has_hidden: bool,
    pub centered_layout: bool,
}

/// Category filter over the rendered home grid. Visibility lives in each entry's `visible`
/// flag and the view renders it as-is.
#[derive(Clone, Debug, PartialEq)]
pub struct GalleryFilter {
    entries: Vec<GalleryEntry>,
    active_category: String,
    outcome: FilterOutcome,
}

impl GalleryFilter {
    pub fn new(catalog: Vec<CatalogEntry>) -> Self {
        let entries = catalog
            .into_iter()
            .enumerate()
            .map(|(original_index, entry)| GalleryEntry {
                item: entry.item,
                preview: entry.preview,
                original_index,
                visible: true,
            })
            .collect();

        let mut filter = Self {
            entries,
            active_category: ALL_CATEGORY.to_string(),
            outcome: FilterOutcome::default(),
        };
        filter.apply(ALL_CATEGORY);
        filter
    }

    pub fn apply(&mut self, category: &str) -> FilterOutcome {
        let wants_all = category == ALL_CATEGORY;
        let mut outcome = FilterOutcome {
            centered_layout: is_centered_category(category),
            ..FilterOutcome::default()
        };

        for entry in &mut self.entries {
            let matches = wants_all || entry.item.category.as_deref() == Some(category);

            entry.visible = if !matches {
                false
            } else if wants_all {
                outcome.shown < HOME_ITEM_LIMIT
            } else {
                entry.preview
            };

            if entry.visible {
                outcome.shown += 1;
            } else if matches {
                outcome.has_hidden = true;
            }
        }

        self.active_category = category.to_string();
        self.outcome = outcome;
        outcome
    }

    pub fn active_category(&self) -> &str {
        &self.active_category
    }

    pub fn outcome(&self) -> FilterOutcome {
        self.outcome
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    /// Visible items in grid order; this is the working set handed to the lightbox.
    pub fn visible_items(&self) -> Vec<MediaItem> {
        self.entries
            .iter()
            .filter(|entry| entry.visible)
            .map(|entry| entry.item.clone())
            .collect()
    }

    /// Position of a grid entry within the visible subset.
    pub fn visible_position(&self, original_index: usize) -> Option<usize> {
        self.entries
            .iter()
            .filter(|entry| entry.visible)
            .position(|entry| entry.original_index == original_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(src: &str, category: &str, preview: bool) -> CatalogEntry {
        CatalogEntry {
            item: MediaItem::image(src).with_category(category),
            preview,
        }
    }

    fn wedding_heavy_catalog() -> Vec<CatalogEntry> {
        let mut catalog = Vec::new();
        for index in 0..20 {
            catalog.push(entry(&format!("/w/{index}.jpg"), "weddings", index % 4 == 0));
        }
        catalog.push(entry("/p/0.jpg", "portraits", true));
        catalog
    }

    #[test]
    fn starts_on_all_with_home_cap() {
        let filter = GalleryFilter::new(wedding_heavy_catalog());

        assert_eq!(filter.active_category(), "all");
        assert_eq!(filter.outcome().shown, HOME_ITEM_LIMIT);
        assert!(filter.outcome().has_hidden);

        let visible = filter.visible_items();
        assert_eq!(
            visible.iter().map(|item| item.src.as_str()).collect::<Vec<_>>(),
            vec!["/w/0.jpg", "/w/1.jpg", "/w/2.jpg"]
        );
    }

    #[test]
    fn category_view_shows_only_preview_items() {
        let mut filter = GalleryFilter::new(wedding_heavy_catalog());
        let outcome = filter.apply("weddings");

        assert_eq!(outcome.shown, 5);
        assert!(outcome.has_hidden);
        assert_eq!(
            filter.entries().iter().filter(|entry| !entry.visible).count(),
            16
        );
        assert!(filter
            .entries()
            .iter()
            .filter(|entry| entry.visible)
            .all(|entry| entry.preview && entry.item.category.as_deref() == Some("weddings")));
    }

    #[test]
    fn fully_previewed_category_has_nothing_hidden() {
        let mut filter = GalleryFilter::new(wedding_heavy_catalog());
        let outcome = filter.apply("portraits");

        assert_eq!(outcome.shown, 1);
        assert!(!outcome.has_hidden);
    }

    #[test]
    fn unknown_category_hides_everything() {
        let mut filter = GalleryFilter::new(wedding_heavy_catalog());
        let outcome = filter.apply("haldi");

        assert_eq!(outcome, FilterOutcome::default());
        assert!(filter.visible_items().is_empty());
    }

    #[test]
    fn only_playing_videos_that_leave_the_viewport_pause() {
        assert!(pauses_offscreen(false, false));
        assert!(!pauses_offscreen(false, true));
        assert!(!pauses_offscreen(true, false));
        assert!(!pauses_offscreen(true, true));
    }

    #[test]
    fn cinematics_uses_centered_layout() {
        let mut filter = GalleryFilter::new(vec![entry("/c/0.mp4", "cinematics", true)]);

        assert!(filter.apply("cinematics").centered_layout);
        assert!(!filter.apply("all").centered_layout);
    }

    #[test]
    fn visible_position_maps_into_the_visible_subset() {
        let mut filter = GalleryFilter::new(wedding_heavy_catalog());
        filter.apply("weddings");

        assert_eq!(filter.visible_position(0), Some(0));
        assert_eq!(filter.visible_position(8), Some(2));
        assert_eq!(filter.visible_position(1), None);
        assert_eq!(filter.visible_position(20), None);
    }
}
