use crate::media::{MediaItem, MediaKind, UNCATEGORIZED};
use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

#[cfg(target_arch = "wasm32")]
pub const DATA_URL: &str = "/data/portfolio.json";
pub const ALL_CATEGORY: &str = "all";

/// Photos per category flagged as preview when flattening grouped data.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
const PREVIEW_PHOTOS_PER_CATEGORY: usize = 3;

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ContentError {
    #[error("Failed to load portfolio data: {0}")]
    Network(String),
    #[error("Failed to load portfolio data: HTTP error! status: {0}")]
    Status(u16),
    #[error("Failed to load portfolio data: {0}")]
    Decode(String),
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDocument {
    #[serde(default)]
    pub portfolio: Portfolio,
    #[serde(default)]
    pub recent_events: Vec<EventEntry>,
    #[serde(default)]
    pub social_proof: SocialProof,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Portfolio {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub images: ImageSet,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Category {
    pub slug: String,
    #[serde(default)]
    pub name: String,
}

/// `portfolio.images` is either grouped by category slug (in document order) or a flat list.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ImageSet {
    Grouped(IndexMap<String, Vec<RawMedia>>),
    Flat(Vec<RawMedia>),
}

impl Default for ImageSet {
    fn default() -> Self {
        Self::Grouped(IndexMap::new())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMedia {
    #[serde(default)]
    pub src: String,
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub aspect_ratio: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl RawMedia {
    fn kind(&self) -> MediaKind {
        MediaKind::from_type(self.media_type.as_deref())
    }

    fn to_item(&self, category: Option<&str>) -> MediaItem {
        MediaItem {
            src: self.src.clone(),
            kind: self.kind(),
            title: self.title.clone(),
            category: Some(
                category
                    .or(self.category.as_deref())
                    .filter(|value| !value.is_empty())
                    .unwrap_or(UNCATEGORIZED)
                    .to_string(),
            ),
            poster: self.poster.clone(),
            alt: self.alt.clone(),
            aspect_ratio: self.aspect_ratio.clone(),
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEntry {
    pub src: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub aspect_ratio: Option<String>,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SocialProof {
    #[serde(default)]
    pub publications: Vec<String>,
    #[serde(default)]
    pub awards: Vec<String>,
    #[serde(default)]
    pub clients: Vec<String>,
}

/// A flattened grid entry. `preview` decides visibility on category-filtered views.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogEntry {
    pub item: MediaItem,
    pub preview: bool,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Clone, Debug, PartialEq)]
pub struct Album {
    pub slug: String,
    pub name: String,
    pub cover: MediaItem,
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategorySummary {
    pub slug: String,
    pub items: usize,
    pub videos: usize,
}

pub fn parse_document(raw: &str) -> Result<PortfolioDocument, ContentError> {
    serde_json::from_str(raw).map_err(|error| ContentError::Decode(error.to_string()))
}

fn usable(entries: &[RawMedia]) -> impl Iterator<Item = &RawMedia> {
    entries.iter().filter(|entry| {
        let keep = !entry.src.trim().is_empty();
        if !keep {
            log::warn!("skipping media entry without src: {:?}", entry.title);
        }
        keep
    })
}

impl PortfolioDocument {
    /// Every item of `category` (case-insensitive), or of all categories for `"all"`.
    pub fn gallery_items(&self, category: &str) -> Vec<MediaItem> {
        let wants_all = category.eq_ignore_ascii_case(ALL_CATEGORY);

        match &self.portfolio.images {
            ImageSet::Flat(entries) => usable(entries)
                .map(|entry| entry.to_item(None))
                .filter(|item| wants_all || item.category_or_empty().eq_ignore_ascii_case(category))
                .collect(),
            ImageSet::Grouped(groups) => groups
                .iter()
                .filter(|(slug, _)| wants_all || slug.eq_ignore_ascii_case(category))
                .flat_map(|(slug, entries)| {
                    usable(entries).map(move |entry| entry.to_item(Some(slug.as_str())))
                })
                .collect(),
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
impl PortfolioDocument {
    /// Flattens the document into home-grid order. Per category the first photos and one video
    /// chosen by `pick_video(video_count)` become preview entries.
    pub fn catalog(&self, mut pick_video: impl FnMut(usize) -> usize) -> Vec<CatalogEntry> {
        match &self.portfolio.images {
            ImageSet::Flat(entries) => usable(entries)
                .map(|entry| CatalogEntry {
                    item: entry.to_item(None),
                    preview: true,
                })
                .collect(),
            ImageSet::Grouped(groups) => {
                let mut catalog = Vec::new();

                for (slug, entries) in groups {
                    let entries = usable(entries).collect::<Vec<_>>();
                    let video_count = entries.iter().filter(|entry| entry.kind().is_video()).count();
                    let chosen_video = (video_count > 0)
                        .then(|| pick_video(video_count).min(video_count - 1));

                    let mut video_position = 0;
                    let mut photo_position = 0;

                    for entry in entries {
                        let preview = if entry.kind().is_video() {
                            let preview = chosen_video == Some(video_position);
                            video_position += 1;
                            preview
                        } else {
                            let preview = photo_position < PREVIEW_PHOTOS_PER_CATEGORY;
                            photo_position += 1;
                            preview
                        };

                        catalog.push(CatalogEntry {
                            item: entry.to_item(Some(slug.as_str())),
                            preview,
                        });
                    }
                }

                catalog
            }
        }
    }

    pub fn category_name(&self, slug: &str) -> Option<&str> {
        self.portfolio
            .categories
            .iter()
            .find(|category| category.slug.eq_ignore_ascii_case(slug))
            .map(|category| category.name.as_str())
    }

    /// Heading for the gallery page: the category's name, or the slug uppercased.
    pub fn category_title(&self, slug: &str) -> String {
        self.category_name(slug)
            .filter(|name| !name.is_empty())
            .map(ToString::to_string)
            .unwrap_or_else(|| slug.to_uppercase())
    }

    /// One album per listed category that has at least one item, covered by its first item.
    pub fn albums(&self) -> Vec<Album> {
        self.portfolio
            .categories
            .iter()
            .filter(|category| category.slug != ALL_CATEGORY)
            .filter_map(|category| {
                let cover = self.gallery_items(&category.slug).into_iter().next()?;
                Some(Album {
                    slug: category.slug.clone(),
                    name: category.name.clone(),
                    cover,
                })
            })
            .collect()
    }

}

#[cfg(not(target_arch = "wasm32"))]
impl PortfolioDocument {
    pub fn summary(&self) -> Vec<CategorySummary> {
        let mut summaries: Vec<CategorySummary> = Vec::new();

        for item in self.gallery_items(ALL_CATEGORY) {
            let slug = item.category_or_empty().to_string();
            let index = match summaries.iter().position(|summary| summary.slug == slug) {
                Some(index) => index,
                None => {
                    summaries.push(CategorySummary {
                        slug,
                        items: 0,
                        videos: 0,
                    });
                    summaries.len() - 1
                }
            };

            summaries[index].items += 1;
            if item.kind.is_video() {
                summaries[index].videos += 1;
            }
        }

        summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUPED: &str = r#"{
        "portfolio": {
            "categories": [
                { "id": "weddings", "name": "Weddings", "slug": "weddings" },
                { "id": 2, "name": "Cinematics", "slug": "cinematics" },
                { "name": "Empty", "slug": "empty" }
            ],
            "images": {
                "weddings": [
                    { "id": 1, "src": "/w/1.jpg", "type": "image", "title": "One", "aspectRatio": "3/4" },
                    { "id": 2, "src": "/w/2.mp4", "type": "video", "poster": "/w/2.jpg" },
                    { "id": 3, "src": "/w/3.jpg", "type": "image" },
                    { "id": 4, "src": "/w/4.jpg", "type": "image" },
                    { "id": 5, "src": "/w/5.jpg", "type": "image" },
                    { "id": 6, "src": "/w/6.mp4", "type": "video" }
                ],
                "cinematics": [
                    { "src": "/c/1.mp4", "type": "video", "title": "Reel" }
                ],
                "empty": []
            }
        },
        "socialProof": { "awards": ["Best of 2024"] }
    }"#;

    #[test]
    fn grouped_catalog_keeps_document_order() {
        let document = parse_document(GROUPED).expect("valid document");
        let catalog = document.catalog(|_| 0);

        let sources = catalog
            .iter()
            .map(|entry| entry.item.src.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            sources,
            vec!["/w/1.jpg", "/w/2.mp4", "/w/3.jpg", "/w/4.jpg", "/w/5.jpg", "/w/6.mp4", "/c/1.mp4"]
        );
        assert!(catalog
            .iter()
            .all(|entry| entry.item.category.is_some()));
    }

    #[test]
    fn preview_is_first_three_photos_and_one_video() {
        let document = parse_document(GROUPED).expect("valid document");
        let catalog = document.catalog(|count| count - 1);

        let previews = catalog
            .iter()
            .filter(|entry| entry.preview)
            .map(|entry| entry.item.src.as_str())
            .collect::<Vec<_>>();
        assert_eq!(previews, vec!["/w/1.jpg", "/w/3.jpg", "/w/4.jpg", "/w/6.mp4", "/c/1.mp4"]);
    }

    #[test]
    fn out_of_range_video_pick_is_clamped() {
        let document = parse_document(GROUPED).expect("valid document");
        let catalog = document.catalog(|_| 99);

        assert!(catalog
            .iter()
            .any(|entry| entry.preview && entry.item.src == "/w/6.mp4"));
    }

    #[test]
    fn flat_list_marks_everything_preview() {
        let document = parse_document(
            r#"{ "portfolio": { "images": [
                { "src": "/a.jpg", "category": "portraits" },
                { "src": "" },
                { "src": "/b.mp4", "type": "video" }
            ] } }"#,
        )
        .expect("valid document");

        let catalog = document.catalog(|_| 0);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.iter().all(|entry| entry.preview));
        assert_eq!(catalog[0].item.category.as_deref(), Some("portraits"));
        assert_eq!(catalog[1].item.kind, MediaKind::Video);
    }

    #[test]
    fn flat_entries_without_category_become_uncategorized() {
        let document = parse_document(
            r#"{ "portfolio": { "images": [
                { "src": "/a.jpg" },
                { "src": "/b.jpg", "category": "" },
                { "src": "/c.jpg", "category": "haldi" }
            ] } }"#,
        )
        .expect("valid document");

        let categories = document
            .catalog(|_| 0)
            .into_iter()
            .map(|entry| entry.item.category)
            .collect::<Vec<_>>();
        assert_eq!(
            categories,
            vec![
                Some("uncategorized".to_string()),
                Some("uncategorized".to_string()),
                Some("haldi".to_string()),
            ]
        );
        assert_eq!(document.gallery_items("all")[0].category_or_empty(), "uncategorized");
    }

    #[test]
    fn gallery_items_match_case_insensitively() {
        let document = parse_document(GROUPED).expect("valid document");

        assert_eq!(document.gallery_items("WEDDINGS").len(), 6);
        assert_eq!(document.gallery_items("all").len(), 7);
        assert!(document.gallery_items("unknown").is_empty());
        assert_eq!(
            document.gallery_items("cinematics")[0].category.as_deref(),
            Some("cinematics")
        );
    }

    #[test]
    fn category_title_falls_back_to_uppercase_slug() {
        let document = parse_document(GROUPED).expect("valid document");

        assert_eq!(document.category_title("cinematics"), "Cinematics");
        assert_eq!(document.category_title("haldi"), "HALDI");
    }

    #[test]
    fn albums_skip_empty_categories() {
        let document = parse_document(GROUPED).expect("valid document");
        let albums = document.albums();

        assert_eq!(albums.len(), 2);
        assert_eq!(albums[0].cover.src, "/w/1.jpg");
        assert_eq!(albums[1].cover.kind, MediaKind::Video);
    }

    #[test]
    fn optional_sections_default_when_absent() {
        let document = parse_document(GROUPED).expect("valid document");

        assert!(document.recent_events.is_empty());
        assert_eq!(document.social_proof.awards, vec!["Best of 2024".to_string()]);
        assert!(document.social_proof.clients.is_empty());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn summary_counts_items_and_videos() {
        let document = parse_document(GROUPED).expect("valid document");
        let summary = document.summary();

        assert_eq!(
            summary,
            vec![
                CategorySummary {
                    slug: "weddings".to_string(),
                    items: 6,
                    videos: 2,
                },
                CategorySummary {
                    slug: "cinematics".to_string(),
                    items: 1,
                    videos: 1,
                },
            ]
        );
    }

    #[test]
    fn malformed_json_is_a_decode_error() {
        let result = parse_document("{ \"portfolio\": ");
        assert!(matches!(result, Err(ContentError::Decode(_))));
    }
}
