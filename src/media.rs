/// Category given to entries that name none.
pub const UNCATEGORIZED: &str = "uncategorized";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

impl MediaKind {
    /// Anything but `"video"` renders as an image.
    pub fn from_type(value: Option<&str>) -> Self {
        match value {
            Some(kind) if kind.eq_ignore_ascii_case("video") => Self::Video,
            _ => Self::Image,
        }
    }

    pub fn is_video(self) -> bool {
        matches!(self, Self::Video)
    }
}

/// One displayable entry, as handed to the grid and to the lightbox.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaItem {
    pub src: String,
    pub kind: MediaKind,
    pub title: Option<String>,
    pub category: Option<String>,
    pub poster: Option<String>,
    pub alt: Option<String>,
    pub aspect_ratio: Option<String>,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
impl MediaItem {
    pub fn image(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            kind: MediaKind::Image,
            ..Self::default()
        }
    }

    pub fn video(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            kind: MediaKind::Video,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn category_or_empty(&self) -> &str {
        self.category.as_deref().unwrap_or_default()
    }

    pub fn alt_text(&self) -> &str {
        self.alt
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or_default()
    }

    /// Grid size class derived from the aspect ratio hint.
    pub fn size_class(&self) -> &str {
        match self.aspect_ratio.as_deref() {
            Some("16/9") => "landscape",
            Some(ratio) if !ratio.is_empty() => ratio,
            _ => "portrait",
        }
    }
}

/// Display name for a category slug. Known slugs have fixed labels, then the document's own
/// name wins, then the slug itself.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub fn category_display_name(slug: &str, document_name: Option<&str>) -> String {
    let known = match slug {
        "wedding" => Some("Weddings"),
        "portraits" => Some("Portraits"),
        "events" => Some("Events"),
        "maternity" => Some("Maternity"),
        "haldi" => Some("Haldi"),
        "engagement" => Some("Engagement"),
        "pre-wedding-photos-and-videos" => Some("Pre-Wedding"),
        "cinematics" => Some("Cinematics"),
        _ => None,
    };

    known
        .or(document_name.filter(|name| !name.trim().is_empty()))
        .unwrap_or(slug)
        .to_string()
}

/// File extensions treated as video when classifying paths or URLs.
#[cfg(not(target_arch = "wasm32"))]
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov"];

#[cfg(not(target_arch = "wasm32"))]
pub fn kind_from_path(path: &str) -> MediaKind {
    let lowered = path.to_ascii_lowercase();
    let is_video = lowered
        .rsplit_once('.')
        .is_some_and(|(_, extension)| VIDEO_EXTENSIONS.contains(&extension));

    if is_video {
        MediaKind::Video
    } else {
        MediaKind::Image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_is_image() {
        assert_eq!(MediaKind::from_type(None), MediaKind::Image);
        assert_eq!(MediaKind::from_type(Some("photo")), MediaKind::Image);
        assert_eq!(MediaKind::from_type(Some("VIDEO")), MediaKind::Video);
    }

    #[test]
    fn size_class_follows_aspect_ratio() {
        let mut item = MediaItem::image("/a.jpg");
        assert_eq!(item.size_class(), "portrait");

        item.aspect_ratio = Some("16/9".to_string());
        assert_eq!(item.size_class(), "landscape");

        item.aspect_ratio = Some("square".to_string());
        assert_eq!(item.size_class(), "square");
    }

    #[test]
    fn missing_metadata_reads_as_empty() {
        let item = MediaItem::video("/clip.mp4");
        assert_eq!(item.title_or_empty(), "");
        assert_eq!(item.category_or_empty(), "");
        assert_eq!(item.alt_text(), "");
    }

    #[test]
    fn alt_falls_back_to_title() {
        let item = MediaItem::image("/a.jpg").with_title("Haldi Session");
        assert_eq!(item.alt_text(), "Haldi Session");
    }

    #[test]
    fn display_name_prefers_known_labels() {
        assert_eq!(category_display_name("wedding", Some("Wedding Stories")), "Weddings");
        assert_eq!(
            category_display_name("pre-wedding-photos-and-videos", None),
            "Pre-Wedding"
        );
        assert_eq!(category_display_name("baby-shower", Some("Baby Shower")), "Baby Shower");
        assert_eq!(category_display_name("baby-shower", Some("  ")), "baby-shower");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn kind_from_path_uses_extension() {
        assert_eq!(kind_from_path("/assets/Cinematic/reel.MP4"), MediaKind::Video);
        assert_eq!(kind_from_path("https://cdn.example.com/a.webm"), MediaKind::Video);
        assert_eq!(kind_from_path("/assets/Haldi/01.webp"), MediaKind::Image);
        assert_eq!(kind_from_path("no-extension"), MediaKind::Image);
    }
}
