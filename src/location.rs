use crate::content::ALL_CATEGORY;
use url::{form_urlencoded, Url};

const CATEGORY_PARAM: &str = "category";
const CATEGORY_SHORT_PARAM: &str = "c";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Home,
    Gallery,
    Albums,
}

impl Page {
    /// Accepts the SPA paths as well as the legacy `/pages/*.html` links.
    pub fn from_path(path: &str) -> Self {
        let trimmed = path.trim_end_matches('/');
        let last = trimmed.rsplit('/').next().unwrap_or_default();

        match last.trim_end_matches(".html") {
            "gallery" => Self::Gallery,
            "albums" => Self::Albums,
            _ => Self::Home,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Gallery => "/gallery",
            Self::Albums => "/albums",
        }
    }
}

/// `category` wins over the short `c` form; blank values are ignored.
pub fn category_from_query(query: &str) -> Option<String> {
    let pairs = form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .map(|(key, value)| (key.into_owned(), value.trim().to_string()))
        .filter(|(_, value)| !value.is_empty())
        .collect::<Vec<_>>();

    [CATEGORY_PARAM, CATEGORY_SHORT_PARAM]
        .into_iter()
        .find_map(|wanted| {
            pairs
                .iter()
                .find(|(key, _)| key == wanted)
                .map(|(_, value)| value.clone())
        })
}

/// Active category for a page load, lowercased, defaulting to `all`.
pub fn initial_category(query: &str) -> String {
    category_from_query(query)
        .map(|value| value.to_lowercase())
        .unwrap_or_else(|| ALL_CATEGORY.to_string())
}

/// The current URL with its `category` parameter set, or removed for `all`. Other query
/// parameters are kept in order.
pub fn url_with_category(href: &str, category: &str) -> Option<String> {
    let mut url = Url::parse(href).ok()?;
    let kept = url
        .query_pairs()
        .filter(|(key, _)| key != CATEGORY_PARAM && key != CATEGORY_SHORT_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect::<Vec<_>>();

    url.set_query(None);
    if !kept.is_empty() || category != ALL_CATEGORY {
        let mut pairs = url.query_pairs_mut();
        pairs.extend_pairs(kept.iter());
        if category != ALL_CATEGORY {
            pairs.append_pair(CATEGORY_PARAM, category);
        }
    }

    Some(url.to_string())
}

pub fn gallery_href(category: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair(CATEGORY_PARAM, category)
        .finish();
    format!("{}?{query}", Page::Gallery.path())
}
