use crate::content::{parse_document, CategorySummary, ContentError};
use crate::logging::log_event;
use crate::media::kind_from_path;
use log::Level;
use serde_json::{json, Map, Value};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// URL prefix the image directory is published under.
const ASSET_URL_PREFIX: &str = "/assets/images";

/// Folders holding page artwork rather than portfolio work.
const SKIPPED_FOLDERS: &[&str] = &["about", "hero", "logos", "cover", "events"];

const MEDIA_EXTENSIONS: &[&str] = &["webp", "jpg", "jpeg", "png", "mp4"];

const FOLDER_SLUGS: &[(&str, &str)] = &[
    ("Wedding", "weddings"),
    ("Cinematic", "cinematics"),
    ("PrewedVideo", "pre-wedding"),
    ("BabyShower", "baby-shower"),
    ("Engagement", "engagement"),
    ("Haldi", "haldi"),
    ("Pre-Wedding", "pre-wedding"),
    ("Maternity", "maternity"),
    ("portraits", "portraits"),
];

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path} has no `portfolio.categories` list")]
    Shape { path: PathBuf },
    #[error("could not scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Invalid(#[from] ContentError),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub items: usize,
    pub categories: usize,
    pub added_categories: Vec<String>,
}

struct ScannedFolder {
    name: String,
    /// Path below the image root, `/`-separated.
    relative: String,
    files: Vec<String>,
}

pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.chars() {
        if ch.is_whitespace() || ch == '_' {
            pending_dash = true;
            continue;
        }
        if pending_dash {
            slug.push('-');
            pending_dash = false;
        }
        slug.extend(ch.to_lowercase());
    }

    slug.trim_matches('-').to_string()
}

fn folder_slug(folder: &str) -> String {
    FOLDER_SLUGS
        .iter()
        .find(|(name, _)| *name == folder)
        .map(|(_, slug)| slug.to_string())
        .unwrap_or_else(|| slugify(folder))
}

/// Capitalizes the first letter of every alphabetic run and lowercases the rest.
fn title_case(text: &str) -> String {
    let mut titled = String::with_capacity(text.len());
    let mut previous_alphabetic = false;

    for ch in text.chars() {
        if ch.is_alphabetic() && !previous_alphabetic {
            titled.extend(ch.to_uppercase());
        } else {
            titled.extend(ch.to_lowercase());
        }
        previous_alphabetic = ch.is_alphabetic();
    }

    titled
}

fn is_media_file(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, extension)| {
        MEDIA_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str())
    })
}

fn scan_error(path: &Path) -> impl FnOnce(io::Error) -> SyncError + '_ {
    move |source| SyncError::Scan {
        path: path.to_path_buf(),
        source,
    }
}

/// Depth-first walk in name order. Files directly under the root are ignored.
fn scan_folders(root: &Path) -> Result<Vec<ScannedFolder>, SyncError> {
    let mut folders = Vec::new();
    let mut pending = vec![(root.to_path_buf(), String::new())];

    while let Some((directory, relative)) = pending.pop() {
        let mut subdirectories = Vec::new();
        let mut files = Vec::new();

        for entry in fs::read_dir(&directory).map_err(scan_error(&directory))? {
            let entry = entry.map_err(scan_error(&directory))?;
            let file_type = entry.file_type().map_err(scan_error(&directory))?;
            let name = entry.file_name().to_string_lossy().to_string();

            if file_type.is_dir() {
                subdirectories.push(name);
            } else if file_type.is_file() {
                files.push(name);
            }
        }

        subdirectories.sort();
        for name in subdirectories.into_iter().rev() {
            let child_relative = if relative.is_empty() {
                name.clone()
            } else {
                format!("{relative}/{name}")
            };
            pending.push((directory.join(&name), child_relative));
        }

        if relative.is_empty() {
            continue;
        }

        files.sort();
        let name = relative
            .rsplit('/')
            .next()
            .unwrap_or(relative.as_str())
            .to_string();
        folders.push(ScannedFolder {
            name,
            relative,
            files,
        });
    }

    Ok(folders)
}

fn media_entry(id: usize, folder: &ScannedFolder, file: &str) -> Value {
    let is_video = kind_from_path(file).is_video();

    json!({
        "id": id,
        "title": format!("{} Session", title_case(&folder.name)),
        "type": if is_video { "video" } else { "image" },
        "src": format!("{ASSET_URL_PREFIX}/{}/{file}", folder.relative),
        "alt": format!("{} photography", folder.name),
        "aspectRatio": if is_video { "16/9" } else { "3/4" },
    })
}

fn read_data_file(path: &Path) -> Result<String, SyncError> {
    fs::read_to_string(path).map_err(|source| SyncError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Rebuilds `portfolio.images` from the folders under `image_dir`, adding any category that
/// is not listed yet. Every other field of the data file is kept as-is, in order.
pub fn sync_portfolio(image_dir: &Path, data_file: &Path) -> Result<SyncReport, SyncError> {
    let raw = read_data_file(data_file)?;
    let mut data: Value = serde_json::from_str(&raw).map_err(|source| SyncError::Parse {
        path: data_file.to_path_buf(),
        source,
    })?;

    let shape_error = || SyncError::Shape {
        path: data_file.to_path_buf(),
    };
    let portfolio = data
        .get_mut("portfolio")
        .and_then(Value::as_object_mut)
        .ok_or_else(shape_error)?;
    let categories = portfolio
        .get_mut("categories")
        .and_then(Value::as_array_mut)
        .ok_or_else(shape_error)?;

    let mut known_slugs = categories
        .iter()
        .filter_map(|category| category.get("slug").and_then(Value::as_str))
        .map(ToString::to_string)
        .collect::<Vec<_>>();

    let mut images: Map<String, Value> = Map::new();
    let mut report = SyncReport::default();

    for folder in scan_folders(image_dir)? {
        if SKIPPED_FOLDERS.contains(&folder.name.as_str()) {
            continue;
        }

        let slug = folder_slug(&folder.name);
        if !known_slugs.contains(&slug) {
            let name = title_case(&folder.name.replace(['-', '_'], " "));
            log_event(
                Level::Info,
                "sync_category_added",
                json!({ "folder": folder.name, "slug": slug, "name": name }),
            );
            categories.push(json!({ "id": slug, "name": name, "slug": slug }));
            known_slugs.push(slug.clone());
            report.added_categories.push(slug.clone());
        }

        let entries = images
            .entry(slug)
            .or_insert_with(|| Value::Array(Vec::new()));
        let Some(entries) = entries.as_array_mut() else {
            continue;
        };

        for file in &folder.files {
            if !is_media_file(file) {
                log_event(
                    Level::Debug,
                    "sync_skipped_file",
                    json!({ "folder": folder.relative, "file": file }),
                );
                continue;
            }

            entries.push(media_entry(entries.len() + 1, &folder, file));
            report.items += 1;
        }
    }

    report.categories = images.len();
    portfolio.insert("images".to_string(), Value::Object(images));

    let mut encoded = serde_json::to_string_pretty(&data).map_err(|source| SyncError::Parse {
        path: data_file.to_path_buf(),
        source,
    })?;
    encoded.push('\n');
    fs::write(data_file, encoded).map_err(|source| SyncError::Write {
        path: data_file.to_path_buf(),
        source,
    })?;

    log_event(
        Level::Info,
        "sync_complete",
        json!({
            "items": report.items,
            "categories": report.categories,
            "added_categories": report.added_categories,
        }),
    );

    Ok(report)
}

/// Loads the data file through the same model the site uses and summarizes it.
pub fn check_portfolio(data_file: &Path) -> Result<Vec<CategorySummary>, SyncError> {
    let document = parse_document(&read_data_file(data_file)?)?;
    let summary = document.summary();
    let previews = document.catalog(|_| 0).iter().filter(|entry| entry.preview).count();

    for category in &summary {
        log_event(
            Level::Info,
            "check_category",
            json!({
                "slug": category.slug,
                "items": category.items,
                "videos": category.videos,
                "listed": document.category_name(&category.slug).is_some(),
            }),
        );
    }
    log_event(
        Level::Info,
        "check_complete",
        json!({
            "categories": summary.len(),
            "items": summary.iter().map(|category| category.items).sum::<usize>(),
            "previews": previews,
        }),
    );

    Ok(summary)
}
