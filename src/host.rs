//! Host object model
//!
//! The media server owns these structures and hands them to the agent on
//! every call. `MediaShow` is the host's file-driven view of a show (which
//! seasons and episodes exist on disk), `ShowMetadata` is the metadata graph
//! the agent fills in. The capability traits are the only way the agent
//! reaches back into the host.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A show as the host knows it from the files on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaShow {
    /// Show name the host derived from the folder or file names
    pub name: String,
    /// Seasons keyed by season number
    pub seasons: BTreeMap<u32, MediaSeason>,
}

/// A season as the host knows it from the files on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaSeason {
    /// Episodes keyed by episode number
    pub episodes: BTreeMap<u32, MediaEpisode>,
}

/// An episode with the media files backing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaEpisode {
    pub parts: Vec<PathBuf>,
}

impl MediaEpisode {
    /// Bare file name of the first media part, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.parts
            .first()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
    }
}

impl MediaShow {
    /// Creates an empty media tree for the given show name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            seasons: BTreeMap::new(),
        }
    }

    /// Registers a media file as season `season`, episode `episode`.
    pub fn add_episode_file(&mut self, season: u32, episode: u32, path: impl AsRef<Path>) {
        self.seasons
            .entry(season)
            .or_default()
            .episodes
            .entry(episode)
            .or_default()
            .parts
            .push(path.as_ref().to_path_buf());
    }
}

/// Cache tier an image is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageTier {
    /// Downscaled preview rendition
    Preview,
    /// Full resolution original
    Full,
}

/// Binary image content held by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedImage {
    pub tier: ImageTier,
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// Put-if-absent image store of one metadata entity, keyed by source URL.
pub trait ImageCache {
    /// Returns true if an image from `url` is already stored.
    fn contains(&self, url: &str) -> bool;

    /// Stores an image under `url`.
    fn put(&mut self, url: String, image: CachedImage);
}

/// Image store backed by an ordered map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ImageSet {
    images: BTreeMap<String, CachedImage>,
}

impl ImageSet {
    pub fn get(&self, url: &str) -> Option<&CachedImage> {
        self.images.get(url)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Source URLs of all stored images, in order.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.images.keys().map(String::as_str)
    }
}

impl ImageCache for ImageSet {
    fn contains(&self, url: &str) -> bool {
        self.images.contains_key(url)
    }

    fn put(&mut self, url: String, image: CachedImage) {
        self.images.insert(url, image);
    }
}

/// Air date as stored by the host.
///
/// Dates in strict `YYYY-MM-DD` form are parsed; anything else the remote
/// source sends is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AirDate {
    Date(NaiveDate),
    Raw(String),
}

impl AirDate {
    /// Parses `value` as `YYYY-MM-DD`, falling back to the raw string.
    pub fn parse(value: &str) -> Self {
        match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
            Ok(date) => AirDate::Date(date),
            Err(_) => AirDate::Raw(value.to_string()),
        }
    }
}

/// One cast entry of a show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    /// Actor name
    pub actor: String,
    /// Character name
    pub role: Option<String>,
    /// Portrait URL, the character's picture when there is one
    pub photo: Option<String>,
}

/// Show-level metadata owned by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShowMetadata {
    /// Remote show identifier chosen from the search results
    pub id: String,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub originally_available_at: Option<AirDate>,
    /// Runtime in minutes
    pub duration: Option<u32>,
    pub rating: Option<f64>,
    /// Production status label, e.g. "Running"
    pub content_rating: Option<String>,
    pub genres: Vec<String>,
    pub studio: Option<String>,
    pub roles: Vec<Role>,
    pub posters: ImageSet,
    pub seasons: BTreeMap<u32, SeasonMetadata>,
}

impl ShowMetadata {
    /// Creates empty metadata for the remote show `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// Season-level metadata owned by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeasonMetadata {
    pub summary: Option<String>,
    pub posters: ImageSet,
    pub episodes: BTreeMap<u32, EpisodeMetadata>,
}

/// Episode-level metadata owned by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EpisodeMetadata {
    /// Season number reported by the remote source
    pub season: Option<u32>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub originally_available_at: Option<AirDate>,
    /// Runtime in minutes
    pub duration: Option<u32>,
    pub rating: Option<f64>,
    pub thumbs: ImageSet,
}

/// A ranked search result handed back to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchCandidate {
    /// Remote show identifier
    pub id: String,
    pub name: String,
    pub year: Option<i32>,
    /// Normalized language code
    pub lang: String,
    /// Relevance in `1..=100`
    pub score: u8,
}

/// Collector the host provides for search results.
pub trait SearchResults {
    fn append(&mut self, candidate: SearchCandidate);
}

impl SearchResults for Vec<SearchCandidate> {
    fn append(&mut self, candidate: SearchCandidate) {
        self.push(candidate);
    }
}

/// Host capability resolving a free-text language name to a language code.
pub trait LanguageMatcher {
    /// Returns the code for `name`, or `None` if the name is not recognized.
    fn match_language(&self, name: &str) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air_date_strict_parse() {
        assert_eq!(
            AirDate::parse("2011-04-17"),
            AirDate::Date(NaiveDate::from_ymd_opt(2011, 4, 17).unwrap())
        );
    }

    #[test]
    fn test_air_date_passes_through_other_formats() {
        assert_eq!(
            AirDate::parse("17.04.2011"),
            AirDate::Raw("17.04.2011".to_string())
        );
        assert_eq!(AirDate::parse("2011"), AirDate::Raw("2011".to_string()));
    }

    #[test]
    fn test_media_episode_file_name() {
        let mut media = MediaShow::new("Show");
        media.add_episode_file(1, 2, "/tv/Show/Season 1/Show.S01E02.mkv");

        let episode = &media.seasons[&1].episodes[&2];
        assert_eq!(episode.file_name(), Some("Show.S01E02.mkv"));
        assert_eq!(MediaEpisode::default().file_name(), None);
    }

    #[test]
    fn test_image_set_put_and_contains() {
        let mut set = ImageSet::default();
        assert!(!set.contains("https://img/a.jpg"));

        set.put(
            "https://img/a.jpg".to_string(),
            CachedImage {
                tier: ImageTier::Preview,
                data: vec![1, 2, 3],
            },
        );

        assert!(set.contains("https://img/a.jpg"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("https://img/a.jpg").unwrap().tier, ImageTier::Preview);
    }
}
