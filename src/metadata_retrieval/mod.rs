/// Data structures and traits for TV show metadata retrieval.
///
/// This module provides read-only records for shows, seasons, episodes and
/// cast as the remote source reports them, as well as the trait implemented
/// by metadata providers.
mod tvmaze;
mod tvmaze_types;

pub use tvmaze::TvMazeProvider;

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during metadata retrieval operations.
#[derive(Debug, Error)]
pub enum MetadataRetrievalError {
    /// Request to the metadata provider failed
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Failed to parse the provider's JSON response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// The requested series was not found
    #[error("Series not found: {0}")]
    SeriesNotFound(String),

    /// The API returned invalid or unexpected data
    #[error("API returned invalid data: {0}")]
    InvalidData(String),
}

/// Image URLs of one entity, per size class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageUrls {
    /// Medium-sized rendition, used for previews
    pub medium: Option<String>,
    /// Original upload, used as the full-size image
    pub original: Option<String>,
}

impl ImageUrls {
    /// Returns true when neither size class carries a URL.
    pub fn is_empty(&self) -> bool {
        self.medium.is_none() && self.original.is_none()
    }
}

/// A show returned by a search, together with its raw relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowHit {
    pub id: u64,
    pub name: String,
    /// Language name as reported by the remote source, e.g. "English"
    pub language: Option<String>,
    /// Premiere date string, usually `YYYY-MM-DD`
    pub premiered: Option<String>,
    /// Raw relevance score, only comparable within one result set
    pub score: f64,
}

/// Represents a complete TV show.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShowRecord {
    pub id: u64,
    /// The name of the TV show
    pub name: String,
    /// Plain-text summary
    pub summary: Option<String>,
    pub premiered: Option<String>,
    /// Runtime in minutes
    pub runtime: Option<u32>,
    pub rating: Option<f64>,
    pub status: Option<String>,
    pub genres: Option<Vec<String>>,
    /// Broadcast network name
    pub network: Option<String>,
    /// Streaming service name, for web-only shows
    pub web_channel: Option<String>,
    pub image: Option<ImageUrls>,
    /// Cast, present when the provider embedded it in the show lookup
    pub cast: Option<CastRecord>,
}

/// Cast of a show as two parallel sequences.
///
/// `people[i]` plays `characters[i]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CastRecord {
    pub people: Vec<Portrait>,
    pub characters: Vec<Portrait>,
}

/// A person or character with an optional picture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portrait {
    pub name: Option<String>,
    pub image: Option<ImageUrls>,
}

/// Represents a season of a TV show.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonRecord {
    pub id: u64,
    /// The season number
    pub number: u32,
    pub summary: Option<String>,
    pub image: Option<ImageUrls>,
}

/// Represents a single episode of a TV show.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeRecord {
    pub id: u64,
    /// The season number this episode belongs to
    pub season: u32,
    /// The episode number within the season, absent for specials
    pub number: Option<u32>,
    /// The episode title
    pub name: Option<String>,
    /// Plain-text summary
    pub summary: Option<String>,
    /// Air date as sent by the remote source
    pub airdate: Option<String>,
    /// Runtime in minutes
    pub runtime: Option<u32>,
    pub rating: Option<f64>,
    pub image: Option<ImageUrls>,
}

/// Trait for metadata providers that can fetch TV show information.
///
/// Every lookup is read-only. A lookup that finds nothing returns `Ok(None)`
/// or an empty list; only transport and decoding problems are errors.
pub trait MetadataProvider {
    /// Searches shows by free-text name.
    fn search_shows(&self, query: &str) -> Result<Vec<ShowHit>, MetadataRetrievalError>;

    /// Fetches a show by identifier, with its cast embedded.
    fn show(&self, show_id: u64) -> Result<Option<ShowRecord>, MetadataRetrievalError>;

    /// Lists the seasons of a show.
    fn seasons(&self, show_id: u64) -> Result<Vec<SeasonRecord>, MetadataRetrievalError>;

    /// Fetches one episode by season and episode number.
    fn episode_by_number(
        &self,
        show_id: u64,
        season: u32,
        number: u32,
    ) -> Result<Option<EpisodeRecord>, MetadataRetrievalError>;

    /// Lists the episodes that aired on `date`, in response order.
    fn episodes_by_date(
        &self,
        show_id: u64,
        date: NaiveDate,
    ) -> Result<Vec<EpisodeRecord>, MetadataRetrievalError>;

    /// Lists every episode of a show.
    fn episodes(&self, show_id: u64) -> Result<Vec<EpisodeRecord>, MetadataRetrievalError>;
}

impl<P: MetadataProvider + ?Sized> MetadataProvider for &P {
    fn search_shows(&self, query: &str) -> Result<Vec<ShowHit>, MetadataRetrievalError> {
        (**self).search_shows(query)
    }

    fn show(&self, show_id: u64) -> Result<Option<ShowRecord>, MetadataRetrievalError> {
        (**self).show(show_id)
    }

    fn seasons(&self, show_id: u64) -> Result<Vec<SeasonRecord>, MetadataRetrievalError> {
        (**self).seasons(show_id)
    }

    fn episode_by_number(
        &self,
        show_id: u64,
        season: u32,
        number: u32,
    ) -> Result<Option<EpisodeRecord>, MetadataRetrievalError> {
        (**self).episode_by_number(show_id, season, number)
    }

    fn episodes_by_date(
        &self,
        show_id: u64,
        date: NaiveDate,
    ) -> Result<Vec<EpisodeRecord>, MetadataRetrievalError> {
        (**self).episodes_by_date(show_id, date)
    }

    fn episodes(&self, show_id: u64) -> Result<Vec<EpisodeRecord>, MetadataRetrievalError> {
        (**self).episodes(show_id)
    }
}
