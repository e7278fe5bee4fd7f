/// TVMaze API response types for deserialization.
///
/// These structures mirror the JSON response format from the TVMaze API.
/// Every attribute TVMaze may send as `null` or leave out is an `Option`.
use serde::Deserialize;

/// A single hit from the `/search/shows` endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeSearchHit {
    /// Relevance score assigned by TVMaze for this query
    pub score: f64,
    /// The matched show
    pub show: TvMazeShow,
}

/// A show as returned by `/shows/{id}` and the search endpoints.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeShow {
    /// TVMaze show identifier
    pub id: u64,
    /// The name of the TV show
    pub name: String,
    /// Language name in English, e.g. "English" or "Japanese"
    pub language: Option<String>,
    pub genres: Option<Vec<String>>,
    /// Production status, e.g. "Running" or "Ended"
    pub status: Option<String>,
    /// Episode runtime in minutes
    pub runtime: Option<u32>,
    #[serde(rename = "averageRuntime")]
    pub average_runtime: Option<u32>,
    /// Premiere date as `YYYY-MM-DD`
    pub premiered: Option<String>,
    pub rating: Option<TvMazeRating>,
    pub network: Option<TvMazeChannel>,
    #[serde(rename = "webChannel")]
    pub web_channel: Option<TvMazeChannel>,
    pub image: Option<TvMazeImage>,
    /// Show summary in HTML format
    pub summary: Option<String>,
    /// Embedded resources (like cast) when requested with ?embed=
    #[serde(rename = "_embedded")]
    pub embedded: Option<TvMazeEmbedded>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TvMazeRating {
    pub average: Option<f64>,
}

/// A broadcast network or streaming web channel.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeChannel {
    pub name: Option<String>,
}

/// Image URLs per size class.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeImage {
    pub medium: Option<String>,
    pub original: Option<String>,
}

/// Embedded resources in a TVMaze show response.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeEmbedded {
    /// Cast list when embed=cast is used
    #[serde(default)]
    pub cast: Vec<TvMazeCastCredit>,
}

/// One cast credit, pairing a person with the character they play.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeCastCredit {
    pub person: TvMazePortrait,
    pub character: TvMazePortrait,
}

/// A person or character entry of a cast credit.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazePortrait {
    pub name: Option<String>,
    pub image: Option<TvMazeImage>,
}

/// A season from `/shows/{id}/seasons`.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeSeason {
    pub id: u64,
    pub number: u32,
    pub summary: Option<String>,
    pub image: Option<TvMazeImage>,
}

/// A single episode from the TVMaze API.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeEpisode {
    pub id: u64,
    /// Season number
    pub season: u32,
    /// Episode number within the season (null for specials)
    pub number: Option<u32>,
    /// Episode title (may be null for episodes without a title)
    pub name: Option<String>,
    /// Episode summary in HTML format (may be null)
    pub summary: Option<String>,
    /// Air date as `YYYY-MM-DD`, empty when unknown
    pub airdate: Option<String>,
    pub runtime: Option<u32>,
    pub rating: Option<TvMazeRating>,
    pub image: Option<TvMazeImage>,
}
