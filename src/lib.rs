//! tvmaze-agent - TVMaze metadata for media server libraries
//!
//! This library implements a metadata agent: the host media server calls
//! [`TvMazeAgent::search`] to find candidate shows for a library entry and
//! [`TvMazeAgent::update`] to fill in show, season and episode metadata from
//! the TVMaze database.

mod config;
mod host;
mod images;
mod language;
mod mapper;
mod metadata_retrieval;
mod scheme;
mod search;

pub use config::{AgentConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use host::{
    AirDate, CachedImage, EpisodeMetadata, ImageCache, ImageSet, ImageTier, LanguageMatcher,
    MediaEpisode, MediaSeason, MediaShow, Role, SearchCandidate, SearchResults, SeasonMetadata,
    ShowMetadata,
};
pub use images::{HttpImageFetcher, ImageFetchError, ImageFetcher};
pub use language::{AGENT_INFO, AgentInfo, IsoLanguageMatcher, SUPPORTED_LANGUAGES};
pub use mapper::{
    CastMappingError, FieldOutcome, FieldScope, MetadataMapper, MissingField, UpdateReport,
    map_cast,
};
pub use metadata_retrieval::{
    CastRecord, EpisodeRecord, ImageUrls, MetadataProvider, MetadataRetrievalError, Portrait,
    SeasonRecord, ShowHit, ShowRecord, TvMazeProvider,
};
pub use scheme::{SchemeToken, classify, find_calendar_date, find_numeric_scheme};
pub use search::{normalize_scores, premiere_year, resolve_candidates};

use thiserror::Error;
use tracing::{debug, warn};

/// Top-level error type for agent operations
#[derive(Debug, Error)]
pub enum AgentError {
    /// Error during metadata retrieval
    #[error("Metadata retrieval error: {0}")]
    MetadataRetrieval(#[from] MetadataRetrievalError),

    /// Error setting up image downloads
    #[error("Image fetch error: {0}")]
    ImageFetch(#[from] ImageFetchError),

    /// The host passed an identifier that is not a TVMaze show id
    #[error("Invalid TVMaze show id: {0:?}")]
    InvalidShowId(String),
}

/// The agent the host talks to
///
/// Bundles the remote source, the host's language matcher and the image
/// fetcher. All three are traits so tests and other hosts can substitute
/// their own.
pub struct TvMazeAgent<P, L, F> {
    provider: P,
    languages: L,
    fetcher: F,
}

impl TvMazeAgent<TvMazeProvider, IsoLanguageMatcher, HttpImageFetcher> {
    /// Creates an agent talking to TVMaze over HTTP with the given settings
    pub fn with_config(config: &AgentConfig) -> Result<Self, AgentError> {
        Ok(Self {
            provider: TvMazeProvider::with_config(config)?,
            languages: IsoLanguageMatcher,
            fetcher: HttpImageFetcher::with_config(config)?,
        })
    }
}

impl<P, L, F> TvMazeAgent<P, L, F>
where
    P: MetadataProvider,
    L: LanguageMatcher,
    F: ImageFetcher,
{
    /// Assembles an agent from its collaborators
    pub fn from_parts(provider: P, languages: L, fetcher: F) -> Self {
        Self {
            provider,
            languages,
            fetcher,
        }
    }

    /// Static description of this agent
    pub fn info(&self) -> &'static AgentInfo {
        &AGENT_INFO
    }

    /// The remote source this agent reads from
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Searches TVMaze for `media.name` and appends ranked candidates to
    /// `results`.
    ///
    /// `lang` is the language assigned to candidates whose own language is
    /// unknown. A failed search contributes no results.
    pub fn search<R>(&self, results: &mut R, media: &MediaShow, lang: &str, manual: bool)
    where
        R: SearchResults + ?Sized,
    {
        debug!(show = %media.name, lang, manual, "searching TVMaze");

        match resolve_candidates(&self.provider, &self.languages, &media.name, lang) {
            Ok(candidates) => {
                for candidate in candidates {
                    results.append(candidate);
                }
            }
            Err(e) => warn!(show = %media.name, error = %e, "show search failed"),
        }
    }

    /// Fills `metadata` for the seasons and episodes present in `media`.
    ///
    /// The show is identified by `metadata.id`. Fields TVMaze does not supply
    /// are cleared and listed in the returned report.
    pub fn update(
        &self,
        metadata: &mut ShowMetadata,
        media: &MediaShow,
        lang: &str,
        force: bool,
    ) -> Result<UpdateReport, AgentError> {
        debug!(id = %metadata.id, lang, force, "update called");
        MetadataMapper::new(&self.provider, &self.fetcher).update(metadata, media)
    }
}
