//! Metadata mapping
//!
//! Copies remote show, season and episode records into the host's metadata
//! graph. Each field is mapped on its own: a field the remote source does not
//! supply becomes an explicit absence in the host structure instead of
//! keeping the value of an earlier update, and is listed in the
//! [`UpdateReport`]. Only seasons and episodes the host already knows about
//! are filled in.

use crate::AgentError;
use crate::host::{AirDate, EpisodeMetadata, MediaShow, Role, SeasonMetadata, ShowMetadata};
use crate::images::{self, ImageFetchError, ImageFetcher};
use crate::metadata_retrieval::{
    CastRecord, EpisodeRecord, ImageUrls, MetadataProvider, MetadataRetrievalError, SeasonRecord,
    ShowRecord,
};
use crate::scheme::{self, SchemeToken};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Entity a mapped field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldScope {
    Show,
    Episode { season: u32, episode: u32 },
}

impl fmt::Display for FieldScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldScope::Show => write!(f, "show"),
            FieldScope::Episode { season, episode } => {
                write!(f, "episode S{season:02}E{episode:02}")
            }
        }
    }
}

/// A field the remote record did not supply
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} missing for {scope}")]
pub struct MissingField {
    pub scope: FieldScope,
    pub field: &'static str,
}

/// A cast entry that could not be turned into a role
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastMappingError {
    #[error("cast entry {index} has no actor name")]
    MissingActorName { index: usize },

    #[error("cast entry {index} has no counterpart")]
    Unpaired { index: usize },
}

/// Outcome of mapping one field
pub type FieldOutcome<T> = Result<T, MissingField>;

/// What an update did, and what it had to leave out
#[derive(Debug, Default)]
pub struct UpdateReport {
    /// Fields set to absence because the remote record lacked them
    pub missing_fields: Vec<MissingField>,
    /// Cast entries that were skipped
    pub cast_failures: Vec<CastMappingError>,
    /// Show and season posters that could not be downloaded
    pub poster_failures: Vec<ImageFetchError>,
    /// Episode thumbnails that could not be downloaded
    pub skipped_thumbnails: usize,
    /// `(season, episode)` pairs that received remote metadata
    pub updated_episodes: Vec<(u32, u32)>,
    /// `(season, episode)` pairs left untouched
    pub unresolved_episodes: Vec<(u32, u32)>,
}

impl UpdateReport {
    /// Unwraps a field outcome, recording a miss as absence.
    fn settle<T>(&mut self, outcome: FieldOutcome<T>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(missing) => {
                debug!(%missing, "field not supplied");
                self.missing_fields.push(missing);
                None
            }
        }
    }
}

fn require<T>(scope: FieldScope, field: &'static str, value: Option<T>) -> FieldOutcome<T> {
    value.ok_or(MissingField { scope, field })
}

/// Studio precedence: broadcast network, then web channel.
pub fn studio(show: &ShowRecord) -> Option<String> {
    show.network.clone().or_else(|| show.web_channel.clone())
}

fn portrait_url(image: Option<&ImageUrls>) -> Option<String> {
    image.and_then(|i| i.original.clone().or_else(|| i.medium.clone()))
}

/// Pairs people and characters positionally into roles.
///
/// The character's picture is preferred over the actor's. Entries without an
/// actor name, and entries without a counterpart, are reported and skipped.
pub fn map_cast(cast: &CastRecord) -> (Vec<Role>, Vec<CastMappingError>) {
    let mut roles = Vec::new();
    let mut failures = Vec::new();

    for (index, (person, character)) in cast.people.iter().zip(&cast.characters).enumerate() {
        let Some(actor) = person.name.clone().filter(|n| !n.is_empty()) else {
            failures.push(CastMappingError::MissingActorName { index });
            continue;
        };

        roles.push(Role {
            actor,
            role: character.name.clone(),
            photo: portrait_url(character.image.as_ref())
                .or_else(|| portrait_url(person.image.as_ref())),
        });
    }

    let paired = cast.people.len().min(cast.characters.len());
    let total = cast.people.len().max(cast.characters.len());
    failures.extend((paired..total).map(|index| CastMappingError::Unpaired { index }));

    (roles, failures)
}

/// Show-level fields extracted from one remote record
struct ShowFields {
    title: String,
    summary: FieldOutcome<String>,
    originally_available_at: FieldOutcome<AirDate>,
    duration: FieldOutcome<u32>,
    rating: FieldOutcome<f64>,
    content_rating: FieldOutcome<String>,
    genres: FieldOutcome<Vec<String>>,
    studio: FieldOutcome<String>,
    roles: FieldOutcome<Vec<Role>>,
    cast_failures: Vec<CastMappingError>,
}

impl ShowFields {
    fn from_record(show: &ShowRecord) -> Self {
        let scope = FieldScope::Show;
        let (roles, cast_failures) = match &show.cast {
            Some(cast) => {
                let (roles, failures) = map_cast(cast);
                (Ok(roles), failures)
            }
            None => (require(scope, "cast", None), Vec::new()),
        };

        Self {
            title: show.name.clone(),
            summary: require(scope, "summary", show.summary.clone()),
            originally_available_at: require(
                scope,
                "originally_available_at",
                show.premiered.as_deref().map(AirDate::parse),
            ),
            duration: require(scope, "duration", show.runtime),
            rating: require(scope, "rating", show.rating),
            content_rating: require(scope, "content_rating", show.status.clone()),
            genres: require(scope, "genres", show.genres.clone()),
            studio: require(scope, "studio", studio(show)),
            roles,
            cast_failures,
        }
    }

    fn apply(self, metadata: &mut ShowMetadata, report: &mut UpdateReport) {
        metadata.title = Some(self.title);
        metadata.summary = report.settle(self.summary);
        metadata.originally_available_at = report.settle(self.originally_available_at);
        metadata.duration = report.settle(self.duration);
        metadata.rating = report.settle(self.rating);
        metadata.content_rating = report.settle(self.content_rating);
        metadata.genres = report.settle(self.genres).unwrap_or_default();
        metadata.studio = report.settle(self.studio);
        metadata.roles = report.settle(self.roles).unwrap_or_default();
        report.cast_failures.extend(self.cast_failures);
    }
}

/// Episode-level fields extracted from one remote record
struct EpisodeFields {
    season: u32,
    title: FieldOutcome<String>,
    summary: FieldOutcome<String>,
    originally_available_at: FieldOutcome<AirDate>,
    duration: FieldOutcome<u32>,
    rating: FieldOutcome<f64>,
}

impl EpisodeFields {
    fn from_record(scope: FieldScope, episode: &EpisodeRecord) -> Self {
        Self {
            season: episode.season,
            title: require(scope, "title", episode.name.clone()),
            summary: require(scope, "summary", episode.summary.clone()),
            originally_available_at: require(
                scope,
                "originally_available_at",
                episode.airdate.as_deref().map(AirDate::parse),
            ),
            duration: require(scope, "duration", episode.runtime),
            rating: require(scope, "rating", episode.rating),
        }
    }

    fn apply(self, metadata: &mut EpisodeMetadata, report: &mut UpdateReport) {
        metadata.season = Some(self.season);
        metadata.title = report.settle(self.title);
        metadata.summary = report.settle(self.summary);
        metadata.originally_available_at = report.settle(self.originally_available_at);
        metadata.duration = report.settle(self.duration);
        metadata.rating = report.settle(self.rating);
    }
}

/// Fills a host metadata graph from the remote source
pub struct MetadataMapper<'a, P, F> {
    provider: &'a P,
    fetcher: &'a F,
}

impl<'a, P, F> MetadataMapper<'a, P, F>
where
    P: MetadataProvider,
    F: ImageFetcher,
{
    pub fn new(provider: &'a P, fetcher: &'a F) -> Self {
        Self { provider, fetcher }
    }

    /// Updates `metadata` for the show identified by `metadata.id`.
    ///
    /// Fails only when the show itself cannot be loaded; in that case
    /// `metadata` is left untouched.
    pub fn update(
        &self,
        metadata: &mut ShowMetadata,
        media: &MediaShow,
    ) -> Result<UpdateReport, AgentError> {
        let show_id: u64 = metadata
            .id
            .trim()
            .parse()
            .map_err(|_| AgentError::InvalidShowId(metadata.id.clone()))?;

        let show = self
            .provider
            .show(show_id)?
            .ok_or_else(|| MetadataRetrievalError::SeriesNotFound(show_id.to_string()))?;

        // None when the listing failed, as opposed to a show without seasons
        let seasons = match self.provider.seasons(show_id) {
            Ok(seasons) => Some(seasons),
            Err(e) => {
                warn!(show_id, error = %e, "could not list seasons, keeping season summaries");
                None
            }
        };

        info!(show_id, name = %show.name, "updating show metadata");
        let mut report = UpdateReport::default();

        ShowFields::from_record(&show).apply(metadata, &mut report);

        if let Some(image) = &show.image {
            let failures = images::acquire(&mut metadata.posters, self.fetcher, image);
            self.record_poster_failures(&mut report, failures);
        }

        for (&season_num, media_season) in &media.seasons {
            let record = seasons
                .as_deref()
                .map(|list| list.iter().find(|s| s.number == season_num));
            let season = metadata.seasons.entry(season_num).or_default();
            self.update_season(season, record, &show, &mut report);

            for (&episode_num, media_episode) in &media_season.episodes {
                let episode = season.episodes.entry(episode_num).or_default();
                let file_name = media_episode.file_name().unwrap_or_default();

                match self.resolve_episode(show_id, season_num, episode_num, file_name) {
                    Ok(Some(record)) => {
                        self.update_episode(episode, &record, season_num, episode_num, &mut report);
                        report.updated_episodes.push((season_num, episode_num));
                    }
                    Ok(None) => {
                        debug!(
                            season = season_num,
                            episode = episode_num,
                            file_name,
                            "episode left unresolved"
                        );
                        report.unresolved_episodes.push((season_num, episode_num));
                    }
                    Err(e) => {
                        warn!(
                            season = season_num,
                            episode = episode_num,
                            error = %e,
                            "episode lookup failed"
                        );
                        report.unresolved_episodes.push((season_num, episode_num));
                    }
                }
            }
        }

        Ok(report)
    }

    /// `listing` is `None` when the season list could not be retrieved; the
    /// summary is then left as it was.
    fn update_season(
        &self,
        season: &mut SeasonMetadata,
        listing: Option<Option<&SeasonRecord>>,
        show: &ShowRecord,
        report: &mut UpdateReport,
    ) {
        if let Some(record) = listing {
            season.summary = record.and_then(|r| r.summary.clone());
        }

        let record = listing.flatten();
        let image = record.and_then(|r| r.image.as_ref()).or(show.image.as_ref());

        if let Some(image) = image {
            let failures = images::acquire(&mut season.posters, self.fetcher, image);
            self.record_poster_failures(report, failures);
        }
    }

    fn update_episode(
        &self,
        episode: &mut EpisodeMetadata,
        record: &EpisodeRecord,
        season_num: u32,
        episode_num: u32,
        report: &mut UpdateReport,
    ) {
        let scope = FieldScope::Episode {
            season: season_num,
            episode: episode_num,
        };
        EpisodeFields::from_record(scope, record).apply(episode, report);

        if let Some(image) = &record.image {
            // TVMaze lacks thumbnails for many shows
            for failure in images::acquire(&mut episode.thumbs, self.fetcher, image) {
                debug!(error = %failure, "skipping episode thumbnail");
                report.skipped_thumbnails += 1;
            }
        }
    }

    /// Looks up the remote episode a media file refers to.
    ///
    /// A numeric scheme is resolved through the host's own season and episode
    /// numbers; a date scheme takes the first episode aired on that day.
    fn resolve_episode(
        &self,
        show_id: u64,
        season_num: u32,
        episode_num: u32,
        file_name: &str,
    ) -> Result<Option<EpisodeRecord>, MetadataRetrievalError> {
        match scheme::classify(file_name) {
            Some(SchemeToken::Numeric { .. }) => {
                debug!(file_name, "number based episode scheme");
                self.provider.episode_by_number(show_id, season_num, episode_num)
            }
            Some(SchemeToken::Date(date)) => {
                debug!(file_name, %date, "date based episode scheme");
                Ok(self
                    .provider
                    .episodes_by_date(show_id, date)?
                    .into_iter()
                    .next())
            }
            None => Ok(None),
        }
    }

    fn record_poster_failures(&self, report: &mut UpdateReport, failures: Vec<ImageFetchError>) {
        for failure in failures {
            warn!(error = %failure, "poster download failed");
            report.poster_failures.push(failure);
        }
    }
}
