/// TVMaze metadata provider implementation.
use super::tvmaze_types::{
    TvMazeCastCredit, TvMazeEpisode, TvMazeImage, TvMazePortrait, TvMazeSearchHit, TvMazeSeason,
    TvMazeShow,
};
use super::{
    CastRecord, EpisodeRecord, ImageUrls, MetadataProvider, MetadataRetrievalError, Portrait,
    SeasonRecord, ShowHit, ShowRecord,
};
use crate::config::AgentConfig;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Metadata provider for the TVMaze API.
///
/// This provider fetches show, season and episode information from
/// https://api.tvmaze.com (or the base URL given in the configuration).
pub struct TvMazeProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl TvMazeProvider {
    /// Creates a new TVMaze provider instance with default settings.
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: crate::config::DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Creates a provider using the endpoint, user agent and timeout of `config`.
    pub fn with_config(config: &AgentConfig) -> Result<Self, MetadataRetrievalError> {
        let client = config
            .http_client()
            .map_err(|e| MetadataRetrievalError::RequestError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Performs a GET request and decodes the JSON body.
    ///
    /// A 404 answer is reported as `Ok(None)`.
    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, MetadataRetrievalError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?query, "requesting TVMaze resource");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .map_err(|e| MetadataRetrievalError::RequestError(e.to_string()))?;

        if response.status() == 404 {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(MetadataRetrievalError::RequestError(format!(
                "HTTP {} {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json()
            .map(Some)
            .map_err(|e| MetadataRetrievalError::ParseError(e.to_string()))
    }

    /// Reduces a TVMaze HTML summary to trimmed plain text.
    fn plain_text(html: Option<String>) -> Option<String> {
        html.map(|s| nanohtml2text::html2text(&s).trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn convert_image(image: Option<TvMazeImage>) -> Option<ImageUrls> {
        image
            .map(|i| ImageUrls {
                medium: i.medium,
                original: i.original,
            })
            .filter(|urls| !urls.is_empty())
    }

    fn convert_portrait(portrait: TvMazePortrait) -> Portrait {
        Portrait {
            name: portrait.name,
            image: Self::convert_image(portrait.image),
        }
    }

    /// Splits cast credits into the parallel people/characters sequences.
    fn convert_cast(credits: Vec<TvMazeCastCredit>) -> CastRecord {
        let mut cast = CastRecord::default();
        for credit in credits {
            cast.people.push(Self::convert_portrait(credit.person));
            cast.characters.push(Self::convert_portrait(credit.character));
        }
        cast
    }

    /// Converts TVMaze show data to our internal ShowRecord structure.
    fn convert_show(show: TvMazeShow) -> ShowRecord {
        ShowRecord {
            id: show.id,
            name: show.name,
            summary: Self::plain_text(show.summary),
            premiered: show.premiered,
            runtime: show.runtime.or(show.average_runtime),
            rating: show.rating.and_then(|r| r.average),
            status: show.status,
            genres: show.genres,
            network: show.network.and_then(|n| n.name),
            web_channel: show.web_channel.and_then(|c| c.name),
            image: Self::convert_image(show.image),
            cast: show.embedded.map(|e| Self::convert_cast(e.cast)),
        }
    }

    fn convert_season(season: TvMazeSeason) -> SeasonRecord {
        SeasonRecord {
            id: season.id,
            number: season.number,
            summary: Self::plain_text(season.summary),
            image: Self::convert_image(season.image),
        }
    }

    /// Rejects an episode that is not the one asked for.
    fn check_episode_number(
        episode: TvMazeEpisode,
        season: u32,
        number: u32,
    ) -> Result<TvMazeEpisode, MetadataRetrievalError> {
        if episode.season != season || episode.number != Some(number) {
            return Err(MetadataRetrievalError::InvalidData(format!(
                "asked for S{season:02}E{number:02}, got episode {} (season {}, number {:?})",
                episode.id, episode.season, episode.number
            )));
        }
        Ok(episode)
    }

    /// Converts a TVMaze episode to our internal EpisodeRecord structure.
    fn convert_episode(episode: TvMazeEpisode) -> EpisodeRecord {
        EpisodeRecord {
            id: episode.id,
            season: episode.season,
            number: episode.number,
            name: episode.name,
            summary: Self::plain_text(episode.summary),
            // TVMaze sends an empty string for unknown air dates
            airdate: episode.airdate.filter(|d| !d.is_empty()),
            runtime: episode.runtime,
            rating: episode.rating.and_then(|r| r.average),
            image: Self::convert_image(episode.image),
        }
    }
}

impl Default for TvMazeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataProvider for TvMazeProvider {
    fn search_shows(&self, query: &str) -> Result<Vec<ShowHit>, MetadataRetrievalError> {
        let hits: Vec<TvMazeSearchHit> = self
            .get_json("/search/shows", &[("q", query)])?
            .unwrap_or_default();

        Ok(hits
            .into_iter()
            .map(|hit| ShowHit {
                id: hit.show.id,
                name: hit.show.name,
                language: hit.show.language,
                premiered: hit.show.premiered,
                score: hit.score,
            })
            .collect())
    }

    fn show(&self, show_id: u64) -> Result<Option<ShowRecord>, MetadataRetrievalError> {
        let show: Option<TvMazeShow> =
            self.get_json(&format!("/shows/{show_id}"), &[("embed", "cast")])?;
        Ok(show.map(Self::convert_show))
    }

    fn seasons(&self, show_id: u64) -> Result<Vec<SeasonRecord>, MetadataRetrievalError> {
        let seasons: Vec<TvMazeSeason> = self
            .get_json(&format!("/shows/{show_id}/seasons"), &[])?
            .unwrap_or_default();
        Ok(seasons.into_iter().map(Self::convert_season).collect())
    }

    fn episode_by_number(
        &self,
        show_id: u64,
        season: u32,
        number: u32,
    ) -> Result<Option<EpisodeRecord>, MetadataRetrievalError> {
        let episode: Option<TvMazeEpisode> = self.get_json(
            &format!("/shows/{show_id}/episodebynumber"),
            &[
                ("season", season.to_string().as_str()),
                ("number", number.to_string().as_str()),
            ],
        )?;
        episode
            .map(|e| Self::check_episode_number(e, season, number))
            .transpose()
            .map(|e| e.map(Self::convert_episode))
    }

    fn episodes_by_date(
        &self,
        show_id: u64,
        date: NaiveDate,
    ) -> Result<Vec<EpisodeRecord>, MetadataRetrievalError> {
        let date = date.format("%Y-%m-%d").to_string();
        let episodes: Vec<TvMazeEpisode> = self
            .get_json(
                &format!("/shows/{show_id}/episodesbydate"),
                &[("date", date.as_str())],
            )?
            .unwrap_or_default();
        Ok(episodes.into_iter().map(Self::convert_episode).collect())
    }

    fn episodes(&self, show_id: u64) -> Result<Vec<EpisodeRecord>, MetadataRetrievalError> {
        let episodes: Vec<TvMazeEpisode> = self
            .get_json(&format!("/shows/{show_id}/episodes"), &[])?
            .unwrap_or_default();
        Ok(episodes.into_iter().map(Self::convert_episode).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_JSON: &str = r#"{
        "id": 82,
        "name": "Game of Thrones",
        "language": "English",
        "genres": ["Drama", "Adventure", "Fantasy"],
        "status": "Ended",
        "runtime": 60,
        "averageRuntime": 61,
        "premiered": "2011-04-17",
        "rating": {"average": 8.9},
        "network": {"id": 8, "name": "HBO"},
        "webChannel": null,
        "image": {
            "medium": "https://static.tvmaze.com/uploads/images/medium_portrait/190/476117.jpg",
            "original": "https://static.tvmaze.com/uploads/images/original_untouched/190/476117.jpg"
        },
        "summary": "<p>Based on the bestselling book series.</p>",
        "_embedded": {
            "cast": [
                {
                    "person": {"id": 14075, "name": "Kit Harington", "image": {"medium": "https://img/kit_m.jpg", "original": "https://img/kit_o.jpg"}},
                    "character": {"id": 14, "name": "Jon Snow", "image": null}
                }
            ]
        }
    }"#;

    #[test]
    fn test_convert_show() {
        let show: TvMazeShow = serde_json::from_str(SHOW_JSON).unwrap();
        let record = TvMazeProvider::convert_show(show);

        assert_eq!(record.id, 82);
        assert_eq!(record.name, "Game of Thrones");
        assert_eq!(record.runtime, Some(60));
        assert_eq!(record.rating, Some(8.9));
        assert_eq!(record.network.as_deref(), Some("HBO"));
        assert_eq!(record.web_channel, None);
        assert_eq!(
            record.summary.as_deref(),
            Some("Based on the bestselling book series.")
        );

        let cast = record.cast.unwrap();
        assert_eq!(cast.people.len(), 1);
        assert_eq!(cast.people[0].name.as_deref(), Some("Kit Harington"));
        assert_eq!(cast.characters[0].name.as_deref(), Some("Jon Snow"));
        assert_eq!(cast.characters[0].image, None);
    }

    #[test]
    fn test_convert_show_with_null_fields() {
        let json = r#"{
            "id": 1,
            "name": "Sparse",
            "language": null,
            "genres": [],
            "status": null,
            "runtime": null,
            "averageRuntime": 30,
            "premiered": null,
            "rating": {"average": null},
            "network": null,
            "webChannel": {"id": 1, "name": "Netflix"},
            "image": null,
            "summary": null
        }"#;
        let show: TvMazeShow = serde_json::from_str(json).unwrap();
        let record = TvMazeProvider::convert_show(show);

        assert_eq!(record.runtime, Some(30));
        assert_eq!(record.rating, None);
        assert_eq!(record.web_channel.as_deref(), Some("Netflix"));
        assert_eq!(record.image, None);
        assert_eq!(record.summary, None);
        assert_eq!(record.cast, None);
    }

    #[test]
    fn test_convert_episode_empty_airdate() {
        let json = r#"{
            "id": 4952,
            "season": 1,
            "number": 3,
            "name": "Lord Snow",
            "summary": "<p>Jon begins his training.</p>",
            "airdate": "",
            "runtime": 60,
            "rating": {"average": 8.1},
            "image": {"medium": "https://img/e_m.jpg", "original": null}
        }"#;
        let episode: TvMazeEpisode = serde_json::from_str(json).unwrap();
        let record = TvMazeProvider::convert_episode(episode);

        assert_eq!(record.number, Some(3));
        assert_eq!(record.airdate, None);
        assert_eq!(record.summary.as_deref(), Some("Jon begins his training."));
        assert_eq!(
            record.image,
            Some(ImageUrls {
                medium: Some("https://img/e_m.jpg".to_string()),
                original: None,
            })
        );
    }

    #[test]
    fn test_search_hit_deserialization() {
        let json = r#"[
            {"score": 17.5, "show": {"id": 139, "name": "Girls", "language": "English", "premiered": "2012-04-15"}},
            {"score": 9.1, "show": {"id": 41734, "name": "Girls", "language": "Swedish", "premiered": null}}
        ]"#;
        let hits: Vec<TvMazeSearchHit> = serde_json::from_str(json).unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].score, 17.5);
        assert_eq!(hits[1].show.language.as_deref(), Some("Swedish"));
        assert_eq!(hits[1].show.premiered, None);
    }

    #[test]
    fn test_empty_image_is_dropped() {
        let image = TvMazeImage {
            medium: None,
            original: None,
        };
        assert_eq!(TvMazeProvider::convert_image(Some(image)), None);
    }

    #[test]
    fn test_episode_by_number_mismatch_is_invalid() {
        let json = r#"{"id": 4953, "season": 1, "number": 4, "name": "Cripples"}"#;
        let episode = || serde_json::from_str::<TvMazeEpisode>(json).unwrap();

        let err = TvMazeProvider::check_episode_number(episode(), 1, 3).unwrap_err();
        assert!(matches!(err, MetadataRetrievalError::InvalidData(_)));

        let ok = TvMazeProvider::check_episode_number(episode(), 1, 4).unwrap();
        assert_eq!(ok.id, 4953);
    }
}
