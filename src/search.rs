//! Show search and relevance scoring
//!
//! Raw TVMaze scores are only comparable within one result set, so they are
//! rescaled to the host's `1..=100` range before being handed back.

use crate::host::{LanguageMatcher, SearchCandidate};
use crate::metadata_retrieval::{MetadataProvider, MetadataRetrievalError, ShowHit};
use tracing::debug;

/// Score given to a certain match
pub const MAX_SCORE: u8 = 100;

/// Rescales raw relevance scores to `1..=100`.
///
/// The highest raw score maps to 100 and the lowest to 1. A single score, or
/// a set in which every score is equal, maps to 100 throughout.
pub fn normalize_scores(scores: &[f64]) -> Vec<u8> {
    if scores.len() <= 1 {
        return vec![MAX_SCORE; scores.len()];
    }

    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if range <= 0.0 || !range.is_finite() {
        return vec![MAX_SCORE; scores.len()];
    }

    scores
        .iter()
        .map(|score| {
            let scaled = (99.0 * (score - min) / range).floor() + 1.0;
            scaled.clamp(1.0, MAX_SCORE as f64) as u8
        })
        .collect()
}

/// Year from the first four characters of a premiere date.
pub fn premiere_year(premiered: Option<&str>) -> Option<i32> {
    premiered?.get(..4)?.parse().ok()
}

/// Builds the ranked candidate list for `query`.
///
/// Candidates are ordered by descending normalized score; equal scores keep
/// the order of the remote response. `lang` is used for shows without a
/// language or with one the matcher does not know.
pub fn resolve_candidates<P, L>(
    provider: &P,
    languages: &L,
    query: &str,
    lang: &str,
) -> Result<Vec<SearchCandidate>, MetadataRetrievalError>
where
    P: MetadataProvider,
    L: LanguageMatcher,
{
    let hits = provider.search_shows(query)?;
    if hits.is_empty() {
        debug!(query, "no shows found");
        return Ok(Vec::new());
    }

    let scores: Vec<f64> = hits.iter().map(|hit| hit.score).collect();
    let normalized = normalize_scores(&scores);

    let mut candidates: Vec<SearchCandidate> = hits
        .into_iter()
        .zip(normalized)
        .map(|(hit, score)| to_candidate(hit, score, languages, lang))
        .collect();

    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    Ok(candidates)
}

fn to_candidate<L: LanguageMatcher>(
    hit: ShowHit,
    score: u8,
    languages: &L,
    fallback_lang: &str,
) -> SearchCandidate {
    let lang = hit
        .language
        .as_deref()
        .and_then(|name| languages.match_language(name))
        .unwrap_or_else(|| fallback_lang.to_string());

    debug!(
        id = hit.id,
        name = %hit.name,
        raw_score = hit.score,
        score,
        %lang,
        "search candidate"
    );

    SearchCandidate {
        id: hit.id.to_string(),
        year: premiere_year(hit.premiered.as_deref()),
        name: hit.name,
        lang,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::IsoLanguageMatcher;
    use crate::metadata_retrieval::{EpisodeRecord, SeasonRecord, ShowRecord};
    use chrono::NaiveDate;

    struct FakeSearch(Vec<ShowHit>);

    impl MetadataProvider for FakeSearch {
        fn search_shows(&self, _query: &str) -> Result<Vec<ShowHit>, MetadataRetrievalError> {
            Ok(self.0.clone())
        }

        fn show(&self, _: u64) -> Result<Option<ShowRecord>, MetadataRetrievalError> {
            Ok(None)
        }

        fn seasons(&self, _: u64) -> Result<Vec<SeasonRecord>, MetadataRetrievalError> {
            Ok(Vec::new())
        }

        fn episode_by_number(
            &self,
            _: u64,
            _: u32,
            _: u32,
        ) -> Result<Option<EpisodeRecord>, MetadataRetrievalError> {
            Ok(None)
        }

        fn episodes_by_date(
            &self,
            _: u64,
            _: NaiveDate,
        ) -> Result<Vec<EpisodeRecord>, MetadataRetrievalError> {
            Ok(Vec::new())
        }

        fn episodes(&self, _: u64) -> Result<Vec<EpisodeRecord>, MetadataRetrievalError> {
            Ok(Vec::new())
        }
    }

    fn hit(
        id: u64,
        name: &str,
        language: Option<&str>,
        premiered: Option<&str>,
        score: f64,
    ) -> ShowHit {
        ShowHit {
            id,
            name: name.to_string(),
            language: language.map(str::to_string),
            premiered: premiered.map(str::to_string),
            score,
        }
    }

    #[test]
    fn test_normalize_min_and_max() {
        let normalized = normalize_scores(&[17.5, 3.2, 9.0, 0.7]);
        assert_eq!(normalized[0], 100);
        assert_eq!(normalized[3], 1);
        assert!(normalized[1] > 1 && normalized[1] < normalized[2]);
    }

    #[test]
    fn test_normalize_formula() {
        // floor(99 * 5 / 10) + 1
        assert_eq!(normalize_scores(&[0.0, 5.0, 10.0]), vec![1, 50, 100]);
    }

    #[test]
    fn test_normalize_single_candidate() {
        assert_eq!(normalize_scores(&[0.42]), vec![100]);
    }

    #[test]
    fn test_normalize_identical_scores() {
        assert_eq!(normalize_scores(&[5.0, 5.0, 5.0]), vec![100, 100, 100]);
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize_scores(&[]).is_empty());
    }

    #[test]
    fn test_premiere_year() {
        assert_eq!(premiere_year(Some("2011-04-17")), Some(2011));
        assert_eq!(premiere_year(Some("20")), None);
        assert_eq!(premiere_year(Some("abcd-01-01")), None);
        assert_eq!(premiere_year(None), None);
    }

    #[test]
    fn test_resolve_candidates() {
        let provider = FakeSearch(vec![
            hit(41734, "Girls", Some("Swedish"), None, 2.0),
            hit(139, "Girls", Some("English"), Some("2012-04-15"), 17.5),
            hit(5000, "Girls und Panzer", None, Some("2012-10-09"), 4.0),
        ]);

        let candidates = resolve_candidates(&provider, &IsoLanguageMatcher, "girls", "fr").unwrap();

        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].id, "139");
        assert_eq!(candidates[0].score, 100);
        assert_eq!(candidates[0].year, Some(2012));
        assert_eq!(candidates[0].lang, "en");

        assert_eq!(candidates[1].id, "5000");
        assert_eq!(candidates[1].lang, "fr");

        assert_eq!(candidates[2].id, "41734");
        assert_eq!(candidates[2].score, 1);
        assert_eq!(candidates[2].year, None);
        assert_eq!(candidates[2].lang, "sv");
    }

    #[test]
    fn test_resolve_candidates_empty() {
        let provider = FakeSearch(Vec::new());
        let candidates = resolve_candidates(&provider, &IsoLanguageMatcher, "nothing", "en").unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_unknown_language_falls_back() {
        let provider = FakeSearch(vec![hit(1, "Star Trek", Some("Klingon"), None, 3.0)]);
        let candidates = resolve_candidates(&provider, &IsoLanguageMatcher, "trek", "de").unwrap();
        assert_eq!(candidates[0].lang, "de");
        assert_eq!(candidates[0].score, 100);
    }
}
