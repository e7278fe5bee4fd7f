//! Image acquisition
//!
//! Posters and thumbnails are downloaded once per source URL. An image whose
//! URL is already in the entity's cache is never fetched again.

use crate::config::AgentConfig;
use crate::host::{CachedImage, ImageCache, ImageTier};
use crate::metadata_retrieval::ImageUrls;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while downloading an image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageFetchError {
    /// The request could not be sent or the body could not be read
    #[error("Failed to fetch image {url}: {reason}")]
    RequestFailed { url: String, reason: String },

    /// The server answered with a non-success status
    #[error("HTTP {status} while fetching image {url}")]
    HttpStatus { url: String, status: u16 },
}

/// Host capability downloading binary image content
pub trait ImageFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageFetchError>;
}

impl<F: ImageFetcher + ?Sized> ImageFetcher for &F {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageFetchError> {
        (**self).fetch(url)
    }
}

/// Image fetcher performing blocking HTTP GET requests
pub struct HttpImageFetcher {
    client: reqwest::blocking::Client,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Creates a fetcher using the user agent and timeout of `config`
    pub fn with_config(config: &AgentConfig) -> Result<Self, ImageFetchError> {
        let client = config
            .http_client()
            .map_err(|e| ImageFetchError::RequestFailed {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageFetcher for HttpImageFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageFetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| ImageFetchError::RequestFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(ImageFetchError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().map_err(|e| ImageFetchError::RequestFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(bytes.to_vec())
    }
}

/// Downloads `url` into `cache` unless it is already present.
///
/// Returns whether a download took place.
pub fn store_if_absent<C, F>(
    cache: &mut C,
    fetcher: &F,
    url: &str,
    tier: ImageTier,
) -> Result<bool, ImageFetchError>
where
    C: ImageCache + ?Sized,
    F: ImageFetcher + ?Sized,
{
    if cache.contains(url) {
        debug!(url, "image already cached");
        return Ok(false);
    }

    let data = fetcher.fetch(url)?;
    cache.put(url.to_string(), CachedImage { tier, data });
    Ok(true)
}

/// Stores the medium rendition as preview and the original as full image.
///
/// Both sizes are attempted independently; every failure is returned.
pub fn acquire<C, F>(cache: &mut C, fetcher: &F, urls: &ImageUrls) -> Vec<ImageFetchError>
where
    C: ImageCache + ?Sized,
    F: ImageFetcher + ?Sized,
{
    let sizes = [
        (urls.medium.as_deref(), ImageTier::Preview),
        (urls.original.as_deref(), ImageTier::Full),
    ];

    sizes
        .into_iter()
        .filter_map(|(url, tier)| url.map(|url| (url, tier)))
        .filter_map(|(url, tier)| store_if_absent(cache, fetcher, url, tier).err())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ImageSet;
    use std::cell::RefCell;

    #[derive(Default)]
    struct CountingFetcher {
        requests: RefCell<Vec<String>>,
        broken: Vec<&'static str>,
    }

    impl ImageFetcher for CountingFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageFetchError> {
            self.requests.borrow_mut().push(url.to_string());
            if self.broken.iter().any(|b| *b == url) {
                return Err(ImageFetchError::HttpStatus {
                    url: url.to_string(),
                    status: 404,
                });
            }
            Ok(url.as_bytes().to_vec())
        }
    }

    fn urls(medium: Option<&str>, original: Option<&str>) -> ImageUrls {
        ImageUrls {
            medium: medium.map(str::to_string),
            original: original.map(str::to_string),
        }
    }

    #[test]
    fn test_acquire_both_tiers() {
        let fetcher = CountingFetcher::default();
        let mut cache = ImageSet::default();

        let errors = acquire(&mut cache, &fetcher, &urls(Some("m.jpg"), Some("o.jpg")));

        assert!(errors.is_empty());
        assert_eq!(cache.get("m.jpg").unwrap().tier, ImageTier::Preview);
        assert_eq!(cache.get("o.jpg").unwrap().tier, ImageTier::Full);
        assert_eq!(cache.get("o.jpg").unwrap().data, b"o.jpg".to_vec());
    }

    #[test]
    fn test_cached_url_is_not_fetched_again() {
        let fetcher = CountingFetcher::default();
        let mut cache = ImageSet::default();
        let images = urls(Some("m.jpg"), Some("o.jpg"));

        acquire(&mut cache, &fetcher, &images);
        acquire(&mut cache, &fetcher, &images);

        assert_eq!(fetcher.requests.borrow().len(), 2);
    }

    #[test]
    fn test_failure_does_not_stop_other_tier() {
        let fetcher = CountingFetcher {
            broken: vec!["m.jpg"],
            ..Default::default()
        };
        let mut cache = ImageSet::default();

        let errors = acquire(&mut cache, &fetcher, &urls(Some("m.jpg"), Some("o.jpg")));

        assert_eq!(errors.len(), 1);
        assert!(!cache.contains("m.jpg"));
        assert!(cache.contains("o.jpg"));
    }

    #[test]
    fn test_store_if_absent_reports_download() {
        let fetcher = CountingFetcher::default();
        let mut cache = ImageSet::default();

        assert_eq!(store_if_absent(&mut cache, &fetcher, "a.jpg", ImageTier::Full), Ok(true));
        assert_eq!(store_if_absent(&mut cache, &fetcher, "a.jpg", ImageTier::Full), Ok(false));
    }
}
