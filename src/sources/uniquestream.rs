use crate::config::{Config, EpisodesEndpoint};
use crate::core::fields::{first_array, first_bool, first_present, first_string};
use crate::core::transport::{default_headers, merge_headers};
use crate::core::{
    DetailRecord, EpisodeNumber, EpisodeRef, FetchOptions, Fetcher, HttpTransport, SearchResult,
    Source, SourceError, StreamTarget, Transport,
};
use crate::utils::{decode_component, encode_component, preview};
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub struct UniqueStreamSource {
    config: Config,
    fetcher: Fetcher,
    site_host: String,
    watch_pattern: Regex,
    episode_pattern: Regex,
}

impl UniqueStreamSource {
    /// Session client first, plain client as fallback.
    pub fn new(config: Config) -> Result<Self, SourceError> {
        let session = HttpTransport::session(Duration::from_secs(config.timeout))?;
        Self::with_transports(
            config,
            vec![Arc::new(session), Arc::new(HttpTransport::baseline())],
        )
    }

    /// Builds the source on top of a host-supplied transport chain.
    pub fn with_transports(
        config: Config,
        transports: Vec<Arc<dyn Transport>>,
    ) -> Result<Self, SourceError> {
        let headers = site_headers(&config)?;
        let fetcher = Fetcher::new(transports, headers);

        let site_host = Url::parse(&config.site_url)?
            .host_str()
            .unwrap_or_default()
            .to_string();

        let watch_base = regex::escape(&format!("{}/watch/", site_root(&config)));
        let watch_pattern = Regex::new(&format!(r"^{}([^?#]+)$", watch_base))?;
        let episode_pattern = Regex::new(&format!(r"^{}([^?#]+)\?ep=([^&#]+)$", watch_base))?;

        Ok(Self {
            config,
            fetcher,
            site_host,
            watch_pattern,
            episode_pattern,
        })
    }

    pub fn watch_url(&self, content_id: &str) -> String {
        format!("{}/watch/{}", site_root(&self.config), encode_component(content_id))
    }

    pub fn episode_url(&self, content_id: &str, number: &EpisodeNumber) -> String {
        format!(
            "{}?ep={}",
            self.watch_url(content_id),
            encode_component(&number.to_string())
        )
    }

    pub fn parse_content_id(&self, url: &str) -> Option<String> {
        let captures = self.watch_pattern.captures(url)?;
        Some(decode_component(captures.get(1)?.as_str()))
    }

    /// Content id and episode number from an episode URL.
    pub fn parse_episode_url(&self, url: &str) -> Option<(String, String)> {
        let captures = self.episode_pattern.captures(url)?;
        Some((
            decode_component(captures.get(1)?.as_str()),
            decode_component(captures.get(2)?.as_str()),
        ))
    }

    fn api(&self) -> &str {
        self.config.api_url.trim_end_matches('/')
    }

    fn search_url(&self, keyword: &str) -> String {
        format!(
            "{}/search?page=1&query={}&language=dub",
            self.api(),
            encode_component(keyword)
        )
    }

    fn content_url(&self, content_id: &str) -> String {
        format!("{}/content/{}", self.api(), encode_component(content_id))
    }

    fn episodes_url(&self, content_id: &str) -> String {
        match self.config.episodes_endpoint {
            EpisodesEndpoint::Content => self.content_url(content_id),
            EpisodesEndpoint::Dedicated => format!("{}/episodes", self.content_url(content_id)),
        }
    }

    fn sources_url(&self, content_id: &str, episode: &str) -> String {
        format!(
            "{}/episode/{}/sources",
            self.content_url(content_id),
            encode_component(episode)
        )
    }

    async fn fetch_json(&self, url: &str) -> Result<Value, SourceError> {
        let body = self
            .fetcher
            .fetch(url, FetchOptions::default())
            .await
            .ok_or_else(|| SourceError::NoResponse(url.to_string()))?;

        if body.trim().is_empty() {
            return Err(SourceError::EmptyResponse(url.to_string()));
        }

        debug!("Response length: {} ({})", body.len(), preview(&body, 120));
        Ok(serde_json::from_str(&body)?)
    }

    async fn try_search(&self, keyword: &str) -> Result<Vec<SearchResult>, SourceError> {
        info!("Searching for: {}", keyword);
        let data = self.fetch_json(&self.search_url(keyword)).await?;
        let fields = &self.config.fields;

        let Some(entries) = first_array(&data, &fields.search_results) else {
            debug!(
                "No result array in search response, keys: {:?}",
                data.as_object().map(|o| o.keys().collect::<Vec<_>>())
            );
            return Ok(Vec::new());
        };

        let results: Vec<SearchResult> = entries
            .iter()
            .filter(|entry| {
                !self.config.filter_dubbed || first_bool(entry, &fields.search_dubbed) == Some(true)
            })
            .filter_map(|entry| {
                let Some(content_id) = first_string(entry, &fields.search_id) else {
                    debug!("Skipping search entry without content id");
                    return None;
                };
                Some(SearchResult {
                    title: first_string(entry, &fields.search_title).unwrap_or_default(),
                    image: first_string(entry, &fields.search_image).unwrap_or_default(),
                    href: self.watch_url(&content_id),
                })
            })
            .collect();

        debug!("Kept {} of {} search entries", results.len(), entries.len());
        Ok(results)
    }

    async fn try_details(&self, url: &str) -> Result<DetailRecord, SourceError> {
        let content_id = self
            .parse_content_id(url)
            .ok_or_else(|| SourceError::InvalidUrl(url.to_string()))?;
        let data = self.fetch_json(&self.content_url(&content_id)).await?;
        let fields = &self.config.fields;

        Ok(DetailRecord::new(
            first_string(&data, &fields.description),
            first_string(&data, &fields.duration),
            first_string(&data, &fields.airdate),
        ))
    }

    async fn try_episodes(&self, url: &str) -> Result<Vec<EpisodeRef>, SourceError> {
        let content_id = self
            .parse_content_id(url)
            .ok_or_else(|| SourceError::InvalidUrl(url.to_string()))?;
        let data = self.fetch_json(&self.episodes_url(&content_id)).await?;
        let fields = &self.config.fields;

        let Some(episodes) = first_array(&data, &fields.dub_episodes) else {
            debug!("No dub track for {}", content_id);
            return Ok(Vec::new());
        };

        let refs: Vec<EpisodeRef> = episodes
            .iter()
            .filter_map(|episode| {
                let number = fields
                    .episode_number
                    .iter()
                    .filter_map(|path| path.resolve(episode))
                    .find_map(EpisodeNumber::from_value)?;
                Some(EpisodeRef {
                    href: self.episode_url(&content_id, &number),
                    number,
                })
            })
            .collect();

        if refs.len() < episodes.len() {
            debug!("Skipped {} episodes without a number", episodes.len() - refs.len());
        }
        Ok(refs)
    }

    async fn try_stream_url(&self, url: &str) -> Result<StreamTarget, SourceError> {
        let (content_id, episode) = self
            .parse_episode_url(url)
            .ok_or_else(|| SourceError::InvalidUrl(url.to_string()))?;
        let data = self.fetch_json(&self.sources_url(&content_id, &episode)).await?;
        let fields = &self.config.fields;

        let sources = first_array(&data, &fields.sources)
            .ok_or_else(|| SourceError::UnexpectedShape("no sources array".to_string()))?;

        let hls = sources
            .iter()
            .filter(|source| {
                first_present(source, &fields.source_type).and_then(Value::as_str) == Some("hls")
            })
            .find_map(|source| first_string(source, &fields.source_url));

        if hls.is_none() {
            info!("No HLS source among {} sources for {}", sources.len(), url);
        }
        Ok(hls)
    }
}

#[async_trait]
impl Source for UniqueStreamSource {
    fn name(&self) -> &'static str {
        "UniqueStream"
    }

    fn suitable(&self, url: &Url) -> bool {
        url.host_str() == Some(self.site_host.as_str())
    }

    async fn search(&self, keyword: &str) -> Vec<SearchResult> {
        match self.try_search(keyword).await {
            Ok(results) => results,
            Err(e) => {
                warn!(category = e.category(), error = %e, "Search failed");
                let body_missing = matches!(
                    e,
                    SourceError::NoResponse(_) | SourceError::EmptyResponse(_)
                );
                if self.config.search_error_entry && !body_missing {
                    vec![SearchResult::error_entry()]
                } else {
                    Vec::new()
                }
            }
        }
    }

    async fn extract_details(&self, url: &str) -> DetailRecord {
        self.try_details(url).await.unwrap_or_else(|e| {
            warn!(category = e.category(), error = %e, "Details extraction failed");
            DetailRecord::placeholder()
        })
    }

    async fn extract_episodes(&self, url: &str) -> Vec<EpisodeRef> {
        self.try_episodes(url).await.unwrap_or_else(|e| {
            warn!(category = e.category(), error = %e, "Episode listing failed");
            Vec::new()
        })
    }

    async fn extract_stream_url(&self, url: &str) -> StreamTarget {
        self.try_stream_url(url).await.unwrap_or_else(|e| {
            warn!(category = e.category(), error = %e, "Stream resolution failed");
            None
        })
    }
}

fn site_root(config: &Config) -> &str {
    config.site_url.trim_end_matches('/')
}

/// Browser defaults with the configured extra headers layered on top.
fn site_headers(config: &Config) -> Result<HeaderMap, SourceError> {
    let mut extra = HeaderMap::new();
    for (name, value) in &config.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| SourceError::InvalidHeader(format!("{}: {}", name, e)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| SourceError::InvalidHeader(format!("{}: {}", name, e)))?;
        extra.insert(header_name, header_value);
    }
    Ok(merge_headers(
        &default_headers(&config.site_url, &config.user_agent),
        &extra,
    ))
}
