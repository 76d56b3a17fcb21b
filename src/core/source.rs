use crate::core::{DetailRecord, EpisodeRef, SearchResult, StreamTarget};
use async_trait::async_trait;
use url::Url;

/// The four entry points a host calls. None of them fail: problems are
/// logged and turned into an empty list, a placeholder record or `None`.
#[async_trait]
pub trait Source: Send + Sync {
    fn name(&self) -> &'static str;
    fn suitable(&self, url: &Url) -> bool;

    async fn search(&self, keyword: &str) -> Vec<SearchResult>;
    async fn extract_details(&self, url: &str) -> DetailRecord;
    async fn extract_episodes(&self, url: &str) -> Vec<EpisodeRef>;
    async fn extract_stream_url(&self, url: &str) -> StreamTarget;
}

pub struct SourceEngine {
    pub sources: Vec<Box<dyn Source>>,
}

impl SourceEngine {
    pub fn new() -> Self {
        Self { sources: Vec::new() }
    }

    pub fn register_source(&mut self, source: Box<dyn Source>) {
        self.sources.push(source);
    }

    pub fn find_by_name(&self, name: &str) -> Option<&dyn Source> {
        self.sources
            .iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
            .map(|s| s.as_ref())
    }

    pub fn find_for_url(&self, url: &str) -> Option<&dyn Source> {
        let parsed_url = Url::parse(url).ok()?;
        self.sources
            .iter()
            .find(|s| s.suitable(&parsed_url))
            .map(|s| s.as_ref())
    }
}

impl Default for SourceEngine {
    fn default() -> Self {
        Self::new()
    }
}
