use crate::core::transport::BROWSER_USER_AGENT;
use crate::core::FieldMapping;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use url::Url;

/// Where the episode list for a title is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpisodesEndpoint {
    /// `<api>/content/<id>`, shared with detail extraction.
    Content,
    /// `<api>/content/<id>/episodes`, used by earlier site revisions.
    Dedicated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site_url: String,
    pub api_url: String,
    pub user_agent: String,
    /// Request timeout in seconds for the session transport.
    pub timeout: u64,
    /// Keep only catalog entries flagged `dubbed: true`.
    pub filter_dubbed: bool,
    /// Answer a failed search with a single "Error" entry instead of `[]`.
    pub search_error_entry: bool,
    pub episodes_endpoint: EpisodesEndpoint,
    /// Extra headers layered over the built-in browser headers.
    pub headers: BTreeMap<String, String>,
    pub fields: FieldMapping,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_url: "https://anime.uniquestream.net".to_string(),
            api_url: "https://anime.uniquestream.net/api/v1".to_string(),
            user_agent: BROWSER_USER_AGENT.to_string(),
            timeout: 30,
            filter_dubbed: false,
            search_error_entry: false,
            episodes_endpoint: EpisodesEndpoint::Content,
            headers: BTreeMap::new(),
            fields: FieldMapping::default(),
        }
    }
}

impl Config {
    /// Reads a TOML config file when one is given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                Self::from_toml(&raw)
                    .with_context(|| format!("parsing config file {}", path.display()))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        Url::parse(&self.site_url).with_context(|| format!("site_url {:?}", self.site_url))?;
        Url::parse(&self.api_url).with_context(|| format!("api_url {:?}", self.api_url))?;
        anyhow::ensure!(self.timeout > 0, "timeout must be at least one second");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_target_v1_api() {
        let config = Config::default();
        assert_eq!(config.api_url, "https://anime.uniquestream.net/api/v1");
        assert!(!config.filter_dubbed);
        assert_eq!(config.episodes_endpoint, EpisodesEndpoint::Content);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_toml() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(
            file,
            r#"
filter_dubbed = true
episodes_endpoint = "dedicated"

[headers]
X-Requested-With = "XMLHttpRequest"

[fields]
search_results = ["data.animes"]
"#
        )?;

        let config = Config::load(Some(file.path()))?;
        assert!(config.filter_dubbed);
        assert_eq!(config.episodes_endpoint, EpisodesEndpoint::Dedicated);
        assert_eq!(config.headers["X-Requested-With"], "XMLHttpRequest");
        assert_eq!(config.fields.search_results.len(), 1);
        assert_eq!(config.fields.search_title, FieldMapping::default().search_title);
        assert_eq!(config.site_url, Config::default().site_url);
        Ok(())
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let config = Config::from_toml(r#"api_url = "not a url""#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/uniquestream.toml"))).is_err());
    }
}
