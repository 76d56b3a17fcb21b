use crate::core::error::TransportError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub headers: HeaderMap,
    pub method: Method,
    pub body: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            headers: HeaderMap::new(),
            method: Method::GET,
            body: None,
        }
    }
}

/// A fully prepared request handed to each transport in turn.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// Browser-shaped headers the site expects before it answers API calls.
pub fn default_headers(site_url: &str, user_agent: &str) -> HeaderMap {
    let site = site_url.trim_end_matches('/');
    let mut headers = HeaderMap::new();

    let mut set = |name: HeaderName, value: &str| match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(e) => warn!("Skipping invalid default header {}: {}", name, e),
    };

    set(reqwest::header::USER_AGENT, user_agent);
    set(reqwest::header::REFERER, &format!("{}/", site));
    set(reqwest::header::ORIGIN, site);
    set(reqwest::header::ACCEPT, "application/json, text/plain, */*");
    set(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9");
    set(HeaderName::from_static("sec-fetch-mode"), "cors");
    set(HeaderName::from_static("sec-fetch-site"), "same-origin");

    headers
}

/// Caller headers win over defaults of the same name; every other default is kept.
pub fn merge_headers(defaults: &HeaderMap, caller: &HeaderMap) -> HeaderMap {
    let mut merged = defaults.clone();
    for name in caller.keys() {
        merged.remove(name);
    }
    for (name, value) in caller.iter() {
        merged.append(name.clone(), value.clone());
    }
    merged
}

/// One way of getting bytes off the network. A failed attempt lets the
/// next transport in line have a go.
#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &'static str;
    async fn send(&self, request: &FetchRequest) -> Result<String, TransportError>;
}

pub struct HttpTransport {
    name: &'static str,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(name: &'static str, client: reqwest::Client) -> Self {
        Self { name, client }
    }

    /// Primary client: keeps cookies between calls so challenge cookies
    /// set by the site are replayed.
    pub fn session(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self::new("session", client))
    }

    /// Plain client with reqwest defaults.
    pub fn baseline() -> Self {
        Self::new("baseline", reqwest::Client::new())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn send(&self, request: &FetchRequest) -> Result<String, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("{} answered HTTP {} via {}", request.url, status, self.name);
        }
        Ok(response.text().await?)
    }
}

/// Ordered transport chain with the site's default headers baked in.
#[derive(Clone)]
pub struct Fetcher {
    transports: Vec<Arc<dyn Transport>>,
    default_headers: HeaderMap,
}

impl Fetcher {
    pub fn new(transports: Vec<Arc<dyn Transport>>, default_headers: HeaderMap) -> Self {
        Self {
            transports,
            default_headers,
        }
    }

    /// Returns the first body any transport produces, or `None` once every
    /// transport has failed.
    pub async fn fetch(&self, url: &str, options: FetchOptions) -> Option<String> {
        let request = FetchRequest {
            url: url.to_string(),
            method: options.method,
            headers: merge_headers(&self.default_headers, &options.headers),
            body: options.body,
        };

        for transport in &self.transports {
            debug!("{} {} via {}", request.method, request.url, transport.name());
            match transport.send(&request).await {
                Ok(body) => return Some(body),
                Err(e) => warn!(
                    transport = transport.name(),
                    error = %e,
                    "Fetch of {} failed", request.url
                ),
            }
        }

        warn!("All transports failed for {}", url);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct Scripted {
        name: &'static str,
        reply: Option<&'static str>,
        calls: AtomicUsize,
        seen: Mutex<Option<FetchRequest>>,
    }

    impl Scripted {
        fn new(name: &'static str, reply: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply,
                calls: AtomicUsize::new(0),
                seen: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn send(&self, request: &FetchRequest) -> Result<String, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen.lock().unwrap() = Some(request.clone());
            self.reply
                .map(str::to_string)
                .ok_or_else(|| TransportError::Unavailable(self.name.to_string()))
        }
    }

    fn site_headers() -> HeaderMap {
        default_headers("https://anime.uniquestream.net", BROWSER_USER_AGENT)
    }

    #[test]
    fn test_default_headers() {
        let headers = site_headers();
        assert_eq!(headers["referer"], "https://anime.uniquestream.net/");
        assert_eq!(headers["origin"], "https://anime.uniquestream.net");
        assert_eq!(headers["sec-fetch-mode"], "cors");
        assert_eq!(headers["sec-fetch-site"], "same-origin");
        assert!(headers["user-agent"].to_str().unwrap().contains("Chrome"));
    }

    #[test]
    fn test_merge_headers_caller_wins() {
        let defaults = site_headers();
        let mut caller = HeaderMap::new();
        caller.insert(
            HeaderName::from_bytes(b"User-Agent").unwrap(),
            HeaderValue::from_static("custom/1.0"),
        );
        caller.insert("x-extra", HeaderValue::from_static("1"));

        let merged = merge_headers(&defaults, &caller);
        assert_eq!(merged["user-agent"], "custom/1.0");
        assert_eq!(merged.get_all("user-agent").iter().count(), 1);
        assert_eq!(merged["x-extra"], "1");
        assert_eq!(merged["referer"], defaults["referer"]);
        assert_eq!(merged.len(), defaults.len() + 1);
    }

    #[test]
    fn test_fallback_stops_at_first_success() {
        let primary = Scripted::new("primary", None);
        let secondary = Scripted::new("secondary", Some("body"));
        let tertiary = Scripted::new("tertiary", Some("unused"));
        let fetcher = Fetcher::new(
            vec![primary.clone(), secondary.clone(), tertiary.clone()],
            site_headers(),
        );

        let body = tokio_test::block_on(fetcher.fetch("https://x/api", FetchOptions::default()));
        assert_eq!(body.as_deref(), Some("body"));
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(tertiary.calls.load(Ordering::SeqCst), 0);

        // the fallback sees the same merged headers as the primary
        let seen = secondary.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.headers, site_headers());
        assert_eq!(seen.method, Method::GET);
    }

    #[test]
    fn test_all_transports_failing_yields_none() {
        let fetcher = Fetcher::new(
            vec![Scripted::new("a", None), Scripted::new("b", None)],
            site_headers(),
        );
        let body = tokio_test::block_on(fetcher.fetch("https://x/api", FetchOptions::default()));
        assert!(body.is_none());
    }

    #[test]
    fn test_options_pass_method_and_body() {
        let only = Scripted::new("only", Some("{}"));
        let fetcher = Fetcher::new(vec![only.clone()], site_headers());
        let options = FetchOptions {
            method: Method::POST,
            body: Some("payload".to_string()),
            ..Default::default()
        };
        tokio_test::block_on(fetcher.fetch("https://x/api", options));

        let seen = only.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.method, Method::POST);
        assert_eq!(seen.body.as_deref(), Some("payload"));
    }
}
