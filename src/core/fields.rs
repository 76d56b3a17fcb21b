//! Field projection over loosely-shaped JSON.
//!
//! The site has shipped several response shapes for the same data. Rather than
//! hard-coding one, every logical attribute is described by an ordered list of
//! candidate paths and resolved to the first one that holds a value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Dotted path into a JSON document. `""` and `"."` address the root; numeric
/// segments index into arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(path: &str) -> Self {
        let segments = path
            .split('.')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn resolve<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        self.segments.iter().try_fold(value, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl From<String> for FieldPath {
    fn from(path: String) -> Self {
        Self::parse(&path)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        if path.is_root() {
            ".".to_string()
        } else {
            path.segments.join(".")
        }
    }
}

/// Null, missing and empty strings all count as absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

pub fn first_present<'a>(value: &'a Value, candidates: &[FieldPath]) -> Option<&'a Value> {
    candidates
        .iter()
        .filter_map(|path| path.resolve(value))
        .find(|v| is_present(v))
}

/// First candidate holding a string or a number, as text.
pub fn first_string(value: &Value, candidates: &[FieldPath]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|path| path.resolve(value))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

pub fn first_array<'a>(value: &'a Value, candidates: &[FieldPath]) -> Option<&'a Vec<Value>> {
    candidates
        .iter()
        .filter_map(|path| path.resolve(value))
        .find_map(Value::as_array)
}

pub fn first_bool(value: &Value, candidates: &[FieldPath]) -> Option<bool> {
    candidates
        .iter()
        .filter_map(|path| path.resolve(value))
        .find_map(Value::as_bool)
}

fn paths(candidates: &[&str]) -> Vec<FieldPath> {
    candidates.iter().map(|p| FieldPath::parse(p)).collect()
}

/// Candidate paths per logical attribute. The first entries of each list
/// describe the v1 API; later entries cover older revisions of the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    pub search_results: Vec<FieldPath>,
    pub search_title: Vec<FieldPath>,
    pub search_image: Vec<FieldPath>,
    pub search_id: Vec<FieldPath>,
    pub search_dubbed: Vec<FieldPath>,

    pub description: Vec<FieldPath>,
    pub duration: Vec<FieldPath>,
    pub airdate: Vec<FieldPath>,

    pub dub_episodes: Vec<FieldPath>,
    pub episode_number: Vec<FieldPath>,

    pub sources: Vec<FieldPath>,
    pub source_type: Vec<FieldPath>,
    pub source_url: Vec<FieldPath>,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            search_results: paths(&["series", "data.animes", "data.series", "animes", "."]),
            search_title: paths(&["name", "title"]),
            search_image: paths(&["poster", "image"]),
            search_id: paths(&["content_id", "id"]),
            search_dubbed: paths(&["dubbed"]),

            description: paths(&["anime.info.description", "data.description", "description"]),
            duration: paths(&["anime.info.stats.duration", "data.duration", "duration"]),
            airdate: paths(&[
                "anime.moreInfo.aired",
                "anime.info.released",
                "data.aired",
                "aired",
            ]),

            dub_episodes: paths(&["anime.episodes.dub", "data.episodes.dub", "episodes.dub", "dub"]),
            episode_number: paths(&["number", "episode_number"]),

            sources: paths(&["data.sources", "sources", "."]),
            source_type: paths(&["type"]),
            source_url: paths(&["url", "file"]),
        }
    }
}
