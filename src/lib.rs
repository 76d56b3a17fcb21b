pub mod cli;
pub mod config;
pub mod core;
pub mod sources;
pub mod utils;

pub use crate::config::{Config, EpisodesEndpoint};
pub use crate::core::{DetailRecord, EpisodeNumber, EpisodeRef, SearchResult, Source, SourceEngine};
pub use crate::sources::UniqueStreamSource;
