pub mod error;
pub mod fields;
pub mod models;
pub mod source;
pub mod transport;

pub use error::{SourceError, TransportError};
pub use fields::{FieldMapping, FieldPath};
pub use models::{DetailRecord, EpisodeNumber, EpisodeRef, SearchResult, StreamTarget};
pub use source::{Source, SourceEngine};
pub use transport::{FetchOptions, Fetcher, HttpTransport, Transport};
