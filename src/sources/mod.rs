pub mod uniquestream;

pub use uniquestream::UniqueStreamSource;
