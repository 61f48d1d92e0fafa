mod config;
pub use config::AccessGateConfig;
pub use config::Config;
pub use config::HttpConfig;
pub use config::MetadataBackend;
pub use config::ObjectsBackend;

mod errors;
pub use errors::{Error, Result};

mod gallery;
pub use gallery::Gallery;
pub use gallery::{ArtworkEntry, NewArtwork};

pub mod http;
pub mod metadata;
pub mod objects;
