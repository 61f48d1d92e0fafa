mod types;
pub use types::Artwork;
pub(crate) use types::Artworks;

mod sqlite;
pub use sqlite::SqliteConfig;
pub use sqlite::SqliteMetadataConn;
pub use sqlite::SqliteMetadataPool;
