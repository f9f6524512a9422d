pub mod companies;
pub mod documents;
pub mod error;
pub mod jobs;
pub mod preferences;
pub mod relational;
pub mod scrape_runs;
pub mod sessions;

pub use documents::DocumentStore;
pub use error::{Result, StoreError};
pub use relational::RelationalStore;
pub use sessions::{FileSessionStore, SessionStore};
