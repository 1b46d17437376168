//! Settings snapshot, validation, site activation and storage.
pub mod loader;
mod manager;
mod matcher;
mod store;
mod types;

pub use loader::load_from_file;
pub use manager::SettingsManager;
pub use matcher::{
    MatcherError,
    SiteMatcher,
    domain_of,
};
pub use store::{
    KeyValueStore,
    MAX_CHUNK_BYTES,
    MemoryStore,
    SettingsStore,
    StoreError,
    split_translations,
};
pub use types::{
    ConfigError,
    DEFAULT_DELAY_MS,
    MAX_DELAY_MS,
    Settings,
    SiteSettings,
    ValidationError,
};
