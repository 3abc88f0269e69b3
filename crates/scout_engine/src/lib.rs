//! Scout engine: IO collaborators and cycle execution.
mod notify;
mod orchestrator;
mod seen;
mod source;
mod types;

pub use notify::{format_message, NotificationSink, NotifySettings, SlackWebhookSink};
pub use orchestrator::{Clock, CycleError, Orchestrator};
pub use seen::{ensure_store_dir, LineFileSeenStore, PersistError, SeenStore};
pub use source::{
    extract_listings, FirecrawlSource, SourceProvider, SourceSettings, DEFAULT_FIRECRAWL_ENDPOINT,
    DEFAULT_LISTING_URL,
};
pub use types::{NotifyError, SourceError, SourceFailure};
