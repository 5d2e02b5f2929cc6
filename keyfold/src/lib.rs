pub(crate) mod api;
pub(crate) mod base;
pub(crate) mod default;
pub(crate) mod error;
pub(crate) mod http;
pub(crate) mod s3;
pub(crate) mod utils;

pub use api::handler::BrowseHandler;
pub use base::bucket::Bucket;
pub use base::config::EnvironmentConfig;
pub use base::entry::{Entry, EntryKind};
pub use base::listing::{ListingClient, ListingEngine, ListingPage};
// re-export all defaults
pub use default::*;
pub use error::KeyfoldError;
pub use s3::S3ListingClient;
pub use utils::time::epoch_to_rfc3339;
