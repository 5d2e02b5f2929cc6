use log::debug;

use crate::base::bucket::Bucket;
use crate::base::entry::Entry;
use crate::base::listing::ListingEngine;
use crate::s3::S3ListingClient;
use crate::{EnvironmentConfig, KeyfoldError};

/// Entry point for browse requests: wires the S3 listing client into
/// the engine. Stateless; a fresh client is built per operation so
/// concurrent requests share nothing but the connection pool.
#[derive(Debug, Clone)]
pub struct BrowseHandler {
    config: EnvironmentConfig,
}

impl BrowseHandler {
    /// Fails early when credentials cannot be resolved, so a
    /// misconfigured deployment dies at startup rather than on the
    /// first request.
    pub fn new(
        config: EnvironmentConfig,
    ) -> Result<BrowseHandler, KeyfoldError> {
        S3ListingClient::from_config(&config)?;
        Ok(BrowseHandler { config })
    }

    pub async fn list_buckets(
        &self,
    ) -> Result<Vec<Bucket>, KeyfoldError> {
        debug!("listing buckets");
        let client = S3ListingClient::from_config(&self.config)?;
        client.list_buckets().await
    }

    pub async fn list_children(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<Entry>, KeyfoldError> {
        debug!("listing children of {}:{}", bucket, prefix);
        let client = S3ListingClient::from_config(&self.config)?;
        let engine = ListingEngine::new(client);
        engine.list_children(bucket, prefix).await
    }
}
