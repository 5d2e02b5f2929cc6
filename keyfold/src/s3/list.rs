use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use super::client::{
    account_endpoint_url, bucket_endpoint_url, S3Client,
};
use super::config::{resolve_config, S3Config};
use crate::base::bucket::Bucket;
use crate::base::listing::{ListingClient, ListingPage};
use crate::http::{HttpClient, HttpClientResponse};
use crate::utils::time::rfc3339_to_epoch;
use crate::{EnvironmentConfig, KeyfoldError, AWS_MAX_LIST_OBJECTS};

// allow non snake case for the XML response
#[allow(non_snake_case)]
#[derive(Debug, Deserialize)]
struct ListAllMyBucketsResult {
    Buckets: Option<Buckets>,
}

// allow non snake case for the XML response
#[allow(non_snake_case)]
#[derive(Debug, Deserialize)]
struct Buckets {
    Bucket: Vec<BucketInfo>,
}

// allow non snake case for the XML response
#[allow(non_snake_case)]
#[derive(Debug, Deserialize)]
struct BucketInfo {
    Name: String,
    CreationDate: Option<String>,
}

// allow non snake case for the XML response
#[allow(non_snake_case)]
#[derive(Debug, Deserialize)]
struct ListBucketResult {
    IsTruncated: Option<bool>,
    Contents: Option<Vec<Content>>,
    NextContinuationToken: Option<String>,
}

// allow non snake case for the XML response
#[allow(non_snake_case)]
#[derive(Debug, Deserialize)]
struct Content {
    Key: String,
}

/// Production [`ListingClient`]: each `list_page` call is one signed
/// `ListObjectsV2` request against the bucket endpoint.
pub struct S3ListingClient {
    http: HttpClient,
    config: S3Config,
}

impl S3ListingClient {
    pub fn from_config(
        config: &EnvironmentConfig,
    ) -> Result<Self, KeyfoldError> {
        let config = resolve_config(config)?;
        let http = HttpClient::new().with_timeout(config.page_timeout);
        Ok(S3ListingClient { http, config })
    }

    pub async fn list_buckets(
        &self,
    ) -> Result<Vec<Bucket>, KeyfoldError> {
        let endpoint = account_endpoint_url(
            &self.config.region,
            self.config.endpoint_url.as_deref(),
        );
        let mut s3_client = S3Client::new(
            endpoint,
            self.config.region.clone(),
            self.config.credentials.clone(),
        );
        let headers = s3_client.generate_list_buckets_headers()?;

        let response = self.http.get(&s3_client.url(), &headers).await?;
        match response.status_code() {
            200 => parse_buckets(&response),
            403 => Err(KeyfoldError::AccessDenied(
                "account bucket list".to_string(),
            )),
            code => Err(unexpected_status(code, "list buckets")),
        }
    }
}

#[async_trait]
impl ListingClient for S3ListingClient {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListingPage, KeyfoldError> {
        let endpoint = bucket_endpoint_url(
            &self.config.region,
            self.config.endpoint_url.as_deref(),
            bucket,
        );
        let mut s3_client = S3Client::new(
            endpoint,
            self.config.region.clone(),
            self.config.credentials.clone(),
        );
        let headers = s3_client.generate_list_objects_headers(
            Some(prefix).filter(|p| !p.is_empty()),
            Some(AWS_MAX_LIST_OBJECTS),
            continuation_token,
        )?;

        let response = self.http.get(&s3_client.url(), &headers).await?;
        match response.status_code() {
            200 => parse_listing_page(&response),
            301 => {
                // single-call boundary: surface the redirect rather
                // than chasing it
                let hint = response
                    .header("x-amz-bucket-region")
                    .map(|region| format!(" (bucket region: {})", region))
                    .unwrap_or_default();
                Err(KeyfoldError::InvalidArgument(format!(
                    "bucket {} is served from another region{}",
                    bucket, hint
                )))
            }
            400 => Err(KeyfoldError::InvalidArgument(format!(
                "listing request rejected for bucket {}",
                bucket
            ))),
            403 => Err(KeyfoldError::AccessDenied(bucket.to_string())),
            404 => Err(KeyfoldError::NotFound(bucket.to_string())),
            code => {
                Err(unexpected_status(code, &format!("bucket {}", bucket)))
            }
        }
    }
}

fn unexpected_status(code: u16, context: &str) -> KeyfoldError {
    KeyfoldError::Unavailable(format!(
        "{}: backend returned status {}",
        context, code
    ))
}

fn parse_listing_page(
    response: &HttpClientResponse,
) -> Result<ListingPage, KeyfoldError> {
    let body = String::from_utf8_lossy(response.body());
    let result: ListBucketResult = serde_xml_rs::from_str(&body)
        .map_err(|e| {
            KeyfoldError::Internal(format!(
                "failed to parse listing response: {}",
                e
            ))
        })?;

    let keys: Vec<String> = result
        .Contents
        .unwrap_or_default()
        .into_iter()
        .map(|content| content.Key)
        .collect();

    let next_token = result.NextContinuationToken;
    // older S3-compatible backends omit IsTruncated; token presence
    // carries the same information
    let is_truncated =
        result.IsTruncated.unwrap_or(next_token.is_some());

    debug!("listing page: {} keys, truncated={}", keys.len(), is_truncated);
    Ok(ListingPage {
        keys,
        next_token,
        is_truncated,
    })
}

fn parse_buckets(
    response: &HttpClientResponse,
) -> Result<Vec<Bucket>, KeyfoldError> {
    let body = String::from_utf8_lossy(response.body());
    let result: ListAllMyBucketsResult = serde_xml_rs::from_str(&body)
        .map_err(|e| {
            KeyfoldError::Internal(format!(
                "failed to parse bucket list response: {}",
                e
            ))
        })?;

    let buckets = result
        .Buckets
        .map(|buckets| buckets.Bucket)
        .unwrap_or_default()
        .into_iter()
        .map(|bucket| {
            let creation_date = bucket
                .CreationDate
                .as_deref()
                .and_then(|date| rfc3339_to_epoch(date).ok());
            Bucket::new(bucket.Name, creation_date)
        })
        .collect();
    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_page_truncated() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>bucket</Name>
  <Prefix></Prefix>
  <KeyCount>2</KeyCount>
  <MaxKeys>2</MaxKeys>
  <IsTruncated>true</IsTruncated>
  <NextContinuationToken>1dEY+token</NextContinuationToken>
  <Contents>
    <Key>a/1</Key>
    <LastModified>2023-01-15T08:00:00.000Z</LastModified>
    <Size>11</Size>
  </Contents>
  <Contents>
    <Key>a/2</Key>
    <LastModified>2023-01-15T08:00:00.000Z</LastModified>
    <Size>12</Size>
  </Contents>
</ListBucketResult>"#;
        let result: ListBucketResult =
            serde_xml_rs::from_str(body).unwrap();
        assert_eq!(result.IsTruncated, Some(true));
        assert_eq!(
            result.NextContinuationToken.as_deref(),
            Some("1dEY+token")
        );
        let keys: Vec<String> = result
            .Contents
            .unwrap_or_default()
            .into_iter()
            .map(|c| c.Key)
            .collect();
        assert_eq!(keys, vec!["a/1", "a/2"]);
    }

    #[test]
    fn test_parse_listing_page_empty() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>bucket</Name>
  <Prefix>nothing-here/</Prefix>
  <KeyCount>0</KeyCount>
  <IsTruncated>false</IsTruncated>
</ListBucketResult>"#;
        let result: ListBucketResult =
            serde_xml_rs::from_str(body).unwrap();
        assert_eq!(result.IsTruncated, Some(false));
        assert!(result.Contents.is_none());
        assert!(result.NextContinuationToken.is_none());
    }

    #[test]
    fn test_parse_bucket_list() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListAllMyBucketsResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Owner><ID>abc</ID></Owner>
  <Buckets>
    <Bucket>
      <Name>media</Name>
      <CreationDate>2012-02-15T21:03:02Z</CreationDate>
    </Bucket>
    <Bucket>
      <Name>logs</Name>
      <CreationDate>2019-06-01T00:00:00Z</CreationDate>
    </Bucket>
  </Buckets>
</ListAllMyBucketsResult>"#;
        let result: ListAllMyBucketsResult =
            serde_xml_rs::from_str(body).unwrap();
        let buckets = result.Buckets.unwrap().Bucket;
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].Name, "media");
        assert_eq!(
            buckets[0].CreationDate.as_deref(),
            Some("2012-02-15T21:03:02Z")
        );
    }
}
