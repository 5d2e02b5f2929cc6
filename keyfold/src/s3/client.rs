use std::collections::HashMap;

use hmac::{Hmac, Mac, NewMac};
use percent_encoding::{utf8_percent_encode, CONTROLS};
use sha2::{Digest, Sha256};
use url::{form_urlencoded, Url};

use super::credentials::AwsCredentials;
use crate::utils::time::UtcTimeNow;
use crate::{KeyfoldError, AWS_MAX_LIST_OBJECTS};

fn sign(key: &[u8], msg: &[u8]) -> Vec<u8> {
    let mut hmac = Hmac::<Sha256>::new_from_slice(key)
        .expect("HMAC can take key of any size");
    hmac.update(msg);
    let result = hmac.finalize();
    result.into_bytes().as_slice().to_vec()
}

/// Builds signed request headers for the S3 REST API (SigV4,
/// UNSIGNED-PAYLOAD). One client instance per target endpoint; the
/// query string is set per operation before signing.
pub struct S3Client {
    endpoint_url: String,
    region: String,
    credentials: AwsCredentials,
    query_string: Option<String>,
}

impl S3Client {
    pub fn new(
        endpoint_url: String,
        region: String,
        credentials: AwsCredentials,
    ) -> S3Client {
        S3Client {
            endpoint_url,
            region,
            credentials,
            query_string: None,
        }
    }

    pub fn url(&self) -> String {
        format!(
            "{}/?{}",
            &self.endpoint_url,
            self.query_string.as_ref().unwrap_or(&"".to_string())
        )
    }

    pub fn generate_list_buckets_headers(
        &mut self,
    ) -> Result<HashMap<String, String>, KeyfoldError> {
        self.query_string = None;
        self.generate_headers("GET")
    }

    pub fn generate_list_objects_headers(
        &mut self,
        prefix: Option<&str>,
        max_keys: Option<u32>,
        continuation_token: Option<&str>,
    ) -> Result<HashMap<String, String>, KeyfoldError> {
        let max_keys = max_keys
            .map(|keys| std::cmp::min(keys, AWS_MAX_LIST_OBJECTS))
            .unwrap_or(AWS_MAX_LIST_OBJECTS);

        // no delimiter: the full flat key set is requested and the
        // folder grouping happens caller-side
        let mut query_parts =
            form_urlencoded::Serializer::new(String::new());
        query_parts.append_pair("list-type", "2");
        query_parts.append_pair("max-keys", &max_keys.to_string());

        if let Some(p) = prefix {
            query_parts.append_pair("prefix", p);
        }
        if let Some(token) = continuation_token {
            query_parts.append_pair("continuation-token", token);
        }

        self.query_string = Some(query_parts.finish());
        self.generate_headers("GET")
    }

    fn generate_headers(
        &mut self,
        method: &str,
    ) -> Result<HashMap<String, String>, KeyfoldError> {
        let utc_now = UtcTimeNow::new();
        let date_stamp = utc_now.date_stamp();
        let x_amz_date = utc_now.x_amz_date();

        let credential_scope =
            format!("{}/{}/s3/aws4_request", date_stamp, self.region);

        let mut headers: HashMap<String, String> = HashMap::new();
        headers.insert("x-amz-date".to_string(), x_amz_date.clone());
        headers.insert(
            "x-amz-content-sha256".to_string(),
            "UNSIGNED-PAYLOAD".to_string(),
        );
        if let Some(token) = self.credentials.session_token() {
            headers.insert(
                "x-amz-security-token".to_string(),
                token.to_string(),
            );
        }

        let url = Url::parse(&self.endpoint_url)
            .map_err(|e| KeyfoldError::Internal(e.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| {
                KeyfoldError::Internal(format!(
                    "missing host in endpoint url: {}",
                    self.endpoint_url
                ))
            })?
            .to_owned();
        headers.insert("host".to_string(), host);

        let canonical_uri = self.get_canonical_uri(&url);
        let canonical_headers = self.get_canonical_headers(&headers);
        let canonical_query_string = self.get_canonical_query_string();

        let mut signed_header_names = headers
            .keys()
            .map(|key| key.to_lowercase())
            .collect::<Vec<String>>();
        signed_header_names.sort();
        let signed_headers = signed_header_names.join(";");

        let canonical_request = format!(
            "{}\n/{}\n{}\n{}\n{}\n{}",
            method,
            canonical_uri,
            canonical_query_string,
            canonical_headers,
            signed_headers,
            "UNSIGNED-PAYLOAD"
        );

        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{}\n{}\n{:x}",
            x_amz_date,
            credential_scope,
            Sha256::digest(canonical_request.as_bytes())
        );

        let signing_key = self.generate_signing_key(&date_stamp);
        let signature = sign(&signing_key, string_to_sign.as_bytes());

        let authorization_header = format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, \
             Signature={}",
            self.credentials.access_key(),
            credential_scope,
            signed_headers,
            hex::encode(signature)
        );

        headers
            .insert("Authorization".to_string(), authorization_header);
        Ok(headers)
    }

    fn generate_signing_key(&self, date_stamp: &str) -> Vec<u8> {
        let k_date = sign(
            format!("AWS4{}", self.credentials.secret_key()).as_bytes(),
            date_stamp.as_bytes(),
        );
        let k_region = sign(&k_date, self.region.as_bytes());
        let k_service = sign(&k_region, b"s3");
        sign(&k_service, b"aws4_request")
    }

    fn get_canonical_headers(
        &self,
        headers: &HashMap<String, String>,
    ) -> String {
        let mut canonical_headers = String::new();
        let mut headers_vec: Vec<(&String, &String)> =
            headers.iter().collect();
        headers_vec
            .sort_by(|a, b| a.0.to_lowercase().cmp(&b.0.to_lowercase()));

        for (header_name, header_value) in headers_vec {
            let header_name = header_name.trim().to_lowercase();
            if header_name.starts_with("x-amz-")
                || header_name == "host"
                || header_name == "content-type"
                || header_name == "date"
            {
                canonical_headers += &format!(
                    "{}:{}\n",
                    header_name,
                    header_value.trim()
                );
            }
        }
        canonical_headers
    }

    fn get_canonical_uri(&self, url: &Url) -> String {
        // listing operations address the endpoint root; a custom
        // endpoint may still carry a base path
        let endpoint_path =
            url.path().trim_start_matches('/').trim_end_matches('/');
        if endpoint_path.is_empty() {
            String::new()
        } else {
            form_urlencoded::byte_serialize(endpoint_path.as_bytes())
                .collect::<String>()
        }
    }

    fn get_canonical_query_string(&self) -> String {
        let query = match self.query_string.as_ref() {
            Some(query) if !query.is_empty() => query,
            _ => return String::new(),
        };

        let mut parts: Vec<(String, String)> = query
            .split('&')
            .filter_map(|p| {
                let mut split = p.splitn(2, '=');
                match (split.next(), split.next()) {
                    (Some(k), Some(v)) => {
                        Some((k.to_string(), v.to_string()))
                    }
                    _ => None,
                }
            })
            .collect();
        parts.sort();

        let encoded_parts: Vec<String> = parts
            .into_iter()
            .map(|(k, v)| {
                format!("{}={}", k, utf8_percent_encode(&v, CONTROLS))
            })
            .collect();
        encoded_parts.join("&")
    }
}

/// S3-style bucket endpoint: virtual-hosted AWS URL, or
/// `<endpoint>/<bucket>` for S3-compatible stores.
pub fn bucket_endpoint_url(
    region: &str,
    endpoint_url: Option<&str>,
    bucket_name: &str,
) -> String {
    match endpoint_url {
        Some(url) => {
            format!("{}/{}", url.trim_end_matches('/'), bucket_name)
        }
        None => {
            format!("https://{}.s3.{}.amazonaws.com", bucket_name, region)
        }
    }
}

pub fn account_endpoint_url(
    region: &str,
    endpoint_url: Option<&str>,
) -> String {
    match endpoint_url {
        Some(url) => url.trim_end_matches('/').to_owned(),
        None => format!("https://s3.{}.amazonaws.com", region),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> S3Client {
        S3Client::new(
            "https://bucket.s3.us-east-2.amazonaws.com".to_string(),
            "us-east-2".to_string(),
            AwsCredentials::new(
                "AKIDEXAMPLE".to_string(),
                "secret".to_string(),
                None,
            ),
        )
    }

    #[test]
    fn test_list_objects_headers_signed() {
        let mut client = test_client();
        let headers = client
            .generate_list_objects_headers(
                Some("docs/"),
                Some(1000),
                None,
            )
            .unwrap();

        assert!(headers.contains_key("Authorization"));
        assert!(headers["Authorization"]
            .starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/"));
        assert_eq!(
            headers["host"],
            "bucket.s3.us-east-2.amazonaws.com"
        );
        assert_eq!(headers["x-amz-content-sha256"], "UNSIGNED-PAYLOAD");

        let url = client.url();
        assert!(url.contains("list-type=2"));
        assert!(url.contains("prefix=docs%2F"));
        assert!(!url.contains("delimiter"));
    }

    #[test]
    fn test_continuation_token_in_query() {
        let mut client = test_client();
        client
            .generate_list_objects_headers(None, None, Some("token=="))
            .unwrap();
        assert!(client.url().contains("continuation-token=token%3D%3D"));
    }

    #[test]
    fn test_endpoint_urls() {
        assert_eq!(
            bucket_endpoint_url("us-east-2", None, "b"),
            "https://b.s3.us-east-2.amazonaws.com"
        );
        assert_eq!(
            bucket_endpoint_url(
                "us-east-2",
                Some("http://localhost:9000/"),
                "b"
            ),
            "http://localhost:9000/b"
        );
        assert_eq!(
            account_endpoint_url("eu-west-1", None),
            "https://s3.eu-west-1.amazonaws.com"
        );
    }
}
