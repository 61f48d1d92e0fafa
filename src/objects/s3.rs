use std::time::Duration;

use async_trait::async_trait;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_credential_types::Credentials;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use http::Uri;
use serde::Deserialize;

use super::ObjectStore;
use crate::errors::Result;

#[derive(Clone, Deserialize)]
pub struct S3Config {
    pub secret_key: String,
    pub access_key: String,
    pub hostname: String,
    pub region: String,
    pub bucket_name: String,
}

impl S3Config {
    pub async fn new_objects(&self) -> Result<S3> {
        let scp = SharedCredentialsProvider::new(
            Credentials::new(
                self.access_key.clone(),
                self.secret_key.clone(),
                None,
                None,
                "atelier",
            )
            .provide_credentials()
            .await?,
        );

        let uri = Uri::builder()
            .scheme("https")
            .authority(self.hostname.as_str())
            .path_and_query("/")
            .build()?;

        let sdk_config = aws_config::load_from_env().await;

        let config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .region(Region::new(self.region.clone()))
            .credentials_provider(scp)
            .endpoint_url(uri.to_string())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(Duration::from_secs(30))
                    .operation_attempt_timeout(Duration::from_secs(30))
                    .build(),
            )
            .build();

        Ok(S3 {
            hostname: self.hostname.clone(),
            bucket_name: self.bucket_name.clone(),
            client: Client::from_conf(config),
        })
    }
}

#[derive(Clone)]
pub struct S3 {
    hostname: String,
    bucket_name: String,
    client: Client,
}

#[async_trait]
impl ObjectStore for S3 {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<()> {
        let _put_object_output = self
            .client
            .put_object()
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .bucket(&self.bucket_name)
            .send()
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .key(key)
            .bucket(&self.bucket_name)
            .send()
            .await?;
        Ok(())
    }

    /// Virtual-hosted-style URL: `https://<bucket>.<hostname>/<key>`.
    fn resolve(&self, key: &str) -> String {
        format!("https://{}.{}/{}", self.bucket_name, self.hostname, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_builds_virtual_hosted_url() {
        let store = S3 {
            hostname: "s3.example.com".to_string(),
            bucket_name: "artworks".to_string(),
            client: Client::from_conf(aws_sdk_s3::Config::builder().build()),
        };
        assert_eq!(
            store.resolve("abc-cat.png"),
            "https://artworks.s3.example.com/abc-cat.png"
        );
    }
}
