use std::str::FromStr;

use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    primitives::ByteStream,
    types::{CompletedMultipartUpload, CompletedPart},
};
use tracing::{error, info, warn};

use crate::init::config::S3Config;

use super::{BlobStore, ProgressFn, UploadProgress};

/// S3 refuses parts smaller than 5 MiB except the last one.
const MIN_PART_SIZE: usize = 5 * 1024 * 1024;

pub struct S3BlobStore {
    client: Client,
    bucket: String,
    region: String,
    public_base_url: Option<String>,
    part_size: usize,
}

impl S3BlobStore {
    pub async fn connect(config: &S3Config) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        let region = sdk_config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "us-west-1".to_string());

        info!(bucket = %config.bucket, region = %region, "S3 blob store configured");

        S3BlobStore {
            client: Client::new(&sdk_config),
            bucket: config.bucket.clone(),
            region,
            public_base_url: config
                .public_base_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
            part_size: config.multipart_part_size.max(MIN_PART_SIZE),
        }
    }

    async fn put_single(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await?;
        Ok(())
    }

    async fn put_multipart(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        progress: &ProgressFn<'_>,
    ) -> anyhow::Result<()> {
        let created = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .send()
            .await?;
        let upload_id = created
            .upload_id()
            .ok_or_else(|| anyhow::anyhow!("S3 did not return a multipart upload id"))?
            .to_string();

        let total = bytes.len();
        let mut sent = 0usize;
        let mut parts: Vec<CompletedPart> = Vec::new();

        for (index, chunk) in bytes.chunks(self.part_size).enumerate() {
            let part_number = (index + 1) as i32;
            let uploaded = self
                .client
                .upload_part()
                .bucket(&self.bucket)
                .key(key)
                .upload_id(&upload_id)
                .part_number(part_number)
                .body(ByteStream::from(chunk.to_vec()))
                .send()
                .await;

            match uploaded {
                Ok(output) => {
                    parts.push(
                        CompletedPart::builder()
                            .set_e_tag(output.e_tag().map(str::to_string))
                            .part_number(part_number)
                            .build(),
                    );
                }
                Err(e) => {
                    error!(error = %e, key = %key, part_number, "Multipart part upload failed; aborting");
                    if let Err(abort_err) = self
                        .client
                        .abort_multipart_upload()
                        .bucket(&self.bucket)
                        .key(key)
                        .upload_id(&upload_id)
                        .send()
                        .await
                    {
                        warn!(error = %abort_err, key = %key, "Could not abort multipart upload");
                    }
                    return Err(e.into());
                }
            }

            sent += chunk.len();
            progress(UploadProgress::running(sent, total));
        }

        self.client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(&upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build(),
            )
            .send()
            .await?;

        Ok(())
    }
}

/// Converts a full object URL to its bucket-relative key.
pub fn url_to_key(url_str: &str) -> Option<String> {
    if url_str.trim().is_empty() {
        return None;
    }

    match reqwest::Url::from_str(url_str) {
        Ok(u) => {
            let path = u.path().trim_start_matches('/');
            if path.is_empty() {
                None
            } else {
                Some(path.to_string())
            }
        }
        Err(e) => {
            warn!(url = url_str, error = %e, "Failed to parse blob URL; skipping key");
            None
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        progress: &ProgressFn<'_>,
    ) -> anyhow::Result<String> {
        let size_bytes = bytes.len();
        progress(UploadProgress::running(0, size_bytes));

        let result = if size_bytes <= self.part_size {
            self.put_single(key, bytes, content_type).await
        } else {
            self.put_multipart(key, bytes, content_type, progress).await
        };

        match result {
            Ok(()) => {
                progress(UploadProgress::success());
                info!(bucket = %self.bucket, key = %key, size_bytes, "Uploaded blob to S3");
                Ok(self.resolve_url(key))
            }
            Err(e) => {
                progress(UploadProgress::error(0));
                error!(bucket = %self.bucket, key = %key, error = %e, "Failed to upload blob to S3");
                Err(e)
            }
        }
    }

    async fn delete(&self, url: &str) -> anyhow::Result<bool> {
        let Some(key) = url_to_key(url) else {
            return Ok(false);
        };

        let head = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await;
        if let Err(e) = head {
            if e.as_service_error().is_some_and(|se| se.is_not_found()) {
                return Ok(false);
            }
            return Err(e.into());
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await?;

        info!(bucket = %self.bucket, key = %key, "Deleted blob from S3");
        Ok(true)
    }

    fn resolve_url(&self, key: &str) -> String {
        let key = key.trim_start_matches('/');
        match &self.public_base_url {
            Some(base) => format!("{base}/{key}"),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_to_key_strips_host_and_leading_slash() {
        assert_eq!(
            url_to_key("https://bucket.s3.us-west-1.amazonaws.com/images/a.jpg").as_deref(),
            Some("images/a.jpg")
        );
        assert_eq!(url_to_key("https://cdn.example.com/"), None);
        assert_eq!(url_to_key("   "), None);
        assert_eq!(url_to_key("not a url"), None);
    }
}
