// S3 / MinIO client built on rust-s3

use super::{
    content_type_for, object_key, ObjectData, ObjectStore, StorageError, StorageResult,
    StoredObject, PRESIGN_EXPIRY_SECS,
};
use crate::config::StorageConfig;
use async_trait::async_trait;
use bytes::Bytes;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

/// One shared handle to the target bucket. Never mutated after `connect`,
/// so it is shared across requests without locking.
pub struct S3Storage {
    bucket: Bucket,
}

impl S3Storage {
    /// Build the client and make sure the bucket exists.
    pub async fn connect(config: &StorageConfig) -> StorageResult<Self> {
        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint_url(),
        };
        let credentials = credentials(config)?;

        ensure_bucket(&config.bucket, region.clone(), credentials.clone()).await?;

        let bucket = Bucket::new(&config.bucket, region, credentials)?.with_path_style();
        info!(bucket = %config.bucket, endpoint = %config.endpoint_url(), "Object storage ready");

        Ok(Self { bucket })
    }

    /// Wrap an existing bucket handle without touching the backend.
    pub fn from_bucket(bucket: Bucket) -> Self {
        Self { bucket }
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket.name
    }
}

fn credentials(config: &StorageConfig) -> StorageResult<Credentials> {
    Credentials::new(
        Some(config.access_key.as_str()),
        Some(config.secret_key.as_str()),
        None,
        None,
        None,
    )
    .map_err(|e| StorageError::Credentials(e.to_string()))
}

/// Create the bucket, treating "already exists" as success. No existence
/// pre-check, so concurrent cold starts cannot race each other.
async fn ensure_bucket(name: &str, region: Region, credentials: Credentials) -> StorageResult<()> {
    match Bucket::create_with_path_style(name, region, credentials, BucketConfiguration::default())
        .await
    {
        Ok(response) => {
            info!(bucket = %name, status = response.response_code, "Bucket created");
            Ok(())
        }
        Err(S3Error::HttpFailWithBody(409, _)) => {
            debug!(bucket = %name, "Bucket already exists");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Best-effort removal of an object whose download link could not be signed.
/// Returns the error to report for the failed upload either way.
async fn discard_orphan(bucket: &Bucket, key: String, sign_error: S3Error) -> StorageError {
    match bucket.delete_object(&key).await {
        Ok(_) => warn!(key = %key, "Removed object after presign failure"),
        Err(e) => warn!(key = %key, error = %e, "Could not remove orphaned object"),
    }
    StorageError::Presign {
        key,
        reason: sign_error.to_string(),
    }
}

fn is_not_found(err: &S3Error) -> bool {
    matches!(err, S3Error::HttpFailWithBody(404, _))
}

#[async_trait]
impl ObjectStore for S3Storage {
    #[tracing::instrument(skip(self, data, content_type), fields(bucket = %self.bucket.name, size = data.len()))]
    async fn put(
        &self,
        data: Bytes,
        original_filename: &str,
        content_type: Option<&str>,
    ) -> StorageResult<StoredObject> {
        let key = object_key(original_filename);
        let content_type = content_type
            .map(str::to_string)
            .unwrap_or_else(|| content_type_for(&key));

        self.bucket
            .put_object_with_content_type(&key, &data, &content_type)
            .await?;
        debug!(key = %key, content_type = %content_type, "Object written");

        match self.bucket.presign_get(&key, PRESIGN_EXPIRY_SECS, None).await {
            Ok(url) => Ok(StoredObject { key, url }),
            Err(e) => Err(discard_orphan(&self.bucket, key, e).await),
        }
    }

    #[tracing::instrument(skip(self), fields(bucket = %self.bucket.name))]
    async fn get(&self, key: &str) -> StorageResult<ObjectData> {
        let (head, status) = self.bucket.head_object(key).await.map_err(|e| {
            if is_not_found(&e) {
                StorageError::NotFound(key.to_string())
            } else {
                e.into()
            }
        })?;
        if status == 404 {
            return Err(StorageError::NotFound(key.to_string()));
        }
        debug!(last_modified = ?head.last_modified, "Object metadata fetched");

        let response = self.bucket.get_object(key).await.map_err(|e| {
            if is_not_found(&e) {
                StorageError::NotFound(key.to_string())
            } else {
                e.into()
            }
        })?;

        Ok(ObjectData {
            bytes: response.bytes().clone(),
            last_modified: head.last_modified,
        })
    }
}
