//! Original uploaded files, kept in S3 next to the structured resume.

use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;

pub fn source_key(user_id: Uuid, resume_id: Uuid, extension: &str) -> String {
    format!("uploads/{user_id}/{resume_id}.{extension}")
}

pub async fn put_source(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    bytes: Bytes,
    content_type: &str,
) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .content_type(content_type)
        .body(ByteStream::from(bytes))
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("Failed to upload s3://{bucket}/{key}: {e}")))?;

    info!("Uploaded source file to s3://{bucket}/{key}");
    Ok(())
}

/// Returns the object's bytes and stored content type.
pub async fn get_source(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
) -> Result<(Bytes, Option<String>), AppError> {
    let object = s3
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("Failed to fetch s3://{bucket}/{key}: {e}")))?;

    let content_type = object.content_type().map(str::to_string);
    let data = object
        .body
        .collect()
        .await
        .map_err(|e| AppError::Storage(format!("Failed to read s3://{bucket}/{key}: {e}")))?;
    Ok((data.into_bytes(), content_type))
}

/// Best effort; a leftover object is only logged.
pub async fn delete_source(s3: &aws_sdk_s3::Client, bucket: &str, key: &str) {
    match s3.delete_object().bucket(bucket).key(key).send().await {
        Ok(_) => info!("Deleted source file s3://{bucket}/{key}"),
        Err(e) => warn!("Failed to delete s3://{bucket}/{key}: {e}"),
    }
}
