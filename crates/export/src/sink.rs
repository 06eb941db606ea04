// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::{ExportError, Result};
use diagnostics::*;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::region::Region;
use std::path::PathBuf;

pub const DEFAULT_BUCKET: &str = "the-bucket-currency-data";
pub const DEFAULT_REGION: &str = "us-east-2";

/// Destination for exported objects.
pub trait ObjectSink {
    fn put(&self, key: &str, body: &[u8], content_type: &str) -> Result<()>;

    /// Where objects go, for log messages.
    fn location(&self) -> String;
}

/// S3 bucket. Credentials come from the usual AWS environment variables,
/// profile or instance metadata at upload time.
#[derive(Debug, Clone)]
pub struct S3Sink {
    bucket: String,
    region: Region,
}

impl S3Sink {
    pub fn new(bucket: &str, region: &str) -> Result<Self> {
        let parsed = region.parse::<Region>().map_err(|e| ExportError::Region {
            region: region.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            bucket: bucket.to_string(),
            region: parsed,
        })
    }
}

impl ObjectSink for S3Sink {
    fn put(&self, key: &str, body: &[u8], content_type: &str) -> Result<()> {
        let failed = |message: String| ExportError::Upload {
            key: key.to_string(),
            message,
        };

        let creds = Credentials::default().map_err(|e| failed(e.to_string()))?;
        let bucket = Bucket::new(&self.bucket, self.region.clone(), creds).map_err(|e| failed(e.to_string()))?;
        let response = bucket
            .put_object_with_content_type(key, body, content_type)
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(failed(format!("HTTP {status}")));
        }
        let location = self.location();
        debug!("Stored {key} in {location}", key: key, location: location);
        Ok(())
    }

    fn location(&self) -> String {
        format!("s3://{}", self.bucket)
    }
}

/// Local directory, for dry runs.
#[derive(Debug, Clone)]
pub struct LocalDirSink {
    dir: PathBuf,
}

impl LocalDirSink {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }
}

impl ObjectSink for LocalDirSink {
    fn put(&self, key: &str, body: &[u8], _content_type: &str) -> Result<()> {
        let path = self.dir.join(key);
        std::fs::create_dir_all(&self.dir)
            .and_then(|()| std::fs::write(&path, body))
            .map_err(|source| ExportError::Io { path, source })
    }

    fn location(&self) -> String {
        self.dir.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_sink_writes_key() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LocalDirSink::new(dir.path().join("exports"));

        sink.put("2024-05-01.csv", b"a,b\n1,x\n", "text/csv").unwrap();
        sink.put("2024-05-01.csv", b"a\n", "text/csv").unwrap();

        let written = std::fs::read_to_string(dir.path().join("exports/2024-05-01.csv")).unwrap();
        assert_eq!(written, "a\n");
    }

    #[test]
    fn test_s3_location() {
        let sink = S3Sink::new(DEFAULT_BUCKET, DEFAULT_REGION).unwrap();
        assert_eq!(sink.location(), "s3://the-bucket-currency-data");
    }
}
