use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Result;

/// Per-partition append-only log files, guarded by a lock keyed on
/// `"{topic}-{partition}"` so concurrent Produce requests against the same
/// partition can't interleave their writes.
#[derive(Default)]
pub struct PartitionLogs {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PartitionLogs {
    pub fn new() -> Self {
        Self::default()
    }

    async fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Appends `records` (a raw Produce-request record batch) to the log
    /// file at `path`, creating the file and its parent directory if needed.
    /// Returns the base offset the caller should report back, which this
    /// broker always reports as 0 since it doesn't track a running offset
    /// counter across Produce calls.
    pub async fn append(&self, topic: &str, partition: i32, path: &Path, records: &Bytes) -> Result<i64> {
        let key = format!("{topic}-{partition}");
        let lock = self.lock_for(&key).await;
        let _guard = lock.lock().await;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(records).await?;
        file.flush().await?;

        debug!(topic, partition, bytes = records.len(), "appended records to partition log");
        Ok(0)
    }

    /// Reads the full contents of the partition log at `path` for a Fetch
    /// response. A missing file means the partition exists but has never
    /// been written to; this is not an error, it just means no records.
    pub async fn read_all(&self, path: &Path) -> Result<Bytes> {
        match tokio::fs::File::open(path).await {
            Ok(mut file) => {
                let mut buf = Vec::new();
                file.read_to_end(&mut buf).await?;
                Ok(Bytes::from(buf))
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Bytes::new()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appends_and_reads_back_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foo-0").join("00000000000000000000.log");
        let logs = PartitionLogs::new();

        logs.append("foo", 0, &path, &Bytes::from_static(b"first"))
            .await
            .unwrap();
        logs.append("foo", 0, &path, &Bytes::from_static(b"second"))
            .await
            .unwrap();

        let contents = logs.read_all(&path).await.unwrap();
        assert_eq!(contents.as_ref(), b"firstsecond");
    }

    #[tokio::test]
    async fn reading_a_partition_that_was_never_written_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bar-0").join("00000000000000000000.log");
        let logs = PartitionLogs::new();

        let contents = logs.read_all(&path).await.unwrap();
        assert_eq!(contents.len(), 0);
    }

    #[tokio::test]
    async fn concurrent_appends_to_the_same_partition_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baz-0").join("00000000000000000000.log");
        let logs = Arc::new(PartitionLogs::new());

        let chunk = vec![b'x'; 4096];
        let mut handles = Vec::new();
        for _ in 0..8 {
            let logs = logs.clone();
            let path = path.clone();
            let chunk = Bytes::from(chunk.clone());
            handles.push(tokio::spawn(async move {
                logs.append("baz", 0, &path, &chunk).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let contents = logs.read_all(&path).await.unwrap();
        assert_eq!(contents.len(), 8 * 4096);
        assert!(contents.iter().all(|&b| b == b'x'));
    }
}
