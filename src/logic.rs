pub mod describe_topic_partitions;
pub mod fetch;
pub mod produce;

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Result;
use crate::metadata::MetadataStore;
use crate::protocol::request::api_versions::ApiVersionsRequest;
use crate::protocol::request::describe_topic_partitions::DescribeTopicPartitionsRequest;
use crate::protocol::request::fetch::FetchRequest;
use crate::protocol::request::produce::ProduceRequest;
use crate::protocol::request::HeaderV2;
use crate::protocol::response::api_versions::ApiVersionsResponse;
use crate::protocol::response::UnsupportedApiResponse;
use crate::protocol::{ApiKey, Response};
use crate::storage::PartitionLogs;

/// Shared, read-mostly state every connection handler dispatches against.
/// Built once in `main` and cloned (cheaply, via the inner `Arc`s) into each
/// connection task.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub metadata: Arc<MetadataStore>,
    pub logs: Arc<PartitionLogs>,
}

#[derive(Debug, Error)]
#[error("unsupported API key: {0}")]
pub struct UnsupportedApiKeyError(pub i16);

/// Decodes the request body behind `api_key` and dispatches it to the
/// matching handler, returning the encoded response ready for framing.
pub async fn process(
    state: &AppState,
    api_key: i16,
    msg: &mut Bytes,
) -> Result<Box<dyn Response + Send>> {
    let api_key = match ApiKey::try_from(api_key).map_err(|_| UnsupportedApiKeyError(api_key)) {
        Ok(key) => key,
        Err(err) => {
            warn!(%err, "responding to unsupported API key with errorCode 35");
            let header = HeaderV2::decode(msg)?;
            return Ok(Box::new(UnsupportedApiResponse::new(header.correlation_id)));
        }
    };

    debug!(?api_key, "dispatching request");

    let response: Box<dyn Response + Send> = match api_key {
        ApiKey::ApiVersions => {
            let req = ApiVersionsRequest::decode(msg)?;
            Box::new(ApiVersionsResponse::new(
                req.header.correlation_id,
                req.header.request_api_version,
            ))
        }
        ApiKey::DescribeTopicPartitions => {
            let req = DescribeTopicPartitionsRequest::decode(msg)?;
            Box::new(describe_topic_partitions::process(state, req))
        }
        ApiKey::Fetch => {
            let req = FetchRequest::decode(msg)?;
            Box::new(fetch::process(state, req).await?)
        }
        ApiKey::Produce => {
            let req = ProduceRequest::decode(msg)?;
            Box::new(produce::process(state, req).await?)
        }
    };

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::metadata::MetadataStore;
    use crate::storage::PartitionLogs;
    use bytes::{BufMut, BytesMut};

    fn state() -> AppState {
        AppState {
            config: Arc::new(Config::default()),
            metadata: Arc::new(MetadataStore::default()),
            logs: Arc::new(PartitionLogs::new()),
        }
    }

    fn flexible_header(api_key: i16, api_version: i16, correlation_id: i32) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.put_i16(api_key);
        buf.put_i16(api_version);
        buf.put_i32(correlation_id);
        buf.put_i16(-1); // null client id
        buf.put_u8(0); // tag buffer
        buf
    }

    #[tokio::test]
    async fn unknown_api_key_returns_unsupported_version_response_instead_of_closing() {
        let mut msg = flexible_header(999, 0, 42).freeze();
        let resp = process(&state(), 999, &mut msg).await.unwrap();
        let bytes = resp.as_bytes();
        // correlation id, then tag buffer, then the i16 error code 35.
        assert_eq!(&bytes[0..4], &42i32.to_be_bytes());
        assert_eq!(bytes[4], 0); // response header tag buffer
        assert_eq!(&bytes[5..7], &35i16.to_be_bytes());
    }
}
