pub mod api_versions;
pub mod describe_topic_partitions;
pub mod fetch;
pub mod produce;

use bytes::{Buf, Bytes};

use crate::error::{BrokerError, Result};

use super::types::{NullableString, TagBuffer};
use super::ApiKey;

/// Request header, flexible variant (v2): apiKey, apiVersion, correlationId,
/// a non-compact nullable clientId, then a tag buffer.
// https://kafka.apache.org/protocol.html#protocol_messages
#[derive(Debug)]
pub struct HeaderV2 {
    pub request_api_key: i16,
    pub request_api_version: i16,
    pub correlation_id: i32,
    pub client_id: Option<String>,
}

impl HeaderV2 {
    pub fn decode(src: &mut Bytes) -> Result<Self> {
        if src.remaining() < 8 {
            return Err(BrokerError::malformed("truncated request header"));
        }
        let request_api_key = src.get_i16();
        let request_api_version = src.get_i16();
        let correlation_id = src.get_i32();
        let client_id = NullableString::decode(src)?;
        TagBuffer::decode(src)?;

        Ok(Self {
            request_api_key,
            request_api_version,
            correlation_id,
            client_id,
        })
    }

    pub fn api_key(&self) -> std::result::Result<ApiKey, num_enum::TryFromPrimitiveError<ApiKey>> {
        ApiKey::try_from(self.request_api_key)
    }
}
