use bytes::{BufMut, BytesMut};

use crate::protocol::types::{CompactArray, TagBuffer};
use crate::protocol::{ApiKey, ErrorCode, Response};

use super::HeaderV0;

/// https://kafka.apache.org/protocol.html#The_Messages_ApiVersions
pub struct ApiVersionsResponse {
    bytes: BytesMut,
}

struct SupportedApiKey {
    api_key: ApiKey,
    min_version: i16,
    max_version: i16,
}

const SUPPORTED_API_KEYS: &[SupportedApiKey] = &[
    SupportedApiKey {
        api_key: ApiKey::Produce,
        min_version: 0,
        max_version: 11,
    },
    SupportedApiKey {
        api_key: ApiKey::Fetch,
        min_version: 0,
        max_version: 16,
    },
    SupportedApiKey {
        api_key: ApiKey::ApiVersions,
        min_version: 0,
        max_version: 4,
    },
    SupportedApiKey {
        api_key: ApiKey::DescribeTopicPartitions,
        min_version: 0,
        max_version: 0,
    },
];

impl ApiVersionsResponse {
    pub fn new(correlation_id: i32, request_api_version: i16) -> Self {
        let header = HeaderV0::new(correlation_id);

        let error_code = if (0..=4).contains(&request_api_version) {
            ErrorCode::None
        } else {
            ErrorCode::UnsupportedVersion
        };

        let mut bytes = BytesMut::new();
        header.encode(&mut bytes);

        // BODY - ApiVersions Response (Version: 3)
        bytes.put_i16(error_code.into());
        CompactArray::encode(&mut bytes, SUPPORTED_API_KEYS, |b, k| {
            b.put_i16(k.api_key.into());
            b.put_i16(k.min_version);
            b.put_i16(k.max_version);
            TagBuffer::encode(b);
        });
        bytes.put_i32(0); // throttle_time_ms
        TagBuffer::encode(&mut bytes);

        Self { bytes }
    }
}

impl Response for ApiVersionsResponse {
    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
