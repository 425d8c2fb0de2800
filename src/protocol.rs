pub mod record_batch;
pub mod request;
pub mod response;
pub mod types;

use bytes::{BufMut, BytesMut};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// https://kafka.apache.org/protocol.html#protocol_api_keys
#[derive(Clone, Copy, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(i16)]
pub enum ApiKey {
    Produce = 0,
    Fetch = 1,
    ApiVersions = 18,
    DescribeTopicPartitions = 75,
}

/// https://kafka.apache.org/protocol.html#protocol_error_codes
#[derive(Clone, Copy, Debug, IntoPrimitive)]
#[repr(i16)]
pub enum ErrorCode {
    None = 0,
    UnknownTopicOrPartition = 3,
    UnsupportedVersion = 35,
    UnknownTopicId = 100,
}

/// Wraps an API response body with the 4-byte length prefix Kafka's framing
/// requires on every message.
// https://kafka.apache.org/protocol.html#protocol_common
pub struct ResponseMessage {
    bytes: BytesMut,
}

impl ResponseMessage {
    pub fn from_bytes(src: &[u8]) -> Self {
        let mut bytes = BytesMut::with_capacity(src.len() + 4);
        bytes.put_i32(src.len() as i32);
        bytes.extend_from_slice(src);
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

pub trait Response {
    fn as_bytes(&self) -> &[u8];
}
