pub mod api_versions;
pub mod describe_topic_partitions;
pub mod fetch;
pub mod produce;

use bytes::{BufMut, BytesMut};

use super::types::TagBuffer;

// The APIVersions response uses the "v0" header format, while all other
// responses used by this broker use the "v1" header format.
// The response header format (v0) is 4 bytes long, and contains exactly one
// field: correlation_id. The response header format (v1) adds a tag buffer.
// https://kafka.apache.org/protocol.html#protocol_messages

pub struct HeaderV0 {
    correlation_id: i32,
}

impl HeaderV0 {
    pub fn new(correlation_id: i32) -> Self {
        Self { correlation_id }
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i32(self.correlation_id);
    }
}

pub struct HeaderV1 {
    correlation_id: i32,
}

impl HeaderV1 {
    pub fn new(correlation_id: i32) -> Self {
        Self { correlation_id }
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i32(self.correlation_id);
        TagBuffer::encode(buf);
    }
}

/// The single-field body this broker returns for an apiKey outside
/// {0, 1, 18, 75}: just the UNSUPPORTED_VERSION error code, no other
/// fields since no decoding table exists to build them from.
pub struct UnsupportedApiResponse {
    bytes: BytesMut,
}

impl UnsupportedApiResponse {
    pub fn new(correlation_id: i32) -> Self {
        let header = HeaderV1::new(correlation_id);

        let mut bytes = BytesMut::new();
        header.encode(&mut bytes);
        bytes.put_i16(super::ErrorCode::UnsupportedVersion.into());

        Self { bytes }
    }
}

impl super::Response for UnsupportedApiResponse {
    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
