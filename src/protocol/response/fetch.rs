use bytes::{BufMut, Bytes, BytesMut};

use crate::protocol::types::{CompactArray, CompactBytes, TagBuffer, Uuid};
use crate::protocol::{ErrorCode, Response};

use super::HeaderV1;

/// https://kafka.apache.org/protocol.html#The_Messages_Fetch
pub struct FetchResponse {
    bytes: BytesMut,
}

impl FetchResponse {
    pub fn new(correlation_id: i32, responses: Vec<TopicResponse>) -> Self {
        let header = HeaderV1::new(correlation_id);

        let mut bytes = BytesMut::new();
        header.encode(&mut bytes);

        bytes.put_i32(0); // throttle_time_ms
        bytes.put_i16(ErrorCode::None.into());
        bytes.put_i32(0); // sessionId: this broker never establishes fetch sessions
        CompactArray::encode(&mut bytes, &responses, |b, r| r.encode(b));
        TagBuffer::encode(&mut bytes);

        Self { bytes }
    }
}

impl Response for FetchResponse {
    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

pub struct TopicResponse {
    pub topic_id: Uuid,
    pub partitions: Vec<PartitionResponse>,
}

impl TopicResponse {
    fn encode(&self, buf: &mut BytesMut) {
        self.topic_id.encode(buf);
        CompactArray::encode(buf, &self.partitions, |b, p| p.encode(b));
        // One tag buffer per topic entry, per the Kafka wire protocol.
        TagBuffer::encode(buf);
    }
}

pub struct PartitionResponse {
    pub partition_index: i32,
    pub error_code: ErrorCode,
    pub high_watermark: i64,
    pub last_stable_offset: i64,
    pub log_start_offset: i64,
    pub preferred_read_replica: i32,
    /// `None` encodes as a bare null marker (the error path); `Some` encodes
    /// as COMPACT_BYTES, including `Some(&[])` for "known partition, empty
    /// log".
    pub records: Option<Bytes>,
}

impl PartitionResponse {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i32(self.partition_index);
        buf.put_i16(self.error_code.into());
        buf.put_i64(self.high_watermark);
        buf.put_i64(self.last_stable_offset);
        buf.put_i64(self.log_start_offset);
        CompactArray::encode(buf, &Vec::<AbortedTransaction>::new(), |_, _: &AbortedTransaction| {});
        buf.put_i32(self.preferred_read_replica);
        CompactBytes::encode(buf, self.records.as_deref());
        TagBuffer::encode(buf);
    }
}

pub struct AbortedTransaction {
    #[allow(dead_code)]
    pub producer_id: i64,
    #[allow(dead_code)]
    pub first_offset: i64,
}
