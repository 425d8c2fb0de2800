use bytes::{BufMut, BytesMut};

use crate::protocol::types::{CompactArray, CompactString, TagBuffer};
use crate::protocol::{ErrorCode, Response};

use super::HeaderV1;

/// https://kafka.apache.org/protocol.html#The_Messages_Produce
pub struct ProduceResponse {
    bytes: BytesMut,
}

impl ProduceResponse {
    pub fn new(correlation_id: i32, topic_responses: Vec<TopicResponse>) -> Self {
        let header = HeaderV1::new(correlation_id);

        let mut bytes = BytesMut::new();
        header.encode(&mut bytes);

        CompactArray::encode(&mut bytes, &topic_responses, |b, t| t.encode(b));
        bytes.put_i32(0); // throttle_time_ms
        TagBuffer::encode(&mut bytes);

        Self { bytes }
    }
}

impl Response for ProduceResponse {
    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

pub struct TopicResponse {
    pub name: String,
    pub partition_responses: Vec<PartitionResponse>,
}

impl TopicResponse {
    fn encode(&self, buf: &mut BytesMut) {
        CompactString::encode(buf, Some(&self.name));
        CompactArray::encode(buf, &self.partition_responses, |b, p| p.encode(b));
        TagBuffer::encode(buf);
    }
}

pub struct PartitionResponse {
    pub index: i32,
    pub error_code: ErrorCode,
    pub base_offset: i64,
    pub log_start_offset: i64,
}

impl PartitionResponse {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i32(self.index);
        buf.put_i16(self.error_code.into());
        buf.put_i64(self.base_offset);
        buf.put_i64(-1); // log_append_time
        buf.put_i64(self.log_start_offset);
        CompactArray::encode(buf, &Vec::<RecordError>::new(), |_, _: &RecordError| {});
        CompactString::encode(buf, None); // error_message
        TagBuffer::encode(buf);
    }
}

pub struct RecordError;
