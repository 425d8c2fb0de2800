use bytes::{BufMut, BytesMut};

use crate::protocol::types::{CompactArray, CompactString, TagBuffer, Uuid};
use crate::protocol::{ErrorCode, Response};

use super::HeaderV1;

const TOPIC_AUTHORIZED_OPERATIONS: i32 = i32::MIN;

/// https://kafka.apache.org/protocol.html#The_Messages_DescribeTopicPartitions
pub struct DescribeTopicPartitionsResponse {
    bytes: BytesMut,
}

impl DescribeTopicPartitionsResponse {
    pub fn new(correlation_id: i32, topics: Vec<Topic>) -> Self {
        let header = HeaderV1::new(correlation_id);

        let mut bytes = BytesMut::new();
        header.encode(&mut bytes);

        bytes.put_i32(0); // throttle_time_ms
        CompactArray::encode(&mut bytes, &topics, |b, t| t.encode(b));
        bytes.put_u8(0xFF); // next_cursor: null
        TagBuffer::encode(&mut bytes);

        Self { bytes }
    }
}

impl Response for DescribeTopicPartitionsResponse {
    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

pub struct Topic {
    pub error_code: ErrorCode,
    pub name: String,
    pub topic_id: Uuid,
    pub partitions: Vec<Partition>,
}

impl Topic {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i16(self.error_code.into());
        CompactString::encode(buf, Some(&self.name));
        self.topic_id.encode(buf);
        buf.put_u8(0); // is_internal
        CompactArray::encode(buf, &self.partitions, |b, p| p.encode(b));
        buf.put_i32(TOPIC_AUTHORIZED_OPERATIONS);
        TagBuffer::encode(buf);
    }
}

pub struct Partition {
    pub partition_index: i32,
    pub leader_id: i32,
    pub replica_nodes: Vec<i32>,
    pub isr_nodes: Vec<i32>,
}

impl Partition {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i16(ErrorCode::None.into());
        buf.put_i32(self.partition_index);
        buf.put_i32(self.leader_id);
        buf.put_i32(-1); // leader_epoch
        CompactArray::encode_i32(buf, &self.replica_nodes);
        CompactArray::encode_i32(buf, &self.isr_nodes);
        CompactArray::encode_i32(buf, &[]); // eligible_leader_replicas
        CompactArray::encode_i32(buf, &[]); // last_known_elr
        CompactArray::encode_i32(buf, &[]); // offline_replicas
        TagBuffer::encode(buf);
    }
}
