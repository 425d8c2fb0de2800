use bytes::{Buf, Bytes};

use crate::error::{BrokerError, Result};
use crate::protocol::types::{CompactArray, CompactBytes, CompactString, TagBuffer};

use super::HeaderV2;

/// https://kafka.apache.org/protocol.html#The_Messages_Produce
#[derive(Debug)]
pub struct ProduceRequest {
    pub header: HeaderV2,
    pub transactional_id: Option<String>,
    pub acks: i16,
    pub timeout_ms: i32,
    pub topic_data: Vec<ProduceTopicData>,
}

#[derive(Debug)]
pub struct ProduceTopicData {
    pub name: String,
    pub partition_data: Vec<ProducePartitionData>,
}

#[derive(Debug)]
pub struct ProducePartitionData {
    pub index: i32,
    pub records: Option<bytes::Bytes>,
}

impl ProduceRequest {
    pub fn decode(src: &mut Bytes) -> Result<Self> {
        let header = HeaderV2::decode(src)?;

        let transactional_id = CompactString::decode(src)?;
        if src.remaining() < 6 {
            return Err(BrokerError::malformed("truncated Produce request"));
        }
        let acks = src.get_i16();
        let timeout_ms = src.get_i32();

        let topic_data = CompactArray::decode(src, |s| {
            let name = CompactString::decode_required(s)?;
            let partition_data = CompactArray::decode(s, |s| {
                if s.remaining() < 4 {
                    return Err(BrokerError::malformed(
                        "truncated Produce partition data: missing index",
                    ));
                }
                let index = s.get_i32();
                let records = CompactBytes::decode(s)?;
                TagBuffer::decode(s)?;
                Ok(ProducePartitionData { index, records })
            })?;
            TagBuffer::decode(s)?;
            Ok(ProduceTopicData {
                name,
                partition_data,
            })
        })?;

        TagBuffer::decode(src)?;

        Ok(Self {
            header,
            transactional_id,
            acks,
            timeout_ms,
            topic_data,
        })
    }
}
