use bytes::{Buf, Bytes};

use crate::error::{BrokerError, Result};

use super::HeaderV2;
use crate::protocol::types::{CompactArray, CompactString, TagBuffer};

/// https://kafka.apache.org/protocol.html#The_Messages_DescribeTopicPartitions
#[derive(Debug)]
pub struct DescribeTopicPartitionsRequest {
    pub header: HeaderV2,
    pub topics: Vec<String>,
    pub response_partition_limit: i32,
    pub cursor: u8,
}

impl DescribeTopicPartitionsRequest {
    pub fn decode(src: &mut Bytes) -> Result<Self> {
        let header = HeaderV2::decode(src)?;

        let topics = CompactArray::decode(src, |s| {
            let name = CompactString::decode_required(s)?;
            TagBuffer::decode(s)?;
            Ok(name)
        })?;

        if src.remaining() < 5 {
            return Err(BrokerError::malformed(
                "truncated DescribeTopicPartitions body",
            ));
        }
        let response_partition_limit = src.get_i32();
        let cursor = src.get_u8(); // nullable; 0xFF observed in practice means null
        TagBuffer::decode(src)?;

        Ok(Self {
            header,
            topics,
            response_partition_limit,
            cursor,
        })
    }
}
