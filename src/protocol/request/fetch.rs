use bytes::{Buf, Bytes};

use crate::error::{BrokerError, Result};
use crate::protocol::types::{CompactArray, CompactString, TagBuffer, Uuid};

use super::HeaderV2;

/// https://kafka.apache.org/protocol.html#The_Messages_Fetch
#[derive(Debug)]
pub struct FetchRequest {
    pub header: HeaderV2,
    pub max_wait_ms: i32,
    pub min_bytes: i32,
    pub max_bytes: i32,
    pub isolation_level: i8,
    pub session_id: i32,
    pub session_epoch: i32,
    pub topics: Vec<FetchTopic>,
    pub rack_id: Option<String>,
}

#[derive(Debug)]
pub struct FetchTopic {
    pub topic_id: Uuid,
    pub partitions: Vec<FetchPartition>,
}

#[derive(Debug)]
pub struct FetchPartition {
    pub partition: i32,
    pub current_leader_epoch: i32,
    pub fetch_offset: i64,
    pub last_fetched_epoch: i32,
    pub log_start_offset: i64,
    pub partition_max_bytes: i32,
}

fn require(src: &Bytes, n: usize) -> Result<()> {
    if src.remaining() < n {
        return Err(BrokerError::malformed("truncated Fetch request"));
    }
    Ok(())
}

impl FetchRequest {
    pub fn decode(src: &mut Bytes) -> Result<Self> {
        let header = HeaderV2::decode(src)?;

        require(src, 21)?;
        let max_wait_ms = src.get_i32();
        let min_bytes = src.get_i32();
        let max_bytes = src.get_i32();
        let isolation_level = src.get_i8();
        let session_id = src.get_i32();
        let session_epoch = src.get_i32();

        let topics = CompactArray::decode(src, |s| {
            let topic_id = Uuid::decode(s)?;
            let partitions = CompactArray::decode(s, |s| {
                require(s, 24)?;
                let partition = s.get_i32();
                let current_leader_epoch = s.get_i32();
                let fetch_offset = s.get_i64();
                let last_fetched_epoch = s.get_i32();
                let log_start_offset = s.get_i64();
                let partition_max_bytes = s.get_i32();
                TagBuffer::decode(s)?;
                Ok(FetchPartition {
                    partition,
                    current_leader_epoch,
                    fetch_offset,
                    last_fetched_epoch,
                    log_start_offset,
                    partition_max_bytes,
                })
            })?;
            TagBuffer::decode(s)?;
            Ok(FetchTopic {
                topic_id,
                partitions,
            })
        })?;

        // forgottenTopicsData: parsed and discarded, this broker has no
        // session state to forget partitions from.
        let _forgotten_topics = CompactArray::decode(src, |s| {
            let topic_id = Uuid::decode(s)?;
            let partitions = CompactArray::decode_i32(s)?;
            TagBuffer::decode(s)?;
            Ok((topic_id, partitions))
        })?;

        let rack_id = CompactString::decode(src)?;
        TagBuffer::decode(src)?;

        Ok(Self {
            header,
            max_wait_ms,
            min_bytes,
            max_bytes,
            isolation_level,
            session_id,
            session_epoch,
            topics,
            rack_id,
        })
    }
}
