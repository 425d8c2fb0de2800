use std::collections::HashMap;
use std::path::Path;

use bytes::{Buf, Bytes, BytesMut};
use tracing::{info, warn};

use crate::error::{BrokerError, Result};
use crate::protocol::record_batch::{decode_i32_compact_array, RecordBatch};
use crate::protocol::types::{CompactString, TagBuffer, Uuid};

use super::store::{MetadataStore, Partition, Topic};

const TOPIC_RECORD_TYPE: u8 = 2;
const PARTITION_RECORD_TYPE: u8 = 3;

/// Scans the cluster-metadata log at `path` and builds the in-memory
/// catalog. A missing file is not fatal: the broker starts with an empty
/// catalog, as a freshly initialized cluster would have none of its topics
/// registered yet.
pub fn load(path: impl AsRef<Path>) -> Result<MetadataStore> {
    let path = path.as_ref();
    let file_bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "cluster metadata log not found, starting with an empty catalog");
            return Ok(MetadataStore::default());
        }
        Err(err) => return Err(err.into()),
    };

    let mut data: Bytes = BytesMut::from(&file_bytes[..]).freeze();
    let mut topics: HashMap<String, Topic> = HashMap::new();
    let mut batch_count = 0usize;

    loop {
        match RecordBatch::decode(&mut data) {
            Ok(None) => break,
            Ok(Some(batch)) => {
                batch_count += 1;
                for record in &batch.records {
                    let Some(value) = record.value.clone() else {
                        continue;
                    };
                    if let Err(err) = apply_record(&mut topics, value) {
                        warn!(%err, "skipping malformed metadata record");
                    }
                }
            }
            Err(err) => {
                warn!(%err, "truncated cluster metadata batch, stopping scan");
                break;
            }
        }
    }

    let partition_count: usize = topics.values().map(|t| t.partitions.len()).sum();
    info!(
        batches = batch_count,
        topics = topics.len(),
        partitions = partition_count,
        "loaded cluster metadata"
    );

    Ok(MetadataStore::new(topics))
}

fn apply_record(topics: &mut HashMap<String, Topic>, mut value: Bytes) -> Result<()> {
    if value.remaining() < 2 {
        return Err(BrokerError::malformed("metadata record value too short"));
    }
    let _frame_version = value.get_u8();
    let record_type = value.get_u8();

    match record_type {
        TOPIC_RECORD_TYPE => apply_topic_record(topics, &mut value),
        PARTITION_RECORD_TYPE => apply_partition_record(topics, &mut value),
        other => {
            // Feature-level records and anything else this broker doesn't
            // need to act on; not an error.
            let _ = other;
            Ok(())
        }
    }
}

fn apply_topic_record(topics: &mut HashMap<String, Topic>, value: &mut Bytes) -> Result<()> {
    if value.remaining() < 1 {
        return Err(BrokerError::malformed("truncated TopicRecord"));
    }
    let _version = value.get_u8();
    let name = CompactString::decode_required(value)?;
    let topic_id = Uuid::decode(value)?;
    TagBuffer::decode(value)?;

    topics.insert(
        name.clone(),
        Topic {
            name,
            topic_id,
            partitions: Vec::new(),
        },
    );
    Ok(())
}

fn apply_partition_record(topics: &mut HashMap<String, Topic>, value: &mut Bytes) -> Result<()> {
    if value.remaining() < 1 {
        return Err(BrokerError::malformed("truncated PartitionRecord"));
    }
    let _version = value.get_u8();

    if value.remaining() < 4 {
        return Err(BrokerError::malformed(
            "truncated PartitionRecord: missing partition index",
        ));
    }
    let partition_index = value.get_i32();
    let topic_id = Uuid::decode(value)?;
    let replica_nodes = decode_i32_compact_array(value)?;
    let isr_nodes = decode_i32_compact_array(value)?;
    let _removing_replicas = decode_i32_compact_array(value)?;
    let _adding_replicas = decode_i32_compact_array(value)?;

    if value.remaining() < 4 {
        return Err(BrokerError::malformed(
            "truncated PartitionRecord: missing leader id",
        ));
    }
    let leader_id = value.get_i32();

    if value.remaining() < 1 {
        return Err(BrokerError::malformed(
            "truncated PartitionRecord: missing leader recovery state",
        ));
    }
    let _leader_recovery_state = value.get_i8();

    if value.remaining() < 4 {
        return Err(BrokerError::malformed(
            "truncated PartitionRecord: missing leader epoch",
        ));
    }
    let _leader_epoch = value.get_i32();
    TagBuffer::decode(value)?;

    // A PartitionRecord whose topic hasn't been seen yet is silently
    // dropped: the metadata log is written in causal order, so this only
    // happens for a record referring to a topic that was later deleted.
    if let Some(topic) = topics.values_mut().find(|t| t.topic_id == topic_id) {
        topic.partitions.push(Partition {
            partition_index,
            leader_id,
            replica_nodes,
            isr_nodes,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::types::VarInt;
    use bytes::{BufMut, BytesMut};
    use std::io::Write;

    fn encode_topic_record(name: &str, topic_id: Uuid) -> BytesMut {
        let mut record_value = BytesMut::new();
        record_value.put_u8(1); // frame version
        record_value.put_u8(TOPIC_RECORD_TYPE);
        record_value.put_u8(0); // record version
        CompactString::encode(&mut record_value, Some(name));
        topic_id.encode(&mut record_value);
        TagBuffer::encode(&mut record_value);
        record_value
    }

    fn encode_partition_record(
        topic_id: Uuid,
        partition_index: i32,
        leader_id: i32,
        replicas: &[i32],
        isr: &[i32],
    ) -> BytesMut {
        use crate::protocol::types::CompactArray;

        let mut record_value = BytesMut::new();
        record_value.put_u8(1); // frame version
        record_value.put_u8(PARTITION_RECORD_TYPE);
        record_value.put_u8(1); // record version
        record_value.put_i32(partition_index);
        topic_id.encode(&mut record_value);
        CompactArray::encode_i32(&mut record_value, replicas);
        CompactArray::encode_i32(&mut record_value, isr);
        CompactArray::encode_i32(&mut record_value, &[]); // removing
        CompactArray::encode_i32(&mut record_value, &[]); // adding
        record_value.put_i32(leader_id);
        record_value.put_i8(0); // leader recovery state
        record_value.put_i32(0); // leader epoch
        TagBuffer::encode(&mut record_value);
        record_value
    }

    fn encode_record(value: &[u8]) -> BytesMut {
        let mut body = BytesMut::new();
        body.put_i8(0); // attributes
        VarInt::encode(&mut body, 0); // timestamp delta (varlong normally, but 0 is 1 byte either way)
        VarInt::encode(&mut body, 0); // offset delta
        VarInt::encode(&mut body, -1); // null key
        VarInt::encode(&mut body, value.len() as i32);
        body.put_slice(value);
        VarInt::encode(&mut body, 0); // header count

        let mut record = BytesMut::new();
        VarInt::encode(&mut record, body.len() as i32);
        record.extend_from_slice(&body);
        record
    }

    fn encode_batch(records: &[BytesMut]) -> BytesMut {
        let mut records_bytes = BytesMut::new();
        for r in records {
            records_bytes.extend_from_slice(r);
        }

        let mut header = BytesMut::new();
        header.put_i32(0); // partition leader epoch
        header.put_i8(2); // magic
        header.put_u32(0); // crc
        header.put_i16(0); // attributes
        header.put_i32(0); // last offset delta
        header.put_i64(0); // base timestamp
        header.put_i64(0); // max timestamp
        header.put_i64(-1); // producer id
        header.put_i16(-1); // producer epoch
        header.put_i32(-1); // base sequence
        header.put_i32(records.len() as i32);
        header.extend_from_slice(&records_bytes);

        let mut out = BytesMut::new();
        out.put_i64(0); // base offset
        out.put_i32(header.len() as i32);
        out.extend_from_slice(&header);
        out
    }

    #[test]
    fn loads_topic_then_partition_into_catalog() {
        let topic_id = Uuid([9u8; 16]);
        let topic_record = encode_record(&encode_topic_record("foo", topic_id));
        let partition_record =
            encode_record(&encode_partition_record(topic_id, 0, 7, &[7], &[7]));
        let batch = encode_batch(&[topic_record, partition_record]);

        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("metadata.log");
        std::fs::File::create(&log_path)
            .unwrap()
            .write_all(&batch)
            .unwrap();

        let store = load(&log_path).unwrap();
        let topic = store.get_by_name("foo").expect("topic foo loaded");
        assert_eq!(topic.topic_id, topic_id);
        assert_eq!(topic.partitions.len(), 1);
        assert_eq!(topic.partitions[0].partition_index, 0);
        assert_eq!(topic.partitions[0].leader_id, 7);
        assert_eq!(topic.partitions[0].replica_nodes, vec![7]);
        assert_eq!(topic.partitions[0].isr_nodes, vec![7]);
    }

    #[test]
    fn missing_file_yields_empty_catalog() {
        let store = load("/nonexistent/path/for/kafka-broker-tests.log").unwrap();
        assert_eq!(store.get_all().count(), 0);
    }

    #[test]
    fn partition_record_before_its_topic_is_dropped() {
        let topic_id = Uuid([3u8; 16]);
        let partition_record =
            encode_record(&encode_partition_record(topic_id, 0, 1, &[1], &[1]));
        let batch = encode_batch(&[partition_record]);

        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("metadata.log");
        std::fs::File::create(&log_path)
            .unwrap()
            .write_all(&batch)
            .unwrap();

        let store = load(&log_path).unwrap();
        assert_eq!(store.get_all().count(), 0);
    }
}
