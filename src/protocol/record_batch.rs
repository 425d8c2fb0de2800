use bytes::{Buf, Bytes};

use crate::error::{BrokerError, Result};

use super::types::{CompactArray, VarInt, VarLong};

/// A Kafka v2 record batch: a fixed-width header followed by a sequence of
/// varint-framed inner records. Used both for the KRaft cluster-metadata log
/// and for the raw bytes a Produce request appends to a partition log.
#[derive(Debug)]
#[allow(dead_code)]
pub struct RecordBatch {
    pub base_offset: i64,
    pub batch_length: i32,
    pub partition_leader_epoch: i32,
    pub magic: i8,
    pub crc: u32,
    pub attributes: i16,
    pub last_offset_delta: i32,
    pub base_timestamp: i64,
    pub max_timestamp: i64,
    pub producer_id: i64,
    pub producer_epoch: i16,
    pub base_sequence: i32,
    pub records: Vec<Record>,
}

impl RecordBatch {
    /// Reads a single batch from `src`. Returns `Ok(None)` when `src` is
    /// empty at a batch boundary (clean EOF); errors if it runs out
    /// mid-batch.
    pub fn decode(src: &mut Bytes) -> Result<Option<Self>> {
        if !src.has_remaining() {
            return Ok(None);
        }
        if src.remaining() < 12 {
            return Err(BrokerError::malformed(
                "truncated record batch: missing base offset/batch length",
            ));
        }

        let base_offset = src.get_i64();
        let batch_length = src.get_i32();

        if src.remaining() < batch_length as usize {
            return Err(BrokerError::malformed(
                "truncated record batch: batch length exceeds remaining data",
            ));
        }

        let mut body = src.copy_to_bytes(batch_length as usize);

        if body.remaining() < 45 {
            return Err(BrokerError::malformed(
                "truncated record batch header",
            ));
        }

        let partition_leader_epoch = body.get_i32();
        let magic = body.get_i8();
        let crc = body.get_u32();
        let attributes = body.get_i16();
        let last_offset_delta = body.get_i32();
        let base_timestamp = body.get_i64();
        let max_timestamp = body.get_i64();
        let producer_id = body.get_i64();
        let producer_epoch = body.get_i16();
        let base_sequence = body.get_i32();

        if body.remaining() < 4 {
            return Err(BrokerError::malformed(
                "truncated record batch: missing record count",
            ));
        }
        let record_count = body.get_i32();

        let mut records = Vec::with_capacity(record_count.max(0) as usize);
        for _ in 0..record_count {
            match Record::decode(&mut body) {
                Ok(record) => records.push(record),
                // A malformed inner record aborts this batch's remaining
                // records but must not abort the enclosing scan.
                Err(_) => break,
            }
        }

        Ok(Some(RecordBatch {
            base_offset,
            batch_length,
            partition_leader_epoch,
            magic,
            crc,
            attributes,
            last_offset_delta,
            base_timestamp,
            max_timestamp,
            producer_id,
            producer_epoch,
            base_sequence,
            records,
        }))
    }
}

/// A single inner record. `key`/`value` use Kafka's signed-varint-prefixed
/// byte arrays where -1 means null.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Record {
    pub attributes: i8,
    pub timestamp_delta: i64,
    pub offset_delta: i32,
    pub key: Option<Bytes>,
    pub value: Option<Bytes>,
}

impl Record {
    fn decode(src: &mut Bytes) -> Result<Self> {
        let _length = VarInt::decode(src)?;
        if src.remaining() < 1 {
            return Err(BrokerError::malformed("truncated record: missing attributes"));
        }
        let attributes = src.get_i8();
        let timestamp_delta = VarLong::decode(src)?;
        let offset_delta = VarInt::decode(src)?;
        let key = decode_varint_bytes(src)?;
        let value = decode_varint_bytes(src)?;

        let header_count = VarInt::decode(src)?;
        for _ in 0..header_count.max(0) {
            let _ = decode_varint_bytes(src)?; // header key
            let _ = decode_varint_bytes(src)?; // header value
        }

        Ok(Record {
            attributes,
            timestamp_delta,
            offset_delta,
            key,
            value,
        })
    }
}

/// Kafka's signed-varint-length-prefixed byte array: -1 means null.
fn decode_varint_bytes(src: &mut Bytes) -> Result<Option<Bytes>> {
    let len = VarInt::decode(src)?;
    if len < 0 {
        return Ok(None);
    }
    let len = len as usize;
    if src.remaining() < len {
        return Err(BrokerError::malformed(
            "varint-prefixed byte array exceeds remaining data",
        ));
    }
    Ok(Some(src.copy_to_bytes(len)))
}

/// Re-exported so the metadata loader can decode replica/ISR lists without
/// reaching back into `types` directly.
pub fn decode_i32_compact_array(src: &mut Bytes) -> Result<Vec<i32>> {
    CompactArray::decode_i32(src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    fn encode_record(key: Option<&[u8]>, value: Option<&[u8]>) -> BytesMut {
        let mut b = BytesMut::new();
        // placeholder length, patched below
        let mut body = BytesMut::new();
        body.put_i8(0); // attributes
        VarLong::encode(&mut body, 0); // timestamp delta
        VarInt::encode(&mut body, 0); // offset delta
        match key {
            None => VarInt::encode(&mut body, -1),
            Some(k) => {
                VarInt::encode(&mut body, k.len() as i32);
                body.put_slice(k);
            }
        }
        match value {
            None => VarInt::encode(&mut body, -1),
            Some(v) => {
                VarInt::encode(&mut body, v.len() as i32);
                body.put_slice(v);
            }
        }
        VarInt::encode(&mut body, 0); // header count
        VarInt::encode(&mut b, body.len() as i32);
        b.extend_from_slice(&body);
        b
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
        header.put_i32(records.len() as i32); // record count
        header.extend_from_slice(&records_bytes);

        let mut out = BytesMut::new();
        out.put_i64(0); // base offset
        out.put_i32(header.len() as i32); // batch length
        out.extend_from_slice(&header);
        out
    }

    #[test]
    fn decodes_a_batch_with_one_record() {
        let record = encode_record(None, Some(b"hello"));
        let batch_bytes = encode_batch(&[record]);
        let mut src = batch_bytes.freeze();

        let batch = RecordBatch::decode(&mut src).unwrap().unwrap();
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].key, None);
        assert_eq!(batch.records[0].value.as_deref(), Some(&b"hello"[..]));
        assert!(!src.has_remaining());
    }

    #[test]
    fn clean_eof_at_batch_boundary() {
        let mut src = Bytes::new();
        assert!(RecordBatch::decode(&mut src).unwrap().is_none());
    }

    #[test]
    fn truncated_mid_batch_is_an_error() {
        let record = encode_record(None, Some(b"hello"));
        let mut batch_bytes = encode_batch(&[record]);
        batch_bytes.truncate(batch_bytes.len() - 3);
        let mut src = batch_bytes.freeze();
        assert!(RecordBatch::decode(&mut src).is_err());
    }
}
