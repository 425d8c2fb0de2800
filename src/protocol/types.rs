use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{BrokerError, Result};

// https://kafka.apache.org/protocol.html#protocol_types
//
// This module is the only place allowed to know how bytes map to Kafka's
// primitive wire types. Every decoder here takes a cursor over an
// already-buffered frame and fails with `BrokerError::Malformed` instead of
// panicking when the buffer runs out or a varint never terminates.

fn require(src: &Bytes, n: usize, what: &str) -> Result<()> {
    if src.remaining() < n {
        return Err(BrokerError::malformed(format!(
            "need {n} bytes for {what}, only {} remain",
            src.remaining()
        )));
    }
    Ok(())
}

/// Unsigned base-128 LEB128 varint, used for compact-length fields.
pub struct UnsignedVarInt;

impl UnsignedVarInt {
    pub fn encode(buf: &mut BytesMut, mut value: u32) {
        loop {
            let mut byte = (value & 0x7f) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            buf.put_u8(byte);
            if value == 0 {
                break;
            }
        }
    }

    pub fn decode(src: &mut Bytes) -> Result<u32> {
        let mut value: u32 = 0;
        for i in 0..5 {
            require(src, 1, "unsigned varint")?;
            let byte = src.get_u8();
            value |= ((byte & 0x7f) as u32) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(BrokerError::malformed(
            "unsigned varint did not terminate within 5 bytes",
        ))
    }
}

/// ZigZag-encoded base-128 varint (Kafka's `varint`), 32-bit range.
pub struct VarInt;

impl VarInt {
    pub fn encode(buf: &mut BytesMut, value: i32) {
        let zigzag = ((value << 1) ^ (value >> 31)) as u32;
        UnsignedVarInt::encode(buf, zigzag);
    }

    pub fn decode(src: &mut Bytes) -> Result<i32> {
        let mut value: u32 = 0;
        for i in 0..5 {
            require(src, 1, "varint")?;
            let byte = src.get_u8();
            value |= ((byte & 0x7f) as u32) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(((value >> 1) as i32) ^ -((value & 1) as i32));
            }
        }
        Err(BrokerError::malformed(
            "varint did not terminate within 5 bytes",
        ))
    }
}

/// ZigZag-encoded base-128 varint (Kafka's `varlong`), 64-bit range.
pub struct VarLong;

impl VarLong {
    pub fn encode(buf: &mut BytesMut, value: i64) {
        let mut zigzag = ((value << 1) ^ (value >> 63)) as u64;
        loop {
            let mut byte = (zigzag & 0x7f) as u8;
            zigzag >>= 7;
            if zigzag != 0 {
                byte |= 0x80;
            }
            buf.put_u8(byte);
            if zigzag == 0 {
                break;
            }
        }
    }

    pub fn decode(src: &mut Bytes) -> Result<i64> {
        let mut value: u64 = 0;
        for i in 0..10 {
            require(src, 1, "varlong")?;
            let byte = src.get_u8();
            value |= ((byte & 0x7f) as u64) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(((value >> 1) as i64) ^ -((value & 1) as i64));
            }
        }
        Err(BrokerError::malformed(
            "varlong did not terminate within 10 bytes",
        ))
    }
}

/// COMPACT_STRING: unsigned-varint length L; L=0 is null, else L-1 UTF-8 bytes.
pub struct CompactString;

impl CompactString {
    pub fn encode(buf: &mut BytesMut, value: Option<&str>) {
        match value {
            None => UnsignedVarInt::encode(buf, 0),
            Some(s) => {
                UnsignedVarInt::encode(buf, s.len() as u32 + 1);
                buf.put_slice(s.as_bytes());
            }
        }
    }

    pub fn decode(src: &mut Bytes) -> Result<Option<String>> {
        let len = UnsignedVarInt::decode(src)?;
        if len == 0 {
            return Ok(None);
        }
        let len = len as usize - 1;
        require(src, len, "compact string body")?;
        let bytes = src.copy_to_bytes(len);
        String::from_utf8(bytes.to_vec())
            .map(Some)
            .map_err(|e| BrokerError::malformed(format!("compact string is not utf-8: {e}")))
    }

    /// Convenience for required (non-nullable) strings; an absent string
    /// decodes as empty rather than failing, matching how topic names are
    /// always present on the wire in practice.
    pub fn decode_required(src: &mut Bytes) -> Result<String> {
        Ok(Self::decode(src)?.unwrap_or_default())
    }
}

/// Kafka's non-compact "nullable string": i16 length, -1 means null.
pub struct NullableString;

impl NullableString {
    pub fn encode(buf: &mut BytesMut, value: Option<&str>) {
        match value {
            None => buf.put_i16(-1),
            Some(s) => {
                buf.put_i16(s.len() as i16);
                buf.put_slice(s.as_bytes());
            }
        }
    }

    pub fn decode(src: &mut Bytes) -> Result<Option<String>> {
        require(src, 2, "nullable string length")?;
        let len = src.get_i16();
        if len < 0 {
            return Ok(None);
        }
        let len = len as usize;
        require(src, len, "nullable string body")?;
        let bytes = src.copy_to_bytes(len);
        String::from_utf8(bytes.to_vec())
            .map(Some)
            .map_err(|e| BrokerError::malformed(format!("nullable string is not utf-8: {e}")))
    }
}

/// COMPACT_BYTES / COMPACT_RECORDS: like COMPACT_STRING but opaque bytes.
pub struct CompactBytes;

impl CompactBytes {
    pub fn encode(buf: &mut BytesMut, value: Option<&[u8]>) {
        match value {
            None => UnsignedVarInt::encode(buf, 0),
            Some(bytes) => {
                UnsignedVarInt::encode(buf, bytes.len() as u32 + 1);
                buf.put_slice(bytes);
            }
        }
    }

    pub fn decode(src: &mut Bytes) -> Result<Option<Bytes>> {
        let len = UnsignedVarInt::decode(src)?;
        if len == 0 {
            return Ok(None);
        }
        let len = len as usize - 1;
        require(src, len, "compact bytes body")?;
        Ok(Some(src.copy_to_bytes(len)))
    }
}

/// COMPACT_ARRAY<T>: unsigned-varint length L; L=0 null, else L-1 elements.
pub struct CompactArray;

impl CompactArray {
    pub fn encode<T>(
        buf: &mut BytesMut,
        items: &[T],
        mut encode_item: impl FnMut(&mut BytesMut, &T),
    ) {
        UnsignedVarInt::encode(buf, items.len() as u32 + 1);
        for item in items {
            encode_item(buf, item);
        }
    }

    pub fn decode<T>(
        src: &mut Bytes,
        mut decode_item: impl FnMut(&mut Bytes) -> Result<T>,
    ) -> Result<Vec<T>> {
        let len = UnsignedVarInt::decode(src)?;
        if len == 0 {
            return Ok(Vec::new());
        }
        let len = len as usize - 1;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(decode_item(src)?);
        }
        Ok(items)
    }

    /// COMPACT_ARRAY of i32, the shape used repeatedly for replica/ISR lists.
    pub fn encode_i32(buf: &mut BytesMut, items: &[i32]) {
        Self::encode(buf, items, |b, v| b.put_i32(*v));
    }

    pub fn decode_i32(src: &mut Bytes) -> Result<Vec<i32>> {
        Self::decode(src, |s| {
            require(s, 4, "i32 array element")?;
            Ok(s.get_i32())
        })
    }
}

/// TAG_BUFFER: unsigned-varint count of tagged fields, each a
/// (tag, size) pair followed by `size` bytes of opaque data. This broker
/// never emits tagged fields, but faithfully skips whatever a client sends
/// rather than assuming the count is always zero.
pub struct TagBuffer;

impl TagBuffer {
    pub fn encode(buf: &mut BytesMut) {
        UnsignedVarInt::encode(buf, 0);
    }

    pub fn decode(src: &mut Bytes) -> Result<()> {
        let count = UnsignedVarInt::decode(src)?;
        for _ in 0..count {
            let _tag = UnsignedVarInt::decode(src)?;
            let size = UnsignedVarInt::decode(src)? as usize;
            require(src, size, "tagged field body")?;
            src.advance(size);
        }
        Ok(())
    }
}

/// 16-byte binary topic identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Uuid(pub [u8; 16]);

impl Uuid {
    pub const NIL: Uuid = Uuid([0u8; 16]);

    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.0);
    }

    pub fn decode(src: &mut Bytes) -> Result<Self> {
        require(src, 16, "uuid")?;
        let mut bytes = [0u8; 16];
        src.copy_to_slice(&mut bytes);
        Ok(Uuid(bytes))
    }

    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Debug for Uuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Uuid({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_varint_round_trips() {
        for value in [0u32, 1, 127, 128, 16384, u32::MAX] {
            let mut buf = BytesMut::new();
            UnsignedVarInt::encode(&mut buf, value);
            let mut bytes = buf.freeze();
            assert_eq!(UnsignedVarInt::decode(&mut bytes).unwrap(), value);
        }
    }

    #[test]
    fn varint_round_trips_negative_and_positive() {
        for value in [0i32, -1, 1, i32::MIN, i32::MAX, -64, 64] {
            let mut buf = BytesMut::new();
            VarInt::encode(&mut buf, value);
            let mut bytes = buf.freeze();
            assert_eq!(VarInt::decode(&mut bytes).unwrap(), value);
        }
    }

    #[test]
    fn varlong_round_trips() {
        for value in [0i64, -1, i64::MIN, i64::MAX] {
            let mut buf = BytesMut::new();
            VarLong::encode(&mut buf, value);
            let mut bytes = buf.freeze();
            assert_eq!(VarLong::decode(&mut bytes).unwrap(), value);
        }
    }

    #[test]
    fn compact_string_null_and_round_trip() {
        let mut buf = BytesMut::new();
        CompactString::encode(&mut buf, None);
        let mut bytes = buf.freeze();
        assert_eq!(bytes.as_ref(), &[0x00]);
        assert_eq!(CompactString::decode(&mut bytes).unwrap(), None);

        let mut buf = BytesMut::new();
        CompactString::encode(&mut buf, Some("foo"));
        let mut bytes = buf.freeze();
        assert_eq!(
            CompactString::decode(&mut bytes).unwrap(),
            Some("foo".to_string())
        );
    }

    #[test]
    fn compact_array_empty_vs_null_decode_the_same() {
        let mut buf = BytesMut::new();
        CompactArray::encode_i32(&mut buf, &[]);
        let mut bytes = buf.freeze();
        assert_eq!(
            CompactArray::decode_i32(&mut bytes).unwrap(),
            Vec::<i32>::new()
        );
    }

    #[test]
    fn tag_buffer_skips_unknown_tagged_fields() {
        let mut buf = BytesMut::new();
        UnsignedVarInt::encode(&mut buf, 1); // one tagged field
        UnsignedVarInt::encode(&mut buf, 7); // tag id
        UnsignedVarInt::encode(&mut buf, 3); // size
        buf.put_slice(&[1, 2, 3]);
        buf.put_u8(0xAB); // sentinel trailing byte
        let mut bytes = buf.freeze();
        TagBuffer::decode(&mut bytes).unwrap();
        assert_eq!(bytes.get_u8(), 0xAB);
    }

    #[test]
    fn uuid_round_trips() {
        let mut buf = BytesMut::new();
        let uuid = Uuid([7u8; 16]);
        uuid.encode(&mut buf);
        let mut bytes = buf.freeze();
        assert_eq!(Uuid::decode(&mut bytes).unwrap(), uuid);
    }
}
