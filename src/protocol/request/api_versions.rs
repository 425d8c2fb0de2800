use bytes::Bytes;

use crate::error::Result;

use super::HeaderV2;

/// ApiVersions has no flexible body fields this broker reads; everything the
/// client needs is already in the header.
// https://kafka.apache.org/protocol.html#The_Messages_ApiVersions
#[derive(Debug)]
pub struct ApiVersionsRequest {
    pub header: HeaderV2,
}

impl ApiVersionsRequest {
    pub fn decode(src: &mut Bytes) -> Result<Self> {
        let header = HeaderV2::decode(src)?;
        Ok(Self { header })
    }
}
