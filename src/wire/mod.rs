// Wire encoding for the mOSPF protocol: a common header followed by a
// HELLO or LSU payload. Every struct here round-trips through `encode`
// then `decode` byte-for-byte; see tests in each submodule.

pub mod header;
pub mod hello;
pub mod lsu;

pub use header::{MospfHeader, HEADER_LEN, MOSPF_VERSION, TYPE_HELLO, TYPE_LSU};
pub use hello::HelloPayload;
pub use lsu::{Lsa, LsuPayload, LSA_LEN, LSU_HEADER_LEN, MAX_LSU_TTL};

use crate::error::{MospfError, Result};

/// A fully decoded mOSPF packet: header plus typed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Hello(MospfHeader, HelloPayload),
    Lsu(MospfHeader, LsuPayload),
}

impl Packet {
    pub fn header(&self) -> &MospfHeader {
        match self {
            Packet::Hello(h, _) => h,
            Packet::Lsu(h, _) => h,
        }
    }

    /// Encode header + payload into one contiguous buffer, filling in
    /// `length` and `checksum` as it goes.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Packet::Hello(header, payload) => {
                let payload_bytes = payload.encode();
                encode_with_header(header, &payload_bytes, TYPE_HELLO)
            }
            Packet::Lsu(header, payload) => {
                let payload_bytes = payload.encode();
                encode_with_header(header, &payload_bytes, TYPE_LSU)
            }
        }
    }

    /// Decode a full packet, validating version, checksum, and area id
    /// against `expected_area`. On any mismatch this returns
    /// `MospfError::Validation` describing which check failed, matching
    /// the three validation failure cases handled by the dispatcher.
    pub fn decode(buf: &[u8], expected_area: u32) -> Result<Packet> {
        let (header, rest) = MospfHeader::decode(buf)?;
        if header.version != MOSPF_VERSION {
            return Err(MospfError::Validation(format!(
                "bad version {} (expected {})",
                header.version, MOSPF_VERSION
            )));
        }
        if !header.checksum_valid(buf) {
            return Err(MospfError::Validation("checksum mismatch".into()));
        }
        if header.area_id != expected_area {
            return Err(MospfError::Validation(format!(
                "bad area {} (expected {})",
                header.area_id, expected_area
            )));
        }
        match header.packet_type {
            TYPE_HELLO => {
                let payload = HelloPayload::decode(rest)?;
                Ok(Packet::Hello(header, payload))
            }
            TYPE_LSU => {
                let payload = LsuPayload::decode(rest)?;
                Ok(Packet::Lsu(header, payload))
            }
            other => Err(MospfError::UnknownPacketType(other)),
        }
    }
}

fn encode_with_header(header: &MospfHeader, payload: &[u8], packet_type: u8) -> Vec<u8> {
    let mut header = header.clone();
    header.packet_type = packet_type;
    header.length = (HEADER_LEN + payload.len()) as u16;
    header.checksum = 0;

    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    header.encode_into(&mut buf);
    buf.extend_from_slice(payload);

    let checksum = header::mospf_checksum(&buf[..HEADER_LEN]);
    buf[header::CHECKSUM_OFFSET..header::CHECKSUM_OFFSET + 2]
        .copy_from_slice(&checksum.to_be_bytes());
    buf
}
