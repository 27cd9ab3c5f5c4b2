// HELLO payload: subnet mask, hello interval, zero padding (8 bytes).

use std::net::Ipv4Addr;

use crate::error::{MospfError, Result};

pub const HELLO_PAYLOAD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelloPayload {
    pub mask: Ipv4Addr,
    pub hello_interval: u16,
}

impl HelloPayload {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HELLO_PAYLOAD_LEN);
        buf.extend_from_slice(&self.mask.octets());
        buf.extend_from_slice(&self.hello_interval.to_be_bytes());
        buf.extend_from_slice(&[0u8; 2]); // padding
        buf
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < HELLO_PAYLOAD_LEN {
            return Err(MospfError::Validation(format!(
                "short HELLO payload: {} bytes (need {})",
                buf.len(),
                HELLO_PAYLOAD_LEN
            )));
        }
        let mask = Ipv4Addr::new(buf[0], buf[1], buf[2], buf[3]);
        let hello_interval = u16::from_be_bytes([buf[4], buf[5]]);
        Ok(HelloPayload {
            mask,
            hello_interval,
        })
    }
}
