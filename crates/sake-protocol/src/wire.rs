//! Byte-exact read/write helpers shared by the handshake and record layers.
//!
//! All integers are big-endian on the wire (spec.md §6). Grounded on
//! `zrc_transport::framing::LengthCodec` for the length-prefix idiom,
//! adapted from an in-memory `Buf`/`BytesMut` codec to blocking
//! `Read`/`Write` since this protocol has no async runtime (see
//! `crate::session` for why).

use std::io::{Read, Write};

use crate::error::ProtocolError;

/// Read exactly `buf.len()` bytes, translating a short read into
/// [`ProtocolError::ConnectionClosed`] via `io::Error`'s `UnexpectedEof` kind.
pub fn read_exact(stream: &mut impl Read, buf: &mut [u8]) -> Result<(), ProtocolError> {
    stream.read_exact(buf).map_err(ProtocolError::from)
}

pub fn write_all(stream: &mut impl Write, buf: &[u8]) -> Result<(), ProtocolError> {
    stream.write_all(buf).map_err(ProtocolError::from)
}

pub fn read_u32_be(stream: &mut impl Read) -> Result<u32, ProtocolError> {
    let mut buf = [0u8; 4];
    read_exact(stream, &mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

pub fn write_u32_be(stream: &mut impl Write, value: u32) -> Result<(), ProtocolError> {
    write_all(stream, &value.to_be_bytes())
}

/// Read exactly `expected.len()` bytes and require they match `expected`.
pub fn read_literal(stream: &mut impl Read, expected: &'static [u8]) -> Result<(), ProtocolError> {
    let mut buf = vec![0u8; expected.len()];
    read_exact(stream, &mut buf)?;
    if buf == expected {
        Ok(())
    } else {
        Err(ProtocolError::UnexpectedLiteral { expected, actual: buf })
    }
}

pub fn write_literal(stream: &mut impl Write, literal: &[u8]) -> Result<(), ProtocolError> {
    write_all(stream, literal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn u32_round_trip() {
        let mut buf = Vec::new();
        write_u32_be(&mut buf, 0xDEADBEEF).unwrap();
        let mut cursor = Cursor::new(buf);
        assert_eq!(read_u32_be(&mut cursor).unwrap(), 0xDEADBEEF);
    }

    #[test]
    fn literal_round_trip() {
        let mut buf = Vec::new();
        write_literal(&mut buf, b"READY").unwrap();
        let mut cursor = Cursor::new(buf);
        read_literal(&mut cursor, b"READY").unwrap();
    }

    #[test]
    fn literal_mismatch_is_rejected() {
        let mut cursor = Cursor::new(b"WRONG".to_vec());
        let err = read_literal(&mut cursor, b"READY").unwrap_err();
        assert!(matches!(err, ProtocolError::UnexpectedLiteral { .. }));
    }

    #[test]
    fn short_read_reports_connection_closed() {
        let mut cursor = Cursor::new(b"RE".to_vec());
        let err = read_literal(&mut cursor, b"READY").unwrap_err();
        assert!(matches!(err, ProtocolError::ConnectionClosed));
    }
}
