//! Wire protocol codec for the ambry request/response protocol.
//!
//! Length-prefixed frames in both directions:
//!
//! ```text
//! request:  [u32 LE length] [payload: length bytes]
//! response: [u8 status] [u32 LE length] [body: length bytes]
//! ```
//!
//! Byte order is fixed to little-endian on the wire regardless of host
//! architecture. Earlier versions used host order, which silently
//! misinterprets lengths between endpoints of different endianness.

/// Response header size: 1 status byte + 4 length bytes.
pub const HEADER_LEN: usize = 5;

/// A decoded response frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code. 0 = success; nonzero values are application-defined
    /// signaling, passed through to the caller unmodified.
    pub status: u8,
    /// Body bytes, exactly as many as the wire length field declared.
    pub body: Vec<u8>,
}

/// Encode a request payload into wire format.
///
/// Returns `[u32 LE length][payload]`. An empty payload encodes to exactly
/// four zero bytes with nothing trailing.
pub fn encode_request(payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4 + payload.len());
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Incremental response decoder that handles partial reads.
///
/// Feed bytes via [`ResponseDecoder::feed`] and extract complete responses.
/// A single read is never assumed to deliver a whole frame: the 5-byte
/// header is accumulated before the length field is trusted, then exactly
/// that many body bytes are awaited.
#[derive(Debug, Default)]
pub struct ResponseDecoder {
    buf: Vec<u8>,
}

impl ResponseDecoder {
    /// Create a new decoder with an empty buffer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Feed bytes into the decoder and extract all complete responses.
    ///
    /// Incomplete data is buffered for the next call. Any status byte and
    /// any declared length are valid on this side of the protocol, so
    /// decoding itself cannot fail; truncation is detected by the caller
    /// when the stream closes with [`ResponseDecoder::has_partial`] set.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Response> {
        self.buf.extend_from_slice(bytes);
        let mut responses = Vec::new();

        loop {
            // Need the full header before the length field can be trusted
            if self.buf.len() < HEADER_LEN {
                break;
            }

            let status = self.buf[0];
            let length =
                u32::from_le_bytes([self.buf[1], self.buf[2], self.buf[3], self.buf[4]]);

            // Widened compare: header + a length near u32::MAX must not
            // overflow usize on 32-bit targets
            let total = HEADER_LEN as u64 + u64::from(length);
            if (self.buf.len() as u64) < total {
                break; // Incomplete frame, wait for more data
            }
            let total = total as usize;

            let body = self.buf[HEADER_LEN..total].to_vec();
            responses.push(Response { status, body });

            // Remove consumed bytes
            self.buf.drain(..total);
        }

        responses
    }

    /// Returns true if the decoder has buffered partial data.
    pub fn has_partial(&self) -> bool {
        !self.buf.is_empty()
    }
}
