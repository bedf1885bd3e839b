//! Discovery request/response codec.
//!
//! The request is a fixed 10-byte token. Bridges answer with ASCII text of
//! the form `<address>,<hex-hardware-address>,<model>`; only the first two
//! tokens are used.

use crate::error::ParseError;
use crate::types::BridgeRecord;

/// Discovery request payload (`Link_Wi-Fi`)
pub const DISCOVERY_REQUEST: [u8; 10] = [0x4C, 0x69, 0x6E, 0x6B, 0x5F, 0x57, 0x69, 0x2D, 0x46, 0x69];

/// Delimiters separating response fields
const FIELD_DELIMITERS: [char; 2] = [',', ':'];

/// Build the discovery request datagram.
pub fn encode_discovery_request() -> [u8; 10] {
    DISCOVERY_REQUEST
}

/// Parse a bridge's discovery response into a record.
pub fn decode_response(datagram: &[u8]) -> Result<BridgeRecord, ParseError> {
    if datagram.is_empty() {
        return Err(ParseError::Empty);
    }

    let text = String::from_utf8_lossy(datagram);
    let mut fields = text
        .split(&FIELD_DELIMITERS[..])
        .map(|field| field.trim_matches(|c: char| c.is_whitespace() || c == '\0'));

    let address = fields
        .next()
        .filter(|f| !f.is_empty())
        .ok_or(ParseError::MissingField("address"))?;
    let raw_hardware = fields
        .next()
        .filter(|f| !f.is_empty())
        .ok_or(ParseError::MissingField("hardware address"))?;

    Ok(BridgeRecord::new(address, format_hardware_address(raw_hardware)))
}

/// Insert a colon after every pair of characters, without a trailing one.
///
/// `ACCF23112233` becomes `AC:CF:23:11:22:33`.
pub fn format_hardware_address(raw: &str) -> String {
    let mut formatted = String::with_capacity(raw.len() + raw.len() / 2);
    for (i, c) in raw.chars().enumerate() {
        if i > 0 && i % 2 == 0 {
            formatted.push(':');
        }
        formatted.push(c);
    }
    formatted
}
