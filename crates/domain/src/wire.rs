//! Fixed-header DNS wire operations.
//!
//! Only the 12-byte message header is ever read or written; everything past
//! it rides along untouched.

/// Size of the fixed DNS message header.
pub const HEADER_LEN: usize = 12;

/// QR bit in the upper flags byte: set means response.
const FLAGS_QR: u8 = 0x80;

/// Opcode bits in the upper flags byte.
const FLAGS_OPCODE: u8 = 0x78;

/// RCODE 5, REFUSED. Written as the whole lower flags byte, which also
/// clears RA and the reserved Z bits.
const FLAGS_LOW_REFUSED: u8 = 0x05;

/// Build a REFUSED response for a raw query.
///
/// The response is the query, same length, with the header rewritten: QR
/// set, opcode cleared, RCODE 5, and all four section counts zeroed. The
/// transaction id and any bytes past the header are left as-is, so the body
/// may still carry the original question even though the counts say empty.
/// Queries shorter than a header get no response at all.
pub fn build_refusal(query: &[u8]) -> Option<Vec<u8>> {
    if query.len() < HEADER_LEN {
        return None;
    }
    let mut response = query.to_vec();
    response[2] |= FLAGS_QR;
    response[2] &= !FLAGS_OPCODE;
    response[3] = FLAGS_LOW_REFUSED;
    for b in &mut response[4..HEADER_LEN] {
        *b = 0;
    }
    Some(response)
}
