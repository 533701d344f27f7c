use thiserror::Error;

/// Total bytes on the wire for one analyzer response, terminator included.
pub const FRAME_LEN: usize = 16;
/// Everything before this offset is covered by the checksum.
pub const CHECKSUM_OFFSET: usize = 13;

pub const LEADER: u8 = 0x02;
pub const TERMINATOR: u8 = 0x0D;
pub const DELIMITER: u8 = b',';

const LENGTH: [u8; 2] = *b"0F";
const COMMAND: [u8; 2] = *b"RD";
const ECHO: [u8; 2] = *b"CO";
const DATA: core::ops::Range<usize> = 8..12;

/// "Read CO value" request, sent unchanged on every exchange.
pub const REQUEST: [u8; 10] = [
    LEADER, b'0', b'A', COMMAND[0], COMMAND[1], DELIMITER, ECHO[0], ECHO[1], b'C', b'7',
];

const HEX: &[u8; 16] = b"0123456789ABCDEF";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("short frame: {0} bytes")]
    Short(usize),
    #[error("checksum {calc}!={rx}")]
    Checksum { calc: String, rx: String },
    #[error("bad CO digits {0:?}")]
    BadDigits(String),
}

/// Sum of `bytes` mod 256 as two uppercase hex digits.
pub fn checksum(bytes: &[u8]) -> [u8; 2] {
    let sum = bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    [HEX[(sum >> 4) as usize], HEX[(sum & 0x0F) as usize]]
}

/// Validate the checksum of the first `received` bytes of `frame`.
pub fn verify_checksum(frame: &[u8], received: usize) -> Result<(), FrameError> {
    let received = received.min(frame.len());
    if received < FRAME_LEN {
        return Err(FrameError::Short(received));
    }
    let calc = checksum(&frame[..CHECKSUM_OFFSET]);
    let rx = &frame[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2];
    if !calc.eq_ignore_ascii_case(rx) {
        return Err(FrameError::Checksum {
            calc: String::from_utf8_lossy(&calc).into_owned(),
            rx: String::from_utf8_lossy(rx).into_owned(),
        });
    }
    Ok(())
}

/// Receive buffer for one analyzer response. Re-filled in place every cycle.
#[derive(Debug, Clone)]
pub struct ResponseFrame {
    buf: [u8; FRAME_LEN],
    received: usize,
}

impl Default for ResponseFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseFrame {
    pub fn new() -> Self {
        Self {
            buf: [0; FRAME_LEN],
            received: 0,
        }
    }

    pub fn clear(&mut self) {
        self.buf = [0; FRAME_LEN];
        self.received = 0;
    }

    pub fn buf_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }

    pub fn set_received(&mut self, n: usize) {
        self.received = n.min(FRAME_LEN);
    }

    pub fn received(&self) -> &[u8] {
        &self.buf[..self.received]
    }

    pub fn validate(&self) -> Result<(), FrameError> {
        verify_checksum(&self.buf, self.received)
    }

    pub fn leader(&self) -> u8 {
        self.buf[0]
    }

    pub fn length(&self) -> &[u8] {
        &self.buf[1..3]
    }

    pub fn command(&self) -> &[u8] {
        &self.buf[3..5]
    }

    pub fn echo(&self) -> &[u8] {
        &self.buf[6..8]
    }

    /// data_04..data_01, most significant digit first.
    pub fn data_digits(&self) -> &[u8] {
        &self.buf[DATA]
    }

    /// Validate, then decode the CO reading. One call per cycle.
    pub fn co_value(&self) -> Result<u16, FrameError> {
        self.validate()?;
        decode_digits(self.data_digits())
    }
}

fn decode_digits(digits: &[u8]) -> Result<u16, FrameError> {
    // from_str_radix would also take a leading '+'
    if !digits.iter().all(u8::is_ascii_hexdigit) {
        return Err(FrameError::BadDigits(
            String::from_utf8_lossy(digits).into_owned(),
        ));
    }
    digits
        .iter()
        .try_fold(0u16, |acc, d| {
            let nibble = (*d as char).to_digit(16)? as u16;
            acc.checked_mul(16)?.checked_add(nibble)
        })
        .ok_or_else(|| FrameError::BadDigits(String::from_utf8_lossy(digits).into_owned()))
}

/// A well-formed response carrying `value`, as the analyzer would send it.
pub fn build_response(value: u16) -> [u8; FRAME_LEN] {
    let mut f = [0u8; FRAME_LEN];
    f[0] = LEADER;
    f[1..3].copy_from_slice(&LENGTH);
    f[3..5].copy_from_slice(&COMMAND);
    f[5] = DELIMITER;
    f[6..8].copy_from_slice(&ECHO);
    for (i, slot) in f[DATA].iter_mut().enumerate() {
        let shift = 12 - 4 * i;
        *slot = HEX[((value >> shift) & 0x0F) as usize];
    }
    f[12] = DELIMITER;
    let sum = checksum(&f[..CHECKSUM_OFFSET]);
    f[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].copy_from_slice(&sum);
    f[FRAME_LEN - 1] = TERMINATOR;
    f
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_from(bytes: &[u8]) -> ResponseFrame {
        let mut f = ResponseFrame::new();
        f.buf_mut()[..bytes.len()].copy_from_slice(bytes);
        f.set_received(bytes.len());
        f
    }

    #[test]
    fn checksum_wraps_and_is_uppercase() {
        assert_eq!(&checksum(&[0xFF, 0x02]), b"01");
        assert_eq!(&checksum(&[0x2A]), b"2A");
        assert_eq!(&checksum(&[0xAB]), b"AB");
        assert_eq!(&checksum(&[]), b"00");
    }

    #[test]
    fn request_carries_its_own_checksum() {
        assert_eq!(&REQUEST[8..], &checksum(&REQUEST[..8]));
        assert_eq!(&REQUEST, b"\x020ARD,COC7");
    }

    #[test]
    fn decodes_literal_co_frame() {
        let mut raw = *b"\x020FRD,CO001A,xx\r";
        let sum = checksum(&raw[..CHECKSUM_OFFSET]);
        raw[13..15].copy_from_slice(&sum);
        let f = frame_from(&raw);
        assert_eq!(f.data_digits(), b"001A");
        assert_eq!(f.co_value().unwrap(), 26);
    }

    #[test]
    fn built_frame_fields() {
        let f = frame_from(&build_response(0xBEEF));
        assert_eq!(f.leader(), LEADER);
        assert_eq!(f.length(), b"0F");
        assert_eq!(f.command(), b"RD");
        assert_eq!(f.echo(), b"CO");
        assert_eq!(f.co_value().unwrap(), 0xBEEF);
    }

    #[test]
    fn lowercase_checksum_accepted() {
        let mut raw = build_response(0x00AB);
        raw[13] = raw[13].to_ascii_lowercase();
        raw[14] = raw[14].to_ascii_lowercase();
        assert!(frame_from(&raw).validate().is_ok());
    }

    #[test]
    fn corrupted_byte_fails_checksum() {
        let mut raw = build_response(300);
        raw[9] ^= 0x01;
        assert!(matches!(
            frame_from(&raw).co_value(),
            Err(FrameError::Checksum { .. })
        ));
    }

    #[test]
    fn short_receive_is_unusable() {
        let raw = build_response(300);
        assert_eq!(
            frame_from(&raw[..15]).validate(),
            Err(FrameError::Short(15))
        );
        assert_eq!(ResponseFrame::new().validate(), Err(FrameError::Short(0)));
    }

    #[test]
    fn non_hex_digits_are_a_decode_error() {
        let mut raw = build_response(0);
        raw[8..12].copy_from_slice(b"+0G1");
        let sum = checksum(&raw[..CHECKSUM_OFFSET]);
        raw[13..15].copy_from_slice(&sum);
        assert!(matches!(
            frame_from(&raw).co_value(),
            Err(FrameError::BadDigits(_))
        ));
    }

    #[test]
    fn clear_forgets_previous_cycle() {
        let mut f = frame_from(&build_response(42));
        f.clear();
        assert!(f.received().is_empty());
        assert_eq!(f.validate(), Err(FrameError::Short(0)));
    }
}
