use heapless::Vec;

pub const MSP_HEADER0: u8 = b'$';
pub const MSP_HEADER1: u8 = b'M';
/// marker, direction, size, command and checksum
pub const FRAME_OVERHEAD: usize = 6;
pub const MAX_PAYLOAD_SIZE: usize = 255;
pub const MAX_FRAME_SIZE: usize = MAX_PAYLOAD_SIZE + FRAME_OVERHEAD;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Direction {
    Request,
    Response,
    Error,
}

impl Direction {
    pub fn try_from(byte: u8) -> Option<Self> {
        match byte {
            b'<' => Some(Self::Request),
            b'>' => Some(Self::Response),
            b'!' => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Self::Request => b'<',
            Self::Response => b'>',
            Self::Error => b'!',
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Message<'a> {
    pub direction: Direction,
    pub command: u8,
    pub payload: &'a [u8],
}

pub fn checksum(size: u8, command: u8, payload: &[u8]) -> u8 {
    payload.iter().fold(size ^ command, |sum, &byte| sum ^ byte)
}

impl<'a> Message<'a> {
    pub fn new(direction: Direction, command: u8, payload: &'a [u8]) -> Self {
        Self { direction, command, payload }
    }

    /// `None` if the payload does not fit in a single v1 frame
    pub fn encode(&self) -> Option<Vec<u8, MAX_FRAME_SIZE>> {
        if self.payload.len() > MAX_PAYLOAD_SIZE {
            return None;
        }
        let size = self.payload.len() as u8;
        let mut frame = Vec::new();
        frame.extend_from_slice(&[MSP_HEADER0, MSP_HEADER1, self.direction.as_byte()]).ok()?;
        frame.extend_from_slice(&[size, self.command]).ok()?;
        frame.extend_from_slice(self.payload).ok()?;
        frame.push(checksum(size, self.command, self.payload)).ok()?;
        Some(frame)
    }
}

mod test {
    #[test]
    fn test_encode() {
        use hex_literal::hex;

        use super::{Direction, Message};

        let message = Message::new(Direction::Response, 182, &[2]);
        let frame = message.encode().unwrap();
        assert_eq!(&frame[..], &hex!("24 4D 3E 01 B6 02 B5")[..]);

        let payload = [0u8; 256];
        assert_eq!(Message::new(Direction::Request, 1, &payload).encode(), None);
    }
}
