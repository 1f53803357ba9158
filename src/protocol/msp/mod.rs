pub mod message;

use heapless::Vec;

pub use message::{Direction, Message, MAX_PAYLOAD_SIZE};
use message::{MSP_HEADER0, MSP_HEADER1};

#[derive(Copy, Clone, Debug, PartialEq)]
enum State {
    Idle,
    Marker,
    Direction,
    Size,
    Command(usize),
    Payload(usize),
    Checksum,
}

/// Streaming MSP v1 decoder, one instance per input stream.
///
/// Frames with a bad checksum, an unknown direction or a payload larger than
/// `N` are dropped and decoding resumes at the next `$M` marker.
pub struct Decoder<const N: usize> {
    state: State,
    direction: Direction,
    command: u8,
    checksum: u8,
    buffer: Vec<u8, N>,
}

pub type MSP = Decoder<MAX_PAYLOAD_SIZE>;

impl<const N: usize> Default for Decoder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Decoder<N> {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            direction: Direction::Response,
            command: 0,
            checksum: 0,
            buffer: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        self.state = State::Idle;
        self.command = 0;
        self.checksum = 0;
        self.buffer.clear();
    }

    fn resync(&mut self, byte: u8) {
        self.reset();
        if byte == MSP_HEADER0 {
            self.state = State::Marker;
        }
    }

    pub fn process(&mut self, byte: u8) -> Option<Message<'_>> {
        match (self.state, byte) {
            (State::Idle, MSP_HEADER0) => self.state = State::Marker,
            (State::Marker, MSP_HEADER1) => self.state = State::Direction,
            (State::Direction, byte) => match Direction::try_from(byte) {
                Some(direction) => {
                    self.direction = direction;
                    self.state = State::Size;
                }
                None => self.resync(byte),
            },
            (State::Size, size) => {
                if size as usize > N {
                    trace!("Drop MSP frame of size {} exceeding {}", size, N);
                    self.reset();
                    return None;
                }
                self.buffer.clear();
                self.checksum = size;
                self.state = State::Command(size as usize);
            }
            (State::Command(size), command) => {
                self.command = command;
                self.checksum ^= command;
                self.state = if size > 0 { State::Payload(size) } else { State::Checksum };
            }
            (State::Payload(remain), byte) => {
                self.buffer.push(byte).ok();
                self.checksum ^= byte;
                self.state = if remain > 1 { State::Payload(remain - 1) } else { State::Checksum };
            }
            (State::Checksum, checksum) => {
                if checksum != self.checksum {
                    debug!("Drop MSP frame {} with bad checksum", self.command);
                    self.reset();
                    return None;
                }
                self.state = State::Idle;
                let (direction, command) = (self.direction, self.command);
                return Some(Message { direction, command, payload: &self.buffer });
            }
            _ => self.resync(byte),
        }
        None
    }

    pub fn receive<F: FnMut(&Message)>(&mut self, bytes: &[u8], mut handler: F) {
        for &byte in bytes.iter() {
            if let Some(message) = self.process(byte) {
                handler(&message);
            }
        }
    }
}
