use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::mem;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;

const EV_KEY: u16 = 0x01;
const KEY_RELEASE: i32 = 0;
const KEY_PRESS: i32 = 1;

const EVENT_SIZE: usize = mem::size_of::<libc::input_event>();

/// Press state changes of `code` in a run of raw `input_event` records,
/// auto repeat is ignored.
pub fn key_events(bytes: &[u8], code: u16) -> impl Iterator<Item = bool> + '_ {
    bytes.chunks_exact(EVENT_SIZE).filter_map(move |chunk| {
        let event: libc::input_event = unsafe { (chunk.as_ptr() as *const libc::input_event).read_unaligned() };
        if event.type_ != EV_KEY || event.code != code {
            return None;
        }
        match event.value {
            KEY_PRESS => Some(true),
            KEY_RELEASE => Some(false),
            _ => None,
        }
    })
}

/// Non blocking evdev reader watching a single key
pub struct KeyReader {
    file: File,
    code: u16,
    buffer: Vec<u8>,
}

impl KeyReader {
    pub fn open(path: &Path, code: u16) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).custom_flags(libc::O_NONBLOCK).open(path)?;
        info!("Watching key {:#x} on {}", code, path.display());
        Ok(Self { file, code, buffer: vec![0u8; EVENT_SIZE * 16] })
    }

    /// Pending press state changes, empty once the device would block
    pub fn read(&mut self) -> io::Result<Vec<bool>> {
        let mut events = Vec::new();
        loop {
            let size = match self.file.read(&mut self.buffer) {
                Ok(0) => break,
                Ok(size) => size,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            events.extend(key_events(&self.buffer[..size], self.code));
        }
        Ok(events)
    }
}

impl AsRawFd for KeyReader {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

mod test {
    #[test]
    fn test_key_events() {
        use std::mem;

        use super::key_events;

        let event = |type_: u16, code: u16, value: i32| {
            let mut event: libc::input_event = unsafe { mem::zeroed() };
            event.type_ = type_;
            event.code = code;
            event.value = value;
            let size = mem::size_of::<libc::input_event>();
            let bytes = unsafe { std::slice::from_raw_parts(&event as *const _ as *const u8, size) };
            bytes.to_vec()
        };

        let mut bytes = Vec::new();
        bytes.extend(event(1, 0xc9, 1));
        bytes.extend(event(0, 0, 0));
        bytes.extend(event(1, 0xc9, 2));
        bytes.extend(event(1, 0x1c, 1));
        bytes.extend(event(1, 0xc9, 0));
        bytes.extend(&[0u8; 3]);
        let events: Vec<bool> = key_events(&bytes, 0xc9).collect();
        assert_eq!(events, vec![true, false]);
    }
}
