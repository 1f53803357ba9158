use std::io;

use hal::display::{FrameSink, Mode, NUM_BUFFERS};

/// Software surfaces in process memory, keeps a record of presented buffers.
#[derive(Default)]
pub struct MemorySink {
    mode: Option<Mode>,
    buffers: [Vec<u8>; NUM_BUFFERS],
    presented: Vec<usize>,
    refuse_open: bool,
}

impl MemorySink {
    /// A sink whose `open` always fails
    pub fn unavailable() -> Self {
        Self { refuse_open: true, ..Default::default() }
    }

    pub fn is_open(&self) -> bool {
        self.mode.is_some()
    }

    pub fn presented(&self) -> &[usize] {
        &self.presented
    }

    pub fn surface(&self, index: usize) -> Option<&[u8]> {
        self.mode.and(self.buffers.get(index)).map(|buffer| &buffer[..])
    }
}

impl FrameSink for MemorySink {
    type Error = io::Error;

    fn open(&mut self, mode: &Mode) -> io::Result<()> {
        if self.refuse_open {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no display plane"));
        }
        self.buffers.iter_mut().for_each(|buffer| *buffer = vec![0u8; mode.buffer_size()]);
        self.mode = Some(*mode);
        Ok(())
    }

    fn mode(&self) -> Option<Mode> {
        self.mode
    }

    fn buffer(&mut self, index: usize) -> Option<&mut [u8]> {
        self.mode?;
        self.buffers.get_mut(index).map(|buffer| &mut buffer[..])
    }

    fn present(&mut self, index: usize) -> io::Result<()> {
        if self.mode.is_none() || index >= NUM_BUFFERS {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "no such buffer"));
        }
        self.presented.push(index);
        Ok(())
    }

    fn close(&mut self) {
        self.mode = None;
        self.buffers.iter_mut().for_each(|buffer| *buffer = Vec::new());
    }
}

mod test {
    #[test]
    fn test_memory_sink() {
        use hal::display::{FrameSink, Mode};

        use super::MemorySink;

        let mode = Mode { width: 4, height: 2, plane_id: 0 };
        let mut sink = MemorySink::default();
        assert!(sink.buffer(0).is_none());
        sink.open(&mode).unwrap();
        assert_eq!(sink.buffer(1).unwrap().len(), 32);
        assert!(sink.buffer(2).is_none());
        sink.present(1).unwrap();
        assert!(sink.present(2).is_err());
        assert_eq!(sink.presented(), &[1]);
        sink.close();
        assert!(sink.surface(0).is_none());

        assert!(MemorySink::unavailable().open(&mode).is_err());
    }
}
