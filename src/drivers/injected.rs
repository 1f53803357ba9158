use std::io;

use hal::display::{FrameSink, Mode, NUM_BUFFERS};

/// Frame buffers owned by a host process that loaded us into its address
/// space, `present` hands the index back through the host's hook.
pub struct InjectedSink<'a, P> {
    buffers: [&'a mut [u8]; NUM_BUFFERS],
    present: P,
    mode: Option<Mode>,
}

impl<'a, P: FnMut(usize) -> io::Result<()>> InjectedSink<'a, P> {
    pub fn new(buffers: [&'a mut [u8]; NUM_BUFFERS], present: P) -> Self {
        Self { buffers, present, mode: None }
    }
}

impl<'a, P: FnMut(usize) -> io::Result<()>> FrameSink for InjectedSink<'a, P> {
    type Error = io::Error;

    fn open(&mut self, mode: &Mode) -> io::Result<()> {
        let size = mode.buffer_size();
        if let Some(buffer) = self.buffers.iter().find(|buffer| buffer.len() < size) {
            let message = format!("buffer of {} bytes smaller than {}", buffer.len(), size);
            return Err(io::Error::new(io::ErrorKind::InvalidInput, message));
        }
        self.mode = Some(*mode);
        Ok(())
    }

    fn mode(&self) -> Option<Mode> {
        self.mode
    }

    fn buffer(&mut self, index: usize) -> Option<&mut [u8]> {
        let size = self.mode?.buffer_size();
        self.buffers.get_mut(index).map(|buffer| &mut buffer[..size])
    }

    fn present(&mut self, index: usize) -> io::Result<()> {
        if self.mode.is_none() {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "sink closed"));
        }
        (self.present)(index)
    }

    fn close(&mut self) {
        self.mode = None;
    }
}

mod test {
    #[test]
    fn test_injected_sink() {
        use hal::display::{FrameSink, Mode};

        use super::InjectedSink;

        let (mut fb0, mut fb1) = (vec![0u8; 64], vec![0u8; 64]);
        let mut presented = Vec::new();
        {
            let mut sink = InjectedSink::new([&mut fb0[..], &mut fb1[..]], |index| {
                presented.push(index);
                Ok(())
            });
            assert!(sink.open(&Mode { width: 4, height: 5, plane_id: 6 }).is_err());
            assert!(sink.present(0).is_err());

            sink.open(&Mode { width: 4, height: 4, plane_id: 6 }).unwrap();
            sink.buffer(1).unwrap().fill(0xFF);
            sink.present(1).unwrap();
            sink.close();
            assert!(sink.buffer(0).is_none());
        }
        assert_eq!(presented, vec![1]);
        assert!(fb1.iter().all(|&b| b == 0xFF));
        assert!(fb0.iter().all(|&b| b == 0));
    }
}
