use core::fmt::Debug;

pub const BYTES_PER_PIXEL: usize = 4;
pub const NUM_BUFFERS: usize = 2;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Mode {
    pub width: usize,
    pub height: usize,
    pub plane_id: u8,
}

impl Mode {
    pub fn stride(&self) -> usize {
        self.width * BYTES_PER_PIXEL
    }

    pub fn buffer_size(&self) -> usize {
        self.stride() * self.height
    }
}

/// Presentation boundary of the video plane.
///
/// Buffers are `mode.width * mode.height * 4` bytes. Byte order within a pixel
/// and alpha polarity are fixed by the implementation's hardware, callers
/// write pixels already converted to that layout.
pub trait FrameSink {
    type Error: Debug;

    fn open(&mut self, mode: &Mode) -> Result<(), Self::Error>;
    fn mode(&self) -> Option<Mode>;
    /// `None` if the sink is not open or `index >= NUM_BUFFERS`
    fn buffer(&mut self, index: usize) -> Option<&mut [u8]>;
    fn present(&mut self, index: usize) -> Result<(), Self::Error>;
    fn close(&mut self);
}
