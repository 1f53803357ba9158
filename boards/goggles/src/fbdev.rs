use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;

use hal::display::{FrameSink, Mode, BYTES_PER_PIXEL, NUM_BUFFERS};
use memmap2::{MmapMut, MmapOptions};

const FBIOGET_VSCREENINFO: libc::c_ulong = 0x4600;
const FBIOGET_FSCREENINFO: libc::c_ulong = 0x4602;
const FBIOPAN_DISPLAY: libc::c_ulong = 0x4606;

#[repr(C)]
#[derive(Copy, Clone, Default)]
struct Bitfield {
    offset: u32,
    length: u32,
    msb_right: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Default)]
struct VarScreenInfo {
    xres: u32,
    yres: u32,
    xres_virtual: u32,
    yres_virtual: u32,
    xoffset: u32,
    yoffset: u32,
    bits_per_pixel: u32,
    grayscale: u32,
    red: Bitfield,
    green: Bitfield,
    blue: Bitfield,
    transp: Bitfield,
    nonstd: u32,
    activate: u32,
    height: u32,
    width: u32,
    accel_flags: u32,
    pixclock: u32,
    left_margin: u32,
    right_margin: u32,
    upper_margin: u32,
    lower_margin: u32,
    hsync_len: u32,
    vsync_len: u32,
    sync: u32,
    vmode: u32,
    rotate: u32,
    colorspace: u32,
    reserved: [u32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Default)]
struct FixScreenInfo {
    id: [u8; 16],
    smem_start: libc::c_ulong,
    smem_len: u32,
    type_: u32,
    type_aux: u32,
    visual: u32,
    xpanstep: u16,
    ypanstep: u16,
    ywrapstep: u16,
    line_length: u32,
    mmio_start: libc::c_ulong,
    mmio_len: u32,
    accel: u32,
    capabilities: u16,
    reserved: [u16; 2],
}

fn ioctl<T>(file: &File, request: libc::c_ulong, info: &mut T) -> io::Result<()> {
    let info: *mut T = info;
    match unsafe { libc::ioctl(file.as_raw_fd(), request as _, info) } {
        -1 => Err(io::Error::last_os_error()),
        _ => Ok(()),
    }
}

fn invalid(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}

/// Rejects devices whose geometry or pixel layout differs from `mode`
fn check_layout(var: &VarScreenInfo, fix: &FixScreenInfo, mode: &Mode) -> io::Result<()> {
    let (width, height) = (var.xres as usize, var.yres as usize);
    let virtual_height = var.yres_virtual as usize;
    if width != mode.width || height != mode.height || virtual_height < height * NUM_BUFFERS {
        return Err(invalid(format!(
            "{}x{} virtual {}, expect {}x{} with {} buffers",
            width, height, virtual_height, mode.width, mode.height, NUM_BUFFERS
        )));
    }
    if var.bits_per_pixel as usize != BYTES_PER_PIXEL * 8 {
        return Err(invalid(format!("{} bits per pixel not supported", var.bits_per_pixel)));
    }
    if fix.line_length as usize != mode.stride() {
        let message = format!("line length {} != stride {}", fix.line_length, mode.stride());
        return Err(invalid(message));
    }
    Ok(())
}

/// Linux fbdev with both buffers stacked in a double height virtual screen,
/// presenting a buffer pans the visible area onto it.
pub struct FramebufferSink {
    device: PathBuf,
    file: Option<File>,
    map: Option<MmapMut>,
    mode: Option<Mode>,
    info: VarScreenInfo,
}

impl FramebufferSink {
    pub fn new(device: PathBuf) -> Self {
        Self { device, file: None, map: None, mode: None, info: VarScreenInfo::default() }
    }
}

impl FrameSink for FramebufferSink {
    type Error = io::Error;

    fn open(&mut self, mode: &Mode) -> io::Result<()> {
        let file = OpenOptions::new().read(true).write(true).open(&self.device)?;
        let mut info = VarScreenInfo::default();
        ioctl(&file, FBIOGET_VSCREENINFO, &mut info)?;
        let mut fix = FixScreenInfo::default();
        ioctl(&file, FBIOGET_FSCREENINFO, &mut fix)?;
        if let Err(e) = check_layout(&info, &fix, mode) {
            return Err(io::Error::new(e.kind(), format!("{}: {}", self.device.display(), e)));
        }
        let map = unsafe { MmapOptions::new().len(mode.buffer_size() * NUM_BUFFERS).map_mut(&file)? };
        info!(
            "Opened {} {}x{} for plane {}",
            self.device.display(),
            mode.width,
            mode.height,
            mode.plane_id
        );
        self.info = info;
        self.map = Some(map);
        self.file = Some(file);
        self.mode = Some(*mode);
        Ok(())
    }

    fn mode(&self) -> Option<Mode> {
        self.mode
    }

    fn buffer(&mut self, index: usize) -> Option<&mut [u8]> {
        let size = self.mode?.buffer_size();
        if index >= NUM_BUFFERS {
            return None;
        }
        self.map.as_mut().map(|map| &mut map[index * size..(index + 1) * size])
    }

    fn present(&mut self, index: usize) -> io::Result<()> {
        let (file, mode) = match (&self.file, self.mode) {
            (Some(file), Some(mode)) => (file, mode),
            _ => return Err(io::Error::new(io::ErrorKind::NotConnected, "framebuffer closed")),
        };
        if let Some(map) = self.map.as_ref() {
            map.flush_async()?;
        }
        self.info.xoffset = 0;
        self.info.yoffset = (index * mode.height) as u32;
        ioctl(file, FBIOPAN_DISPLAY, &mut self.info)
    }

    fn close(&mut self) {
        self.map = None;
        self.file = None;
        self.mode = None;
        debug!("Closed {}", self.device.display());
    }
}

mod test {
    #[test]
    fn test_screen_info_layout() {
        use super::VarScreenInfo;

        assert_eq!(core::mem::size_of::<VarScreenInfo>(), 160);
    }

    #[test]
    fn test_check_layout() {
        use hal::display::Mode;

        use super::{check_layout, FixScreenInfo, VarScreenInfo};

        let mode = Mode { width: 1440, height: 810, plane_id: 6 };
        let var = VarScreenInfo {
            xres: 1440,
            yres: 810,
            xres_virtual: 1440,
            yres_virtual: 1620,
            bits_per_pixel: 32,
            ..Default::default()
        };
        let fix = FixScreenInfo { line_length: 1440 * 4, ..Default::default() };
        assert!(check_layout(&var, &fix, &mode).is_ok());

        let padded = FixScreenInfo { line_length: 1536 * 4, ..fix };
        assert!(check_layout(&var, &padded, &mode).is_err());
        let single = VarScreenInfo { yres_virtual: 810, ..var };
        assert!(check_layout(&single, &fix, &mode).is_err());
        let rgb565 = VarScreenInfo { bits_per_pixel: 16, ..var };
        assert!(check_layout(&rgb565, &fix, &mode).is_err());
    }

    #[test]
    fn test_open_missing_device() {
        use hal::display::{FrameSink, Mode};

        use super::FramebufferSink;

        let mut sink = FramebufferSink::new("/nonexistent/fb0".into());
        let mode = Mode { width: 1440, height: 810, plane_id: 6 };
        assert!(sink.open(&mode).is_err());
        assert!(sink.mode().is_none());
        assert!(sink.buffer(0).is_none());
        assert!(sink.present(0).is_err());
    }
}
