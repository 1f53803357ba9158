#[macro_use]
extern crate log;

use std::io;
use std::net::UdpSocket;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use env_logger::Env;
use goggles::fbdev::FramebufferSink;
use goggles::input::KeyReader;
use goggles::lifecycle;
use goggles::net::{self, MAX_DATAGRAM_SIZE};
use goggles::service::CommandService;
use msp_osd::components::button::HoldButton;
use msp_osd::components::session::{Banners, Session};
use msp_osd::config::Config;
use msp_osd::osd::{FontStore, Screen};
use msp_osd::sys::jiffies;
use signal_hook::consts::signal::{SIGINT, SIGTERM};

const MSP: usize = 0;
const DATA: usize = 1;
const BUTTON: usize = 2;

type GogglesSession = Session<FramebufferSink, CommandService>;

fn init(matches: &clap::ArgMatches) -> Result<(Config, GogglesSession), String> {
    let config_path = matches.value_of("config").unwrap_or("/opt/etc/msp-osd.toml");
    let config = Config::load(Path::new(config_path)).map_err(|e| format!("{}", e))?;
    let banners = Banners::try_from(&config.banner).map_err(|e| format!("{}", e))?;
    let sink = FramebufferSink::new(config.display.device.clone());
    let fonts = FontStore::new(config.font.search_paths.clone());
    let screen = Screen::new(sink, config.display.mode(), fonts);
    let service = CommandService::new(config.service.relinquish.clone(), config.service.resume.clone());
    let button = HoldButton::new(config.button.hold());
    let session = Session::new(screen, service, button, config.session.settle(), banners);
    Ok((config, session))
}

fn poll(fds: &mut [libc::pollfd], timeout_ms: i32) -> io::Result<()> {
    fds.iter_mut().for_each(|fd| fd.revents = 0);
    match unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, timeout_ms) } {
        -1 => match io::Error::last_os_error() {
            e if e.kind() == io::ErrorKind::Interrupted => Ok(()),
            e => Err(e),
        },
        _ => Ok(()),
    }
}

struct Transport {
    msp: UdpSocket,
    data: UdpSocket,
    button: KeyReader,
}

impl Transport {
    fn open(config: &Config) -> Result<Self, String> {
        let network = &config.network;
        let msp = net::bind(&network.bind_address, network.msp_port).map_err(|e| format!("{}", e))?;
        let data = net::bind(&network.bind_address, network.data_port).map_err(|e| format!("{}", e))?;
        let button = KeyReader::open(&config.button.device, config.button.code)
            .map_err(|e| format!("Open {} failed: {}", config.button.device.display(), e))?;
        Ok(Self { msp, data, button })
    }
}

fn serve(
    config: &Config,
    session: &mut GogglesSession,
    transport: &mut Transport,
    terminate: &AtomicBool,
) -> Result<(), String> {
    let pollfd = |fd| libc::pollfd { fd, events: libc::POLLIN, revents: 0 };
    let mut fds = [
        pollfd(transport.msp.as_raw_fd()),
        pollfd(transport.data.as_raw_fd()),
        pollfd(transport.button.as_raw_fd()),
    ];
    let timeout_ms = config.session.poll_interval().as_millis() as i32;
    let mut buffer = vec![0u8; MAX_DATAGRAM_SIZE];

    if config.session.start_enabled {
        session.start().map_err(|e| format!("{}", e))?;
    }
    while !terminate.load(Ordering::Relaxed) {
        poll(&mut fds, timeout_ms).map_err(|e| format!("Poll failed: {}", e))?;
        if fds[MSP].revents & libc::POLLIN != 0 {
            let result = net::drain(&transport.msp, &mut buffer, |bytes| session.on_msp_data(bytes));
            result.map_err(|e| format!("Receive MSP failed: {}", e))?;
        }
        if fds[DATA].revents & libc::POLLIN != 0 {
            let result = net::drain(&transport.data, &mut buffer, |bytes| session.on_telemetry(bytes));
            result.map_err(|e| format!("Receive telemetry failed: {}", e))?;
        }
        if fds[BUTTON].revents & libc::POLLIN != 0 {
            let events = transport.button.read().map_err(|e| format!("Read button failed: {}", e))?;
            for pressed in events {
                session.on_button(pressed, jiffies::get()).map_err(|e| format!("{}", e))?;
            }
        }
        session.tick(jiffies::get()).map_err(|e| format!("{}", e))?;
    }
    info!("Terminating");
    Ok(())
}

fn run(config: &Config, session: &mut GogglesSession, terminate: &AtomicBool) -> Result<(), String> {
    let transport = Transport::open(config)?;
    lifecycle::serve_then_stop(transport, session, |transport, session| {
        serve(config, session, transport, terminate)
    })
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    jiffies::init();
    let matches = clap::App::new("msp-osd")
        .version("0.1")
        .author("qiuchengxuan")
        .about("MSP DisplayPort OSD overlay for FPV goggles")
        .arg(clap::Arg::with_name("config").long("config").help("Config file").takes_value(true))
        .get_matches();
    let (config, mut session) = match init(&matches) {
        Ok(init) => init,
        Err(error) => {
            error!("{}", error);
            std::process::exit(1);
        }
    };

    let terminate = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        if let Err(e) = signal_hook::flag::register(signal, Arc::clone(&terminate)) {
            error!("Register signal {} failed: {}", signal, e);
            std::process::exit(1);
        }
    }

    if let Err(error) = run(&config, &mut session, &terminate) {
        error!("{}", error);
        std::process::exit(1);
    }
}
