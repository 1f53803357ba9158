use hal::display::FrameSink;
use hal::service::DisplayService;
use msp_osd::components::session::Session;

/// Runs `serve` over `transport`, then stops `session` while `transport` is
/// still open. The transport is released last, whatever `serve` returned.
pub fn serve_then_stop<T, S, D, F>(
    mut transport: T,
    session: &mut Session<S, D>,
    serve: F,
) -> Result<(), String>
where
    S: FrameSink,
    D: DisplayService,
    F: FnOnce(&mut T, &mut Session<S, D>) -> Result<(), String>,
{
    let result = serve(&mut transport, session);
    session.shutdown();
    drop(transport);
    result
}

mod test {
    #[test]
    fn test_stop_before_transport_release() {
        use core::time::Duration;
        use std::cell::RefCell;
        use std::path::PathBuf;
        use std::rc::Rc;

        use hal::display::Mode;
        use hal::service::DisplayService;
        use msp_osd::components::button::HoldButton;
        use msp_osd::components::session::{Banners, DisplayMode, Session};
        use msp_osd::config::Banner;
        use msp_osd::drivers::memory::MemorySink;
        use msp_osd::osd::{FontStore, Screen};

        use super::serve_then_stop;

        type Log = Rc<RefCell<Vec<&'static str>>>;

        struct Service(Log);

        impl DisplayService for Service {
            fn relinquish(&mut self) {}

            fn resume(&mut self) {
                self.0.borrow_mut().push("resume")
            }
        }

        struct Transport(Log);

        impl Drop for Transport {
            fn drop(&mut self) {
                self.0.borrow_mut().push("transport closed")
            }
        }

        let log: Log = Rc::default();
        let mode = Mode { width: 1440, height: 810, plane_id: 6 };
        let fonts = FontStore::new(vec![PathBuf::from("/nonexistent/font")]);
        let screen = Screen::new(MemorySink::default(), mode, fonts);
        let banners = Banners::try_from(&Banner::default()).unwrap();
        let secs = Duration::from_secs;
        let button = HoldButton::new(secs(4));
        let mut session = Session::new(screen, Service(log.clone()), button, secs(1), banners);

        let result = serve_then_stop(Transport(log.clone()), &mut session, |_, session| {
            session.start().map_err(|e| format!("{}", e))?;
            Err("poll failed".to_string())
        });
        assert_eq!(result, Err("poll failed".to_string()));
        assert_eq!(session.mode(), DisplayMode::Disabled);
        assert_eq!(session.screen().sink().presented(), &[0, 1]);
        assert_eq!(*log.borrow(), vec!["resume", "transport closed"]);
    }
}
