use super::msp::Message;

pub const MSP_DISPLAYPORT: u8 = 182;

/// Page 2 select bit of the write string attribute byte
const ATTRIBUTE_PAGE2: u8 = 0x1;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SubCommand {
    Heartbeat,
    Release,
    Clear,
    WriteString,
    Draw,
    SetOptions,
    System,
}

impl SubCommand {
    pub fn try_from(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Heartbeat),
            1 => Some(Self::Release),
            2 => Some(Self::Clear),
            3 => Some(Self::WriteString),
            4 => Some(Self::Draw),
            5 => Some(Self::SetOptions),
            6 => Some(Self::System),
            _ => None,
        }
    }
}

/// Rendering capability set driven by DisplayPort messages.
pub trait Renderer {
    fn draw_character(&mut self, x: u32, y: u32, c: u16);
    fn clear_screen(&mut self);
    fn draw_complete(&mut self);
    fn set_options(&mut self, font_variant: u8, is_hd: bool);
}

pub fn process<R: Renderer + ?Sized>(renderer: &mut R, message: &Message) {
    if message.command != MSP_DISPLAYPORT {
        trace!("Ignore MSP command {}", message.command);
        return;
    }
    let (&sub_command, args) = match message.payload.split_first() {
        Some(split) => split,
        None => return,
    };
    match SubCommand::try_from(sub_command) {
        Some(SubCommand::Clear) => renderer.clear_screen(),
        Some(SubCommand::WriteString) => {
            if args.len() < 3 {
                return;
            }
            let (row, column, attribute) = (args[0] as u32, args[1] as u32, args[2]);
            let page = if attribute & ATTRIBUTE_PAGE2 != 0 { 0x100 } else { 0 };
            for (i, &c) in args[3..].iter().enumerate() {
                renderer.draw_character(column + i as u32, row, c as u16 | page);
            }
        }
        Some(SubCommand::Draw) => renderer.draw_complete(),
        Some(SubCommand::SetOptions) => {
            if args.len() < 2 {
                return;
            }
            renderer.set_options(args[0], args[1] != 0);
        }
        Some(command) => trace!("Ignore DisplayPort {:?}", command),
        None => debug!("Unknown DisplayPort sub-command {}", sub_command),
    }
}

#[cfg(test)]
mod test {
    use hex_literal::hex;

    use super::{process, Renderer};
    use crate::protocol::msp::{Direction, Message};

    #[derive(Debug, PartialEq)]
    enum Call {
        Draw(u32, u32, u16),
        Clear,
        Complete,
        Options(u8, bool),
    }

    #[derive(Default)]
    struct Recorder(Vec<Call>);

    impl Renderer for Recorder {
        fn draw_character(&mut self, x: u32, y: u32, c: u16) {
            self.0.push(Call::Draw(x, y, c))
        }

        fn clear_screen(&mut self) {
            self.0.push(Call::Clear)
        }

        fn draw_complete(&mut self) {
            self.0.push(Call::Complete)
        }

        fn set_options(&mut self, font_variant: u8, is_hd: bool) {
            self.0.push(Call::Options(font_variant, is_hd))
        }
    }

    fn run(command: u8, payload: &[u8]) -> Vec<Call> {
        let mut recorder = Recorder::default();
        process(&mut recorder, &Message::new(Direction::Response, command, payload));
        recorder.0
    }

    #[test]
    fn test_write_string() {
        let calls = run(182, &hex!("03 02 05 00 41 42"));
        assert_eq!(calls, vec![Call::Draw(5, 2, 0x41), Call::Draw(6, 2, 0x42)]);

        let calls = run(182, &hex!("03 01 00 01 04"));
        assert_eq!(calls, vec![Call::Draw(0, 1, 0x104)]);
    }

    #[test]
    fn test_sub_commands() {
        assert_eq!(run(182, &[2]), vec![Call::Clear]);
        assert_eq!(run(182, &[4]), vec![Call::Complete]);
        assert_eq!(run(182, &[5, 1, 1]), vec![Call::Options(1, true)]);
        assert_eq!(run(182, &[5, 0, 0]), vec![Call::Options(0, false)]);
    }

    #[test]
    fn test_ignored() {
        assert_eq!(run(182, &[]), vec![]);
        assert_eq!(run(182, &[0]), vec![]);
        assert_eq!(run(182, &[1]), vec![]);
        assert_eq!(run(182, &[6]), vec![]);
        assert_eq!(run(182, &[9]), vec![]);
        assert_eq!(run(182, &[3, 1, 2]), vec![]);
        assert_eq!(run(182, &[5, 1]), vec![]);
        assert_eq!(run(101, &[2]), vec![]);
    }
}
