use std::process::Command;

use hal::service::DisplayService;

/// Runs configured commands to hand the display over to the stock UI and back
pub struct CommandService {
    relinquish: Vec<String>,
    resume: Vec<String>,
}

impl CommandService {
    pub fn new(relinquish: Vec<String>, resume: Vec<String>) -> Self {
        Self { relinquish, resume }
    }
}

fn run(argv: &[String]) {
    let (program, args) = match argv.split_first() {
        Some(split) => split,
        None => return,
    };
    match Command::new(program).args(args).status() {
        Ok(status) if status.success() => debug!("{} done", argv.join(" ")),
        Ok(status) => warn!("{} exited with {}", argv.join(" "), status),
        Err(e) => warn!("Run {} failed: {}", program, e),
    }
}

impl DisplayService for CommandService {
    fn relinquish(&mut self) {
        run(&self.relinquish)
    }

    fn resume(&mut self) {
        run(&self.resume)
    }
}

mod test {
    #[test]
    fn test_command_service() {
        use hal::service::DisplayService;

        use super::CommandService;

        let mut service = CommandService::new(vec![], vec!["/nonexistent/setprop".into()]);
        service.relinquish();
        service.resume();
    }
}
