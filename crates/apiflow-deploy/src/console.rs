//! 進捗表示（JSON出力モードでは何も出さない）

use apiflow_build::BuildProgress;
use colored::Colorize;

pub(crate) struct Console {
    quiet: bool,
}

impl Console {
    pub(crate) fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub(crate) fn step(&self, current: usize, total: usize, message: &str) {
        if !self.quiet {
            println!();
            println!(
                "{}",
                format!("【Step {}/{}】{}", current, total, message).blue()
            );
        }
    }

    pub(crate) fn say(&self, message: impl AsRef<str>) {
        if !self.quiet {
            println!("{}", message.as_ref());
        }
    }

    pub(crate) fn spinner(&self, message: &str) -> BuildProgress {
        if self.quiet {
            BuildProgress::hidden()
        } else {
            BuildProgress::new(message)
        }
    }
}
