//! Interactive Shell
//!
//! Numbered-menu driver over a [`Store`]. Reads from any `BufRead` and renders
//! to any `Write`, so the binary hands it stdin/stdout and tests hand it
//! buffers.

mod config;
mod menu;

pub use config::ShellConfig;
pub use menu::{parse_ttl, MenuChoice};

use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::{debug, info};

use crate::storage::{ExpireOutcome, Store};

/// Entries loaded when [`ShellConfig::seed_demo`] is set: (key, value, ttl)
pub const DEMO_ENTRIES: [(&str, &str, u64); 4] = [
    ("xiaoming", "175", 0),
    ("zhangsan", "156", 10),
    ("lisi", "180", 0),
    ("lwangwu", "188", 0),
];

/// Shell errors
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("invalid choice '{0}'")]
    InvalidChoice(String),

    #[error("invalid expiration '{0}': expected whole seconds")]
    InvalidTtl(String),

    #[error("negative expiration {0}: use 0 for no expiration")]
    NegativeTtl(i64),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Load the demo entries into `store`
pub fn seed_demo(store: &Store) {
    for (key, value, ttl) in DEMO_ENTRIES {
        store.set(key, value, ttl);
    }
    info!(entries = DEMO_ENTRIES.len(), "Seeded demo entries");
}

/// Interactive menu loop
pub struct Shell<R, W> {
    store: Store,
    input: R,
    output: W,
    config: ShellConfig,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    /// Create a new shell
    pub fn new(store: Store, input: R, output: W, config: ShellConfig) -> Self {
        Self {
            store,
            input,
            output,
            config,
        }
    }

    /// Give back the output sink
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until Exit is chosen or input ends.
    ///
    /// Bad input is reported and the loop continues; only I/O errors abort.
    pub fn run(&mut self) -> Result<(), ShellError> {
        if self.config.seed_demo {
            seed_demo(&self.store);
        }

        loop {
            if self.config.show_menu {
                self.print_menu()?;
            }

            let Some(line) = self.prompt("Enter your choice: ")? else {
                break;
            };

            let choice = match line.parse::<MenuChoice>() {
                Ok(choice) => choice,
                Err(e) => {
                    debug!(error = %e, "Rejected menu input");
                    writeln!(self.output, "Invalid choice. Please enter a valid option.")?;
                    continue;
                }
            };

            match self.execute(choice) {
                Ok(true) => {}
                Ok(false) => break,
                Err(ShellError::Io(e)) => return Err(e.into()),
                Err(e) => writeln!(self.output, "Error: {}", e)?,
            }
        }

        self.output.flush()?;
        Ok(())
    }

    /// Execute one menu action. `Ok(false)` ends the session, either because
    /// Exit was chosen or input ran out mid-action.
    fn execute(&mut self, choice: MenuChoice) -> Result<bool, ShellError> {
        match choice {
            MenuChoice::Set => {
                let Some(key) = self.prompt("Enter your key: ")? else {
                    return Ok(false);
                };
                let Some(value) = self.prompt("Enter your value: ")? else {
                    return Ok(false);
                };
                let Some(ttl) = self.prompt("Enter expiration (0 for no expiration): ")? else {
                    return Ok(false);
                };
                let ttl = parse_ttl(&ttl)?;
                self.store.set(key.as_str(), value.as_str(), ttl);
                writeln!(self.output, "Your key-value {{ {} - {} }} pair set.", key, value)?;
            }

            MenuChoice::Get => {
                let Some(key) = self.prompt("Enter key: ")? else {
                    return Ok(false);
                };
                match self.store.get(&key) {
                    Some(value) => writeln!(self.output, "Value: {}", value)?,
                    None => writeln!(self.output, "Key {} not found.", key)?,
                }
            }

            MenuChoice::Delete => {
                let Some(key) = self.prompt("Enter key you want to delete: ")? else {
                    return Ok(false);
                };
                self.store.delete(&key);
                writeln!(self.output, "Key {} deleted.", key)?;
            }

            MenuChoice::Exists => {
                let Some(key) = self.prompt("Enter key to check: ")? else {
                    return Ok(false);
                };
                if self.store.exists(&key) {
                    writeln!(self.output, "Key {} exists.", key)?;
                } else {
                    writeln!(self.output, "Key {} not found.", key)?;
                }
            }

            MenuChoice::Keys => {
                let mut keys = self.store.keys();
                keys.sort();
                writeln!(self.output, "Keys: [{}]", keys.join(", "))?;
            }

            MenuChoice::SetExpiration => {
                let Some(key) = self.prompt("Enter key to set expiration: ")? else {
                    return Ok(false);
                };
                let Some(ttl) =
                    self.prompt("Enter expiration time in seconds (0 for no expiration): ")?
                else {
                    return Ok(false);
                };
                let ttl = parse_ttl(&ttl)?;
                match self.store.set_expiration(&key, ttl) {
                    ExpireOutcome::Applied => writeln!(
                        self.output,
                        "Expiration time set for key '{}': {} seconds",
                        key, ttl
                    )?,
                    ExpireOutcome::NotFound => writeln!(self.output, "Key not found.")?,
                    ExpireOutcome::NoExpiration => {
                        writeln!(self.output, "No expiration requested for key '{}'.", key)?
                    }
                    ExpireOutcome::AlreadySet => writeln!(
                        self.output,
                        "Key '{}' already has an expiration time set.",
                        key
                    )?,
                }
            }

            MenuChoice::Exit => {
                writeln!(self.output, "Exiting.")?;
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn print_menu(&mut self) -> io::Result<()> {
        for choice in MenuChoice::ALL {
            writeln!(self.output, "{}. {}", choice.number(), choice.label())?;
        }
        Ok(())
    }

    /// Print `text` and read one line, `None` at end of input
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
