//! Menu Parsing
//!
//! Turns raw input lines into menu choices and TTLs.

use std::str::FromStr;

use super::ShellError;

/// One entry of the numbered menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Set,
    Get,
    Delete,
    Exists,
    Keys,
    SetExpiration,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 7] = [
        MenuChoice::Set,
        MenuChoice::Get,
        MenuChoice::Delete,
        MenuChoice::Exists,
        MenuChoice::Keys,
        MenuChoice::SetExpiration,
        MenuChoice::Exit,
    ];

    /// Number the user types to pick this entry
    pub fn number(self) -> u8 {
        match self {
            MenuChoice::Set => 1,
            MenuChoice::Get => 2,
            MenuChoice::Delete => 3,
            MenuChoice::Exists => 4,
            MenuChoice::Keys => 5,
            MenuChoice::SetExpiration => 6,
            MenuChoice::Exit => 7,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuChoice::Set => "Set key-value pair",
            MenuChoice::Get => "Get value by key",
            MenuChoice::Delete => "Delete key-value pair",
            MenuChoice::Exists => "Check if key exists",
            MenuChoice::Keys => "List all keys",
            MenuChoice::SetExpiration => {
                "Add an expiration time for key-value pairs that already exist"
            }
            MenuChoice::Exit => "Exit",
        }
    }
}

impl FromStr for MenuChoice {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<u8>()
            .ok()
            .and_then(|n| MenuChoice::ALL.into_iter().find(|c| c.number() == n))
            .ok_or_else(|| ShellError::InvalidChoice(trimmed.to_string()))
    }
}

/// Parse a TTL in whole seconds. Blank input means no expiration.
pub fn parse_ttl(input: &str) -> Result<u64, ShellError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    match trimmed.parse::<i64>() {
        Ok(n) if n < 0 => Err(ShellError::NegativeTtl(n)),
        Ok(n) => Ok(n as u64),
        Err(_) => trimmed
            .parse::<u64>()
            .map_err(|_| ShellError::InvalidTtl(trimmed.to_string())),
    }
}
