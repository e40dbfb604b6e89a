//! Password strength rules applied to every newly chosen password.
//!
//! The policy is a pure function: no state, no I/O, deterministic.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 12;
/// Argon2 and bcrypt-era hashes both cap useful input at 72 bytes.
pub const MAX_PASSWORD_LENGTH: usize = 72;
pub const MAX_CONSECUTIVE_CHARS: usize = 6;

/// High-risk passwords only. Compared case-insensitively.
pub const DENYLIST: &[&str] = &[
    "password",
    "passw0rd",
    "123456",
    "12345678",
    "123456789",
    "1234567890",
    "qwerty",
    "qwertyuiop",
    "asdfghjkl",
    "letmein",
    "admin",
    "welcome",
    "monkey",
];

// A denylisted word with a run of digits/symbols glued to either end.
static DECORATED_DENYLIST_WORD: LazyLock<Regex> = LazyLock::new(|| {
    let words = DENYLIST
        .iter()
        .map(|word| regex::escape(word))
        .collect::<Vec<_>>()
        .join("|");
    let run = r"[0-9!@#$%\^&*]+";
    Regex::new(&format!("^(?:(?:{words}){run}|{run}(?:{words}))$"))
        .expect("denylist pattern is a valid regex")
});

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("password must be at least {min} characters")]
    TooShort { min: usize },
    #[error("password must not exceed {max} characters")]
    TooLong { max: usize },
    #[error("password is too common")]
    TooCommon,
    #[error("password contains excessive repetition")]
    ExcessiveRepetition,
}

/// Validate a candidate password.
///
/// Length is measured in bytes of the UTF-8 encoding since that is what the
/// hash consumes.
pub fn validate(password: &str) -> Result<(), PolicyViolation> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(PolicyViolation::TooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(PolicyViolation::TooLong {
            max: MAX_PASSWORD_LENGTH,
        });
    }

    let lower = password.to_lowercase();
    if DENYLIST.contains(&lower.as_str()) || DECORATED_DENYLIST_WORD.is_match(&lower) {
        return Err(PolicyViolation::TooCommon);
    }

    if has_excessive_repetition(password) {
        return Err(PolicyViolation::ExcessiveRepetition);
    }

    Ok(())
}

fn has_excessive_repetition(password: &str) -> bool {
    let mut chars = password.chars();
    let Some(mut previous) = chars.next() else {
        return false;
    };

    let mut run = 1;
    for current in chars {
        if current == previous {
            run += 1;
            if run >= MAX_CONSECUTIVE_CHARS {
                return true;
            }
        } else {
            run = 1;
            previous = current;
        }
    }
    false
}
