//! Password generation from fixed presets.

use rand::{rngs::OsRng, seq::SliceRandom};
use std::{fmt, str::FromStr};

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const PUNCTUATION: &[u8] = b"!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

pub const INVALID_COMPLEXITY: &str = "Invalid password complexity selection.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorError {
    EmptyPool,
    ZeroLength,
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPool => f.write_str("no character classes selected"),
            Self::ZeroLength => f.write_str("password length must be positive"),
        }
    }
}

impl std::error::Error for GeneratorError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Complexity {
    /// Lowercase letters, 8 characters.
    Simple,
    /// Upper and lower case, digits and ASCII punctuation, 12 characters.
    Complex,
}

impl FromStr for Complexity {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "simple" => Ok(Self::Simple),
            "complex" => Ok(Self::Complex),
            _ => Err(INVALID_COMPLEXITY),
        }
    }
}

impl Complexity {
    #[must_use]
    pub const fn builder(self) -> PasswordBuilder {
        match self {
            Self::Simple => PasswordBuilder::new(8).with_lowercase(),
            Self::Complex => PasswordBuilder::new(12)
                .with_uppercase()
                .with_lowercase()
                .with_digits()
                .with_punctuation(),
        }
    }

    /// # Errors
    /// Never for the built-in presets; see [`PasswordBuilder::build`].
    pub fn generate(self) -> Result<String, GeneratorError> {
        self.builder().build()
    }
}

/// Accumulates character classes into a pool, then draws `length` characters
/// independently and uniformly from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordBuilder {
    length: usize,
    lowercase: bool,
    uppercase: bool,
    digits: bool,
    punctuation: bool,
}

impl PasswordBuilder {
    #[must_use]
    pub const fn new(length: usize) -> Self {
        Self {
            length,
            lowercase: false,
            uppercase: false,
            digits: false,
            punctuation: false,
        }
    }

    #[must_use]
    pub const fn with_lowercase(mut self) -> Self {
        self.lowercase = true;
        self
    }

    #[must_use]
    pub const fn with_uppercase(mut self) -> Self {
        self.uppercase = true;
        self
    }

    #[must_use]
    pub const fn with_digits(mut self) -> Self {
        self.digits = true;
        self
    }

    #[must_use]
    pub const fn with_punctuation(mut self) -> Self {
        self.punctuation = true;
        self
    }

    #[must_use]
    pub fn pool(&self) -> Vec<u8> {
        [
            (self.uppercase, UPPERCASE),
            (self.lowercase, LOWERCASE),
            (self.digits, DIGITS),
            (self.punctuation, PUNCTUATION),
        ]
        .iter()
        .filter(|(enabled, _)| *enabled)
        .flat_map(|(_, class)| class.iter().copied())
        .collect()
    }

    /// # Errors
    /// Returns an error when no class is selected or the length is zero.
    pub fn build(&self) -> Result<String, GeneratorError> {
        if self.length == 0 {
            return Err(GeneratorError::ZeroLength);
        }
        let pool = self.pool();
        if pool.is_empty() {
            return Err(GeneratorError::EmptyPool);
        }

        let mut rng = OsRng;
        Ok((0..self.length)
            .filter_map(|_| pool.choose(&mut rng).copied())
            .map(char::from)
            .collect())
    }
}
