//! Alphabet and length bounds used to build short codes.

use serde_json::json;

use crate::error::AppError;

pub const DEFAULT_MIN_LENGTH: usize = 5;
pub const DEFAULT_MAX_LENGTH: usize = 12;

/// Lowercase letters without the visually ambiguous `c`, `i`, `j`, `k`, `l`, `o`.
pub const DEFAULT_LETTERS: &str = "abdefghmnpqrstuvwxyz";

/// Digits without `0` and `1`.
pub const DEFAULT_DIGITS: &str = "23456789";

/// Upper bound imposed by the `urls.id` column (`varchar(32)`).
pub const MAX_CODE_LENGTH: usize = 32;

/// Immutable parameters for candidate generation.
///
/// Validated once on construction and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphabetConfig {
    min_length: usize,
    max_length: usize,
    letters: Vec<char>,
    digits: Vec<char>,
}

impl AlphabetConfig {
    /// Builds a config from length bounds and the two character sets.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if:
    /// - `min_length` is zero
    /// - `max_length` is below `min_length` or above [`MAX_CODE_LENGTH`]
    /// - either character set is empty
    pub fn new(
        min_length: usize,
        max_length: usize,
        letters: &str,
        digits: &str,
    ) -> Result<Self, AppError> {
        if min_length == 0 {
            return Err(AppError::bad_request(
                "Minimum short code length must be at least 1",
                json!({ "min_length": min_length }),
            ));
        }

        if max_length < min_length {
            return Err(AppError::bad_request(
                "Maximum short code length must not be below the minimum",
                json!({ "min_length": min_length, "max_length": max_length }),
            ));
        }

        if max_length > MAX_CODE_LENGTH {
            return Err(AppError::bad_request(
                "Maximum short code length exceeds storage limit",
                json!({ "max_length": max_length, "limit": MAX_CODE_LENGTH }),
            ));
        }

        if letters.is_empty() {
            return Err(AppError::bad_request(
                "Letter set must not be empty",
                json!({ "letters": letters }),
            ));
        }

        if digits.is_empty() {
            return Err(AppError::bad_request(
                "Digit set must not be empty",
                json!({ "digits": digits }),
            ));
        }

        Ok(Self {
            min_length,
            max_length,
            letters: letters.chars().collect(),
            digits: digits.chars().collect(),
        })
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn letters(&self) -> &[char] {
        &self.letters
    }

    pub fn digits(&self) -> &[char] {
        &self.digits
    }

    /// Number of candidates one random draw yields.
    pub fn batch_size(&self) -> usize {
        self.max_length - self.min_length + 1
    }

    /// Returns true if `c` belongs to the letter or digit set.
    pub fn contains(&self, c: char) -> bool {
        self.letters.contains(&c) || self.digits.contains(&c)
    }
}

impl Default for AlphabetConfig {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_LENGTH,
            max_length: DEFAULT_MAX_LENGTH,
            letters: DEFAULT_LETTERS.chars().collect(),
            digits: DEFAULT_DIGITS.chars().collect(),
        }
    }
}
