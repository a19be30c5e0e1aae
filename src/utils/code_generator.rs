//! Candidate short code generation.
//!
//! One random string of `max_length` characters is drawn per batch and every
//! prefix from `min_length` to `max_length` becomes a candidate, shortest
//! first. Letters never run longer than two characters in a row.

use std::sync::Arc;

use rand::Rng;

use crate::domain::alphabet::AlphabetConfig;
use crate::utils::random::SecureRng;

/// Longest allowed run of consecutive letters.
pub const MAX_LETTER_RUN: usize = 2;

/// Pure generator of candidate short codes.
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    config: Arc<AlphabetConfig>,
}

impl CandidateGenerator {
    pub fn new(config: Arc<AlphabetConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AlphabetConfig {
        &self.config
    }

    /// Generates one batch using [`SecureRng`].
    ///
    /// The batch holds `max_length - min_length + 1` candidates in increasing
    /// length order; each shorter candidate is a prefix of the longer ones.
    pub fn generate(&self) -> Vec<String> {
        self.generate_with(&mut SecureRng::new())
    }

    /// Generates one batch from the given random source.
    ///
    /// A seeded generator makes the batch reproducible.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let generator = CandidateGenerator::new(Arc::new(AlphabetConfig::default()));
    /// let batch = generator.generate_with(&mut StdRng::seed_from_u64(42));
    /// assert_eq!(batch.len(), 8);
    /// assert_eq!(batch[0].len(), 5);
    /// ```
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<String> {
        let random_part = self.random_part(rng);

        (self.config.min_length()..=self.config.max_length())
            .map(|length| random_part[..length].iter().collect())
            .collect()
    }

    fn random_part<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<char> {
        let letters = self.config.letters();
        let digits = self.config.digits();
        let length = self.config.max_length();

        let mut use_letter = rng.random_bool(0.5);
        let mut letter_run = 0;
        let mut part = Vec::with_capacity(length);

        for _ in 0..length {
            if use_letter && letter_run < MAX_LETTER_RUN {
                part.push(letters[rng.random_range(0..letters.len())]);
                letter_run += 1;
            } else {
                part.push(digits[rng.random_range(0..digits.len())]);
                letter_run = 0;
            }
            use_letter = rng.random_bool(0.5);
        }

        part
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::alphabet::{DEFAULT_DIGITS, DEFAULT_LETTERS};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn generator(min: usize, max: usize, letters: &str, digits: &str) -> CandidateGenerator {
        CandidateGenerator::new(Arc::new(
            AlphabetConfig::new(min, max, letters, digits).unwrap(),
        ))
    }

    fn default_generator() -> CandidateGenerator {
        CandidateGenerator::new(Arc::new(AlphabetConfig::default()))
    }

    fn longest_letter_run(code: &str, letters: &str) -> usize {
        let mut longest = 0;
        let mut current = 0;
        for c in code.chars() {
            if letters.contains(c) {
                current += 1;
                longest = longest.max(current);
            } else {
                current = 0;
            }
        }
        longest
    }

    #[test]
    fn test_batch_has_one_candidate_per_length() {
        let batch = default_generator().generate();

        assert_eq!(batch.len(), 8);
        for (i, candidate) in batch.iter().enumerate() {
            assert_eq!(candidate.chars().count(), 5 + i);
        }
    }

    #[test]
    fn test_shorter_candidates_are_prefixes() {
        let batch = default_generator().generate();
        let longest = batch.last().unwrap();

        for candidate in &batch {
            assert!(longest.starts_with(candidate.as_str()));
        }
    }

    #[test]
    fn test_lengths_within_bounds() {
        let generator = generator(3, 9, DEFAULT_LETTERS, DEFAULT_DIGITS);

        for _ in 0..200 {
            for candidate in generator.generate() {
                let len = candidate.chars().count();
                assert!((3..=9).contains(&len), "length {len} out of range");
            }
        }
    }

    #[test]
    fn test_characters_drawn_from_alphabet() {
        let generator = default_generator();

        for _ in 0..200 {
            for candidate in generator.generate() {
                assert!(
                    candidate.chars().all(|c| generator.config().contains(c)),
                    "unexpected character in {candidate}"
                );
            }
        }
    }

    #[test]
    fn test_no_letter_run_longer_than_two() {
        let generator = default_generator();

        for _ in 0..500 {
            let batch = generator.generate();
            let longest = batch.last().unwrap();
            assert!(
                longest_letter_run(longest, DEFAULT_LETTERS) <= MAX_LETTER_RUN,
                "letter run too long in {longest}"
            );
        }
    }

    #[test]
    fn test_same_seed_same_batch() {
        let generator = default_generator();

        let first = generator.generate_with(&mut StdRng::seed_from_u64(42));
        let second = generator.generate_with(&mut StdRng::seed_from_u64(42));

        assert_eq!(first, second);
    }

    #[test]
    fn test_different_seeds_differ() {
        let generator = default_generator();

        let batches: std::collections::HashSet<String> = (0..20)
            .map(|seed| {
                generator
                    .generate_with(&mut StdRng::seed_from_u64(seed))
                    .pop()
                    .unwrap()
            })
            .collect();

        assert!(batches.len() > 1);
    }

    #[test]
    fn test_equal_bounds_yield_single_candidate() {
        let generator = generator(5, 5, DEFAULT_LETTERS, DEFAULT_DIGITS);

        for _ in 0..50 {
            let batch = generator.generate();
            assert_eq!(batch.len(), 1);
            assert_eq!(batch[0].chars().count(), 5);
        }
    }

    #[test]
    fn test_single_character_sets() {
        let generator = generator(4, 8, "a", "2");

        for _ in 0..50 {
            let batch = generator.generate();
            let longest = batch.last().unwrap();
            assert!(longest.chars().all(|c| c == 'a' || c == '2'));
            assert!(!longest.contains("aaa"));
        }
    }

    #[test]
    fn test_multibyte_alphabet_prefixes() {
        let generator = generator(2, 4, "äö", "٣");

        let batch = generator.generate_with(&mut StdRng::seed_from_u64(7));

        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].chars().count(), 2);
        assert_eq!(batch[2].chars().count(), 4);
    }
}
