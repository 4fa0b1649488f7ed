//! Random password generation
//!
//! Every selected character category gets one reserved slot, the remaining
//! positions are drawn from the union of the selected categories, and the
//! result is Fisher-Yates shuffled. All randomness comes from `OsRng`.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};

/// Upper bound on a single generated password
pub const MAX_PASSWORD_LENGTH: usize = 1024;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const NUMBERS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Which categories to draw from and how long the result must be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorOptions {
    pub length: usize,
    #[serde(rename = "uppercase")]
    pub include_uppercase: bool,
    #[serde(rename = "lowercase")]
    pub include_lowercase: bool,
    #[serde(rename = "numbers")]
    pub include_numbers: bool,
    #[serde(rename = "symbols")]
    pub include_symbols: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            length: 16,
            include_uppercase: true,
            include_lowercase: true,
            include_numbers: true,
            include_symbols: true,
        }
    }
}

impl GeneratorOptions {
    fn selected_sets(&self) -> Vec<&'static [u8]> {
        [
            (self.include_uppercase, UPPERCASE),
            (self.include_lowercase, LOWERCASE),
            (self.include_numbers, NUMBERS),
            (self.include_symbols, SYMBOLS),
        ]
        .into_iter()
        .filter_map(|(on, set)| on.then_some(set))
        .collect()
    }
}

/// Generate a password satisfying `options`
///
/// Fails with [`VaultError::InvalidOptions`] when no category is selected,
/// when `length` is too short to hold one character per selected category,
/// or when it exceeds [`MAX_PASSWORD_LENGTH`].
pub fn generate(options: &GeneratorOptions) -> Result<String> {
    let sets = options.selected_sets();

    if sets.is_empty() {
        return Err(VaultError::InvalidOptions(
            "at least one character set must be selected".to_string(),
        ));
    }
    if options.length < sets.len() {
        return Err(VaultError::InvalidOptions(format!(
            "length {} cannot include one character from each of {} selected sets",
            options.length,
            sets.len()
        )));
    }
    if options.length > MAX_PASSWORD_LENGTH {
        return Err(VaultError::InvalidOptions(format!(
            "length {} exceeds the maximum of {MAX_PASSWORD_LENGTH}",
            options.length
        )));
    }

    let mut rng = OsRng;
    let pool: Vec<u8> = sets.concat();

    let mut chars: Vec<u8> = Vec::with_capacity(options.length);
    for set in &sets {
        chars.push(set[rng.gen_range(0..set.len())]);
    }
    while chars.len() < options.length {
        chars.push(pool[rng.gen_range(0..pool.len())]);
    }

    chars.shuffle(&mut rng);

    // Every set is ASCII, so the bytes map one-to-one onto chars.
    Ok(chars.into_iter().map(char::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(length: usize, upper: bool, lower: bool, numbers: bool, symbols: bool) -> GeneratorOptions {
        GeneratorOptions {
            length,
            include_uppercase: upper,
            include_lowercase: lower,
            include_numbers: numbers,
            include_symbols: symbols,
        }
    }

    fn contains_from(password: &str, set: &[u8]) -> bool {
        password.bytes().any(|b| set.contains(&b))
    }

    #[test]
    fn test_every_valid_combination_includes_each_category() {
        for mask in 1u8..16 {
            let (upper, lower, numbers, symbols) =
                (mask & 1 != 0, mask & 2 != 0, mask & 4 != 0, mask & 8 != 0);
            let selected = mask.count_ones() as usize;

            for length in [selected, selected + 1, 12, 64] {
                let opts = options(length, upper, lower, numbers, symbols);
                let password = generate(&opts).unwrap();

                assert_eq!(password.len(), length);
                assert_eq!(contains_from(&password, UPPERCASE), upper);
                assert_eq!(contains_from(&password, LOWERCASE), lower);
                assert_eq!(contains_from(&password, NUMBERS), numbers);
                assert_eq!(contains_from(&password, SYMBOLS), symbols);
            }
        }
    }

    #[test]
    fn test_no_categories_rejected() {
        let result = generate(&options(16, false, false, false, false));
        assert!(matches!(result, Err(VaultError::InvalidOptions(_))));
    }

    #[test]
    fn test_length_below_category_count_rejected() {
        let result = generate(&options(3, true, true, true, true));
        assert!(matches!(result, Err(VaultError::InvalidOptions(_))));

        let result = generate(&options(0, true, false, false, false));
        assert!(matches!(result, Err(VaultError::InvalidOptions(_))));
    }

    #[test]
    fn test_length_above_maximum_rejected() {
        let result = generate(&options(MAX_PASSWORD_LENGTH + 1, true, true, true, true));
        assert!(matches!(result, Err(VaultError::InvalidOptions(_))));
        assert!(generate(&options(MAX_PASSWORD_LENGTH, true, true, true, true)).is_ok());
    }

    #[test]
    fn test_guaranteed_characters_are_not_pinned_to_the_front() {
        // With only uppercase+numbers at length 2, a fixed ordering would
        // always start with a letter.
        let opts = options(2, true, false, true, false);
        let starts_with_digit = (0..200)
            .map(|_| generate(&opts).unwrap())
            .any(|p| p.as_bytes()[0].is_ascii_digit());
        assert!(starts_with_digit);
    }

    #[test]
    fn test_outputs_differ() {
        let opts = GeneratorOptions::default();
        assert_ne!(generate(&opts).unwrap(), generate(&opts).unwrap());
    }

    #[test]
    fn test_options_wire_names() {
        let opts: GeneratorOptions = serde_json::from_str(
            r#"{"length":20,"uppercase":true,"lowercase":false,"numbers":true,"symbols":false}"#,
        )
        .unwrap();
        assert_eq!(opts, options(20, true, false, true, false));
    }
}
