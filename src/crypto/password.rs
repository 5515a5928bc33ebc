//! Password strength checks and generation.

use super::aead::secure_random;
use crate::error::CryptoError;
use serde::Serialize;
use zeroize::Zeroizing;

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*";
const SPECIAL: &str = "!@#$%^&*(),.?\":{}|<>";

/// Default length for generated passwords.
pub const DEFAULT_GENERATED_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strength {
    Weak,
    Medium,
    Strong,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirements {
    pub min_length: bool,
    pub has_uppercase: bool,
    pub has_lowercase: bool,
    pub has_numbers: bool,
    pub has_special_chars: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordStrength {
    pub is_valid: bool,
    pub score: u8,
    pub requirements: Requirements,
    pub strength: Strength,
}

/// Scores a password against five simple requirements.
pub fn assess_password(password: &str) -> PasswordStrength {
    let requirements = Requirements {
        min_length: password.chars().count() >= 8,
        has_uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
        has_lowercase: password.chars().any(|c| c.is_ascii_lowercase()),
        has_numbers: password.chars().any(|c| c.is_ascii_digit()),
        has_special_chars: password.chars().any(|c| SPECIAL.contains(c)),
    };

    let score = [
        requirements.min_length,
        requirements.has_uppercase,
        requirements.has_lowercase,
        requirements.has_numbers,
        requirements.has_special_chars,
    ]
    .into_iter()
    .filter(|&met| met)
    .count() as u8;

    let strength = match score {
        0 | 1 => Strength::Weak,
        2 | 3 => Strength::Medium,
        _ => Strength::Strong,
    };

    PasswordStrength {
        is_valid: score >= 3,
        score,
        requirements,
        strength,
    }
}

/// Generates a random password of `len` characters.
pub fn generate_password(len: usize) -> Result<Zeroizing<String>, CryptoError> {
    if len == 0 {
        return Err(CryptoError::InvalidPassword);
    }

    let mut bytes = Zeroizing::new(vec![0u8; len]);
    secure_random(&mut bytes)?;

    let password = bytes
        .iter()
        .map(|b| CHARSET[*b as usize % CHARSET.len()] as char)
        .collect::<String>();

    Ok(Zeroizing::new(password))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_password() {
        let s = assess_password("abc");
        assert_eq!(s.score, 1);
        assert_eq!(s.strength, Strength::Weak);
        assert!(!s.is_valid);
    }

    #[test]
    fn medium_password_is_valid_at_three() {
        let s = assess_password("abcdefgh1");
        assert_eq!(s.score, 3);
        assert_eq!(s.strength, Strength::Medium);
        assert!(s.is_valid);
    }

    #[test]
    fn strong_password() {
        let s = assess_password("Correct-Horse-9!");
        assert_eq!(s.score, 5);
        assert_eq!(s.strength, Strength::Strong);
        assert!(s.requirements.has_special_chars);
    }

    #[test]
    fn generated_password_uses_charset() {
        let pw = generate_password(DEFAULT_GENERATED_LEN).unwrap();
        assert_eq!(pw.len(), DEFAULT_GENERATED_LEN);
        assert!(pw.bytes().all(|b| CHARSET.contains(&b)));
    }

    #[test]
    fn generated_passwords_differ() {
        assert_ne!(
            *generate_password(32).unwrap(),
            *generate_password(32).unwrap()
        );
    }

    #[test]
    fn zero_length_is_rejected() {
        assert_eq!(generate_password(0), Err(CryptoError::InvalidPassword));
    }
}
