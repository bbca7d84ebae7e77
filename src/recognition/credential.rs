//! API credential for the recognition service

use std::fmt;

use zeroize::Zeroizing;

/// Secret API key, wiped from memory on drop
#[derive(Clone)]
pub struct Credential(Zeroizing<String>);

impl Credential {
    /// Wrap a key; surrounding whitespace is dropped and blank input is `None`
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key: Zeroizing<String> = Zeroizing::new(key.into());
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(Zeroizing::new(trimmed.to_string())))
    }

    /// The raw key, for building requests
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_rejected() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new("   \n").is_none());
    }

    #[test]
    fn test_trimmed() {
        assert_eq!(Credential::new(" abc123 ").unwrap().expose(), "abc123");
    }

    #[test]
    fn test_debug_redacts() {
        let debug = format!("{:?}", Credential::new("secret-key").unwrap());
        assert!(!debug.contains("secret"));
    }
}
