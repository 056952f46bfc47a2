//! Hashing for package ids.

use sha2::{Digest, Sha256};

/// A hasher for building fingerprints from multiple components.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    /// Add a string component.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.hasher.update(s.as_bytes());
        self.hasher.update(b"\0");
        self
    }

    /// Add an optional string component. `None` and `Some("")` hash
    /// differently.
    pub fn update_opt(&mut self, opt: Option<&str>) -> &mut Self {
        match opt {
            Some(s) => {
                self.hasher.update(b"\x01");
                self.update_str(s);
            }
            None => self.hasher.update(b"\x00"),
        }
        self
    }

    /// Finalize and return the fingerprint as a hex string.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_input_same_fingerprint() {
        let mut a = Fingerprint::new();
        a.update_str("ublkpp").update_opt(Some("20"));
        let mut b = Fingerprint::new();
        b.update_str("ublkpp").update_opt(Some("20"));

        let a = a.finish();
        assert_eq!(a.len(), 64);
        assert_eq!(a, b.finish());
    }

    #[test]
    fn test_component_boundaries() {
        let mut a = Fingerprint::new();
        a.update_str("ab").update_str("c");
        let mut b = Fingerprint::new();
        b.update_str("a").update_str("bc");
        assert_ne!(a.finish(), b.finish());
    }

    #[test]
    fn test_absent_differs_from_empty() {
        let mut a = Fingerprint::new();
        a.update_opt(None);
        let mut b = Fingerprint::new();
        b.update_opt(Some(""));
        assert_ne!(a.finish(), b.finish());
    }
}
