//! Best score across sessions
//!
//! Persisted as decimal text under a single key so older saves stay readable.

use crate::persistence::Storage;

/// Storage key for the best score
pub const STORAGE_KEY: &str = "highScore";

/// The best score ever reached. Never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighScore {
    best: u32,
}

impl HighScore {
    pub fn new(best: u32) -> Self {
        Self { best }
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Read the stored best score; anything missing or malformed counts as 0
    pub fn load(storage: &impl Storage) -> Self {
        match storage.get(STORAGE_KEY) {
            Ok(Some(raw)) => {
                let best = parse_score(&raw);
                log::info!("Loaded high score {}", best);
                Self { best }
            }
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("Could not read high score: {}", e);
                Self::default()
            }
        }
    }

    /// Record a score. Returns true and persists when it beats the best.
    pub fn record(&mut self, score: u32, storage: &mut impl Storage) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        if let Err(e) = storage.set(STORAGE_KEY, &score.to_string()) {
            log::warn!("Could not save high score {}: {}", score, e);
        }
        true
    }
}

/// Lenient integer parse: leading whitespace, optional `+`, then digits.
/// Trailing junk is ignored; no digits, a minus sign, or overflow give 0.
pub fn parse_score(raw: &str) -> u32 {
    let trimmed = raw.trim_start();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score("42"), 42);
        assert_eq!(parse_score("  17"), 17);
        assert_eq!(parse_score("+8"), 8);
        assert_eq!(parse_score("12abc"), 12);
        assert_eq!(parse_score("abc"), 0);
        assert_eq!(parse_score(""), 0);
        assert_eq!(parse_score("-5"), 0);
        assert_eq!(parse_score("NaN"), 0);
        assert_eq!(parse_score("99999999999999999999"), 0);
    }

    #[test]
    fn test_load_defaults_to_zero() {
        let storage = MemoryStorage::new();
        assert_eq!(HighScore::load(&storage).best(), 0);

        let mut storage = MemoryStorage::new();
        storage.set(STORAGE_KEY, "garbage").unwrap();
        assert_eq!(HighScore::load(&storage).best(), 0);
    }

    #[test]
    fn test_record_only_on_improvement() {
        let mut storage = MemoryStorage::new();
        let mut high = HighScore::new(5);

        assert!(!high.record(3, &mut storage));
        assert!(!high.record(5, &mut storage));
        assert_eq!(storage.get(STORAGE_KEY).unwrap(), None);

        assert!(high.record(6, &mut storage));
        assert_eq!(high.best(), 6);
        assert_eq!(storage.get(STORAGE_KEY).unwrap().as_deref(), Some("6"));
    }

    #[test]
    fn test_round_trip() {
        let mut storage = MemoryStorage::new();
        let mut high = HighScore::load(&storage);
        high.record(23, &mut storage);
        assert_eq!(HighScore::load(&storage), high);
    }
}
