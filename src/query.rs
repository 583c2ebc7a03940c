//! Value lookup with typed accessors.
//!
//! Typed getters return the caller's default both when the value is missing
//! and when it does not parse. Use [`Dataset::get_value`] and parse it
//! yourself to tell the two apart.

use crate::dataset::Dataset;
use crate::storage::Storage;

impl<S: Storage> Dataset<S> {
    /// Value of the first pair called `key` in the section called `section`.
    ///
    /// Both names are matched exactly and case-sensitively.
    #[must_use]
    pub fn get_value(&self, section: &str, key: &str) -> Option<&str> {
        self.has_section(section)?.get(key)
    }

    #[must_use]
    pub fn get_string<'d>(&'d self, section: &str, key: &str, default: &'d str) -> &'d str {
        self.get_value(section, key).unwrap_or(default)
    }

    /// Decimal unsigned integer.
    #[must_use]
    pub fn get_unsigned(&self, section: &str, key: &str, default: u64) -> u64 {
        self.get_value(section, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Decimal signed integer.
    #[must_use]
    pub fn get_signed(&self, section: &str, key: &str, default: i64) -> i64 {
        self.get_value(section, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Hexadecimal integer, with or without a `0x`/`0X` prefix.
    #[must_use]
    pub fn get_hex(&self, section: &str, key: &str, default: u64) -> u64 {
        self.get_value(section, key)
            .and_then(|v| {
                let digits = v
                    .strip_prefix("0x")
                    .or_else(|| v.strip_prefix("0X"))
                    .unwrap_or(v);
                u64::from_str_radix(digits, 16).ok()
            })
            .unwrap_or(default)
    }

    #[must_use]
    pub fn get_float(&self, section: &str, key: &str, default: f64) -> f64 {
        self.get_value(section, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Exactly `true` or `false`; anything else is the default.
    #[must_use]
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        match self.get_value(section, key) {
            Some("true") => true,
            Some("false") => false,
            _ => default,
        }
    }
}
