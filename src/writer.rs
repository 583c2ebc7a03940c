//! Writing a [`Dataset`] back out as INI text.

use embedded_io::Write;

use crate::dataset::Dataset;
use crate::storage::Storage;

/// Values with spaces are quoted so they read back unchanged.
fn needs_quotes(value: &str) -> bool {
    value.contains(' ')
}

/// Writes every section in insertion order, each followed by its pairs.
///
/// ```
/// let data = inidb::Dataset::parse_str("[Text]\ngreeting = Hello there\n").unwrap();
/// let mut out = Vec::new();
/// inidb::writer::write(&data, &mut out).unwrap();
/// assert_eq!(out, b"[Text]\ngreeting=\"Hello there\"\n");
/// ```
///
/// # Errors
///
/// From the underlying writer.
pub fn write<W: Write, S: Storage>(dataset: &Dataset<S>, mut writer: W) -> Result<(), W::Error> {
    for section in dataset {
        writer.write_all(b"[")?;
        writer.write_all(section.name().as_bytes())?;
        writer.write_all(b"]\n")?;
        for pair in section.pairs() {
            writer.write_all(pair.key.as_bytes())?;
            writer.write_all(b"=")?;
            if needs_quotes(pair.value) {
                writer.write_all(b"\"")?;
                writer.write_all(pair.value.as_bytes())?;
                writer.write_all(b"\"")?;
            } else {
                writer.write_all(pair.value.as_bytes())?;
            }
            writer.write_all(b"\n")?;
        }
    }
    writer.flush()
}

impl<S: Storage> Dataset<S> {
    /// See [`write`].
    ///
    /// # Errors
    ///
    /// From the underlying writer.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), W::Error> {
        write(self, writer)
    }

    /// Creates or truncates the file at `path` and writes the dataset to it.
    ///
    /// # Errors
    ///
    /// If the file cannot be created or written.
    #[cfg(feature = "std")]
    pub fn write_path<P: AsRef<std::path::Path>>(&self, path: P) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        write(self, embedded_io_adapters::std::FromStd::new(file))
    }
}
