use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for file formats that are parsed into an in-memory value.
///
/// Implementors handle format-specific parsing; opening the file and buffering
/// are provided by the default methods.
pub trait ReadFormat {
    /// The value produced by a successful parse.
    type Output;

    /// The error type for parsing and I/O.
    type Error: Error + From<io::Error>;

    /// Reads and parses a value from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is malformed or the reader fails.
    fn read_from(reader: &mut impl BufRead) -> Result<Self::Output, Self::Error>;

    /// Reads and parses a value from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self::Output, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}

/// Defines the interface for file formats that serialize an in-memory value.
pub trait WriteFormat {
    /// The value being written.
    type Input: ?Sized;

    /// Format-specific knobs. Use `()` when there are none.
    type Options;

    /// The error type for serialization and I/O.
    type Error: Error + From<io::Error>;

    /// Writes `input` to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_to(
        input: &Self::Input,
        options: &Self::Options,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Writes `input` to a newly created file at `path`, flushing before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(
        input: &Self::Input,
        options: &Self::Options,
        path: P,
    ) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(input, options, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
