use crate::error::Error;
use serde::Serialize;
use std::cell::RefCell;
use std::io::Write;

/// Where the output goes
enum Sink {
    Std,

    /// Kept in memory, stdout and stderr together
    Buffer(RefCell<Vec<u8>>),
}

/// Write all outputs of a command
///
/// Plain text goes to the terminal, structured mode prints one JSON document per call instead.
pub(crate) struct Writer {
    is_structured: bool,
    sink: Sink,
}

impl Writer {
    pub(crate) fn new(is_structured: bool) -> Self {
        Writer {
            is_structured,
            sink: Sink::Std,
        }
    }

    /// Writer that keeps the output in memory, see `Writer::captured_output`
    #[cfg(test)]
    pub(crate) fn capturing(is_structured: bool) -> Self {
        Writer {
            is_structured,
            sink: Sink::Buffer(RefCell::new(vec![])),
        }
    }

    #[cfg(test)]
    pub(crate) fn captured_output(&self) -> String {
        match &self.sink {
            Sink::Buffer(buffer) => String::from_utf8_lossy(&buffer.borrow()).into_owned(),
            Sink::Std => String::new(),
        }
    }

    /// Human readable output, skipped in structured mode
    pub(crate) fn text(&self, output: &str) -> Result<(), Error> {
        if self.is_structured {
            log::warn!("Skipping output (not structured data): {output}");
            return Ok(());
        }

        self.write(output.as_bytes(), false)
    }

    /// Serialize a manifest, a stack list or any other value as a single JSON document
    ///
    /// Skipped in plain text mode.
    pub(crate) fn json<T: Serialize + ?Sized>(&self, output: &T) -> Result<(), Error> {
        if !self.is_structured {
            log::warn!("Skipping output (not plain text)");
            return Ok(());
        }

        let mut json = serde_json::to_vec(output).map_err(|e| {
            log::error!("Failed to serialize output: {e:?}");
            Error::new("Failed to serialize the output", None)
        })?;

        json.push(b'\n');
        self.write(&json, false)
    }

    /// Human readable error, in stderr
    pub(crate) fn error(&self, output: &str) -> Result<(), Error> {
        if self.is_structured {
            log::warn!("Skipping output (not structured data): {output}");
            return Ok(());
        }

        self.write(output.as_bytes(), true)
    }

    fn write(&self, output: &[u8], is_error: bool) -> Result<(), Error> {
        let result = match &self.sink {
            Sink::Buffer(buffer) => {
                buffer.borrow_mut().extend_from_slice(output);
                Ok(())
            }

            Sink::Std if is_error => std::io::stderr().write_all(output),
            Sink::Std => std::io::stdout().write_all(output),
        };

        result.map_err(|e| {
            log::error!("Error while writing to std*: {e:?}");
            Error::new("Output error", Some("Check that stdout is writable."))
        })
    }

    pub(crate) fn is_structured(&self) -> bool {
        self.is_structured
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn text_mode_skips_json() {
        let writer = Writer::capturing(false);
        writer.text("Stacks\n").unwrap();
        writer.json(&json!({ "stacks": [] })).unwrap();

        assert_eq!(writer.captured_output(), "Stacks\n");
    }

    #[test]
    fn structured_mode_prints_one_document_per_call() {
        let writer = Writer::capturing(true);
        writer.text("Stacks\n").unwrap();
        writer.error("Error\n").unwrap();
        writer.json(&[1, 2]).unwrap();
        writer.json(&json!({ "waves": [] })).unwrap();

        assert_eq!(writer.captured_output(), "[1,2]\n{\"waves\":[]}\n");
    }
}
