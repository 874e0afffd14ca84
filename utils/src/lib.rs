use std::io::BufWriter;
use std::io::Cursor;
use std::io::Write;

/// Where a stream of diagnostics ends up: an in-memory buffer (handy for
/// tests), or a buffered writer like stdout.
enum Sink {
    Log(Cursor<Vec<u8>>),
    Write(BufWriter<Box<dyn Write>>),
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Sink::Log(inner) => inner.write(buf),
            Sink::Write(inner) => inner.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Sink::Log(_) => Ok(()),
            Sink::Write(inner) => inner.flush(),
        }
    }
}

impl Sink {
    fn contents(&self) -> Option<String> {
        match self {
            Sink::Log(inner) => Some(String::from_utf8_lossy(inner.get_ref()).into_owned()),
            Sink::Write(_) => None,
        }
    }
}

/// Collects the regular output and the diagnostics of the equation tools.
/// Diagnostics refer to a line of the input file.
pub struct DiagnosticEmitter {
    out: Sink,
    err: Sink,
    errors: usize,
    warnings: usize,
}

impl DiagnosticEmitter {
    pub fn new(out: Box<dyn Write>, err: Box<dyn Write>) -> Self {
        Self {
            out: Sink::Write(BufWriter::new(out)),
            err: Sink::Write(BufWriter::new(err)),
            errors: 0,
            warnings: 0,
        }
    }

    pub fn log_to_buffer() -> Self {
        Self {
            out: Sink::Log(Cursor::new(Vec::new())),
            err: Sink::Log(Cursor::new(Vec::new())),
            errors: 0,
            warnings: 0,
        }
    }

    pub fn out(&mut self, msg: &str) {
        self.out
            .write_all(msg.as_bytes())
            .expect("Failed to write to output buffer.");
    }

    pub fn out_ln(&mut self, msg: &str) {
        self.out(msg);
        self.out("\n");
    }

    /// The regular output, when logging to a buffer.
    pub fn out_buffer(&self) -> Option<String> {
        self.out.contents()
    }

    /// The diagnostics, when logging to a buffer.
    pub fn err_buffer(&self) -> Option<String> {
        self.err.contents()
    }

    pub fn error(&mut self, line: u32, message: &str) {
        self.report(line, "", message);
    }

    /// Reports an error, `item` usually points to the offending token.
    pub fn report(&mut self, line: u32, item: &str, message: &str) {
        self.errors += 1;
        self.emit(format!("[line {line}] Error {item}: {message}\n"));
    }

    /// Like [`DiagnosticEmitter::report`], for problems that do not stop
    /// the processing of the input.
    pub fn warn(&mut self, line: u32, item: &str, message: &str) {
        self.warnings += 1;
        self.emit(format!("[line {line}] Warning {item}: {message}\n"));
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn warning_count(&self) -> usize {
        self.warnings
    }

    pub fn flush(&mut self) {
        self.out.flush().expect("Failed to flush output buffer.");
        self.err.flush().expect("Failed to flush error buffer.");
    }

    fn emit(&mut self, line: String) {
        let _ = self.err.write_all(line.as_bytes());
    }
}

impl Drop for DiagnosticEmitter {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffered_diagnostics() {
        let mut diag = DiagnosticEmitter::log_to_buffer();
        diag.out_ln("x = Yes");
        diag.report(3, "at 'y'", "'=' expected.");
        diag.warn(4, "at 'x'", "Duplicate equation.");
        assert_eq!(diag.out_buffer().as_deref(), Some("x = Yes\n"));
        assert_eq!(
            diag.err_buffer().as_deref(),
            Some("[line 3] Error at 'y': '=' expected.\n[line 4] Warning at 'x': Duplicate equation.\n")
        );
        assert_eq!(diag.error_count(), 1);
        assert_eq!(diag.warning_count(), 1);
    }

    #[test]
    fn writer_has_no_buffer() {
        let diag = DiagnosticEmitter::new(Box::new(Vec::<u8>::new()), Box::new(Vec::<u8>::new()));
        assert_eq!(diag.out_buffer(), None);
        assert_eq!(diag.err_buffer(), None);
    }
}
