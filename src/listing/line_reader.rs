use futures::{AsyncBufRead, AsyncBufReadExt};

/// Reads `\n`-terminated lines from a buffered byte stream.
///
/// `read_until` keeps a line that arrives over several reads together, and
/// decoding happens only once the whole line is in, so a multi-byte character
/// split between reads survives. Invalid UTF-8 is replaced, never an error.
#[derive(Debug)]
pub struct LineReader<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    /// The next line without its terminator, or `None` at end of stream. An
    /// unterminated final line is still returned.
    pub async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf).await? == 0 {
            return Ok(None);
        }
        Ok(Some(decode_line(&self.buf)))
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
