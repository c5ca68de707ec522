//! Incremental SMTP reply parser.
//!
//! Transports deliver bytes in arbitrary fragments, so the reader buffers
//! input until complete lines are available and assembles multi-line
//! replies (`250-...` continuation lines) into whole [`Reply`] values.
//! Accumulation is bounded so a misbehaving server cannot grow the buffer
//! without limit.

use std::collections::VecDeque;

use bytes::BytesMut;

use crate::error::{Error, Result};
use crate::types::{Reply, ReplyCode};

/// Maximum length of a single reply line, per RFC 5321 section 4.5.3.1.5.
pub const MAX_REPLY_LINE: usize = 512;

/// Maximum bytes buffered for one reply across all of its lines.
pub const MAX_REPLY_BYTES: usize = 8 * 1024;

/// Streaming reply reader.
///
/// Feed raw transport bytes with [`ReplyReader::feed`], then drain any
/// replies that completed with [`ReplyReader::next_reply`].
#[derive(Debug, Default)]
pub struct ReplyReader {
    /// Bytes of the line currently being received.
    buf: BytesMut,
    /// Complete lines of the reply currently being assembled.
    lines: Vec<String>,
    /// Total bytes held in `lines`.
    buffered: usize,
    /// Replies fully received and not yet taken by the caller.
    ready: VecDeque<Reply>,
}

impl ReplyReader {
    /// Creates an empty reader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds transport bytes into the reader.
    ///
    /// # Errors
    ///
    /// Returns an error if a line is malformed or the buffering limits are
    /// exceeded. After an error the reader contents are unspecified; the
    /// connection should be abandoned.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(bytes);

        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let raw = self.buf.split_to(pos + 1);
            let mut line = &raw[..raw.len() - 1];
            if let Some(stripped) = line.strip_suffix(b"\r") {
                line = stripped;
            }

            if line.len() > MAX_REPLY_LINE {
                return Err(Error::ReplyTooLong {
                    limit: MAX_REPLY_LINE,
                });
            }

            let line = String::from_utf8_lossy(line).into_owned();
            let last = is_last_reply_line(&line);

            self.buffered += line.len();
            if self.buffered > MAX_REPLY_BYTES {
                return Err(Error::ReplyTooLong {
                    limit: MAX_REPLY_BYTES,
                });
            }
            self.lines.push(line);

            if last {
                let reply = parse_reply(&self.lines)?;
                self.lines.clear();
                self.buffered = 0;
                self.ready.push_back(reply);
            }
        }

        // A partial line may never outgrow the reply line limit either.
        if self.buf.len() > MAX_REPLY_LINE {
            return Err(Error::ReplyTooLong {
                limit: MAX_REPLY_LINE,
            });
        }

        Ok(())
    }

    /// Takes the next fully received reply, if any.
    pub fn next_reply(&mut self) -> Option<Reply> {
        self.ready.pop_front()
    }

    /// Returns true if no partial reply is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty() && self.lines.is_empty() && self.ready.is_empty()
    }
}

/// Parses an assembled SMTP reply from its lines.
///
/// Only the final line's leading digits decide the verdict; earlier lines
/// are kept as text.
///
/// # Errors
///
/// Returns an error if any line lacks a three-digit code prefix.
pub fn parse_reply(lines: &[String]) -> Result<Reply> {
    let Some(last) = lines.last() else {
        return Err(Error::Protocol("empty reply".into()));
    };

    let code = reply_code(last)?;
    let mut text = Vec::with_capacity(lines.len());
    for line in lines {
        // Every line must carry a code prefix even though only the final
        // one is authoritative.
        reply_code(line)?;
        if line.len() > 4 {
            text.push(line[4..].to_string());
        } else {
            text.push(String::new());
        }
    }

    Ok(Reply::new(code, text))
}

/// Checks whether a line terminates a reply.
///
/// Continuation lines carry `-` after the code; a space, or a bare code
/// with nothing after it, ends the reply.
#[must_use]
pub fn is_last_reply_line(line: &str) -> bool {
    line.as_bytes().get(3) != Some(&b'-')
}

fn reply_code(line: &str) -> Result<ReplyCode> {
    let bytes = line.as_bytes();
    if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
        return Err(Error::Protocol(format!("malformed reply line: {line}")));
    }
    match bytes.get(3) {
        None | Some(&b' ' | &b'-') => {}
        Some(_) => {
            return Err(Error::Protocol(format!("malformed reply line: {line}")));
        }
    }

    let code = line[..3]
        .parse::<u16>()
        .map_err(|_| Error::Protocol(format!("invalid reply code in: {line}")))?;
    Ok(ReplyCode::new(code))
}
