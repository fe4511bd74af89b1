//! Seek directive codec
//!
//! Recognition, parsing and encoding of the textual seek directive.

use crate::address::SeekRequest;
use crate::error::{LogError, Result};

/// Reserved prefix marking a seek directive
pub const SEEKTO_PREFIX: &[u8] = b"AESDCHAR_IOCSEEKTO:";

/// What a received command asks for
#[derive(Debug, PartialEq, Eq)]
pub enum Inbound<'a> {
    /// Reposition the reply cursor; append nothing
    Seek(SeekRequest),

    /// Log content to accumulate
    Content(&'a [u8]),
}

/// Classify a completed command
pub fn classify(chunk: &[u8]) -> Result<Inbound<'_>> {
    match parse_seek_directive(chunk) {
        Some(request) => Ok(Inbound::Seek(request?)),
        None => Ok(Inbound::Content(chunk)),
    }
}

/// Parse a seek directive
///
/// Returns `None` when `chunk` does not start with [`SEEKTO_PREFIX`], and
/// an error when it does but the two numbers are missing or malformed.
pub fn parse_seek_directive(chunk: &[u8]) -> Option<Result<SeekRequest>> {
    let body = chunk.strip_prefix(SEEKTO_PREFIX)?;
    Some(parse_body(body))
}

/// Encode a newline-terminated seek directive
pub fn encode_seek_directive(request: SeekRequest) -> Vec<u8> {
    let mut message = SEEKTO_PREFIX.to_vec();
    message.extend_from_slice(
        format!("{},{}\n", request.command_index, request.intra_offset).as_bytes(),
    );
    message
}

// =============================================================================
// Private Helpers
// =============================================================================

fn parse_body(body: &[u8]) -> Result<SeekRequest> {
    let text = std::str::from_utf8(body)
        .map_err(|_| LogError::Protocol("seek directive is not valid UTF-8".to_string()))?;
    let text = text.trim_end_matches(['\r', '\n']);

    let (command, offset) = text.split_once(',').ok_or_else(|| {
        LogError::Protocol(format!(
            "seek directive: expected <command>,<offset>, got {:?}",
            text
        ))
    })?;

    Ok(SeekRequest {
        command_index: parse_field("command index", command)?,
        intra_offset: parse_field("byte offset", offset)?,
    })
}

fn parse_field(name: &str, field: &str) -> Result<u32> {
    field.trim().parse().map_err(|e| {
        LogError::Protocol(format!("seek directive: invalid {} {:?}: {}", name, field, e))
    })
}
