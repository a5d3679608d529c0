//! Data-URI codec: `data:<mediatype>[;base64|;base64-placeholder],<payload>`.
//!
//! A single metadata parser ([`DataUri::parse`]) classifies every source into
//! an [`Encoding`]; the transforms dispatch on that enum instead of repeating
//! suffix checks:
//!
//! | Encoding            | Decode direction          | Encode direction          |
//! |---------------------|---------------------------|---------------------------|
//! | `Base64`            | write payload to file     | left as-is                |
//! | `Base64Placeholder` | left as-is                | read file, base64-encode  |
//! | `Raw`               | percent-decoded text      | percent-decoded text      |
//!
//! The codec never sees the document; callers splice the result back with
//! [`Transcoded::rewritten_source`].

use crate::config::Direction;
use crate::diagnostics::DiagnosticsSink;
use crate::error::{Diagnostic, TranscodeError};
use crate::pipeline::materialize;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Scheme prefix every embedded source starts with.
pub const DATA_SCHEME: &str = "data:";

/// Media type assumed when the metadata section is empty (RFC 2397).
pub const DEFAULT_MEDIATYPE: &str = "text/plain;charset=US-ASCII";

/// Metadata token marking an inline base64 payload.
pub const BASE64_TOKEN: &str = "base64";

/// Metadata token marking a payload that lives in a file next to the document.
pub const PLACEHOLDER_TOKEN: &str = "base64-placeholder";

// Encoders in the wild drop padding; accept both forms on the way in.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

// Longest URI prefix echoed back in error messages.
const PREVIEW_CHARS: usize = 64;

/// How the payload of a data URI is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Encoding {
    /// `;base64` — payload is inline base64.
    Base64,
    /// `;base64-placeholder` — payload was extracted to a file.
    Base64Placeholder,
    /// No recognised encoding token; payload is percent-encoded text.
    Raw,
}

/// A parsed data URI, borrowing from the source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri<'a> {
    pub mediatype: &'a str,
    pub encoding: Encoding,
    pub payload: &'a str,
}

impl<'a> DataUri<'a> {
    /// Parse a data URI.
    ///
    /// # Errors
    /// * [`TranscodeError::InvalidScheme`] — no `data:` prefix
    /// * [`TranscodeError::MalformedUri`] — no `,` after the metadata
    pub fn parse(uri: &'a str) -> Result<Self, TranscodeError> {
        let rest = uri
            .strip_prefix(DATA_SCHEME)
            .ok_or_else(|| TranscodeError::InvalidScheme { uri: preview(uri) })?;
        let (metadata, payload) = rest
            .split_once(',')
            .ok_or_else(|| TranscodeError::MalformedUri { uri: preview(uri) })?;

        let (mediatype, encoding) = match metadata.rsplit_once(';') {
            Some((head, BASE64_TOKEN)) => (head, Encoding::Base64),
            Some((head, PLACEHOLDER_TOKEN)) => (head, Encoding::Base64Placeholder),
            None if metadata == BASE64_TOKEN => ("", Encoding::Base64),
            None if metadata == PLACEHOLDER_TOKEN => ("", Encoding::Base64Placeholder),
            _ => (metadata, Encoding::Raw),
        };

        Ok(Self {
            mediatype: if mediatype.is_empty() {
                DEFAULT_MEDIATYPE
            } else {
                mediatype
            },
            encoding,
            payload,
        })
    }
}

/// Result of running one source through the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcoded {
    pub mediatype: String,
    pub encoding: Encoding,
    /// Base64 text after an encode, percent-decoded text for `Raw`, the
    /// untouched payload for a direction mismatch, empty after a decode.
    pub data: String,
    /// Payload bytes written or read on disk; 0 when no file was touched.
    pub bytes: usize,
}

impl Transcoded {
    /// The source string to store back in the document, or `None` when the
    /// original source stays as it is.
    pub fn rewritten_source(&self, direction: Direction) -> Option<String> {
        match (direction, self.encoding) {
            (Direction::Decode, Encoding::Base64) => Some(placeholder_source(&self.mediatype)),
            (Direction::Encode, Encoding::Base64Placeholder) => {
                Some(base64_source(&self.mediatype, &self.data))
            }
            _ => None,
        }
    }
}

/// Parse `uri` and apply the transform its encoding calls for.
///
/// `target` is the file the payload is written to (decode) or read from
/// (encode). An empty decoded payload still creates an empty file and is
/// reported as [`Diagnostic::EmptyPayload`].
pub async fn transcode(
    target: &Path,
    uri: &str,
    direction: Direction,
    sink: &dyn DiagnosticsSink,
) -> Result<Transcoded, TranscodeError> {
    let parsed = DataUri::parse(uri)?;

    let (data, bytes) = match (parsed.encoding, direction) {
        (Encoding::Base64, Direction::Decode) => {
            let written = materialize_payload(target, parsed.payload, sink).await?;
            (String::new(), written)
        }
        (Encoding::Base64Placeholder, Direction::Encode) => embed_file(target).await?,
        (Encoding::Raw, _) => (percent_decode(parsed.payload), 0),
        _ => (parsed.payload.to_string(), 0),
    };

    Ok(Transcoded {
        mediatype: parsed.mediatype.to_string(),
        encoding: parsed.encoding,
        data,
        bytes,
    })
}

/// `data:<mediatype>;base64-placeholder,`
pub fn placeholder_source(mediatype: &str) -> String {
    format!("{DATA_SCHEME}{mediatype};{PLACEHOLDER_TOKEN},")
}

/// `data:<mediatype>;base64,<payload>`
pub fn base64_source(mediatype: &str, payload: &str) -> String {
    format!("{DATA_SCHEME}{mediatype};{BASE64_TOKEN},{payload}")
}

/// Decode a `;base64` payload. Percent-escapes and ASCII whitespace are
/// tolerated, trailing `=` padding is optional.
pub fn decode_base64_payload(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let unescaped = urlencoding::decode_binary(payload.as_bytes());
    let compact: Vec<u8> = unescaped
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    LENIENT_BASE64.decode(compact)
}

/// Percent-decode a raw payload into text. Invalid UTF-8 is replaced.
pub fn percent_decode(payload: &str) -> String {
    String::from_utf8_lossy(&urlencoding::decode_binary(payload.as_bytes())).into_owned()
}

async fn materialize_payload(
    target: &Path,
    payload: &str,
    sink: &dyn DiagnosticsSink,
) -> Result<usize, TranscodeError> {
    let bytes = decode_base64_payload(payload).map_err(|e| TranscodeError::InvalidBase64 {
        path: target.to_path_buf(),
        detail: e.to_string(),
    })?;

    if bytes.is_empty() {
        sink.on_diagnostic(&Diagnostic::EmptyPayload {
            path: target.to_path_buf(),
        });
    }

    materialize::write(target, &bytes).await?;
    Ok(bytes.len())
}

async fn embed_file(target: &Path) -> Result<(String, usize), TranscodeError> {
    let bytes = materialize::read(target).await?;
    Ok((STANDARD.encode(&bytes), bytes.len()))
}

fn preview(uri: &str) -> String {
    match uri.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}…", &uri[..cut]),
        None => uri.to_string(),
    }
}
