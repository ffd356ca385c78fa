//! Protocol Envelope
//!
//! Outbound requests are wrapped as
//! `<protocol version="1.3"><request sessionkey="...">INNER</request></protocol>`.
//! Inbound envelopes carry either a `response` element (payload) or an
//! `error` element (message).

use log::debug;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::error::{TransportError, TransportResult};

/// Envelope protocol version sent on every request
pub const PROTOCOL_VERSION: &str = "1.3";

const RESPONSE_TAG: &[u8] = b"response";
const ERROR_TAG: &[u8] = b"error";

/// Wrap an inner request fragment in the protocol envelope
pub fn build_request(session_key: &str, inner: &str) -> String {
    format!(
        r#"<protocol version="{}"><request sessionkey="{}">{}</request></protocol>"#,
        PROTOCOL_VERSION,
        escape(session_key),
        inner
    )
}

fn is_named(start: &BytesStart<'_>, tag: &[u8]) -> bool {
    start.local_name().as_ref() == tag
}

/// Unwrap a response envelope.
///
/// The first `response` element anywhere in the document wins, even when an
/// `error` element precedes it. Its inner markup is returned verbatim.
/// Failing that, the text of every `error` element, joined in document
/// order, becomes [`TransportError::Protocol`]. Anything else is
/// [`TransportError::MalformedResponse`].
pub fn read_response(raw: &str) -> TransportResult<String> {
    let mut reader = Reader::from_str(raw);
    let mut depth = 0usize;
    // Depth of the outermost error element currently open
    let mut error_open: Option<usize> = None;
    let mut error_text: Option<String> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                debug!("Envelope markup error at {}: {}", reader.buffer_position(), e);
                break;
            }
        };

        match event {
            Event::Start(start) => {
                if is_named(&start, RESPONSE_TAG) {
                    return reader
                        .read_text(start.name())
                        .map(|inner| inner.into_owned())
                        .map_err(|e| {
                            debug!("Unterminated response element: {}", e);
                            TransportError::MalformedResponse
                        });
                }
                if error_open.is_none() && is_named(&start, ERROR_TAG) {
                    error_open = Some(depth);
                    error_text.get_or_insert_with(String::new);
                }
                depth += 1;
            }
            Event::Empty(start) => {
                if is_named(&start, RESPONSE_TAG) {
                    return Ok(String::new());
                }
                if is_named(&start, ERROR_TAG) {
                    error_text.get_or_insert_with(String::new);
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if error_open == Some(depth) {
                    error_open = None;
                }
            }
            Event::Text(text) => {
                if let (Some(_), Some(buf)) = (error_open, error_text.as_mut()) {
                    match text.unescape() {
                        Ok(unescaped) => buf.push_str(&unescaped),
                        Err(_) => buf.push_str(&String::from_utf8_lossy(&text)),
                    }
                }
            }
            Event::CData(data) => {
                if let (Some(_), Some(buf)) = (error_open, error_text.as_mut()) {
                    buf.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    match error_text {
        Some(message) => Err(TransportError::Protocol(message)),
        None => Err(TransportError::MalformedResponse),
    }
}
