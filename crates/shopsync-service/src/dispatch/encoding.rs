//! Character encoding of legacy payload lines.

use std::borrow::Cow;

use encoding_rs::WINDOWS_1252;
use tracing::debug;

use super::client::{ClientInfo, ClientVersion};

/// Turns a rendered payload into response bytes.
pub trait ResponseEncoding: Send + Sync + std::fmt::Debug {
    /// Label used in the XML declaration and the `charset` parameter.
    fn label(&self) -> &'static str;

    fn encode<'a>(&self, text: &'a str) -> Cow<'a, [u8]>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Encoding;

impl ResponseEncoding for Utf8Encoding {
    fn label(&self) -> &'static str {
        "UTF-8"
    }

    fn encode<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
        Cow::Borrowed(text.as_bytes())
    }
}

/// Encoding understood by old ERP clients. Unmappable characters become
/// numeric character references.
#[derive(Debug, Clone, Copy, Default)]
pub struct Windows1252Encoding;

impl ResponseEncoding for Windows1252Encoding {
    fn label(&self) -> &'static str {
        "windows-1252"
    }

    fn encode<'a>(&self, text: &'a str) -> Cow<'a, [u8]> {
        let (bytes, _, lossy) = WINDOWS_1252.encode(text);
        if lossy {
            debug!("Payload contains characters outside Windows-1252");
        }
        bytes
    }
}

static UTF8: Utf8Encoding = Utf8Encoding;
static WINDOWS_1252_LEGACY: Windows1252Encoding = Windows1252Encoding;

/// UTF-8 for clients at or above `utf8_from`, Windows-1252 for older or
/// unidentified ones.
pub fn for_client(client: &ClientInfo, utf8_from: &ClientVersion) -> &'static dyn ResponseEncoding {
    if client.is_at_least(utf8_from) {
        &UTF8
    } else {
        &WINDOWS_1252_LEGACY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_1252_umlauts() {
        let bytes = Windows1252Encoding.encode("Müller");
        assert_eq!(bytes.as_ref(), b"M\xfcller");
        assert_eq!(Utf8Encoding.encode("Müller").as_ref(), "Müller".as_bytes());
    }

    #[test]
    fn test_euro_sign_matches_declared_charset() {
        let bytes = Windows1252Encoding.encode("5 €");
        assert_eq!(bytes.as_ref(), b"5 \x80");
        let (decoded, _, had_errors) = encoding_rs::Encoding::for_label(Windows1252Encoding.label().as_bytes())
            .unwrap()
            .decode(&bytes);
        assert!(!had_errors);
        assert_eq!(decoded, "5 €");
    }

    #[test]
    fn test_unmappable_becomes_reference() {
        let bytes = Windows1252Encoding.encode("Ω");
        assert_eq!(bytes.as_ref(), b"&#937;");
    }

    #[test]
    fn test_selection_by_version() {
        let min = ClientVersion::parse("1.5").unwrap();
        let new = ClientInfo { version: ClientVersion::parse("1.6.0") };
        let old = ClientInfo { version: ClientVersion::parse("1.4.9") };
        assert_eq!(for_client(&new, &min).label(), "UTF-8");
        assert_eq!(for_client(&old, &min).label(), "windows-1252");
        assert_eq!(for_client(&ClientInfo::default(), &min).label(), "windows-1252");
    }
}
