use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use engine_logging::engine_warn;

/// How far into the document a `<meta charset>` declaration is searched for.
const META_PRESCAN_BYTES: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHtml {
    pub html: String,
    pub encoding_label: String,
    /// Malformed sequences were replaced with U+FFFD.
    pub had_errors: bool,
}

/// Decode raw bytes into UTF-8 using: BOM -> Content-Type charset -> meta charset -> chardetng fallback.
/// Never fails: malformed input is repaired and logged.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> DecodedHtml {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(enc) = content_type
        .and_then(extract_charset)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return decode_with(bytes, enc);
    }

    if let Some(enc) = prescan_meta_charset(bytes).and_then(|label| Encoding::for_label(label.as_bytes())) {
        return decode_with(bytes, enc);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim_matches([' ', '"', '\''].as_ref()).to_string())
        })
        .find(|label| !label.is_empty())
}

/// Finds `charset=...` inside a `<meta` tag near the start of the document.
fn prescan_meta_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(META_PRESCAN_BYTES)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let mut rest = head.as_str();
    while let Some(start) = rest.find("<meta") {
        let tag = &rest[start..];
        let tag = &tag[..tag.find('>').unwrap_or(tag.len())];
        if let Some(pos) = tag.find("charset=") {
            let label: String = tag[pos + "charset=".len()..]
                .trim_start_matches(|c: char| c == '"' || c == '\'')
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || matches!(*c, '-' | '_' | ':' | '.'))
                .collect();
            if !label.is_empty() {
                return Some(label);
            }
        }
        rest = &rest[start + "<meta".len()..];
    }
    None
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> DecodedHtml {
    let (text, _, had_errors) = enc.decode(bytes);
    if had_errors {
        engine_warn!("malformed {} input, replacement characters inserted", enc.name());
    }
    DecodedHtml {
        html: text.into_owned(),
        encoding_label: enc.name().to_string(),
        had_errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_parameter_is_case_insensitive() {
        assert_eq!(
            extract_charset("text/html; Charset=\"UTF-8\"").as_deref(),
            Some("UTF-8")
        );
        assert_eq!(extract_charset("text/html"), None);
    }

    #[test]
    fn meta_charset_is_found_in_prescan() {
        let html = br#"<html><head><meta http-equiv="Content-Type" content="text/html; charset=windows-1252"></head>"#;
        assert_eq!(prescan_meta_charset(html).as_deref(), Some("windows-1252"));

        let html5 = br#"<meta charset="iso-8859-2"><p>x</p>"#;
        assert_eq!(prescan_meta_charset(html5).as_deref(), Some("iso-8859-2"));
    }

    #[test]
    fn meta_charset_drives_decoding_without_header() {
        let mut bytes = b"<meta charset=\"iso-8859-1\"><p>caf".to_vec();
        bytes.push(0xe9);
        bytes.extend_from_slice(b"</p>");
        let decoded = decode_html(&bytes, None);
        assert!(decoded.html.contains("caf\u{e9}"));
        assert!(!decoded.had_errors);
    }

    #[test]
    fn malformed_bytes_are_replaced_not_rejected() {
        let decoded = decode_html(b"<p>ok \xFF still here</p>", Some("text/html; charset=utf-8"));
        assert!(decoded.had_errors);
        assert_eq!(decoded.html, "<p>ok \u{FFFD} still here</p>");
    }
}
