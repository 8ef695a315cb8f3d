use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

/// Label used for UTF-8 files that start with a byte order mark.
pub const UTF8_SIG: &str = "utf-8-sig";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    /// Lowercase encoding label, `utf-8-sig` for UTF-8 with BOM
    pub encoding: String,
    pub had_errors: bool,
}

impl DecodedText {
    /// Whether UTF-8 lines can be appended without mixing encodings.
    pub fn accepts_utf8_append(&self) -> bool {
        self.encoding == "utf-8" || self.encoding == UTF8_SIG
    }
}

pub fn decode(bytes: &[u8]) -> DecodedText {
    // BOM (UTF-8 EF BB BF, UTF-16 LE/BE)
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        let label = if encoding == UTF_8 {
            UTF8_SIG.to_string()
        } else {
            encoding.name().to_lowercase()
        };

        return DecodedText {
            text: text.into_owned(),
            encoding: label,
            had_errors,
        };
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return DecodedText {
            text: text.to_string(),
            encoding: "utf-8".to_string(),
            had_errors: false,
        };
    }

    // Legacy dictionaries saved in a local code page
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);

    DecodedText {
        text: text.into_owned(),
        encoding: encoding.name().to_lowercase(),
        had_errors,
    }
}
