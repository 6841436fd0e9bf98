use encoding_rs::{BIG5, Encoding, UTF_8};
use std::borrow::Cow;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Cp950,
    Utf8Sig,
    Utf8,
    Big5,
}

impl TextEncoding {
    pub const FALLBACK_CHAIN: [TextEncoding; 4] = [
        TextEncoding::Cp950,
        TextEncoding::Utf8Sig,
        TextEncoding::Utf8,
        TextEncoding::Big5,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Cp950 => "cp950",
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Big5 => "big5",
        }
    }

    // encoding_rs ships a single Big5 decoder (the WHATWG one, a cp950
    // superset), so both legacy entries resolve to it.
    fn decoder(self) -> &'static Encoding {
        match self {
            TextEncoding::Cp950 | TextEncoding::Big5 => BIG5,
            TextEncoding::Utf8Sig | TextEncoding::Utf8 => UTF_8,
        }
    }

    /// The Big5 decoder also maps HKSCS pairs that cp950 does not define,
    /// so legacy decodes must re-encode to exactly the input bytes.
    pub fn decode<'a>(self, raw: &'a [u8]) -> Option<Cow<'a, str>> {
        let body = match self {
            TextEncoding::Utf8Sig => raw.strip_prefix(UTF8_BOM).unwrap_or(raw),
            _ => raw,
        };
        let text = self
            .decoder()
            .decode_without_bom_handling_and_without_replacement(body)?;
        if matches!(self, TextEncoding::Cp950 | TextEncoding::Big5) {
            let (encoded, _, unmappable) = BIG5.encode(&text);
            if unmappable || encoded.as_ref() != body {
                return None;
            }
        }
        Some(text)
    }
}

pub fn decode_with_fallback<'a>(
    raw: &'a [u8],
    chain: &[TextEncoding],
) -> Option<(TextEncoding, Cow<'a, str>)> {
    chain
        .iter()
        .find_map(|encoding| encoding.decode(raw).map(|text| (*encoding, text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big5_bytes_decode_with_first_choice() {
        let (bytes, _, failed) = BIG5.encode("大樂透,111000001");
        assert!(!failed);
        let (used, text) =
            decode_with_fallback(&bytes, &TextEncoding::FALLBACK_CHAIN).expect("decoded");
        assert_eq!(used, TextEncoding::Cp950);
        assert_eq!(text, "大樂透,111000001");
    }

    #[test]
    fn utf8_with_bom_falls_through_to_utf8_sig() {
        // U+0080 encodes as C2 80, which is not a valid Big5 sequence.
        let mut raw = UTF8_BOM.to_vec();
        raw.extend_from_slice("x\u{80}y".as_bytes());
        let (used, text) =
            decode_with_fallback(&raw, &TextEncoding::FALLBACK_CHAIN).expect("decoded");
        assert_eq!(used, TextEncoding::Utf8Sig);
        assert_eq!(text, "x\u{80}y");
    }

    #[test]
    fn plain_utf8_is_accepted_when_legacy_decoders_refuse() {
        let raw = "a\u{80}b".as_bytes();
        let chain = [TextEncoding::Cp950, TextEncoding::Utf8];
        let (used, _) = decode_with_fallback(raw, &chain).expect("decoded");
        assert_eq!(used, TextEncoding::Utf8);
    }

    #[test]
    fn bomless_utf8_game_names_are_not_misread_as_big5() {
        let member = "今彩539,112000002,112/01/03,1,1,05,09,17,29,33\n\
                      大樂透,112000001,112/01/03,1,1,03,11,19,25,37,44,08\n";
        let (used, text) = decode_with_fallback(member.as_bytes(), &TextEncoding::FALLBACK_CHAIN)
            .expect("decoded");
        assert_eq!(used, TextEncoding::Utf8);
        assert_eq!(text, member);
    }

    #[test]
    fn hkscs_only_pairs_are_refused_by_the_legacy_entries() {
        let raw = "今彩539".as_bytes();
        assert!(TextEncoding::Cp950.decode(raw).is_none());
        assert!(TextEncoding::Big5.decode(raw).is_none());
    }

    #[test]
    fn undecodable_bytes_yield_none() {
        let raw = [0xFF, 0xFF, 0x80];
        assert!(decode_with_fallback(&raw, &TextEncoding::FALLBACK_CHAIN).is_none());
    }

    #[test]
    fn chain_order_is_respected() {
        let raw = b"plain ascii";
        let chain = [TextEncoding::Utf8, TextEncoding::Cp950];
        let (used, _) = decode_with_fallback(raw, &chain).expect("decoded");
        assert_eq!(used, TextEncoding::Utf8);
    }
}
