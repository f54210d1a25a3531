//! Conversion between emoji strings and hyphen-delimited codepoint strings.
//!
//! `"👩‍🔬"` <-> `"1f469-200d-1f52c"`. Every Unicode scalar value is emitted
//! once, so supplementary-plane characters never appear as surrogate halves.

use crate::domain::errors::CodecError;

/// Separator between codepoints in a codepoint string.
pub const CODEPOINT_SEPARATOR: char = '-';

/// Encodes an emoji (possibly a multi-codepoint sequence) as lower-case hex
/// codepoints joined with `-`.
#[must_use]
pub fn emoji_to_codepoint(emoji: &str) -> String {
    emoji
        .chars()
        .map(|c| format!("{:x}", u32::from(c)))
        .collect::<Vec<_>>()
        .join("-")
}

/// Decodes a codepoint string back into the emoji it names.
///
/// # Errors
/// Returns error if a segment is not hex or not a Unicode scalar value.
pub fn codepoint_to_emoji(codepoints: &str) -> Result<String, CodecError> {
    codepoints
        .split(CODEPOINT_SEPARATOR)
        .map(|segment| {
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(CodecError::invalid_hex(codepoints, segment));
            }
            let value = u32::from_str_radix(segment, 16)
                .map_err(|_| CodecError::invalid_hex(codepoints, segment))?;
            char::from_u32(value).ok_or_else(|| CodecError::invalid_scalar(codepoints, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("😀", "1f600" ; "single_astral")]
    #[test_case("❤", "2764" ; "single_bmp")]
    #[test_case("❤️", "2764-fe0f" ; "variation_selector")]
    #[test_case("👩‍🔬", "1f469-200d-1f52c" ; "zwj_sequence")]
    #[test_case("🏳️‍🌈", "1f3f3-fe0f-200d-1f308" ; "flag_sequence")]
    #[test_case("👍🏽", "1f44d-1f3fd" ; "skin_tone")]
    fn test_encode_decode(emoji: &str, codepoints: &str) {
        assert_eq!(emoji_to_codepoint(emoji), codepoints);
        assert_eq!(codepoint_to_emoji(codepoints).unwrap(), emoji);
    }

    #[test]
    fn test_astral_not_double_counted() {
        let encoded = emoji_to_codepoint("🥰");
        assert_eq!(encoded.split('-').count(), 1);
    }

    #[test]
    fn test_uppercase_hex_accepted() {
        assert_eq!(codepoint_to_emoji("1F600").unwrap(), "😀");
    }

    #[test_case("" ; "empty")]
    #[test_case("zz" ; "not_hex")]
    #[test_case("1f600--2764" ; "empty_segment")]
    #[test_case("+1f600" ; "sign_prefix")]
    fn test_invalid_hex(input: &str) {
        assert!(matches!(
            codepoint_to_emoji(input),
            Err(CodecError::InvalidHex { .. })
        ));
    }

    #[test_case("d800" ; "surrogate")]
    #[test_case("110000" ; "beyond_max")]
    fn test_invalid_scalar(input: &str) {
        assert!(matches!(
            codepoint_to_emoji(input),
            Err(CodecError::InvalidScalar { .. })
        ));
    }
}
