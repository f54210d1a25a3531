//! Mashup image URL construction.

use crate::domain::entities::EncodedCombination;

/// Image host path every mashup URL starts with.
pub const MASHUP_BASE_URL: &str = "https://www.gstatic.com/android/keyboard/emojikitchen";

/// Rebuilds the image URL for an encoded combination:
/// `{base}/{date}/u{left}/u{left}_u{right}.png`, with every `-` inside a
/// codepoint string becoming `-u`.
///
/// Returns `None` if the combination does not have all three fields.
#[must_use]
pub fn build_url(combination: &EncodedCombination) -> Option<String> {
    let parts = combination.parts()?;
    let left = url_segment(parts.left);
    let right = url_segment(parts.right);
    Some(format!(
        "{MASHUP_BASE_URL}/{date}/{left}/{left}_{right}.png",
        date = parts.date
    ))
}

fn url_segment(codepoints: &str) -> String {
    format!("u{}", codepoints.replace('-', "-u"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(
        "20201001:1f600:2764",
        "https://www.gstatic.com/android/keyboard/emojikitchen/20201001/u1f600/u1f600_u2764.png"
        ; "simple"
    )]
    #[test_case(
        "20230301:2764-fe0f:1f431",
        "https://www.gstatic.com/android/keyboard/emojikitchen/20230301/u2764-ufe0f/u2764-ufe0f_u1f431.png"
        ; "left_sequence"
    )]
    #[test_case(
        "20211115:1f469-200d-1f52c:1f3f3-fe0f-200d-1f308",
        "https://www.gstatic.com/android/keyboard/emojikitchen/20211115/u1f469-u200d-u1f52c/u1f469-u200d-u1f52c_u1f3f3-ufe0f-u200d-u1f308.png"
        ; "both_sequences"
    )]
    fn test_build_url(encoded: &str, expected: &str) {
        assert_eq!(
            build_url(&EncodedCombination::from(encoded)).as_deref(),
            Some(expected)
        );
    }

    #[test]
    fn test_malformed_combination() {
        assert!(build_url(&EncodedCombination::from("20201001:1f600")).is_none());
        assert!(build_url(&EncodedCombination::from("garbage")).is_none());
    }
}
