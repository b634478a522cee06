//! Phone number canonicalization.
//!
//! Everything downstream (directory lookup, contact search) works with
//! numbers in `+<countrycode><digits>` form, so raw provider strings are
//! normalized exactly once at each boundary.

/// Normalize a raw phone string to `+<countrycode><digits>`.
///
/// Strips all non-digit characters; a bare 10-digit number is assumed to
/// be US and gets `+1` prepended, anything else just gets a leading `+`.
/// No digit-count validation beyond that: a 7-digit input produces a
/// well-formed but semantically invalid number, which is tolerated —
/// such a number will simply never match the directory.
pub fn normalize(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 {
        format!("+1{digits}")
    } else if digits.is_empty() {
        String::new()
    } else {
        format!("+{digits}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_digit_us_number_gets_country_code() {
        assert_eq!(normalize("3605551234"), "+13605551234");
        assert_eq!(normalize("(360) 555-1234"), "+13605551234");
        assert_eq!(normalize("360.555.1234"), "+13605551234");
    }

    #[test]
    fn already_canonical_is_unchanged() {
        assert_eq!(normalize("+13605486904"), "+13605486904");
        assert_eq!(normalize("+447911123456"), "+447911123456");
    }

    #[test]
    fn eleven_digit_number_keeps_its_country_code() {
        assert_eq!(normalize("13605551234"), "+13605551234");
    }

    #[test]
    fn idempotent_on_canonical_output() {
        for raw in ["3605551234", "+13605486904", "1 (360) 555-1234", "555-0100"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn short_number_is_well_formed_but_not_validated() {
        // Known edge case: 7 digits is not an error, just never routable.
        assert_eq!(normalize("555-0100"), "+5550100");
    }

    #[test]
    fn empty_and_digitless_input_yields_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("ext."), "");
    }
}
