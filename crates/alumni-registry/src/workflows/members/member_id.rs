//! `{prefix}-{year}-{sequence}` identifiers. The sequence is shared by every
//! type and year: it continues from the highest suffix ever issued.

use crate::workflows::membership::MembershipType;

pub const MISSING_YEAR: &str = "Either SSC year or JSC year must be provided";
pub const SEQUENCE_EXHAUSTED: &str = "No member ID sequence numbers are left.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemberIdError {
    #[error("{MISSING_YEAR}")]
    MissingYear,
    #[error("{SEQUENCE_EXHAUSTED}")]
    SequenceExhausted,
}

/// Numeric suffix after the last hyphen. Non-numeric or zero suffixes do not count.
pub fn sequence_of(member_id: &str) -> Option<u32> {
    let suffix = member_id.rsplit('-').next()?;
    if suffix.is_empty() || !suffix.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    suffix.parse::<u32>().ok().filter(|sequence| *sequence > 0)
}

pub fn next_sequence<'a>(
    existing: impl IntoIterator<Item = &'a str>,
) -> Result<u32, MemberIdError> {
    match existing.into_iter().filter_map(sequence_of).max() {
        None => Ok(1),
        Some(highest) => highest
            .checked_add(1)
            .ok_or(MemberIdError::SequenceExhausted),
    }
}

pub fn format_member_id(membership_type: MembershipType, year: i32, sequence: u32) -> String {
    format!(
        "{}-{year}-{sequence:04}",
        membership_type.member_id_prefix()
    )
}

/// Next identifier given every member ID issued so far.
pub fn allocate<'a>(
    membership_type: MembershipType,
    ssc_year: Option<i32>,
    jsc_year: Option<i32>,
    existing: impl IntoIterator<Item = &'a str>,
) -> Result<String, MemberIdError> {
    let year = ssc_year.or(jsc_year).ok_or(MemberIdError::MissingYear)?;
    Ok(format_member_id(
        membership_type,
        year,
        next_sequence(existing)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_shared_across_types_and_years() {
        let mut issued: Vec<String> = Vec::new();
        let requests = [
            (MembershipType::General, Some(2020), None),
            (MembershipType::Lifetime, Some(2020), None),
            (MembershipType::Associate, None, Some(2015)),
        ];
        for (membership_type, ssc, jsc) in requests {
            let id = allocate(membership_type, ssc, jsc, issued.iter().map(String::as_str))
                .expect("year present");
            issued.push(id);
        }
        assert_eq!(issued, ["G-2020-0001", "LT-2020-0002", "A-2015-0003"]);
    }

    #[test]
    fn ssc_year_wins_over_jsc_year() {
        let id = allocate(MembershipType::General, Some(2008), Some(2006), std::iter::empty())
            .expect("year present");
        assert_eq!(id, "G-2008-0001");
    }

    #[test]
    fn malformed_suffixes_are_ignored() {
        let existing = ["G-2001-0007", "LEGACY-abc", "A-1999-", "LT-2010-0000"];
        assert_eq!(next_sequence(existing), Ok(8));
    }

    #[test]
    fn sequence_grows_past_four_digits() {
        assert_eq!(
            allocate(MembershipType::General, Some(2000), None, ["G-2000-9999"]),
            Ok("G-2000-10000".to_string())
        );
    }

    #[test]
    fn exhausted_sequence_is_refused_instead_of_wrapping() {
        let existing = ["G-2000-4294967295", "G-2001-0003"];
        assert_eq!(next_sequence(existing), Err(MemberIdError::SequenceExhausted));
        assert_eq!(
            allocate(MembershipType::General, Some(2002), None, existing),
            Err(MemberIdError::SequenceExhausted)
        );
    }

    #[test]
    fn missing_years_are_refused() {
        assert_eq!(
            allocate(MembershipType::General, None, None, std::iter::empty()),
            Err(MemberIdError::MissingYear)
        );
    }
}
