use chrono::{DateTime, Datelike, Days, Months, Utc};

/// `at` plus whole calendar years. A 29 February start rolls over to
/// 1 March when the target year has no leap day.
pub fn add_years(at: DateTime<Utc>, years: u32) -> Option<DateTime<Utc>> {
    let shifted = at.checked_add_months(Months::new(years.checked_mul(12)?))?;
    if at.month() == 2 && at.day() == 29 && shifted.day() != 29 {
        return shifted.checked_add_days(Days::new(1));
    }
    Some(shifted)
}

/// Expiry of a membership approved at `approved_at` for `years` years.
/// Fewer than one year means the membership does not expire.
pub fn compute_expiry(approved_at: Option<DateTime<Utc>>, years: i64) -> Option<DateTime<Utc>> {
    let approved_at = approved_at?;
    let years = u32::try_from(years).ok().filter(|years| *years >= 1)?;
    add_years(approved_at, years)
}

/// Renewals extend a still-running membership from its expiry and a lapsed
/// one from `now`.
pub fn renewal_base(current: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match current {
        Some(expiry) if expiry > now => expiry,
        _ => now,
    }
}
