//! Request field checks shared by the resource services.
//!
//! Every check records a message on a `ValidationErrors` collector instead of
//! returning early, so a client sees all problems with a payload at once.

use chrono::{DateTime, Utc};
use rrule::{RRule, Tz, Unvalidated};

use almanac_core::constants::MAX_NAME_LENGTH;
use almanac_core::util::datetime::parse_datetime;

use crate::error::ValidationErrors;

/// ## Summary
/// Checks a required name-like string: present, not blank, at most 255 characters.
///
/// Returns the trimmed value when it passes.
pub fn required_name<'a>(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&'a str>,
) -> Option<&'a str> {
    match value.map(str::trim) {
        None | Some("") => {
            errors.add(field, format!("The {field} field is required."));
            None
        }
        Some(value) => max_length(errors, field, value).then_some(value),
    }
}

/// Records an error if `value` is longer than the name limit.
pub fn max_length(errors: &mut ValidationErrors, field: &str, value: &str) -> bool {
    if value.chars().count() > MAX_NAME_LENGTH {
        errors.add(
            field,
            format!("The {field} field must not be greater than {MAX_NAME_LENGTH} characters."),
        );
        return false;
    }
    true
}

/// Records an error unless `value` is a `#RRGGBB` hex color.
pub fn color(errors: &mut ValidationErrors, field: &str, value: &str) -> bool {
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        errors.add(field, format!("The {field} field format is invalid."));
    }
    valid
}

/// Records an error unless `value` names an IANA timezone.
pub fn timezone(errors: &mut ValidationErrors, field: &str, value: &str) -> bool {
    let valid = value.parse::<chrono_tz::Tz>().is_ok();
    if !valid {
        errors.add(field, format!("The {field} field must be a valid timezone."));
    }
    valid
}

/// Parses a client timestamp, recording an error on failure.
pub fn date(errors: &mut ValidationErrors, field: &str, value: &str) -> Option<DateTime<Utc>> {
    let parsed = parse_datetime(value).ok();
    if parsed.is_none() {
        errors.add(field, format!("The {field} field must be a valid date."));
    }
    parsed
}

/// Records an error unless `end` is at or after `start`.
pub fn date_order(
    errors: &mut ValidationErrors,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> bool {
    let valid = end >= start;
    if !valid {
        errors.add(
            "end_date",
            "The end_date field must be a date after or equal to start_date.",
        );
    }
    valid
}

/// ## Summary
/// Records an error unless `value` is a recurrence rule that can be expanded from `dtstart`.
///
/// Accepts the rule with or without a leading `RRULE:`.
pub fn rrule(
    errors: &mut ValidationErrors,
    field: &str,
    value: &str,
    dtstart: DateTime<Utc>,
) -> bool {
    let text = value.trim();
    let text = text.strip_prefix("RRULE:").unwrap_or(text);

    let valid = text
        .parse::<RRule<Unvalidated>>()
        .ok()
        .and_then(|rule| rule.build(dtstart.with_timezone(&Tz::UTC)).ok())
        .is_some();
    if !valid {
        errors.add(field, format!("The {field} field must be a valid recurrence rule."));
    }
    valid
}

/// Records an error unless `value` looks like an email address.
pub fn email(errors: &mut ValidationErrors, field: &str, value: &str) -> bool {
    let valid = value.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !value.chars().any(char::is_whitespace)
    });
    if !valid {
        errors.add(field, format!("The {field} field must be a valid email address."));
    }
    valid
}
