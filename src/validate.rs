//! Birth-date validation over three raw text fields.
//!
//! The entry point is [`validate_birth_date`]: it takes the day, month, and
//! year exactly as the user typed them, a [`ValidationConfig`] policy, and an
//! injected "today" so results are reproducible. Every outcome is a value;
//! no input can make it panic.

use serde::{Deserialize, Serialize};

use crate::CalendarDate;
use crate::consts::{
    DEFAULT_MAX_AGE, DEFAULT_MIN_AGE, DEFAULT_MIN_YEAR, FEBRUARY, MAX_DAY, MAX_MONTH, MIN_DAY,
};
use crate::types::{days_in_month, is_leap_year, month_name};

/// Policy bounds for a birth date. Defaults match the onboarding form:
/// at least 1 year old, at most 120, born no earlier than 1900.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub min_age: u32,
    pub max_age: u32,
    pub min_year: u16,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_age: DEFAULT_MIN_AGE,
            max_age: DEFAULT_MAX_AGE,
            min_year: DEFAULT_MIN_YEAR,
        }
    }
}

/// A single validation failure. `Display` renders the message shown to the
/// user; [`ValidationError::kind`] classifies it for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("The day is required")]
    DayRequired,
    #[error("The day must be a valid number")]
    DayNotANumber,
    #[error("The day must be between {MIN_DAY} and {MAX_DAY}")]
    DayOutOfRange,

    #[error("The month is required")]
    MonthRequired,
    #[error("The month must be a valid number")]
    MonthNotANumber,
    #[error("The month cannot be less than 1")]
    MonthTooSmall,
    #[error("The month cannot be greater than {MAX_MONTH}")]
    MonthTooLarge,

    #[error("The year is required")]
    YearRequired,
    #[error("The year must be a valid number")]
    YearNotANumber,
    #[error("The year cannot be before {min_year}")]
    YearBeforeMin { min_year: u16 },
    #[error("The year cannot be a future year")]
    YearInFuture,

    #[error("{} only has {max_days} days", month_name(*.month))]
    MonthTooFewDays { month: u8, max_days: u8 },
    #[error("February only has 28 days this year; it has 29 days only in leap years")]
    FebruaryOnly28Days,
    #[error("February only has 29 days this year")]
    FebruaryOnly29Days,

    #[error("The date is invalid")]
    InvalidDate,
    #[error("The birth date cannot be in the future")]
    FutureDate,
    #[error("You must be at least {min_age} years old")]
    TooYoung { min_age: u32 },
    #[error("Age cannot exceed {max_age} years")]
    TooOld { max_age: u32 },
}

/// Classification of a [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// A required field was empty
    Required,
    /// A field was not a number
    Format,
    /// A field was numeric but outside its own bounds
    Range,
    /// The day does not exist in the given month and year
    CalendarConsistency,
    /// The assembled date failed the strict calendar parse
    Parse,
    /// The date lies after "today"
    Temporal,
    /// The computed age violates the policy bounds
    AgeBound,
}

impl ValidationError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DayRequired | Self::MonthRequired | Self::YearRequired => ErrorKind::Required,
            Self::DayNotANumber | Self::MonthNotANumber | Self::YearNotANumber => ErrorKind::Format,
            Self::DayOutOfRange
            | Self::MonthTooSmall
            | Self::MonthTooLarge
            | Self::YearBeforeMin { .. }
            | Self::YearInFuture => ErrorKind::Range,
            Self::MonthTooFewDays { .. } | Self::FebruaryOnly28Days | Self::FebruaryOnly29Days => {
                ErrorKind::CalendarConsistency
            }
            Self::InvalidDate => ErrorKind::Parse,
            Self::FutureDate => ErrorKind::Temporal,
            Self::TooYoung { .. } | Self::TooOld { .. } => ErrorKind::AgeBound,
        }
    }
}

impl Serialize for ValidationError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Per-slot validation failures. At most one error per slot; a slot is
/// `None` when that field (or the combination, for `general`) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<ValidationError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<ValidationError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<ValidationError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general: Option<ValidationError>,
}

impl ValidationErrors {
    /// Returns true when no slot holds an error
    pub const fn is_empty(&self) -> bool {
        self.day.is_none() && self.month.is_none() && self.year.is_none() && self.general.is_none()
    }
}

/// Outcome of a validation call. `is_valid` is true iff `errors` is empty;
/// the constructors keep the two in sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: ValidationErrors,
}

impl ValidationResult {
    /// A result with no errors
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: ValidationErrors::default(),
        }
    }

    /// A result derived from the collected errors
    pub const fn from_errors(errors: ValidationErrors) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Outcome of reading one raw field
enum FieldValue {
    Empty,
    NotNumeric,
    Number(i64),
}

/// Reads a raw field leniently: trims, accepts an optional sign, and treats
/// digit strings too long for i64 as saturated numbers rather than garbage,
/// so they fail range checks instead of format checks.
fn parse_field(raw: &str) -> FieldValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return FieldValue::Empty;
    }
    match trimmed.parse::<i64>() {
        Ok(n) => FieldValue::Number(n),
        Err(_) => {
            let digits = trimmed
                .strip_prefix('-')
                .or_else(|| trimmed.strip_prefix('+'))
                .unwrap_or(trimmed);
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                let saturated = if trimmed.starts_with('-') {
                    i64::MIN
                } else {
                    i64::MAX
                };
                FieldValue::Number(saturated)
            } else {
                FieldValue::NotNumeric
            }
        }
    }
}

/// Validates the day field in isolation: required, numeric, and within the
/// coarse `1..=31` bound. The month-specific bound is checked later by
/// [`validate_birth_date`] once the month and year are known.
///
/// # Errors
/// `DayRequired`, `DayNotANumber`, or `DayOutOfRange`.
pub fn validate_day(raw: &str) -> Result<u8, ValidationError> {
    match parse_field(raw) {
        FieldValue::Empty => Err(ValidationError::DayRequired),
        FieldValue::NotNumeric => Err(ValidationError::DayNotANumber),
        FieldValue::Number(n) => {
            if !(i64::from(MIN_DAY)..=i64::from(MAX_DAY)).contains(&n) {
                return Err(ValidationError::DayOutOfRange);
            }
            u8::try_from(n).map_err(|_| ValidationError::DayOutOfRange)
        }
    }
}

/// Validates the month field in isolation: required, numeric, and in
/// `1..=12`, with distinct messages below and above the range.
///
/// # Errors
/// `MonthRequired`, `MonthNotANumber`, `MonthTooSmall`, or `MonthTooLarge`.
pub fn validate_month(raw: &str) -> Result<u8, ValidationError> {
    match parse_field(raw) {
        FieldValue::Empty => Err(ValidationError::MonthRequired),
        FieldValue::NotNumeric => Err(ValidationError::MonthNotANumber),
        FieldValue::Number(n) => {
            if n < 1 {
                return Err(ValidationError::MonthTooSmall);
            }
            if n > i64::from(MAX_MONTH) {
                return Err(ValidationError::MonthTooLarge);
            }
            u8::try_from(n).map_err(|_| ValidationError::MonthTooLarge)
        }
    }
}

/// Validates the year field in isolation: required, numeric, and within
/// `min_year..=current_year`, with distinct messages on either side.
///
/// # Errors
/// `YearRequired`, `YearNotANumber`, `YearBeforeMin`, or `YearInFuture`.
pub fn validate_year(raw: &str, min_year: u16, current_year: u16) -> Result<u16, ValidationError> {
    match parse_field(raw) {
        FieldValue::Empty => Err(ValidationError::YearRequired),
        FieldValue::NotNumeric => Err(ValidationError::YearNotANumber),
        FieldValue::Number(n) => {
            if n < i64::from(min_year) {
                return Err(ValidationError::YearBeforeMin { min_year });
            }
            if n > i64::from(current_year) {
                return Err(ValidationError::YearInFuture);
            }
            u16::try_from(n).map_err(|_| ValidationError::YearInFuture)
        }
    }
}

/// Validates a birth date entered as three raw text fields.
///
/// Runs a fixed stage order, returning at the first stage that fails:
/// 1. the three field validators, all run unconditionally so a single call
///    reports every malformed field at once;
/// 2. day-count consistency against the month and (leap-aware) year;
/// 3. strict re-parse of the assembled `YYYY-MM-DD` string;
/// 4. the date must not be after `today`;
/// 5. whole-year age must be within `config.min_age..=config.max_age`.
///
/// `today` is supplied by the caller rather than read from a clock, so two
/// calls with the same inputs always produce the same result.
pub fn validate_birth_date(
    day: &str,
    month: &str,
    year: &str,
    config: &ValidationConfig,
    today: CalendarDate,
) -> ValidationResult {
    let mut errors = ValidationErrors::default();

    let day_num = match validate_day(day) {
        Ok(d) => Some(d),
        Err(e) => {
            errors.day = Some(e);
            None
        }
    };
    let month_num = match validate_month(month) {
        Ok(m) => Some(m),
        Err(e) => {
            errors.month = Some(e);
            None
        }
    };
    let year_num = match validate_year(year, config.min_year, today.year()) {
        Ok(y) => Some(y),
        Err(e) => {
            errors.year = Some(e);
            None
        }
    };

    let (Some(d), Some(m), Some(y)) = (day_num, month_num, year_num) else {
        return ValidationResult::from_errors(errors);
    };

    // Day-count consistency for the specific month and year
    let max_days = days_in_month(y, m);
    if d > max_days {
        errors.day = Some(if m == FEBRUARY {
            if is_leap_year(y) {
                ValidationError::FebruaryOnly29Days
            } else {
                ValidationError::FebruaryOnly28Days
            }
        } else {
            ValidationError::MonthTooFewDays {
                month: m,
                max_days,
            }
        });
        return ValidationResult::from_errors(errors);
    }

    // Assemble the zero-padded date and re-parse it strictly. With the
    // stages above this cannot fail, but a parse failure still maps to a
    // result value rather than a panic.
    let assembled = format!("{y:04}-{m:02}-{d:02}");
    let Ok(birth) = assembled.parse::<CalendarDate>() else {
        errors.general = Some(ValidationError::InvalidDate);
        return ValidationResult::from_errors(errors);
    };

    if birth > today {
        errors.general = Some(ValidationError::FutureDate);
        return ValidationResult::from_errors(errors);
    }

    let age = birth.age_on(today);
    if age < config.min_age {
        errors.year = Some(ValidationError::TooYoung {
            min_age: config.min_age,
        });
        return ValidationResult::from_errors(errors);
    }
    if age > config.max_age {
        errors.year = Some(ValidationError::TooOld {
            max_age: config.max_age,
        });
        return ValidationResult::from_errors(errors);
    }

    ValidationResult::valid()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> CalendarDate {
        // Frozen clock for deterministic results
        CalendarDate::from_ymd(2025, 1, 1).unwrap()
    }

    fn check(day: &str, month: &str, year: &str) -> ValidationResult {
        validate_birth_date(day, month, year, &ValidationConfig::default(), today())
    }

    #[test]
    fn test_all_fields_empty() {
        let result = check("", "", "");
        assert!(!result.is_valid);
        assert_eq!(result.errors.day, Some(ValidationError::DayRequired));
        assert_eq!(result.errors.month, Some(ValidationError::MonthRequired));
        assert_eq!(result.errors.year, Some(ValidationError::YearRequired));
        assert_eq!(result.errors.general, None);
    }

    #[test]
    fn test_whitespace_only_counts_as_empty() {
        let result = check("  ", "\t", " ");
        assert_eq!(result.errors.day, Some(ValidationError::DayRequired));
        assert_eq!(result.errors.month, Some(ValidationError::MonthRequired));
        assert_eq!(result.errors.year, Some(ValidationError::YearRequired));
    }

    #[test]
    fn test_field_errors_reported_together() {
        // All three validators run even when the first already failed
        let result = check("abc", "0", "1850");
        assert!(!result.is_valid);
        assert_eq!(result.errors.day, Some(ValidationError::DayNotANumber));
        assert_eq!(result.errors.month, Some(ValidationError::MonthTooSmall));
        assert_eq!(
            result.errors.year,
            Some(ValidationError::YearBeforeMin { min_year: 1900 })
        );
    }

    #[test]
    fn test_day_field() {
        assert_eq!(validate_day("15"), Ok(15));
        assert_eq!(validate_day(" 3 "), Ok(3));
        assert_eq!(validate_day(""), Err(ValidationError::DayRequired));
        assert_eq!(validate_day("x"), Err(ValidationError::DayNotANumber));
        assert_eq!(validate_day("1.5"), Err(ValidationError::DayNotANumber));
        assert_eq!(validate_day("0"), Err(ValidationError::DayOutOfRange));
        assert_eq!(validate_day("32"), Err(ValidationError::DayOutOfRange));
        assert_eq!(validate_day("-1"), Err(ValidationError::DayOutOfRange));
    }

    #[test]
    fn test_month_field_distinct_bound_errors() {
        assert_eq!(validate_month("12"), Ok(12));
        assert_eq!(validate_month("0"), Err(ValidationError::MonthTooSmall));
        assert_eq!(validate_month("-2"), Err(ValidationError::MonthTooSmall));
        assert_eq!(validate_month("13"), Err(ValidationError::MonthTooLarge));
        assert_eq!(validate_month("999"), Err(ValidationError::MonthTooLarge));
    }

    #[test]
    fn test_year_field_distinct_bound_errors() {
        assert_eq!(validate_year("1991", 1900, 2025), Ok(1991));
        assert_eq!(
            validate_year("1899", 1900, 2025),
            Err(ValidationError::YearBeforeMin { min_year: 1900 })
        );
        assert_eq!(
            validate_year("2026", 1900, 2025),
            Err(ValidationError::YearInFuture)
        );
        // Digit strings beyond i64 are out of range, not malformed
        assert_eq!(
            validate_year("99999999999999999999", 1900, 2025),
            Err(ValidationError::YearInFuture)
        );
    }

    #[test]
    fn test_future_year_is_a_field_error() {
        // The year field check runs first, so a year beyond today's never
        // reaches the future-date stage
        let result = check("15", "06", "2030");
        assert!(!result.is_valid);
        assert_eq!(result.errors.year, Some(ValidationError::YearInFuture));
        assert_eq!(result.errors.general, None);
    }

    #[test]
    fn test_feb_29_non_leap_year() {
        let result = check("29", "02", "2021");
        assert!(!result.is_valid);
        assert_eq!(result.errors.day, Some(ValidationError::FebruaryOnly28Days));
        let message = result.errors.day.unwrap().to_string();
        assert!(message.contains("leap"), "message was: {message}");
    }

    #[test]
    fn test_feb_29_leap_year_is_valid() {
        let result = check("29", "02", "2020");
        assert!(result.is_valid, "errors: {:?}", result.errors);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_feb_30_leap_year() {
        let result = check("30", "02", "2020");
        assert!(!result.is_valid);
        assert_eq!(result.errors.day, Some(ValidationError::FebruaryOnly29Days));
        assert!(result.errors.day.unwrap().to_string().contains("29 days"));
    }

    #[test]
    fn test_april_31() {
        let result = check("31", "04", "2000");
        assert!(!result.is_valid);
        assert_eq!(
            result.errors.day,
            Some(ValidationError::MonthTooFewDays {
                month: 4,
                max_days: 30
            })
        );
        assert_eq!(
            result.errors.day.unwrap().to_string(),
            "April only has 30 days"
        );
    }

    #[test]
    fn test_november_31() {
        let result = check("31", "11", "1995");
        assert_eq!(
            result.errors.day.unwrap().to_string(),
            "November only has 30 days"
        );
    }

    #[test]
    fn test_future_date_within_current_year() {
        // Dec 31 of the current year passes the field checks but lies
        // after the frozen Jan 1 "today"
        let result = check("31", "12", "2025");
        assert!(!result.is_valid);
        assert_eq!(result.errors.general, Some(ValidationError::FutureDate));
        assert_eq!(result.errors.day, None);
        assert_eq!(result.errors.year, None);
    }

    #[test]
    fn test_age_within_default_bounds() {
        // Age 15 on 2025-01-01
        let result = check("01", "01", "2010");
        assert!(result.is_valid, "errors: {:?}", result.errors);
    }

    #[test]
    fn test_min_age_policy() {
        let config = ValidationConfig {
            min_age: 18,
            ..ValidationConfig::default()
        };
        let result = validate_birth_date("01", "01", "2010", &config, today());
        assert!(!result.is_valid);
        assert_eq!(
            result.errors.year,
            Some(ValidationError::TooYoung { min_age: 18 })
        );
        assert_eq!(
            result.errors.year.unwrap().to_string(),
            "You must be at least 18 years old"
        );
    }

    #[test]
    fn test_max_age_policy() {
        // Born 1900-01-01, age 125 on 2025-01-01
        let result = check("01", "01", "1900");
        assert!(!result.is_valid);
        assert_eq!(
            result.errors.year,
            Some(ValidationError::TooOld { max_age: 120 })
        );
    }

    #[test]
    fn test_newborn_fails_default_min_age() {
        // Born yesterday: age 0, below the default minimum of 1
        let result = check("31", "12", "2024");
        assert!(!result.is_valid);
        assert_eq!(
            result.errors.year,
            Some(ValidationError::TooYoung { min_age: 1 })
        );
    }

    #[test]
    fn test_age_boundary_on_birthday() {
        // 18th birthday exactly on "today" counts as 18
        let config = ValidationConfig {
            min_age: 18,
            ..ValidationConfig::default()
        };
        let result = validate_birth_date("01", "01", "2007", &config, today());
        assert!(result.is_valid, "errors: {:?}", result.errors);

        // One day short of the 18th birthday is still 17
        let result = validate_birth_date("02", "01", "2007", &config, today());
        assert!(!result.is_valid);
        assert_eq!(
            result.errors.year,
            Some(ValidationError::TooYoung { min_age: 18 })
        );
    }

    #[test]
    fn test_idempotence() {
        let first = check("29", "02", "2021");
        let second = check("29", "02", "2021");
        assert_eq!(first, second);

        let first = check("15", "08", "1991");
        let second = check("15", "08", "1991");
        assert_eq!(first, second);
    }

    #[test]
    fn test_valid_triple_round_trips() {
        for (d, m, y) in [("29", "02", "2020"), ("1", "1", "2010"), ("31", "12", "1999")] {
            let result = check(d, m, y);
            assert!(result.is_valid, "({d},{m},{y}) errors: {:?}", result.errors);

            let day = validate_day(d).unwrap();
            let month = validate_month(m).unwrap();
            let year = validate_year(y, 1900, 2025).unwrap();
            let iso = format!("{year:04}-{month:02}-{day:02}");
            let date = iso.parse::<CalendarDate>().unwrap();
            assert_eq!((date.day(), date.month(), date.year()), (day, month, year));
        }
    }

    #[test]
    fn test_garbage_never_panics() {
        for garbage in ["-", "+", "--3", "1e9", "NaN", "0x1f", "٣", "🦀", "1 2"] {
            let result = check(garbage, garbage, garbage);
            assert!(!result.is_valid);
        }
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(ValidationError::DayRequired.kind(), ErrorKind::Required);
        assert_eq!(ValidationError::YearNotANumber.kind(), ErrorKind::Format);
        assert_eq!(ValidationError::MonthTooLarge.kind(), ErrorKind::Range);
        assert_eq!(
            ValidationError::FebruaryOnly28Days.kind(),
            ErrorKind::CalendarConsistency
        );
        assert_eq!(ValidationError::InvalidDate.kind(), ErrorKind::Parse);
        assert_eq!(ValidationError::FutureDate.kind(), ErrorKind::Temporal);
        assert_eq!(
            ValidationError::TooOld { max_age: 120 }.kind(),
            ErrorKind::AgeBound
        );
    }

    #[test]
    fn test_result_invariant() {
        assert!(ValidationResult::valid().errors.is_empty());
        assert!(ValidationResult::valid().is_valid);

        let errors = ValidationErrors {
            day: Some(ValidationError::DayRequired),
            ..ValidationErrors::default()
        };
        let result = ValidationResult::from_errors(errors);
        assert!(!result.is_valid);

        let result = ValidationResult::from_errors(ValidationErrors::default());
        assert!(result.is_valid);
    }

    #[test]
    fn test_serde_result_shape() {
        let result = check("", "5", "1991");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isValid"], false);
        assert_eq!(json["errors"]["day"], "The day is required");
        assert!(json["errors"].get("month").is_none());
        assert!(json["errors"].get("general").is_none());

        let result = check("15", "08", "1991");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isValid"], true);
        assert_eq!(json["errors"], serde_json::json!({}));
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: ValidationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ValidationConfig::default());

        let config: ValidationConfig = serde_json::from_str(r#"{"min_age": 18}"#).unwrap();
        assert_eq!(config.min_age, 18);
        assert_eq!(config.max_age, 120);
        assert_eq!(config.min_year, 1900);
    }
}
