//! Quartz cron expression syntax.
//!
//! Six or seven whitespace-separated fields: seconds, minutes, hours,
//! day-of-month, month, day-of-week and an optional year. Only the syntax is
//! checked; nothing here computes fire times.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct CronError {
    pub field: &'static str,
    pub message: String,
}

impl CronError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

const MONTHS: &[&str] = &[
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];
const WEEKDAYS: &[&str] = &["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Special {
    None,
    DayOfMonth,
    DayOfWeek,
}

struct FieldSpec {
    name: &'static str,
    min: u32,
    max: u32,
    names: &'static [&'static str],
    special: Special,
}

const FIELDS: [FieldSpec; 7] = [
    FieldSpec {
        name: "seconds",
        min: 0,
        max: 59,
        names: &[],
        special: Special::None,
    },
    FieldSpec {
        name: "minutes",
        min: 0,
        max: 59,
        names: &[],
        special: Special::None,
    },
    FieldSpec {
        name: "hours",
        min: 0,
        max: 23,
        names: &[],
        special: Special::None,
    },
    FieldSpec {
        name: "day-of-month",
        min: 1,
        max: 31,
        names: &[],
        special: Special::DayOfMonth,
    },
    FieldSpec {
        name: "month",
        min: 1,
        max: 12,
        names: MONTHS,
        special: Special::None,
    },
    FieldSpec {
        name: "day-of-week",
        min: 1,
        max: 7,
        names: WEEKDAYS,
        special: Special::DayOfWeek,
    },
    FieldSpec {
        name: "year",
        min: 1970,
        max: 2099,
        names: &[],
        special: Special::None,
    },
];

/// A syntactically valid Quartz cron expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpression {
    fields: Vec<String>,
}

impl CronExpression {
    pub fn parse(input: &str) -> Result<Self, CronError> {
        let fields: Vec<&str> = input.split_whitespace().collect();
        if !(6..=7).contains(&fields.len()) {
            return Err(CronError::new(
                "expression",
                format!("expected 6 or 7 fields, found {}", fields.len()),
            ));
        }

        for (raw, spec) in fields.iter().zip(FIELDS.iter()) {
            parse_field(raw, spec)?;
        }

        match (fields[3] == "?", fields[5] == "?") {
            (true, true) => {
                return Err(CronError::new(
                    "day-of-week",
                    "'?' may only be used in one of day-of-month and day-of-week",
                ));
            }
            (false, false) => {
                return Err(CronError::new(
                    "day-of-week",
                    "one of day-of-month and day-of-week must be '?'",
                ));
            }
            _ => {}
        }

        Ok(Self {
            fields: fields.into_iter().map(str::to_string).collect(),
        })
    }

    pub fn has_year(&self) -> bool {
        self.fields.len() == 7
    }
}

impl fmt::Display for CronExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fields.join(" "))
    }
}

impl std::str::FromStr for CronExpression {
    type Err = CronError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_field(raw: &str, spec: &FieldSpec) -> Result<(), CronError> {
    if raw == "?" {
        return match spec.special {
            Special::None => Err(CronError::new(spec.name, "'?' is not allowed here")),
            _ => Ok(()),
        };
    }

    for item in raw.split(',') {
        if item.is_empty() {
            return Err(CronError::new(spec.name, format!("empty list item in '{}'", raw)));
        }
        if !parse_special(item, spec)? {
            parse_item(item, spec)?;
        }
    }
    Ok(())
}

/// `L`, `LW`, `nW` and `L-n` in day-of-month; `L`, `nL` and `n#k` in
/// day-of-week. Returns whether the item was one of these.
fn parse_special(item: &str, spec: &FieldSpec) -> Result<bool, CronError> {
    let upper = item.to_ascii_uppercase();
    match spec.special {
        Special::None => Ok(false),
        Special::DayOfMonth => {
            if upper == "L" || upper == "LW" {
                return Ok(true);
            }
            if let Some(offset) = upper.strip_prefix("L-") {
                parse_number(offset, 0, 30, spec)?;
                return Ok(true);
            }
            if let Some(day) = upper.strip_suffix('W') {
                parse_value(day, spec)?;
                return Ok(true);
            }
            Ok(false)
        }
        Special::DayOfWeek => {
            if upper == "L" {
                return Ok(true);
            }
            if let Some((day, nth)) = upper.split_once('#') {
                parse_value(day, spec)?;
                parse_number(nth, 1, 5, spec)?;
                return Ok(true);
            }
            if let Some(day) = upper.strip_suffix('L') {
                parse_value(day, spec)?;
                return Ok(true);
            }
            Ok(false)
        }
    }
}

fn parse_item(item: &str, spec: &FieldSpec) -> Result<(), CronError> {
    let (base, step) = match item.split_once('/') {
        Some((base, step)) => (base, Some(step)),
        None => (item, None),
    };

    if let Some(step) = step {
        parse_number(step, 1, spec.max.max(1), spec)?;
    }

    if base == "*" {
        return Ok(());
    }
    match base.split_once('-') {
        Some((from, to)) => {
            parse_value(from, spec)?;
            parse_value(to, spec)?;
        }
        None => {
            parse_value(base, spec)?;
        }
    }
    Ok(())
}

fn parse_value(value: &str, spec: &FieldSpec) -> Result<u32, CronError> {
    let upper = value.to_ascii_uppercase();
    if let Some(index) = spec.names.iter().position(|n| *n == upper) {
        return Ok(spec.min + index as u32);
    }
    parse_number(value, spec.min, spec.max, spec)
}

fn parse_number(value: &str, min: u32, max: u32, spec: &FieldSpec) -> Result<u32, CronError> {
    let n: u32 = value
        .parse()
        .map_err(|_| CronError::new(spec.name, format!("invalid value '{}'", value)))?;
    if n < min || n > max {
        return Err(CronError::new(
            spec.name,
            format!("{} is out of range {}-{}", n, min, max),
        ));
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_at_six() {
        let cron = CronExpression::parse("0 0 6 * * ?").unwrap();
        assert!(!cron.has_year());
        assert_eq!(cron.to_string(), "0 0 6 * * ?");
    }

    #[test]
    fn test_not_a_cron() {
        let err = CronExpression::parse("not a cron").unwrap_err();
        assert_eq!(err.field, "expression");
        assert!(err.message.contains("found 3"));
    }

    #[test]
    fn test_common_quartz_expressions() {
        for expr in [
            "0 0/15 * * * ?",
            "0 30 2 ? * MON-FRI",
            "0 0 12 1,15 * ?",
            "0 0 8 L * ?",
            "0 0 8 LW * ?",
            "0 0 8 15W * ?",
            "0 0 8 ? * 6L",
            "0 0 8 ? * FRI#2",
            "0 0 0 1 JAN ? 2030",
            "*/10 * * * * ?",
            "0 0 6 ? * *",
        ] {
            assert!(CronExpression::parse(expr).is_ok(), "{} should parse", expr);
        }
    }

    #[test]
    fn test_question_mark_rules() {
        let err = CronExpression::parse("0 0 6 * * *").unwrap_err();
        assert_eq!(err.field, "day-of-week");
        assert!(CronExpression::parse("0 0 6 ? * ?").is_err());
        let err = CronExpression::parse("? 0 6 * * ?").unwrap_err();
        assert_eq!(err.field, "seconds");
    }

    #[test]
    fn test_out_of_range_values() {
        assert_eq!(
            CronExpression::parse("60 0 6 * * ?").unwrap_err().field,
            "seconds"
        );
        assert_eq!(
            CronExpression::parse("0 0 24 * * ?").unwrap_err().field,
            "hours"
        );
        assert_eq!(
            CronExpression::parse("0 0 6 32 * ?").unwrap_err().field,
            "day-of-month"
        );
        assert_eq!(
            CronExpression::parse("0 0 6 ? * 8").unwrap_err().field,
            "day-of-week"
        );
        assert_eq!(
            CronExpression::parse("0 0 6 * * ? 1969").unwrap_err().field,
            "year"
        );
    }

    #[test]
    fn test_malformed_items() {
        assert!(CronExpression::parse("0 0 6 1,,2 * ?").is_err());
        assert!(CronExpression::parse("0 0/0 6 * * ?").is_err());
        assert!(CronExpression::parse("0 0 6 * FOO ?").is_err());
        assert!(CronExpression::parse("0 0 6 ? * MON#6").is_err());
        assert!(CronExpression::parse("0 0 6 * * ? 2030 extra").is_err());
    }
}
