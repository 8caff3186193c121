//! Document number rendering.
//!
//! Tokens are emitted in a fixed order and joined by the separator:
//!
//! ```text
//! prefix [year] [month] [day] [branch] sequence
//! INV  -  2425 -  05  -  07 -  BLR   - 00042
//! ```
//!
//! Rendering is a pure function of the format and the context.

use crate::error::FiscalError;
use crate::models::{BranchFormat, DocumentNumberFormat, YearFormat};
use chrono::{Datelike, NaiveDate};

pub const MAX_SEQUENCE_LENGTH: i32 = 12;
pub const MAX_AFFIX_LENGTH: usize = 16;

/// Inputs that vary per document.
#[derive(Debug, Clone, Copy)]
pub struct FormatContext<'a> {
    pub branch_code: Option<&'a str>,
    pub date: NaiveDate,
    pub sequence: i64,
}

/// Check a format independently of any context.
pub fn validate(config: &DocumentNumberFormat) -> Result<(), FiscalError> {
    if config.sequence_length <= 0 {
        return Err(FiscalError::InvalidFormatConfig(format!(
            "sequence_length must be positive, got {}",
            config.sequence_length
        )));
    }
    if config.sequence_length > MAX_SEQUENCE_LENGTH {
        return Err(FiscalError::InvalidFormatConfig(format!(
            "sequence_length must be at most {}, got {}",
            MAX_SEQUENCE_LENGTH, config.sequence_length
        )));
    }
    check_affix("prefix", &config.prefix)?;
    check_affix("separator", &config.separator)?;
    Ok(())
}

fn check_affix(field: &str, value: &str) -> Result<(), FiscalError> {
    if value.chars().count() > MAX_AFFIX_LENGTH {
        return Err(FiscalError::InvalidFormatConfig(format!(
            "{} must be at most {} characters",
            field, MAX_AFFIX_LENGTH
        )));
    }
    if value.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(FiscalError::InvalidFormatConfig(format!(
            "{} must not contain whitespace or control characters",
            field
        )));
    }
    Ok(())
}

/// Render a document number.
pub fn format(config: &DocumentNumberFormat, ctx: &FormatContext<'_>) -> Result<String, FiscalError> {
    validate(config)?;

    if ctx.sequence < 1 {
        return Err(FiscalError::InvalidFormatConfig(format!(
            "sequence value must be at least 1, got {}",
            ctx.sequence
        )));
    }

    let mut tokens: Vec<String> = Vec::with_capacity(6);

    if !config.prefix.is_empty() {
        tokens.push(config.prefix.clone());
    }
    if config.include_year {
        tokens.push(render_year(config.year_format, ctx.date));
    }
    if config.include_month {
        tokens.push(format!("{:02}", ctx.date.month()));
    }
    if config.include_day {
        tokens.push(format!("{:02}", ctx.date.day()));
    }
    if config.include_branch {
        let code = ctx
            .branch_code
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                FiscalError::InvalidFormatConfig(
                    "format includes the branch token but no branch code was given".to_string(),
                )
            })?;
        tokens.push(render_branch(config.branch_format, code)?);
    }

    let width = config.sequence_length as usize;
    tokens.push(format!("{:0>width$}", ctx.sequence, width = width));

    Ok(tokens.join(&config.separator))
}

/// Render with a synthetic sequence value; never touches any counter.
pub fn preview(
    config: &DocumentNumberFormat,
    branch_code: Option<&str>,
    date: NaiveDate,
    sample_sequence: Option<i64>,
) -> Result<String, FiscalError> {
    format(
        config,
        &FormatContext {
            branch_code,
            date,
            sequence: sample_sequence.unwrap_or(1),
        },
    )
}

fn render_year(year_format: YearFormat, date: NaiveDate) -> String {
    match year_format {
        YearFormat::FourDigit => format!("{:04}", date.year()),
        YearFormat::TwoDigit => format!("{:02}", date.year().rem_euclid(100)),
        YearFormat::FinancialYear => {
            let start = if date.month() >= 4 {
                date.year()
            } else {
                date.year() - 1
            };
            format!(
                "{:02}{:02}",
                start.rem_euclid(100),
                (start + 1).rem_euclid(100)
            )
        }
    }
}

fn render_branch(branch_format: BranchFormat, code: &str) -> Result<String, FiscalError> {
    match branch_format {
        BranchFormat::Code => Ok(code.to_string()),
        BranchFormat::Upper => Ok(code.to_uppercase()),
        BranchFormat::Short => {
            let short: String = code
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .take(3)
                .collect::<String>()
                .to_ascii_uppercase();
            if short.is_empty() {
                return Err(FiscalError::InvalidFormatConfig(format!(
                    "branch code '{}' has no alphanumeric characters",
                    code
                )));
            }
            Ok(short)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentType, ResetFrequency};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn full_format() -> DocumentNumberFormat {
        DocumentNumberFormat {
            prefix: "INV".to_string(),
            separator: "/".to_string(),
            sequence_length: 4,
            sequence_reset_frequency: ResetFrequency::Monthly,
            include_branch: true,
            branch_format: BranchFormat::Short,
            include_year: true,
            year_format: YearFormat::FourDigit,
            include_month: true,
            include_day: true,
        }
    }

    #[test]
    fn test_default_format() {
        let config = DocumentNumberFormat::default_for(DocumentType::Invoice);
        let ctx = FormatContext {
            branch_code: None,
            date: date(2024, 5, 7),
            sequence: 42,
        };
        assert_eq!(format(&config, &ctx).unwrap(), "INV-00042");
    }

    #[test]
    fn test_token_order() {
        let ctx = FormatContext {
            branch_code: Some("blr-main"),
            date: date(2024, 5, 7),
            sequence: 12,
        };
        assert_eq!(
            format(&full_format(), &ctx).unwrap(),
            "INV/2024/05/07/BLR/0012"
        );
    }

    #[test]
    fn test_year_formats() {
        let mut config = DocumentNumberFormat::default_for(DocumentType::JobSheet);
        config.include_year = true;
        let ctx = |d| FormatContext {
            branch_code: None,
            date: d,
            sequence: 1,
        };

        config.year_format = YearFormat::TwoDigit;
        assert_eq!(format(&config, &ctx(date(2024, 5, 7))).unwrap(), "JS-24-00001");

        config.year_format = YearFormat::FinancialYear;
        assert_eq!(format(&config, &ctx(date(2024, 5, 7))).unwrap(), "JS-2425-00001");
        assert_eq!(format(&config, &ctx(date(2025, 3, 31))).unwrap(), "JS-2425-00001");
        assert_eq!(format(&config, &ctx(date(2099, 12, 1))).unwrap(), "JS-9900-00001");
    }

    #[test]
    fn test_branch_formats() {
        let mut config = DocumentNumberFormat::default_for(DocumentType::Estimate);
        config.include_branch = true;
        let ctx = FormatContext {
            branch_code: Some("Koramangala"),
            date: date(2024, 1, 1),
            sequence: 3,
        };

        config.branch_format = BranchFormat::Code;
        assert_eq!(format(&config, &ctx).unwrap(), "EST-Koramangala-00003");
        config.branch_format = BranchFormat::Upper;
        assert_eq!(format(&config, &ctx).unwrap(), "EST-KORAMANGALA-00003");
        config.branch_format = BranchFormat::Short;
        assert_eq!(format(&config, &ctx).unwrap(), "EST-KOR-00003");
    }

    #[test]
    fn test_missing_branch_code_is_rejected() {
        let ctx = FormatContext {
            branch_code: Some("  "),
            date: date(2024, 1, 1),
            sequence: 1,
        };
        assert!(matches!(
            format(&full_format(), &ctx),
            Err(FiscalError::InvalidFormatConfig(_))
        ));
    }

    #[test]
    fn test_invalid_sequence_length() {
        let ctx = FormatContext {
            branch_code: Some("X"),
            date: date(2024, 1, 1),
            sequence: 1,
        };
        for len in [0, -3, MAX_SEQUENCE_LENGTH + 1] {
            let mut config = full_format();
            config.sequence_length = len;
            assert!(matches!(
                format(&config, &ctx),
                Err(FiscalError::InvalidFormatConfig(_))
            ));
        }
    }

    #[test]
    fn test_empty_prefix_has_no_leading_separator() {
        let mut config = DocumentNumberFormat::default_for(DocumentType::Invoice);
        config.prefix = String::new();
        config.sequence_length = 3;
        let ctx = FormatContext {
            branch_code: None,
            date: date(2024, 1, 1),
            sequence: 7,
        };
        assert_eq!(format(&config, &ctx).unwrap(), "007");
    }

    #[test]
    fn test_sequence_wider_than_width_is_not_truncated() {
        let mut config = DocumentNumberFormat::default_for(DocumentType::Invoice);
        config.sequence_length = 2;
        let ctx = FormatContext {
            branch_code: None,
            date: date(2024, 1, 1),
            sequence: 12345,
        };
        assert_eq!(format(&config, &ctx).unwrap(), "INV-12345");
    }

    #[test]
    fn test_format_is_pure() {
        let config = full_format();
        let ctx = FormatContext {
            branch_code: Some("HSR"),
            date: date(2024, 11, 30),
            sequence: 999,
        };
        let first = format(&config, &ctx).unwrap();
        for _ in 0..100 {
            assert_eq!(format(&config, &ctx).unwrap(), first);
        }
    }

    #[test]
    fn test_preview_defaults_to_one() {
        let config = DocumentNumberFormat::default_for(DocumentType::CreditNote);
        assert_eq!(
            preview(&config, None, date(2024, 1, 1), None).unwrap(),
            "CN-00001"
        );
        assert_eq!(
            preview(&config, None, date(2024, 1, 1), Some(77)).unwrap(),
            "CN-00077"
        );
    }

    #[test]
    fn test_whitespace_in_separator_is_rejected() {
        let mut config = DocumentNumberFormat::default_for(DocumentType::Invoice);
        config.separator = " ".to_string();
        assert!(validate(&config).is_err());
    }
}
