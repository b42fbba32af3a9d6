//! Schedule CSV export and import

use crate::core::{LeaseRow, LeaseSchedule};
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::io::{BufRead, Write};
use std::sync::OnceLock;

/// Column headers of an exported schedule
pub const SCHEDULE_HEADERS: [&str; 9] = [
    "Period",
    "Date",
    "Payment",
    "Interest",
    "Principal",
    "Closing Liability",
    "Depreciation",
    "ROU Balance",
    "Total Expense",
];

/// Write a schedule as CSV
pub fn write_schedule_csv<W: Write>(schedule: &LeaseSchedule, mut writer: W) -> Result<()> {
    writeln!(writer, "{}", SCHEDULE_HEADERS.join(","))?;
    for row in schedule.rows() {
        writeln!(
            writer,
            "{},{},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
            row.period,
            row.date.format("%Y-%m-%d"),
            row.payment,
            row.interest,
            row.principal,
            row.closing_liability,
            row.depreciation,
            row.rou_balance,
            row.total_expense,
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Split one CSV line, honouring double-quoted fields
fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn amount_noise() -> &'static Regex {
    static NOISE: OnceLock<Regex> = OnceLock::new();
    NOISE.get_or_init(|| Regex::new(r"[\$,\s]").expect("static regex"))
}

/// Parse a formatted amount such as `$1,234.50`
fn parse_amount(raw: &str, column: &str, line: usize) -> Result<f64> {
    let cleaned = amount_noise().replace_all(raw, "");
    let (negative, digits) = match cleaned.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner.to_string()),
        None => (false, cleaned.to_string()),
    };
    let value: f64 = digits
        .parse()
        .with_context(|| format!("Line {}: invalid amount '{}' in '{}'", line, raw, column))?;
    Ok(if negative { -value } else { value })
}

fn field<'a>(fields: &'a [String], index: &[usize; 9], column: usize, line_no: usize) -> Result<&'a str> {
    fields
        .get(index[column])
        .map(|s| s.trim())
        .with_context(|| format!("Line {}: missing '{}'", line_no, SCHEDULE_HEADERS[column]))
}

/// Read a schedule exported by [`write_schedule_csv`].
///
/// Columns are matched by header name, so column order and extra columns
/// do not matter. Amounts may carry currency symbols and thousands separators.
pub fn read_schedule_csv<R: BufRead>(reader: R) -> Result<LeaseSchedule> {
    let mut lines = reader.lines();
    let header = match lines.next() {
        Some(line) => split_line(line?.trim_start_matches('\u{feff}')),
        None => bail!("Schedule CSV is empty"),
    };

    let mut index = [0usize; 9];
    for (slot, name) in index.iter_mut().zip(SCHEDULE_HEADERS) {
        *slot = header
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
            .with_context(|| format!("Schedule CSV is missing the '{}' column", name))?;
    }

    let mut rows = Vec::new();
    for (n, line) in lines.enumerate() {
        let line_no = n + 2;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_line(&line);

        let period = field(&fields, &index, 0, line_no)?
            .parse::<u32>()
            .with_context(|| format!("Line {}: invalid period", line_no))?;
        let date_text = field(&fields, &index, 1, line_no)?;
        let date = NaiveDate::parse_from_str(date_text, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(date_text.get(..10).unwrap_or(date_text), "%Y-%m-%d"))
            .with_context(|| format!("Line {}: invalid date '{}'", line_no, date_text))?;
        let amount = |i: usize| -> Result<f64> {
            parse_amount(field(&fields, &index, i, line_no)?, SCHEDULE_HEADERS[i], line_no)
        };

        rows.push(LeaseRow {
            period,
            date,
            payment: amount(2)?,
            interest: amount(3)?,
            principal: amount(4)?,
            closing_liability: amount(5)?,
            depreciation: amount(6)?,
            rou_balance: amount(7)?,
            total_expense: amount(8)?,
        });
    }

    Ok(LeaseSchedule::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LeaseSchedule {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        LeaseSchedule::new(vec![LeaseRow {
            period: 1,
            date,
            payment: 1000.0,
            interest: 41.67,
            principal: 958.33,
            closing_liability: 9041.67,
            depreciation: 833.33,
            rou_balance: 9166.67,
            total_expense: 875.0,
        }])
    }

    #[test]
    fn test_write_header_and_row() {
        let mut out = Vec::new();
        write_schedule_csv(&sample(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Period,Date,Payment,Interest,Principal,Closing Liability,Depreciation,ROU Balance,Total Expense"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1,2025-01-01,1000.00,41.67,958.33,9041.67,833.33,9166.67,875.00"
        );
    }

    #[test]
    fn test_read_formatted_amounts_and_reordered_columns() {
        let csv = "Date,Period,Payment,Interest,Principal,Closing Liability,Depreciation,ROU Balance,Total Expense,Note\n\
                   2025-01-01,1,\"$1,000.00\",41.67,958.33,\"9,041.67\",833.33,\"9,166.67\",875.00,\"first, month\"\n";
        let schedule = read_schedule_csv(csv.as_bytes()).unwrap();
        assert_eq!(schedule, sample());
    }

    #[test]
    fn test_read_missing_column() {
        let csv = "Period,Date,Payment\n1,2025-01-01,100\n";
        let err = read_schedule_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Interest"));
    }

    #[test]
    fn test_parse_negative_amount() {
        assert_eq!(parse_amount("(1,250.50)", "Principal", 2).unwrap(), -1250.5);
        assert_eq!(parse_amount("-3.00", "Principal", 2).unwrap(), -3.0);
        assert!(parse_amount("n/a", "Principal", 2).is_err());
    }

    #[test]
    fn test_split_line_quotes() {
        assert_eq!(
            split_line(r#"a,"b,c","say ""hi""""#),
            vec!["a".to_string(), "b,c".to_string(), "say \"hi\"".to_string()]
        );
    }
}
