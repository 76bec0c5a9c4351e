//! Registration exports: CSV for spreadsheets and a plain-text report that
//! stands in for a printable PDF.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use sedp_types::Registration;

use crate::clock::Clock;

const DELIMITER: char = ',';
const QUOTE: char = '"';
const REPORT_WIDTH: usize = 64;
const LABEL_WIDTH: usize = 16;

/// A column in the delimited export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportField {
    SerialNo,
    FullName,
    MobileNumber,
    WhatsappNumber,
    Address,
    Panchayath,
    Category,
    Status,
    SubmittedAt,
    ApprovedAt,
    UniqueId,
}

impl ExportField {
    /// Column set of the standard registration export.
    pub const STANDARD: [ExportField; 11] = [
        ExportField::SerialNo,
        ExportField::FullName,
        ExportField::MobileNumber,
        ExportField::WhatsappNumber,
        ExportField::Address,
        ExportField::Panchayath,
        ExportField::Category,
        ExportField::Status,
        ExportField::SubmittedAt,
        ExportField::ApprovedAt,
        ExportField::UniqueId,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Self::SerialNo => "S.No",
            Self::FullName => "Full Name",
            Self::MobileNumber => "Mobile Number",
            Self::WhatsappNumber => "WhatsApp Number",
            Self::Address => "Address",
            Self::Panchayath => "Panchayath",
            Self::Category => "Category",
            Self::Status => "Status",
            Self::SubmittedAt => "Submitted Date",
            Self::ApprovedAt => "Approved Date",
            Self::UniqueId => "Unique ID",
        }
    }

    /// Value of this column for the record at 1-based position `serial`.
    pub fn value(self, serial: usize, reg: &Registration) -> String {
        match self {
            Self::SerialNo => serial.to_string(),
            Self::FullName => reg.full_name.clone(),
            Self::MobileNumber => reg.mobile_number.clone(),
            Self::WhatsappNumber => reg.whatsapp_number.clone(),
            Self::Address => reg.address.clone(),
            Self::Panchayath => reg.panchayath_details.clone(),
            Self::Category => reg.category.label().to_string(),
            Self::Status => reg.status.to_string(),
            Self::SubmittedAt => format_date(reg.submitted_at),
            Self::ApprovedAt => reg.approved_at.map(format_date).unwrap_or_default(),
            Self::UniqueId => reg.unique_id.clone().unwrap_or_default(),
        }
    }
}

fn format_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// Quote a value if it holds the delimiter, a quote or a line break.
fn escape(value: &str) -> String {
    if value.contains([DELIMITER, QUOTE, '\n', '\r']) {
        format!("{QUOTE}{}{QUOTE}", value.replace(QUOTE, "\"\""))
    } else {
        value.to_string()
    }
}

fn write_row<I>(out: &mut String, cells: I)
where
    I: IntoIterator<Item = String>,
{
    let line = cells
        .into_iter()
        .map(|c| escape(&c))
        .collect::<Vec<_>>()
        .join(&DELIMITER.to_string());
    out.push_str(&line);
    out.push('\n');
}

/// Header line plus one line per record, each terminated by `\n`.
pub fn to_delimited_text(records: &[Registration], fields: &[ExportField]) -> String {
    let mut out = String::new();
    write_row(&mut out, fields.iter().map(|f| f.header().to_string()));
    for (i, reg) in records.iter().enumerate() {
        write_row(&mut out, fields.iter().map(|f| f.value(i + 1, reg)));
    }
    out
}

pub fn to_report(records: &[Registration], clock: &dyn Clock) -> String {
    to_report_titled("SEDP REGISTRATION REPORT", records, clock)
}

/// Fixed-width text report: banner, one block per record, closing banner.
/// The generation time comes from `clock`; everything else is derived from
/// `records`.
pub fn to_report_titled(title: &str, records: &[Registration], clock: &dyn Clock) -> String {
    let heavy = "=".repeat(REPORT_WIDTH);
    let light = "-".repeat(REPORT_WIDTH);
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, "{:^width$}", title, width = REPORT_WIDTH);
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, "Generated: {} UTC", format_date(clock.now()));
    let _ = writeln!(out, "Total records: {}", records.len());
    let _ = writeln!(out, "{heavy}");

    for (i, reg) in records.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "#{}", i + 1);
        for field in ExportField::STANDARD.iter().skip(1) {
            write_report_line(&mut out, field.header(), &field.value(i + 1, reg));
        }
        let _ = writeln!(out, "{light}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, "{:^width$}", "END OF REPORT", width = REPORT_WIDTH);
    let _ = writeln!(out, "{heavy}");
    out
}

fn write_report_line(out: &mut String, label: &str, value: &str) {
    let value = if value.is_empty() { "-" } else { value };
    let mut lines = value.lines();
    let first = lines.next().unwrap_or("-");
    let _ = writeln!(out, "  {label:<width$}: {first}", width = LABEL_WIDTH);
    for cont in lines {
        let _ = writeln!(out, "  {:<width$}  {cont}", "", width = LABEL_WIDTH);
    }
}

/// Download name for an export, e.g. `FarmeLife_registrations.csv`.
/// Characters outside `[A-Za-z0-9_-]` become `_`.
pub fn export_filename(scope: &str, extension: &str) -> String {
    let scope: String = scope
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let scope = if scope.is_empty() { "all".to_string() } else { scope };
    format!("{scope}_registrations.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::TimeZone;
    use sedp_types::{Category, Status};

    const STANDARD_HEADER: &str = "S.No,Full Name,Mobile Number,WhatsApp Number,Address,Panchayath,Category,Status,Submitted Date,Approved Date,Unique ID";

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, 15, 0).unwrap()
    }

    fn approved() -> Registration {
        Registration {
            id: "r1".into(),
            full_name: "Anu \"Chechi\" Joseph".into(),
            mobile_number: "9876543210".into(),
            whatsapp_number: "9876543210".into(),
            address: "House 12, Main Road\nTanur".into(),
            panchayath_details: "Tanur".into(),
            category: Category::Farmelife,
            status: Status::Approved,
            submitted_at: at(9),
            approved_at: Some(at(11)),
            unique_id: Some("ESP9876543210A".into()),
        }
    }

    fn pending() -> Registration {
        Registration {
            id: "r2".into(),
            full_name: "Binu".into(),
            mobile_number: "9123456780".into(),
            whatsapp_number: "9123456780".into(),
            address: "Edappal".into(),
            panchayath_details: "Edappal".into(),
            category: Category::JobCard,
            status: Status::Pending,
            submitted_at: at(10),
            approved_at: None,
            unique_id: None,
        }
    }

    fn parse_csv(text: &str) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(text.as_bytes())
            .records()
            .map(|row| row.unwrap().iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn empty_export_is_header_only() {
        let csv = to_delimited_text(&[], &ExportField::STANDARD);
        assert_eq!(csv, format!("{STANDARD_HEADER}\n"));
    }

    #[test]
    fn rows_follow_standard_columns() {
        let csv = to_delimited_text(&[pending()], &ExportField::STANDARD);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(STANDARD_HEADER));
        assert_eq!(
            lines.next(),
            Some("1,Binu,9123456780,9123456780,Edappal,Edappal,Job Card (All Categories),pending,2024-05-01 10:15,,")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn quoted_values_round_trip() {
        let records = vec![approved(), pending()];
        let csv = to_delimited_text(&records, &ExportField::STANDARD);
        let rows = parse_csv(&csv);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].join(","), STANDARD_HEADER);
        for (i, reg) in records.iter().enumerate() {
            let expected: Vec<String> = ExportField::STANDARD
                .iter()
                .map(|f| f.value(i + 1, reg))
                .collect();
            assert_eq!(rows[i + 1], expected);
        }
        assert_eq!(rows[1][1], "Anu \"Chechi\" Joseph");
        assert_eq!(rows[1][4], "House 12, Main Road\nTanur");
    }

    #[test]
    fn carriage_returns_stay_inside_the_cell() {
        let mut reg = pending();
        reg.address = "Door 4\r\nEdappal".into();
        reg.full_name = "Binu,\rK".into();

        let text = to_delimited_text(&[reg], &ExportField::STANDARD);
        let rows = parse_csv(&text);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][1], "Binu,\rK");
        assert_eq!(rows[1][4], "Door 4\r\nEdappal");
        assert_eq!(rows[1][5], "Edappal");
    }

    #[test]
    fn custom_field_selection() {
        let csv = to_delimited_text(
            &[approved()],
            &[ExportField::MobileNumber, ExportField::UniqueId],
        );
        assert_eq!(csv, "Mobile Number,Unique ID\n9876543210,ESP9876543210A\n");
    }

    #[test]
    fn report_is_deterministic_under_fixed_clock() {
        let clock = FixedClock(at(12));
        let records = vec![approved(), pending()];
        let a = to_report(&records, &clock);
        let b = to_report(&records, &clock);
        assert_eq!(a, b);

        assert!(a.contains("Generated: 2024-05-01 12:15 UTC"));
        assert!(a.contains("Total records: 2"));
        assert!(a.contains("#1\n"));
        assert!(a.contains("  Unique ID       : ESP9876543210A"));
        assert!(a.contains("  Approved Date   : -"));
        assert!(a.contains("  Address         : House 12, Main Road\n                    Tanur\n"));
        assert!(a.trim_end().ends_with(&"=".repeat(REPORT_WIDTH)));
    }

    #[test]
    fn empty_report_has_banners_only() {
        let report = to_report(&[], &FixedClock(at(8)));
        assert!(report.contains("Total records: 0"));
        assert!(report.contains("END OF REPORT"));
        assert!(!report.contains("#1"));
    }

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(
            export_filename("Job Card (All Categories)", "csv"),
            "Job_Card__All_Categories__registrations.csv"
        );
        assert_eq!(export_filename("", "txt"), "all_registrations.txt");
    }
}
