use chrono::FixedOffset;
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;

use crate::db::models::requests::ServiceRequest;
use crate::errors::ExportError;

pub const SHEET_NAME: &str = "Service Requests";
pub const EXPORT_FILE_NAME: &str = "service-requests.xlsx";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const SERVICE_DATE_FORMAT: &str = "%d/%m/%Y";
pub const CREATED_AT_FORMAT: &str = "%d/%m/%Y %H:%M";

pub const HEADERS: [&str; 8] = [
    "Customer Name",
    "Complaint",
    "Mobile",
    "Technician",
    "Service Date",
    "Status",
    "Notes",
    "Created At",
];

/// One flattened spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub customer_name: String,
    pub complaint: String,
    pub mobile: String,
    pub technician: String,
    pub service_date: String,
    pub status: String,
    pub notes: String,
    pub created_at: String,
}

impl ExportRow {
    pub fn from_request(request: &ServiceRequest, offset: &FixedOffset) -> Self {
        ExportRow {
            customer_name: request.customer_name.clone(),
            complaint: request.complaint.clone(),
            mobile: request.mobile.clone(),
            technician: request.technician_name.clone(),
            service_date: request.service_date.format(SERVICE_DATE_FORMAT).to_string(),
            status: request.status.to_string(),
            notes: request.notes.clone().unwrap_or_default(),
            created_at: request
                .created_at
                .with_timezone(offset)
                .format(CREATED_AT_FORMAT)
                .to_string(),
        }
    }

    fn cells(&self) -> [&str; 8] {
        [
            self.customer_name.as_str(),
            self.complaint.as_str(),
            self.mobile.as_str(),
            self.technician.as_str(),
            self.service_date.as_str(),
            self.status.as_str(),
            self.notes.as_str(),
            self.created_at.as_str(),
        ]
    }
}

/// Same length and order as `requests`.
pub fn export_rows(requests: &[ServiceRequest], offset: &FixedOffset) -> Vec<ExportRow> {
    requests
        .iter()
        .map(|request| ExportRow::from_request(request, offset))
        .collect()
}

/// Serializes rows into a single-sheet xlsx workbook.
pub fn write_workbook(rows: &[ExportRow]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }
    for (idx, row) in rows.iter().enumerate() {
        let row_num = idx as u32 + 1;
        for (col, value) in row.cells().iter().enumerate() {
            worksheet.write_string(row_num, col as u16, *value)?;
        }
    }
    worksheet.autofit();

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::requests::ServiceStatus;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::io::{Cursor, Read};
    use uuid::Uuid;

    fn request(name: &str, notes: Option<&str>) -> ServiceRequest {
        ServiceRequest {
            id: Uuid::new_v4(),
            customer_name: name.into(),
            complaint: "AC noise".into(),
            mobile: "9999999999".into(),
            technician_name: "Raj".into(),
            service_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            status: ServiceStatus::InProgress,
            notes: notes.map(Into::into),
            created_at: Utc.with_ymd_and_hms(2024, 4, 30, 21, 5, 0).unwrap(),
        }
    }

    #[test]
    fn rows_keep_input_order_and_formats() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let input = vec![request("Amit", Some("call first")), request("Bela", None)];
        let rows = export_rows(&input, &utc);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].customer_name, "Amit");
        assert_eq!(rows[1].customer_name, "Bela");
        assert_eq!(rows[0].service_date, "01/05/2024");
        assert_eq!(rows[0].created_at, "30/04/2024 21:05");
        assert_eq!(rows[0].status, "in_progress");
        assert_eq!(rows[0].notes, "call first");
        assert_eq!(rows[1].notes, "");
    }

    #[test]
    fn created_at_uses_display_offset_but_service_date_does_not() {
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let row = ExportRow::from_request(&request("Amit", None), &ist);
        assert_eq!(row.created_at, "01/05/2024 02:35");
        assert_eq!(row.service_date, "01/05/2024");
    }

    fn part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut xml).unwrap();
        xml
    }

    fn between<'a>(text: &'a str, open: &str, close: &str) -> Option<&'a str> {
        let start = text.find(open)? + open.len();
        let len = text[start..].find(close)?;
        Some(&text[start..start + len])
    }

    fn shared_strings(bytes: &[u8]) -> Vec<String> {
        part(bytes, "xl/sharedStrings.xml")
            .split("<si>")
            .skip(1)
            .map(|si| between(si, ">", "</t>").unwrap_or_default().to_string())
            .collect()
    }

    /// Cells of worksheet row `row` (1-based) as eight column strings, plus
    /// whether each cell carries a non-default style.
    fn sheet_row(bytes: &[u8], row: u32) -> ([String; 8], [bool; 8]) {
        let strings = shared_strings(bytes);
        let sheet = part(bytes, "xl/worksheets/sheet1.xml");
        let row_xml = between(&sheet, &format!("<row r=\"{row}\""), "</row>").unwrap();

        let mut values: [String; 8] = Default::default();
        let mut styled = [false; 8];
        for cell in row_xml.split("<c ").skip(1) {
            let reference = between(cell, "r=\"", "\"").unwrap();
            let col = (reference.as_bytes()[0] - b'A') as usize;
            styled[col] = cell.contains(" s=\"");
            if let Some(v) = between(cell, "<v>", "</v>") {
                values[col] = strings[v.parse::<usize>().unwrap()].clone();
            }
        }
        (values, styled)
    }

    #[test]
    fn workbook_names_sheet_and_bolds_headers() {
        let bytes = write_workbook(&[]).unwrap();

        assert!(part(&bytes, "xl/workbook.xml").contains(&format!("name=\"{SHEET_NAME}\"")));
        assert_eq!(SHEET_NAME, "Service Requests");

        let (headers, styled) = sheet_row(&bytes, 1);
        assert_eq!(headers, HEADERS.map(String::from));
        assert_eq!(styled, [true; 8]);
        assert!(part(&bytes, "xl/styles.xml").contains("<b/>"));
        // header only
        assert!(!part(&bytes, "xl/worksheets/sheet1.xml").contains("<row r=\"2\""));
    }

    #[test]
    fn workbook_rows_hold_formatted_values() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let rows = export_rows(&[request("Amit", None), request("Bela", Some("call first"))], &utc);
        let bytes = write_workbook(&rows).unwrap();

        let (first, styled) = sheet_row(&bytes, 2);
        assert_eq!(first, rows[0].cells().map(String::from));
        assert_eq!(first[6], "");
        assert_eq!(first[7], "30/04/2024 21:05");
        assert_eq!(first[4], "01/05/2024");
        assert!(!styled[0]);

        let (second, _) = sheet_row(&bytes, 3);
        assert_eq!(second[0], "Bela");
        assert_eq!(second[6], "call first");
    }
}
