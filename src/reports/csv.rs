//! CSV export
//!
//! Renders a report as comma-delimited text with CRLF row endings. Sections
//! come in a fixed order and each ends with a blank line.
//!
//! Fields are written as-is: a medicine or complaint containing a comma or a
//! double quote will shift the columns of its row.

use chrono::NaiveDateTime;

use super::model::ReportModel;

const CRLF: &str = "\r\n";

/// A rendered CSV document and the filename it should be saved under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

impl CsvExport {
    pub fn as_bytes(&self) -> &[u8] {
        self.content.as_bytes()
    }
}

/// `Medical_Reports_June_2024.csv`
pub fn csv_filename(model: &ReportModel) -> String {
    format!(
        "Medical_Reports_{}_{}.csv",
        model.period().month_name(),
        model.period().year()
    )
}

struct CsvBuilder {
    out: String,
}

impl CsvBuilder {
    fn new() -> Self {
        Self { out: String::new() }
    }

    fn row<S: AsRef<str>>(&mut self, fields: &[S]) {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.out.push(',');
            }
            self.out.push_str(field.as_ref());
        }
        self.out.push_str(CRLF);
    }

    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push_str(CRLF);
    }

    fn end_section(&mut self) {
        self.out.push_str(CRLF);
    }
}

/// Pair two columns side by side, leaving cells blank where one side runs out
fn paired_rows<'a>(
    left: &'a [(String, u64)],
    right: &'a [(String, u64)],
) -> impl Iterator<Item = [String; 4]> + 'a {
    let rows = left.len().max(right.len());
    (0..rows).map(move |i| {
        let cell = |side: &[(String, u64)]| match side.get(i) {
            Some((name, count)) => (name.clone(), count.to_string()),
            None => (String::new(), String::new()),
        };
        let (l_name, l_count) = cell(left);
        let (r_name, r_count) = cell(right);
        [l_name, l_count, r_name, r_count]
    })
}

/// Render the report. `generated_at` is the only time-dependent input.
pub fn render_csv(model: &ReportModel, generated_at: NaiveDateTime) -> CsvExport {
    let totals = model.totals();
    let mut csv = CsvBuilder::new();

    csv.line(&format!(
        "Medical Reports for the Month of {} {}",
        model.period().month_name(),
        model.period().year()
    ));
    csv.line(&format!("Generated on: {}", generated_at.format("%-m/%-d/%Y")));
    csv.end_section();

    csv.line("MEDICINE DISTRIBUTION");
    csv.row(&["Medicine Name", "Count"]);
    for item in model.medicines() {
        csv.row(&[item.medicine_name.clone(), item.count.to_string()]);
    }
    csv.row(&[
        "Total Medicines Distributed".to_string(),
        totals.medicines_distributed.to_string(),
    ]);
    csv.end_section();

    csv.line("HEALTH COMPLAINTS BY GENDER");
    csv.row(&["Male Complaints", "Count", "Female Complaints", "Count"]);
    let male: Vec<_> = model
        .male_complaints()
        .iter()
        .map(|c| (c.complaint.clone(), c.count))
        .collect();
    let female: Vec<_> = model
        .female_complaints()
        .iter()
        .map(|c| (c.complaint.clone(), c.count))
        .collect();
    for row in paired_rows(&male, &female) {
        csv.row(&row);
    }
    csv.row(&[
        "Total Male Complaints".to_string(),
        totals.male_complaints.to_string(),
        "Total Female Complaints".to_string(),
        totals.female_complaints.to_string(),
    ]);
    csv.end_section();

    csv.line("AGE DISTRIBUTION BY GENDER");
    csv.row(&["Male Age Range", "Count", "Female Age Range", "Count"]);
    let male: Vec<_> = model
        .male_age_brackets()
        .iter()
        .map(|b| (b.bracket.label().to_string(), b.count))
        .collect();
    let female: Vec<_> = model
        .female_age_brackets()
        .iter()
        .map(|b| (b.bracket.label().to_string(), b.count))
        .collect();
    for row in paired_rows(&male, &female) {
        csv.row(&row);
    }
    csv.row(&[
        "Total Males".to_string(),
        totals.male_subjects.to_string(),
        "Total Females".to_string(),
        totals.female_subjects.to_string(),
    ]);
    csv.end_section();

    csv.line("SUMMARY");
    csv.row(&["Category", "Count"]);
    let summary_rows = [
        ("Total Male Patients", totals.male_subjects),
        ("Total Female Patients", totals.female_subjects),
        ("Total Patients", totals.total_subjects),
        ("Total Medicines Distributed", totals.medicines_distributed),
        ("Total Health Complaints", totals.total_complaints),
    ];
    for (label, value) in summary_rows {
        csv.row(&[label.to_string(), value.to_string()]);
    }
    csv.end_section();

    CsvExport {
        filename: csv_filename(model),
        content: csv.out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DispenseRequest, Profile};
    use crate::reports::period::ReportPeriod;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn request(medicine: &str, complaint: &str, gender: &str) -> DispenseRequest {
        DispenseRequest {
            id: 0,
            medicine: Some(medicine.to_string()),
            complaint: Some(complaint.to_string()),
            gender: Some(gender.to_string()),
            date_visit: "2024-06-10T10:00:00".to_string(),
        }
    }

    fn profile(dob: &str, gender: &str) -> Profile {
        Profile {
            id: 0,
            name: None,
            dob: Some(dob.to_string()),
            gender: Some(gender.to_string()),
        }
    }

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 2)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    fn sample_model() -> ReportModel {
        let requests = vec![
            request("Paracetamol", "Headache", "Male"),
            request("Paracetamol", "Fever", "Female"),
            request("Ibuprofen", "Back Pain", "Male"),
            request("Antacid", "Heartburn", "Male"),
            request("Paracetamol", "Headache", "Male"),
        ];
        let profiles = vec![
            profile("1995-01-01", "Male"),
            profile("1980-01-01", "Female"),
        ];
        ReportModel::build(
            ReportPeriod::new(5, 2024).unwrap(),
            &requests,
            &profiles,
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
        )
    }

    /// Data rows of a section: lines after its header row, up to the blank line
    fn section_rows<'a>(content: &'a str, title: &str) -> Vec<&'a str> {
        let lines: Vec<&str> = content.split("\r\n").collect();
        let start = lines.iter().position(|l| *l == title).unwrap();
        lines[start + 2..]
            .iter()
            .take_while(|l| !l.is_empty())
            .copied()
            .collect()
    }

    #[test]
    fn test_filename() {
        assert_eq!(csv_filename(&sample_model()), "Medical_Reports_June_2024.csv");
    }

    #[test]
    fn test_layout() {
        let export = render_csv(&sample_model(), generated_at());
        let expected = "Medical Reports for the Month of June 2024\r\n\
            Generated on: 7/2/2024\r\n\
            \r\n\
            MEDICINE DISTRIBUTION\r\n\
            Medicine Name,Count\r\n\
            Paracetamol,3\r\n\
            Ibuprofen,1\r\n\
            Antacid,1\r\n\
            Total Medicines Distributed,5\r\n\
            \r\n\
            HEALTH COMPLAINTS BY GENDER\r\n\
            Male Complaints,Count,Female Complaints,Count\r\n\
            Headache,2,Fever,1\r\n\
            Back Pain,1,,\r\n\
            Heartburn,1,,\r\n\
            Total Male Complaints,4,Total Female Complaints,1\r\n\
            \r\n\
            AGE DISTRIBUTION BY GENDER\r\n\
            Male Age Range,Count,Female Age Range,Count\r\n\
            18-25,0,18-25,0\r\n\
            26-35,1,26-35,0\r\n\
            36-45,0,36-45,1\r\n\
            46-55,0,46-55,0\r\n\
            55+,0,55+,0\r\n\
            Total Males,1,Total Females,1\r\n\
            \r\n\
            SUMMARY\r\n\
            Category,Count\r\n\
            Total Male Patients,1\r\n\
            Total Female Patients,1\r\n\
            Total Patients,2\r\n\
            Total Medicines Distributed,5\r\n\
            Total Health Complaints,5\r\n\
            \r\n";
        assert_eq!(export.content, expected);
    }

    #[test]
    fn test_medicine_total_matches_column_sum() {
        let export = render_csv(&sample_model(), generated_at());
        let rows = section_rows(&export.content, "MEDICINE DISTRIBUTION");
        let (total_row, data_rows) = rows.split_last().unwrap();

        let sum: u64 = data_rows
            .iter()
            .map(|r| r.rsplit(',').next().unwrap().parse::<u64>().unwrap())
            .sum();
        assert_eq!(*total_row, format!("Total Medicines Distributed,{}", sum));
    }

    #[test]
    fn test_complaint_padding_uses_blank_cells() {
        let requests = vec![
            request("A", "Cough", "Male"),
            request("A", "Cough", "Male"),
            request("A", "Cough", "Male"),
            request("A", "Fever", "Male"),
            request("A", "Fever", "Male"),
            request("A", "Rash", "Male"),
            request("A", "Migraine", "Female"),
        ];
        let model = ReportModel::build(
            ReportPeriod::new(5, 2024).unwrap(),
            &requests,
            &[],
            NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
        );

        let export = render_csv(&model, generated_at());
        let rows = section_rows(&export.content, "HEALTH COMPLAINTS BY GENDER");

        assert_eq!(rows.len(), 4); // three data rows plus totals
        assert_eq!(rows[0], "Cough,3,Migraine,1");
        assert_eq!(rows[1], "Fever,2,,");
        assert_eq!(rows[2], "Rash,1,,");
    }

    #[test]
    fn test_age_section_always_five_rows() {
        let model = ReportModel::build(
            ReportPeriod::new(0, 2025).unwrap(),
            &[],
            &[],
            NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
        );
        let export = render_csv(&model, generated_at());
        let rows = section_rows(&export.content, "AGE DISTRIBUTION BY GENDER");
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[5], "Total Males,0,Total Females,0");
    }

    fn data_sum(rows: &[&str], column: usize) -> u64 {
        rows.iter()
            .filter_map(|r| r.split(',').nth(column))
            .filter(|cell| !cell.is_empty())
            .map(|cell| cell.parse::<u64>().unwrap())
            .sum()
    }

    fn arb_request() -> impl Strategy<Value = DispenseRequest> {
        (
            prop::option::of(prop::sample::select(vec!["Antacid", "Ibuprofen", "Paracetamol", "Zinc"])),
            prop::option::of(prop::sample::select(vec!["Cough", "Fever", "Headache"])),
            prop::option::of(prop::sample::select(vec!["Male", "Female"])),
        )
            .prop_map(|(medicine, complaint, gender)| DispenseRequest {
                id: 0,
                medicine: medicine.map(str::to_string),
                complaint: complaint.map(str::to_string),
                gender: gender.map(str::to_string),
                date_visit: "2024-06-10T10:00:00".to_string(),
            })
    }

    proptest! {
        #[test]
        fn prop_total_rows_match_column_sums(requests in prop::collection::vec(arb_request(), 0..50)) {
            let model = ReportModel::build(
                ReportPeriod::new(5, 2024).unwrap(),
                &requests,
                &[],
                NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            );
            let export = render_csv(&model, generated_at());

            let rows = section_rows(&export.content, "MEDICINE DISTRIBUTION");
            let (total_row, data_rows) = rows.split_last().unwrap();
            prop_assert_eq!(
                total_row.to_string(),
                format!("Total Medicines Distributed,{}", data_sum(data_rows, 1))
            );

            let rows = section_rows(&export.content, "HEALTH COMPLAINTS BY GENDER");
            let (total_row, data_rows) = rows.split_last().unwrap();
            prop_assert_eq!(
                total_row.to_string(),
                format!(
                    "Total Male Complaints,{},Total Female Complaints,{}",
                    data_sum(data_rows, 1),
                    data_sum(data_rows, 3)
                )
            );
        }
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let model = sample_model();
        let first = render_csv(&model, generated_at());
        let second = render_csv(&model, generated_at());
        assert_eq!(first.as_bytes(), second.as_bytes());
    }
}
