//! Report model
//!
//! The aggregate both exporters render from. Fields are read-only once
//! built; a new selection builds a new model.

use chrono::NaiveDate;
use serde::Serialize;

use super::aggregate::{self, ComplaintCount, MedicineCount, RequestExclusions};
use super::age::{self, AgeBracketCount, ProfileExclusions};
use super::period::ReportPeriod;
use crate::models::{DispenseRequest, Profile};

/// Records that were left out of one or more buckets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExclusionSummary {
    pub requests: RequestExclusions,
    pub profiles: ProfileExclusions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportModel {
    period: ReportPeriod,
    /// Reference date ages were computed against
    as_of: NaiveDate,
    medicines: Vec<MedicineCount>,
    male_complaints: Vec<ComplaintCount>,
    female_complaints: Vec<ComplaintCount>,
    male_age_brackets: [AgeBracketCount; 5],
    female_age_brackets: [AgeBracketCount; 5],
    excluded: ExclusionSummary,
}

/// Derived totals shared by the CSV summary and the print executive summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportTotals {
    pub medicines_distributed: u64,
    pub male_complaints: u64,
    pub female_complaints: u64,
    pub total_complaints: u64,
    pub male_subjects: u64,
    pub female_subjects: u64,
    pub total_subjects: u64,
}

impl ReportModel {
    /// Build a model from one period's requests and the full profile list
    pub fn build(
        period: ReportPeriod,
        requests: &[DispenseRequest],
        profiles: &[Profile],
        today: NaiveDate,
    ) -> Self {
        let requests_agg = aggregate::aggregate_requests(requests);
        let ages = age::classify_profiles(profiles, today);

        Self {
            period,
            as_of: today,
            medicines: requests_agg.medicines,
            male_complaints: requests_agg.male_complaints,
            female_complaints: requests_agg.female_complaints,
            male_age_brackets: ages.male,
            female_age_brackets: ages.female,
            excluded: ExclusionSummary {
                requests: requests_agg.excluded,
                profiles: ages.excluded,
            },
        }
    }

    pub fn period(&self) -> ReportPeriod {
        self.period
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    pub fn medicines(&self) -> &[MedicineCount] {
        &self.medicines
    }

    pub fn male_complaints(&self) -> &[ComplaintCount] {
        &self.male_complaints
    }

    pub fn female_complaints(&self) -> &[ComplaintCount] {
        &self.female_complaints
    }

    pub fn male_age_brackets(&self) -> &[AgeBracketCount; 5] {
        &self.male_age_brackets
    }

    pub fn female_age_brackets(&self) -> &[AgeBracketCount; 5] {
        &self.female_age_brackets
    }

    pub fn excluded(&self) -> &ExclusionSummary {
        &self.excluded
    }

    pub fn totals(&self) -> ReportTotals {
        let medicines_distributed = self.medicines.iter().map(|m| m.count).sum();
        let male_complaints = self.male_complaints.iter().map(|c| c.count).sum();
        let female_complaints = self.female_complaints.iter().map(|c| c.count).sum();
        let male_subjects = self.male_age_brackets.iter().map(|b| b.count).sum();
        let female_subjects = self.female_age_brackets.iter().map(|b| b.count).sum();

        ReportTotals {
            medicines_distributed,
            male_complaints,
            female_complaints,
            total_complaints: male_complaints + female_complaints,
            male_subjects,
            female_subjects,
            total_subjects: male_subjects + female_subjects,
        }
    }

    /// The on-screen rendering of this model
    pub fn summary(&self) -> ReportSummary<'_> {
        ReportSummary {
            period: self.period.label(),
            as_of: self.as_of.format("%Y-%m-%d").to_string(),
            totals: self.totals(),
            medicines: &self.medicines,
            male_complaints: &self.male_complaints,
            female_complaints: &self.female_complaints,
            male_age_brackets: &self.male_age_brackets,
            female_age_brackets: &self.female_age_brackets,
            excluded: &self.excluded,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportSummary<'a> {
    pub period: String,
    pub as_of: String,
    pub totals: ReportTotals,
    pub medicines: &'a [MedicineCount],
    pub male_complaints: &'a [ComplaintCount],
    pub female_complaints: &'a [ComplaintCount],
    pub male_age_brackets: &'a [AgeBracketCount],
    pub female_age_brackets: &'a [AgeBracketCount],
    pub excluded: &'a ExclusionSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_totals() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let requests = vec![
            request("Paracetamol", "Headache", "Male"),
            request("Paracetamol", "Fever", "Female"),
            request("Ibuprofen", "Headache", "Male"),
        ];
        let profiles = vec![
            profile("1990-01-01", "Male"),
            profile("1985-01-01", "Female"),
            profile("1970-01-01", "Female"),
            profile("2010-01-01", "Female"),
        ];

        let model = ReportModel::build(
            ReportPeriod::new(5, 2024).unwrap(),
            &requests,
            &profiles,
            today,
        );
        let totals = model.totals();

        assert_eq!(totals.medicines_distributed, 3);
        assert_eq!(totals.male_complaints, 2);
        assert_eq!(totals.female_complaints, 1);
        assert_eq!(totals.total_complaints, 3);
        assert_eq!(totals.male_subjects, 1);
        assert_eq!(totals.female_subjects, 2);
        assert_eq!(totals.total_subjects, 3);
        assert_eq!(model.excluded().profiles.under_18, 1);
    }

    #[test]
    fn test_accessors_expose_built_values() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let requests = vec![request("Zinc", "Cough", "Female")];
        let profiles = vec![profile("1960-03-01", "Male")];
        let model = ReportModel::build(ReportPeriod::new(5, 2024).unwrap(), &requests, &profiles, today);

        assert_eq!(model.period(), ReportPeriod::new(5, 2024).unwrap());
        assert_eq!(model.as_of(), today);
        assert_eq!(model.medicines()[0].medicine_name, "Zinc");
        assert!(model.male_complaints().is_empty());
        assert_eq!(model.female_complaints()[0].complaint, "Cough");
        assert_eq!(model.male_age_brackets()[4].count, 1);
        assert!(model.female_age_brackets().iter().all(|b| b.count == 0));
        assert_eq!(model.excluded().profiles.under_18, 0);
    }

    #[test]
    fn test_summary_serializes_bracket_labels() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let model = ReportModel::build(ReportPeriod::new(5, 2024).unwrap(), &[], &[], today);

        let json = serde_json::to_value(model.summary()).unwrap();
        assert_eq!(json["period"], "June 2024");
        assert_eq!(json["male_age_brackets"][4]["bracket"], "55+");
        assert_eq!(json["female_age_brackets"][0]["gender"], "Female");
        assert_eq!(json["totals"]["total_subjects"], 0);
    }
}
