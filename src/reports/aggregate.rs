//! Medicine and complaint aggregation
//!
//! Counts dispense requests by medicine name and by (gender, complaint).
//! Output sequences are sorted by count descending; equal counts keep the
//! order in which their key was first seen.

use std::collections::HashMap;

use serde::Serialize;

use super::intake::{self, Gender};
use crate::models::DispenseRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MedicineCount {
    pub medicine_name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplaintCount {
    pub complaint: String,
    pub count: u64,
}

/// Requests that contributed to some buckets but not others
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestExclusions {
    pub without_medicine: u64,
    pub without_complaint: u64,
    pub missing_gender: u64,
    pub unrecognized_gender: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestAggregates {
    pub medicines: Vec<MedicineCount>,
    pub male_complaints: Vec<ComplaintCount>,
    pub female_complaints: Vec<ComplaintCount>,
    pub excluded: RequestExclusions,
}

/// Running counts keyed by name, remembering first-seen order
#[derive(Debug, Default)]
struct OrderedCounter {
    positions: HashMap<String, usize>,
    entries: Vec<(String, u64)>,
}

impl OrderedCounter {
    fn increment(&mut self, key: &str) {
        match self.positions.get(key) {
            Some(&idx) => self.entries[idx].1 += 1,
            None => {
                self.positions.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), 1));
            }
        }
    }

    /// Entries by count descending; `sort_by` is stable so ties stay in encounter order
    fn into_sorted(self) -> Vec<(String, u64)> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

/// Aggregate one period's dispense requests
pub fn aggregate_requests(requests: &[DispenseRequest]) -> RequestAggregates {
    let mut medicines = OrderedCounter::default();
    let mut male = OrderedCounter::default();
    let mut female = OrderedCounter::default();
    let mut excluded = RequestExclusions::default();

    for request in requests {
        match intake::medicine_of(request) {
            Ok(name) => medicines.increment(name),
            Err(reason) => {
                tracing::debug!(request_id = request.id, ?reason, "Request skipped for medicine counts");
                excluded.without_medicine += 1;
            }
        }

        match intake::complaint_of(request) {
            Ok(entry) => match entry.gender {
                Gender::Male => male.increment(entry.complaint),
                Gender::Female => female.increment(entry.complaint),
            },
            Err(reason) => {
                tracing::debug!(request_id = request.id, ?reason, "Request skipped for complaint counts");
                match reason {
                    intake::SkipReason::MissingGender => excluded.missing_gender += 1,
                    intake::SkipReason::UnrecognizedGender(_) => excluded.unrecognized_gender += 1,
                    _ => excluded.without_complaint += 1,
                }
            }
        }
    }

    let to_complaints = |counter: OrderedCounter| {
        counter
            .into_sorted()
            .into_iter()
            .map(|(complaint, count)| ComplaintCount { complaint, count })
            .collect::<Vec<_>>()
    };

    RequestAggregates {
        medicines: medicines
            .into_sorted()
            .into_iter()
            .map(|(medicine_name, count)| MedicineCount { medicine_name, count })
            .collect(),
        male_complaints: to_complaints(male),
        female_complaints: to_complaints(female),
        excluded,
    }
}
