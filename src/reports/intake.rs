//! Record intake
//!
//! Raw records are accepted leniently: a record missing a field only loses
//! its contribution to the buckets that need that field. Each check here
//! returns either the typed value a bucket needs or the reason it was skipped.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{DispenseRequest, Profile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Exact, case-sensitive match on the stored value
    pub fn from_exact(s: &str) -> Option<Self> {
        match s {
            "Male" => Some(Gender::Male),
            "Female" => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingMedicine,
    MissingComplaint,
    MissingGender,
    UnrecognizedGender(String),
    MissingDateOfBirth,
    UnparseableDateOfBirth(String),
}

/// A complaint attributable to one of the two reported genders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenderedComplaint<'a> {
    pub gender: Gender,
    pub complaint: &'a str,
}

/// A profile that can be placed in an age bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
    pub gender: Gender,
    pub dob: NaiveDate,
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

fn gender_of(field: &Option<String>) -> Result<Gender, SkipReason> {
    let raw = present(field).ok_or(SkipReason::MissingGender)?;
    Gender::from_exact(raw).ok_or_else(|| SkipReason::UnrecognizedGender(raw.to_string()))
}

/// Medicine name counted for this request
pub fn medicine_of(request: &DispenseRequest) -> Result<&str, SkipReason> {
    present(&request.medicine).ok_or(SkipReason::MissingMedicine)
}

/// Complaint and gender counted for this request
pub fn complaint_of(request: &DispenseRequest) -> Result<GenderedComplaint<'_>, SkipReason> {
    let complaint = present(&request.complaint).ok_or(SkipReason::MissingComplaint)?;
    let gender = gender_of(&request.gender)?;
    Ok(GenderedComplaint { gender, complaint })
}

/// Gender and date of birth for age classification
pub fn subject_of(profile: &Profile) -> Result<Subject, SkipReason> {
    let raw_dob = present(&profile.dob).ok_or(SkipReason::MissingDateOfBirth)?;
    let gender = gender_of(&profile.gender)?;
    let dob = parse_dob(raw_dob)
        .ok_or_else(|| SkipReason::UnparseableDateOfBirth(raw_dob.to_string()))?;
    Ok(Subject { gender, dob })
}

/// Accepts a bare date or a date followed by a time component
fn parse_dob(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}
