//! Age bracket classification
//!
//! Profiles are bucketed per gender into five fixed age ranges. Ages are
//! whole calendar years as of an explicit reference date; subjects under 18
//! fall into no bracket and are dropped.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::intake::{self, Gender, SkipReason};
use crate::models::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AgeBracket {
    #[serde(rename = "18-25")]
    From18To25,
    #[serde(rename = "26-35")]
    From26To35,
    #[serde(rename = "36-45")]
    From36To45,
    #[serde(rename = "46-55")]
    From46To55,
    #[serde(rename = "55+")]
    Over55,
}

impl AgeBracket {
    /// All brackets in ascending order
    pub const ALL: [AgeBracket; 5] = [
        AgeBracket::From18To25,
        AgeBracket::From26To35,
        AgeBracket::From36To45,
        AgeBracket::From46To55,
        AgeBracket::Over55,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AgeBracket::From18To25 => "18-25",
            AgeBracket::From26To35 => "26-35",
            AgeBracket::From36To45 => "36-45",
            AgeBracket::From46To55 => "46-55",
            AgeBracket::Over55 => "55+",
        }
    }

    /// 18–25 inclusive, then (25, 35], (35, 45], (45, 55] and above 55.
    /// Under 18 has no bracket.
    pub fn for_age(age: i32) -> Option<Self> {
        match age {
            18..=25 => Some(AgeBracket::From18To25),
            26..=35 => Some(AgeBracket::From26To35),
            36..=45 => Some(AgeBracket::From36To45),
            46..=55 => Some(AgeBracket::From46To55),
            a if a > 55 => Some(AgeBracket::Over55),
            _ => None,
        }
    }

    fn index(&self) -> usize {
        match self {
            AgeBracket::From18To25 => 0,
            AgeBracket::From26To35 => 1,
            AgeBracket::From36To45 => 2,
            AgeBracket::From46To55 => 3,
            AgeBracket::Over55 => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeBracketCount {
    pub bracket: AgeBracket,
    pub count: u64,
    pub gender: Gender,
}

/// Profiles left out of the age distribution, by reason
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileExclusions {
    pub missing_date_of_birth: u64,
    pub unparseable_date_of_birth: u64,
    pub missing_gender: u64,
    pub unrecognized_gender: u64,
    pub under_18: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgeDistribution {
    pub male: [AgeBracketCount; 5],
    pub female: [AgeBracketCount; 5],
    pub excluded: ProfileExclusions,
}

/// Age in whole years on `today`: the year difference, less one if this
/// year's birthday has not been reached yet.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - dob.year();
    if today.month() < dob.month() || (today.month() == dob.month() && today.day() < dob.day()) {
        age -= 1;
    }
    age
}

fn empty_table(gender: Gender) -> [AgeBracketCount; 5] {
    AgeBracket::ALL.map(|bracket| AgeBracketCount {
        bracket,
        count: 0,
        gender,
    })
}

/// Classify every profile relative to `today`
pub fn classify_profiles(profiles: &[Profile], today: NaiveDate) -> AgeDistribution {
    let mut male = empty_table(Gender::Male);
    let mut female = empty_table(Gender::Female);
    let mut excluded = ProfileExclusions::default();

    for profile in profiles {
        let subject = match intake::subject_of(profile) {
            Ok(subject) => subject,
            Err(reason) => {
                tracing::debug!(profile_id = profile.id, ?reason, "Profile skipped for age distribution");
                match reason {
                    SkipReason::MissingDateOfBirth => excluded.missing_date_of_birth += 1,
                    SkipReason::UnparseableDateOfBirth(_) => excluded.unparseable_date_of_birth += 1,
                    SkipReason::UnrecognizedGender(_) => excluded.unrecognized_gender += 1,
                    _ => excluded.missing_gender += 1,
                }
                continue;
            }
        };

        let age = age_on(subject.dob, today);
        let Some(bracket) = AgeBracket::for_age(age) else {
            excluded.under_18 += 1;
            continue;
        };

        let table = match subject.gender {
            Gender::Male => &mut male,
            Gender::Female => &mut female,
        };
        table[bracket.index()].count += 1;
    }

    AgeDistribution {
        male,
        female,
        excluded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn profile(dob: &str, gender: &str) -> Profile {
        Profile {
            id: 0,
            name: None,
            dob: Some(dob.to_string()),
            gender: Some(gender.to_string()),
        }
    }

    fn bracket_on(dob: NaiveDate, today: NaiveDate) -> Option<AgeBracket> {
        AgeBracket::for_age(age_on(dob, today))
    }

    #[test]
    fn test_birthday_boundaries() {
        let today = date(2024, 6, 15);

        assert_eq!(age_on(date(2006, 6, 15), today), 18);
        assert_eq!(bracket_on(date(2006, 6, 15), today), Some(AgeBracket::From18To25));

        assert_eq!(age_on(date(2006, 6, 16), today), 17);
        assert_eq!(bracket_on(date(2006, 6, 16), today), None);

        assert_eq!(age_on(date(1999, 6, 14), today), 25);
        assert_eq!(bracket_on(date(1999, 6, 14), today), Some(AgeBracket::From18To25));

        // Birthday tomorrow: still the younger age
        assert_eq!(age_on(date(1999, 6, 16), today), 24);
        assert_eq!(bracket_on(date(1999, 6, 16), today), Some(AgeBracket::From18To25));

        assert_eq!(age_on(date(1998, 6, 15), today), 26);
        assert_eq!(bracket_on(date(1998, 6, 15), today), Some(AgeBracket::From26To35));
    }

    #[test]
    fn test_earlier_month_counts_as_birthday_passed() {
        assert_eq!(age_on(date(2000, 1, 31), date(2024, 2, 1)), 24);
        assert_eq!(age_on(date(2000, 3, 1), date(2024, 2, 29)), 23);
    }

    #[test]
    fn test_bracket_edges() {
        assert_eq!(AgeBracket::for_age(17), None);
        assert_eq!(AgeBracket::for_age(25), Some(AgeBracket::From18To25));
        assert_eq!(AgeBracket::for_age(35), Some(AgeBracket::From26To35));
        assert_eq!(AgeBracket::for_age(36), Some(AgeBracket::From36To45));
        assert_eq!(AgeBracket::for_age(55), Some(AgeBracket::From46To55));
        assert_eq!(AgeBracket::for_age(56), Some(AgeBracket::Over55));
        assert_eq!(AgeBracket::for_age(90), Some(AgeBracket::Over55));
    }

    #[test]
    fn test_always_five_brackets() {
        let today = date(2024, 6, 15);
        let empty = classify_profiles(&[], today);
        assert_eq!(empty.male.len(), 5);
        assert!(empty.male.iter().chain(empty.female.iter()).all(|b| b.count == 0));

        let minors = vec![profile("2010-01-01", "Male"), profile("2012-05-05", "Female")];
        let result = classify_profiles(&minors, today);
        let labels: Vec<_> = result.female.iter().map(|b| b.bracket.label()).collect();
        assert_eq!(labels, vec!["18-25", "26-35", "36-45", "46-55", "55+"]);
        assert!(result.male.iter().chain(result.female.iter()).all(|b| b.count == 0));
        assert_eq!(result.excluded.under_18, 2);
    }

    #[test]
    fn test_classify_by_gender() {
        let today = date(2024, 6, 15);
        let profiles = vec![
            profile("2000-01-01", "Male"),
            profile("1990-01-01", "Male"),
            profile("1960-01-01", "Female"),
            profile("1980-01-01", "female"),
            Profile {
                id: 9,
                name: None,
                dob: None,
                gender: Some("Female".to_string()),
            },
        ];

        let result = classify_profiles(&profiles, today);

        let male: Vec<u64> = result.male.iter().map(|b| b.count).collect();
        let female: Vec<u64> = result.female.iter().map(|b| b.count).collect();
        assert_eq!(male, vec![1, 1, 0, 0, 0]);
        assert_eq!(female, vec![0, 0, 0, 0, 1]);
        assert!(result.female.iter().all(|b| b.gender == Gender::Female));
        assert_eq!(result.excluded.unrecognized_gender, 1);
        assert_eq!(result.excluded.missing_date_of_birth, 1);
    }
}
