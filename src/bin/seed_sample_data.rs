//! Utility to seed the clinic database with sample requests and profiles
//!
//! Inserts a month of medicine requests (dated in the current month) and a
//! set of employee profiles spanning every age bracket. A few records are
//! deliberately incomplete so the exclusion tally has something to show.

use chrono::{Datelike, Local, NaiveDate};

use clinic_reports::config::ReportsConfig;
use clinic_reports::db::Database;
use clinic_reports::models::{DispenseRequest, DispenseRequestCreate, Profile, ProfileCreate};

/// (day of month, medicine, complaint, gender)
const SAMPLE_REQUESTS: &[(u32, Option<&str>, Option<&str>, Option<&str>)] = &[
    (1, Some("Paracetamol"), Some("Headache"), Some("Male")),
    (2, Some("Paracetamol"), Some("Fever"), Some("Female")),
    (3, Some("Ibuprofen"), Some("Headache"), Some("Male")),
    (5, Some("Antacid"), Some("Heartburn"), Some("Female")),
    (6, Some("Cetirizine"), Some("Allergy"), Some("Female")),
    (8, Some("Paracetamol"), Some("Toothache"), Some("Male")),
    (9, Some("Loperamide"), Some("Diarrhea"), Some("Male")),
    (12, Some("Ibuprofen"), Some("Back Pain"), Some("Male")),
    (14, Some("Mefenamic Acid"), Some("Dysmenorrhea"), Some("Female")),
    (15, Some("Paracetamol"), Some("Fever"), Some("Male")),
    (17, Some("Cetirizine"), Some("Allergy"), Some("Male")),
    (19, Some("Antacid"), None, Some("Male")),
    (20, None, Some("Dizziness"), Some("Female")),
    (22, Some("Paracetamol"), Some("Headache"), None),
    (25, Some("Ibuprofen"), Some("Back Pain"), Some("Female")),
    (27, Some("Paracetamol"), Some("Headache"), Some("Female")),
    (28, Some("Lozenges"), Some("Sore Throat"), Some("Male")),
];

/// (name, age in years, gender)
const SAMPLE_PROFILES: &[(&str, Option<i32>, Option<&str>)] = &[
    ("Ana Reyes", Some(22), Some("Female")),
    ("Ben Cruz", Some(24), Some("Male")),
    ("Carla Santos", Some(31), Some("Female")),
    ("Dan Flores", Some(29), Some("Male")),
    ("Ella Ramos", Some(40), Some("Female")),
    ("Felix Garcia", Some(44), Some("Male")),
    ("Gina Mendoza", Some(52), Some("Female")),
    ("Hugo Torres", Some(49), Some("Male")),
    ("Iris Navarro", Some(60), Some("Female")),
    ("Jon Castillo", Some(58), Some("Male")),
    ("Kim Aquino", Some(17), Some("Female")),
    ("Leo Bautista", None, Some("Male")),
    ("Mia Villanueva", Some(35), None),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ReportsConfig::from_env();
    println!("Database path: {}", config.database_path.display());

    let database = Database::open(&config.database_path)?;
    let today = Local::now().date_naive();

    database.with_conn(|conn| {
        let mut inserted = 0;
        for &(day, medicine, complaint, gender) in SAMPLE_REQUESTS {
            let date_visit = NaiveDate::from_ymd_opt(today.year(), today.month(), day)
                .and_then(|d| d.and_hms_opt(9 + day % 8, 30, 0));
            let Some(date_visit) = date_visit else {
                continue;
            };
            DispenseRequest::create(
                conn,
                &DispenseRequestCreate {
                    medicine: medicine.map(str::to_string),
                    complaint: complaint.map(str::to_string),
                    gender: gender.map(str::to_string),
                    date_visit: Some(date_visit),
                },
            )?;
            inserted += 1;
        }
        println!("Inserted {} medicine requests for {}", inserted, today.format("%B %Y"));
        Ok(())
    })?;

    database.with_conn(|conn| {
        for &(name, age, gender) in SAMPLE_PROFILES {
            let dob = age.and_then(|years| NaiveDate::from_ymd_opt(today.year() - years, 1, 15));
            let profile = Profile::create(
                conn,
                &ProfileCreate {
                    name: Some(name.to_string()),
                    dob,
                    gender: gender.map(str::to_string),
                },
            )?;
            println!(
                "  Profile #{}: {} (dob: {})",
                profile.id,
                name,
                profile.dob.as_deref().unwrap_or("-")
            );
        }
        println!("Inserted {} profiles", SAMPLE_PROFILES.len());
        Ok(())
    })?;

    Ok(())
}
