//! Synthetic bulk CSV files for load testing.
//!
//! Rows are deterministic: the same count always produces the same file, and
//! the age mix is roughly 10% under 20, 40% in 20..=39, 30% in 41..=60 and 20% over 60.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info};

use crate::{
    error::IngestError,
    io_utils,
    parser::DEFAULT_DELIMITER,
};

pub const MAX_GENERATED_RECORDS: usize = 1_000_000;
const PROGRESS_EVERY: usize = 1000;

pub const GENERATED_HEADERS: [&str; 8] = [
    "name.firstName",
    "name.lastName",
    "age",
    "address.line1",
    "address.line2",
    "address.city",
    "address.state",
    "gender",
];

const FIRST_NAMES: [&str; 20] = [
    "Rohit", "Priya", "Amit", "Sneha", "Rajesh", "Anita", "Vikas", "Kavita", "Suresh", "Deepa",
    "Rahul", "Pooja", "Vikram", "Neha", "Arjun", "Simran", "Karan", "Riya", "Aditya", "Divya",
];

const LAST_NAMES: [&str; 20] = [
    "Prasad", "Sharma", "Kumar", "Patel", "Singh", "Verma", "Mehta", "Reddy", "Nair", "Joshi",
    "Gupta", "Iyer", "Desai", "Malhotra", "Kulkarni", "Rao", "Agarwal", "Chopra", "Bose",
    "Trivedi",
];

const ADDRESSES: [[&str; 4]; 10] = [
    ["A-563 Rakshak Society", "New Pune Road", "Pune", "Maharashtra"],
    ["B-101 Green Park", "Link Road", "Mumbai", "Maharashtra"],
    ["C-45 Sector 12", "Main Street", "Delhi", "Delhi"],
    ["D-789 Heritage Villa", "MG Road", "Bangalore", "Karnataka"],
    ["E-234 Sunset Apartments", "Beach Road", "Chennai", "Tamil Nadu"],
    ["F-567 Golden Heights", "Ring Road", "Hyderabad", "Telangana"],
    ["G-890 Silver Oak", "Station Road", "Jaipur", "Rajasthan"],
    ["H-123 Rose Garden", "Park Street", "Kolkata", "West Bengal"],
    ["I-456 Palm Grove", "Lake Road", "Kochi", "Kerala"],
    ["J-789 Maple Court", "Hill Road", "Shimla", "Himachal Pradesh"],
];

const GENDERS: [&str; 2] = ["male", "female"];

/// Field values for generated row `index`, in [`GENERATED_HEADERS`] order.
pub fn generated_row(index: usize) -> [String; 8] {
    let first = FIRST_NAMES[index % FIRST_NAMES.len()];
    let last = LAST_NAMES[(index / FIRST_NAMES.len()) % LAST_NAMES.len()];
    let [line1, line2, city, state] = ADDRESSES[index % ADDRESSES.len()];
    let gender = GENDERS[index % GENDERS.len()];
    [
        first.to_string(),
        last.to_string(),
        generated_age(index).to_string(),
        line1.to_string(),
        line2.to_string(),
        city.to_string(),
        state.to_string(),
        gender.to_string(),
    ]
}

pub fn generated_age(index: usize) -> u32 {
    let (base, width) = match index % 10 {
        0 => (12, 8),
        1..=4 => (20, 20),
        5..=7 => (41, 20),
        _ => (61, 20),
    };
    let spread = (index / 10).wrapping_mul(7) + index;
    base + (spread % width) as u32
}

pub fn default_output_path(count: usize) -> PathBuf {
    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S");
    PathBuf::from("uploads").join(format!("bulk_{count}_{timestamp}.csv"))
}

pub fn generate_csv(path: &Path, count: usize) -> Result<usize> {
    if count == 0 || count > MAX_GENERATED_RECORDS {
        return Err(IngestError::invalid_option(format!(
            "record count must be between 1 and {MAX_GENERATED_RECORDS}, got {count}"
        ))
        .into());
    }
    info!("Generating CSV with {count} records at {path:?}");
    let mut writer = io_utils::open_csv_writer(path, DEFAULT_DELIMITER)?;
    writer
        .write_record(GENERATED_HEADERS)
        .context("Writing header row")?;
    for index in 0..count {
        writer
            .write_record(generated_row(index))
            .with_context(|| format!("Writing generated row {}", index + 1))?;
        if (index + 1) % PROGRESS_EVERY == 0 {
            debug!("Generated {} / {count} records", index + 1);
        }
    }
    writer.flush().context("Flushing generated CSV")?;
    info!("Generated {count} records at {path:?}");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{AgeBucket, AgeDistribution};

    #[test]
    fn generated_ages_follow_the_group_mix() {
        let ages = (0..1000)
            .map(|i| generated_age(i) as i64)
            .collect::<Vec<_>>();
        let dist = AgeDistribution::from_ages(&ages).unwrap();
        assert_eq!(dist.count(AgeBucket::UnderTwenty), 100);
        assert_eq!(dist.count(AgeBucket::TwentyToForty), 400);
        assert_eq!(dist.count(AgeBucket::FortyToSixty), 300);
        assert_eq!(dist.count(AgeBucket::OverSixty), 200);
    }

    #[test]
    fn generated_rows_are_deterministic() {
        assert_eq!(generated_row(0)[0], "Rohit");
        assert_eq!(generated_row(0)[1], "Prasad");
        assert_eq!(generated_row(21)[1], "Sharma");
        assert_eq!(generated_row(7), generated_row(7));
    }

    #[test]
    fn count_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bulk.csv");
        assert!(generate_csv(&path, 0).is_err());
        assert!(generate_csv(&path, MAX_GENERATED_RECORDS + 1).is_err());
        assert!(!path.exists());
    }
}
