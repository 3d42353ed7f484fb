use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::DatasetError;
use crate::models::StudentRecord;

/// Read access to the student table. Loaded once, never mutated.
pub trait DatasetStore {
    fn all(&self) -> &[StudentRecord];
}

#[derive(Debug, Clone)]
pub struct StaticDataset {
    records: Vec<StudentRecord>,
}

impl StaticDataset {
    pub fn new(records: Vec<StudentRecord>) -> Self {
        Self { records }
    }

    /// The built-in sample roster.
    pub fn seed() -> Self {
        let rows: [(&str, &str, &str, &str, bool, Option<f64>, (i32, u32, u32)); 10] = [
            ("Alice Smith", "8", "A", "North", true, Some(85.0), (2025, 7, 10)),
            ("Bob Johnson", "8", "A", "North", false, None, (2025, 7, 10)),
            ("Ethan Clarke", "8", "A", "North", true, Some(78.0), (2025, 7, 9)),
            ("Fatima Noor", "8", "A", "North", true, Some(92.0), (2025, 7, 3)),
            ("Grace Kim", "8", "B", "North", false, Some(64.0), (2025, 7, 11)),
            ("Charlie Brown", "9", "B", "South", true, Some(90.0), (2025, 7, 17)),
            ("Diana Wilson", "9", "B", "South", false, None, (2025, 7, 17)),
            ("Hugo Alvarez", "9", "B", "South", true, Some(71.0), (2025, 7, 15)),
            ("Ines Duarte", "9", "A", "South", false, Some(58.0), (2025, 7, 16)),
            ("Jonah Reed", "9", "B", "North", true, Some(88.0), (2025, 7, 8)),
        ];

        let records = rows
            .into_iter()
            .filter_map(|(name, grade, class, region, submitted, quiz_score, (y, m, d))| {
                Some(StudentRecord {
                    name: name.to_string(),
                    grade: grade.to_string(),
                    class: class.to_string(),
                    region: region.to_string(),
                    submitted,
                    quiz_score,
                    date: NaiveDate::from_ymd_opt(y, m, d)?,
                })
            })
            .collect();

        Self { records }
    }

    pub fn from_csv_path(path: &Path) -> Result<Self, DatasetError> {
        let file = std::fs::File::open(path).map_err(csv::Error::from)?;
        let dataset = Self::from_csv_reader(file)?;
        info!(
            path = %path.display(),
            records = dataset.records.len(),
            "loaded dataset from csv"
        );
        Ok(dataset)
    }

    pub fn from_csv_reader<R: Read>(input: R) -> Result<Self, DatasetError> {
        let mut reader = csv::Reader::from_reader(input);

        #[derive(serde::Deserialize)]
        struct CsvRow {
            name: String,
            grade: String,
            class: String,
            region: String,
            submitted: bool,
            quiz_score: Option<f64>,
            date: NaiveDate,
        }

        let mut records = Vec::new();

        for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
            let row = result?;
            let line = index + 1;

            for (field, value) in [
                ("name", &row.name),
                ("grade", &row.grade),
                ("class", &row.class),
                ("region", &row.region),
            ] {
                if value.trim().is_empty() {
                    return Err(DatasetError::MissingField { row: line, field });
                }
            }

            records.push(StudentRecord {
                name: row.name.trim().to_string(),
                grade: row.grade.trim().to_string(),
                class: row.class.trim().to_string(),
                region: row.region.trim().to_string(),
                submitted: row.submitted,
                quiz_score: row.quiz_score,
                date: row.date,
            });
        }

        debug!(records = records.len(), "parsed csv rows");
        Ok(Self { records })
    }
}

impl DatasetStore for StaticDataset {
    fn all(&self) -> &[StudentRecord] {
        &self.records
    }
}
