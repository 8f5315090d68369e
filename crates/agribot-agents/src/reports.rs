//! In-memory disease report store.
//!
//! Process-wide and append-only: one store is created at startup and shared
//! by reference across sessions. Submissions combine with a small seed
//! dataset of historical reports to form the context for alert prompts.
//! No deduplication, no expiry.

use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use agribot_core::types::DiseaseReport;

/// Append-only collection of disease reports.
pub struct ReportStore {
    reports: Mutex<Vec<DiseaseReport>>,
}

impl ReportStore {
    /// Create a store seeded with the historical records.
    pub fn new() -> Self {
        Self {
            reports: Mutex::new(seed_reports()),
        }
    }

    /// Create an unseeded store.
    pub fn empty() -> Self {
        Self {
            reports: Mutex::new(Vec::new()),
        }
    }

    /// Append a report. Fields are stored lowercased.
    pub fn submit(&self, report: DiseaseReport) {
        let report = DiseaseReport {
            crop: report.crop.to_lowercase(),
            disease: report.disease.to_lowercase(),
            location: report.location.to_lowercase(),
            report_date: report.report_date,
        };
        self.lock().push(report);
    }

    /// All reports (seed + submissions) in insertion order.
    pub fn all(&self) -> Vec<DiseaseReport> {
        self.lock().clone()
    }

    /// Reports whose crop or location matches, case-insensitively.
    pub fn matching(&self, crop: &str, location: &str) -> Vec<DiseaseReport> {
        let crop = crop.to_lowercase();
        let location = location.to_lowercase();
        self.lock()
            .iter()
            .filter(|r| r.crop == crop || r.location == location)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // The list is append-only, so a poisoned lock still holds usable data.
    fn lock(&self) -> MutexGuard<'_, Vec<DiseaseReport>> {
        self.reports.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ReportStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixed historical seed dataset.
fn seed_reports() -> Vec<DiseaseReport> {
    vec![
        DiseaseReport {
            crop: "wheat".to_string(),
            disease: "rust".to_string(),
            location: "udaipur".to_string(),
            report_date: NaiveDate::from_ymd_opt(2025, 7, 31).expect("valid seed date"),
        },
        DiseaseReport {
            crop: "rice".to_string(),
            disease: "false smut".to_string(),
            location: "jaipur".to_string(),
            report_date: NaiveDate::from_ymd_opt(2025, 7, 30).expect("valid seed date"),
        },
    ]
}
