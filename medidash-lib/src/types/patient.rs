use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A stored patient record as returned by the remote collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    /// Identifier assigned by the store
    #[serde(rename = "_id")]
    pub id: String,
    /// Full name
    pub name: String,
    /// Age in years
    pub age: u32,
    /// Gender as entered at admission
    pub gender: String,
    /// Reported symptoms
    #[serde(default)]
    pub symptoms: Vec<String>,
    /// Relevant medical history
    #[serde(default)]
    pub history: Vec<String>,
    /// Blood pressure, e.g. `120/80`
    #[serde(default)]
    pub bp: String,
    /// Body temperature as entered
    #[serde(default)]
    pub temperature: String,
    /// Heart rate as entered
    #[serde(default)]
    pub heart_rate: String,
    /// Admission time (UTC)
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Payload for registering a new patient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPatient {
    /// Full name
    pub name: String,
    /// Age in years
    pub age: u32,
    /// Gender
    pub gender: String,
    /// Reported symptoms
    #[serde(default)]
    pub symptoms: Vec<String>,
    /// Relevant medical history
    #[serde(default)]
    pub history: Vec<String>,
    /// Blood pressure, e.g. `120/80`
    #[serde(default)]
    pub bp: String,
    /// Body temperature
    #[serde(default)]
    pub temperature: String,
    /// Heart rate
    #[serde(default)]
    pub heart_rate: String,
}

/// Recommendation computed by the remote analysis agent for one admission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Patient this recommendation belongs to (only present in history records)
    #[serde(default)]
    pub patient_id: Option<String>,
    /// Patient name (only present in history records)
    #[serde(default)]
    pub patient_name: Option<String>,
    /// Most likely condition
    pub possible_condition: String,
    /// Tests the agent suggests ordering
    #[serde(default)]
    pub suggested_tests: Vec<String>,
    /// Dosage guidance
    #[serde(default)]
    pub dosage_recommendation: String,
    /// Precautions for the patient
    #[serde(default)]
    pub precautionary_measures: Vec<String>,
    /// Free-text summary of the analysis
    #[serde(default)]
    pub ai_analysis_summary: String,
    /// When the analysis was stored
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
}

/// One page of the remote collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientPage {
    /// Patients on this page, newest admission first
    pub patients: Vec<Patient>,
    /// Number of records matching the query across all pages
    pub total: u64,
    /// Number of pages matching the query
    pub total_pages: u32,
}

/// Aggregate counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// All records
    pub total: u64,
    /// Male patients
    pub male: u64,
    /// Female patients
    pub female: u64,
    /// Patients with a systolic pressure above 140
    pub critical: u64,
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admission {
    /// Identifier of the newly stored record
    pub patient_id: String,
    /// Analysis computed for the admission
    #[serde(rename = "ai_recommendation")]
    pub recommendation: Recommendation,
}

/// A single patient together with its stored recommendation, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDetails {
    /// The patient record
    pub patient: Patient,
    /// The recommendation stored at admission time
    #[serde(default)]
    pub recommendation: Option<Recommendation>,
}
