use std::fmt::Write;

use medidash_lib::{Patient, PatientDetails, Recommendation, Stats, VisibleState};

use super::color::{BOLD, BOLD_GREEN, DIM, GREEN, PINK, YELLOW, color};

/// Renders what the dashboard shows.
///
/// Implemented once for plain text and once with terminal colors; both
/// produce the same lines so scripts can rely on the layout.
pub(crate) trait DashboardFormatter: Send + Sync {
    /// The header line of a page, e.g. `Page 2 of 5 (43 records)`
    fn format_header(&self, state: &VisibleState) -> String;

    /// One line per patient on the page
    fn format_patient(&self, patient: &Patient) -> String;

    /// A one-line summary of the dashboard counters
    fn format_stats(&self, stats: &Stats) -> String;

    /// A recommendation, one field per line
    fn format_recommendation(&self, recommendation: &Recommendation) -> String;

    /// A passive notice that something did not work
    fn format_notice(&self, message: &str) -> String;

    /// The whole page
    fn format_page(&self, state: &VisibleState) -> String {
        let mut out = self.format_header(state);
        if state.results.is_empty() {
            out.push_str("\n  No patients found");
        }
        for patient in &state.results {
            out.push('\n');
            out.push_str(&self.format_patient(patient));
        }
        out
    }

    /// A patient and the recommendation stored for it
    fn format_details(&self, details: &PatientDetails) -> String {
        let mut out = self.format_patient(&details.patient);
        let patient = &details.patient;
        let _ = write!(
            out,
            "\n  BP {} | Temp {} | HR {}",
            or_dash(&patient.bp),
            or_dash(&patient.temperature),
            or_dash(&patient.heart_rate)
        );
        if !patient.history.is_empty() {
            let _ = write!(out, "\n  History: {}", patient.history.join(", "));
        }
        match &details.recommendation {
            Some(recommendation) => {
                out.push('\n');
                out.push_str(&self.format_recommendation(recommendation));
            }
            None => out.push_str("\n  No recommendation on file"),
        }
        out
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

fn list(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

/// Plain text without any color codes
pub(crate) struct PlainFormatter;

impl DashboardFormatter for PlainFormatter {
    fn format_header(&self, state: &VisibleState) -> String {
        format!(
            "Page {} of {} ({} records)",
            state.page,
            state.total_pages.max(1),
            state.total_count
        )
    }

    fn format_patient(&self, patient: &Patient) -> String {
        format!(
            "  {}  {}, {}, {}  [{}]",
            patient.id,
            patient.name,
            patient.age,
            patient.gender,
            patient.symptoms.join(", ")
        )
    }

    fn format_stats(&self, stats: &Stats) -> String {
        format!(
            "Total {} | Male {} | Female {} | Critical {}",
            stats.total, stats.male, stats.female, stats.critical
        )
    }

    fn format_recommendation(&self, r: &Recommendation) -> String {
        format!(
            "  Possible condition: {}\n  Suggested tests: {}\n  Dosage: {}\n  Precautions: {}\n  Summary: {}",
            or_dash(&r.possible_condition),
            list(&r.suggested_tests),
            or_dash(&r.dosage_recommendation),
            list(&r.precautionary_measures),
            or_dash(&r.ai_analysis_summary)
        )
    }

    fn format_notice(&self, message: &str) -> String {
        format!("[!] {message}")
    }
}

/// Colored output for terminals
pub(crate) struct ColorFormatter;

impl DashboardFormatter for ColorFormatter {
    fn format_header(&self, state: &VisibleState) -> String {
        let mut out = String::new();
        let _ = color!(
            out,
            BOLD_GREEN,
            "Page {} of {}",
            state.page,
            state.total_pages.max(1)
        );
        let _ = write!(out, " {}", DIM.apply_to(format!("({} records)", state.total_count)));
        out
    }

    fn format_patient(&self, patient: &Patient) -> String {
        let mut out = String::from("  ");
        let _ = color!(out, DIM, "{}", patient.id);
        let _ = write!(out, "  ");
        let _ = color!(out, BOLD, "{}", patient.name);
        let _ = write!(
            out,
            ", {}, {}  [{}]",
            patient.age,
            patient.gender,
            patient.symptoms.join(", ")
        );
        out
    }

    fn format_stats(&self, stats: &Stats) -> String {
        let mut out = String::new();
        let _ = color!(out, GREEN, "Total {}", stats.total);
        let _ = write!(out, " | Male {} | Female {} | ", stats.male, stats.female);
        let _ = color!(out, PINK, "Critical {}", stats.critical);
        out
    }

    fn format_recommendation(&self, r: &Recommendation) -> String {
        let label = |name: &str| BOLD.apply_to(format!("{name}:")).to_string();
        format!(
            "  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}",
            label("Possible condition"),
            or_dash(&r.possible_condition),
            label("Suggested tests"),
            list(&r.suggested_tests),
            label("Dosage"),
            or_dash(&r.dosage_recommendation),
            label("Precautions"),
            list(&r.precautionary_measures),
            label("Summary"),
            or_dash(&r.ai_analysis_summary)
        )
    }

    fn format_notice(&self, message: &str) -> String {
        YELLOW.apply_to(format!("[!] {message}")).to_string()
    }
}

#[cfg(test)]
mod tests {
    use medidash_lib::{Patient, PatientDetails, Recommendation, Stats, VisibleState};
    use pretty_assertions::assert_eq;

    use super::{ColorFormatter, DashboardFormatter, PlainFormatter};

    fn patient(id: &str, name: &str) -> Patient {
        serde_json::from_value(serde_json::json!({
            "_id": id,
            "name": name,
            "age": 47,
            "gender": "Female",
            "symptoms": ["fever", "cough"],
            "bp": "130/85"
        }))
        .unwrap()
    }

    fn state() -> VisibleState {
        VisibleState {
            results: vec![patient("p1", "Asha Rao"), patient("p2", "Bea Lund")],
            page: 2,
            total_pages: 5,
            total_count: 43,
        }
    }

    #[test]
    fn test_plain_page() {
        assert_eq!(
            PlainFormatter.format_page(&state()),
            "Page 2 of 5 (43 records)\n  \
             p1  Asha Rao, 47, Female  [fever, cough]\n  \
             p2  Bea Lund, 47, Female  [fever, cough]"
        );
    }

    #[test]
    fn test_plain_empty_page() {
        let state = VisibleState::default();
        assert_eq!(
            PlainFormatter.format_page(&state),
            "Page 1 of 1 (0 records)\n  No patients found"
        );
    }

    #[test]
    fn test_plain_stats() {
        let stats = Stats {
            total: 43,
            male: 20,
            female: 22,
            critical: 4,
        };
        assert_eq!(
            PlainFormatter.format_stats(&stats),
            "Total 43 | Male 20 | Female 22 | Critical 4"
        );
    }

    #[test]
    fn test_plain_details() {
        let details = PatientDetails {
            patient: patient("p1", "Asha Rao"),
            recommendation: Some(Recommendation {
                possible_condition: "Influenza".into(),
                suggested_tests: vec!["CBC".into(), "Flu swab".into()],
                ..Recommendation::default()
            }),
        };
        let out = PlainFormatter.format_details(&details);
        assert!(out.contains("BP 130/85 | Temp - | HR -"));
        assert!(out.contains("Possible condition: Influenza"));
        assert!(out.contains("Suggested tests: CBC, Flu swab"));
        assert!(out.contains("Precautions: -"));
    }

    #[test]
    fn test_color_output_keeps_text() {
        let plain = console::strip_ansi_codes(&ColorFormatter.format_page(&state())).to_string();
        assert_eq!(plain, PlainFormatter.format_page(&state()));
        let notice = ColorFormatter.format_notice("list not updated");
        assert!(console::strip_ansi_codes(&notice).contains("[!] list not updated"));
    }
}
