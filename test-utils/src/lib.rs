//! `test-utils` is used for testing in both `medidash-lib` and `medidash-bin`.
//! This crate does not depend on `medidash-lib` or `medidash-bin`, else we would get dependency cycles.
//! Macros are used instead, so that the importer is responsible for providing the dependencies
//! (`wiremock`, `http` and `serde_json`).

/// Create a mock web server, which responds with a predefined status to any
/// request
#[macro_export]
macro_rules! mock_server {
    ($status:expr $(, $func:tt ($($arg:expr),*))*) => {{
        let mock_server = wiremock::MockServer::start().await;
        let response_template = wiremock::ResponseTemplate::new(http::StatusCode::from($status));
        let template = response_template$(.$func($($arg),*))*;
        wiremock::Mock::given(wiremock::matchers::any()).respond_with(template).mount(&mock_server).await;
        mock_server
    }};
}

/// A patient record as the API returns it
#[macro_export]
macro_rules! patient_json {
    ($id:expr, $name:expr, $age:expr, $gender:expr $(,)?) => {
        serde_json::json!({
            "_id": $id,
            "name": $name,
            "age": $age,
            "gender": $gender,
            "symptoms": ["cough"],
            "history": [],
            "bp": "120/80",
            "temperature": "98.6",
            "heart_rate": "72",
            "created_at": "2024-03-12T08:15:31"
        })
    };
}

/// One page of the patient list as the API returns it
#[macro_export]
macro_rules! page_json {
    ([$($patient:expr),* $(,)?], $total:expr, $total_pages:expr $(,)?) => {{
        let patients: Vec<serde_json::Value> = vec![$($patient),*];
        $crate::page_json!(patients, $total, $total_pages)
    }};
    ($patients:expr, $total:expr, $total_pages:expr $(,)?) => {
        serde_json::json!({
            "patients": $patients,
            "total": $total,
            "page": 1,
            "limit": 10,
            "total_pages": $total_pages
        })
    };
}

/// Set up a mock patient API under `/api` serving a single page of
/// `patients` and the given stats
#[macro_export]
macro_rules! mock_patient_api {
    ([$($patient:expr),* $(,)?], stats: $stats:expr $(,)?) => {{
        let mock_server = wiremock::MockServer::start().await;
        let patients: Vec<serde_json::Value> = vec![$($patient),*];
        let total = patients.len();
        let total_pages = total.div_ceil(10);

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/api/patients/stats"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json($stats))
            .mount(&mock_server)
            .await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/api/patients/"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_json($crate::page_json!(patients, total, total_pages)),
            )
            .mount(&mock_server)
            .await;
        mock_server
    }};
}
