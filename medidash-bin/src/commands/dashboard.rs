use std::io::Write;

use anyhow::{Context, Result};
use log::{debug, info};
use medidash_lib::{Client, Outcome, QueryCoordinator};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::CommandParams;
use super::input::{Command, HELP};
use crate::formatters::page::DashboardFormatter;

type Coordinator = QueryCoordinator<Client>;

/// Run the interactive dashboard.
///
/// Commands are read from `input` while coordinator events are processed
/// concurrently, so a slow list response never blocks typing. Page
/// navigation is relative to the page on screen, so `page`, `next` and
/// `prev` first wait for pending searches and fetches to settle. `show` and
/// `admit` are awaited in place; list events queue up meanwhile and are
/// reported afterwards. On `quit` or end of input, a search still waiting on
/// its debounce is sent, every fetch settles and the rate limiters are torn
/// down.
pub(crate) async fn dashboard<R, W>(params: CommandParams, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let CommandParams {
        client,
        formatter,
        rate_limits,
    } = params;
    let formatter = formatter.as_ref();

    let mut coordinator = QueryCoordinator::new(client.clone(), rate_limits);
    coordinator.start();
    let mut lines = input.lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Cannot read command")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        execute(command, &mut coordinator, &client, formatter, out).await?;
                    }
                    Err(e) => writeln!(out, "{}", formatter.format_notice(&format!("{e:#}")))?,
                }
            }
            outcome = coordinator.next_event() => {
                report(&outcome, &coordinator, formatter, out)?;
            }
        }
    }

    debug!("Waiting for {} pending queries", coordinator.in_flight());
    drain(&mut coordinator, formatter, out).await?;
    coordinator.dispose();
    Ok(())
}

/// Process events until the coordinator is idle and report them.
///
/// Every applied response has already been folded into the visible state by
/// then, so the page is printed once.
async fn drain<W: Write>(
    coordinator: &mut Coordinator,
    formatter: &dyn DashboardFormatter,
    out: &mut W,
) -> Result<()> {
    let outcomes = coordinator.settle().await;
    let last_applied = outcomes
        .iter()
        .rposition(|outcome| matches!(outcome, Outcome::Applied { .. }));
    for (i, outcome) in outcomes.iter().enumerate() {
        if matches!(outcome, Outcome::Applied { .. }) && Some(i) != last_applied {
            continue;
        }
        report(outcome, coordinator, formatter, out)?;
    }
    Ok(())
}

async fn execute<W: Write>(
    command: Command,
    coordinator: &mut Coordinator,
    client: &Client,
    formatter: &dyn DashboardFormatter,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Search(term) => coordinator.set_search_term(term),
        Command::Filter(gender) => {
            coordinator.set_gender_filter(gender);
        }
        Command::Page(page) => {
            drain(coordinator, formatter, out).await?;
            change_page(coordinator, page, formatter, out)?;
        }
        Command::Next => {
            drain(coordinator, formatter, out).await?;
            let page = coordinator.visible().page.saturating_add(1);
            change_page(coordinator, page, formatter, out)?;
        }
        Command::Prev => {
            drain(coordinator, formatter, out).await?;
            let page = coordinator.visible().page.saturating_sub(1);
            change_page(coordinator, page, formatter, out)?;
        }
        Command::Refresh => {
            coordinator.refresh();
        }
        Command::Stats => writeln!(out, "{}", formatter.format_stats(&coordinator.stats()))?,
        Command::Show(id) => match client.patient(&id).await {
            Ok(details) => writeln!(out, "{}", formatter.format_details(&details))?,
            Err(e) => writeln!(out, "{}", formatter.format_notice(&e.to_string()))?,
        },
        Command::Admit(patient) => match client.create_patient(&patient).await {
            Ok(admission) => {
                writeln!(out, "Admitted {} as {}", patient.name, admission.patient_id)?;
                writeln!(
                    out,
                    "{}",
                    formatter.format_recommendation(&admission.recommendation)
                )?;
                coordinator.refresh();
            }
            Err(e) => writeln!(
                out,
                "{}",
                formatter.format_notice(&format!("Patient not admitted: {e}"))
            )?,
        },
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => {}
    }
    Ok(())
}

fn change_page<W: Write>(
    coordinator: &mut Coordinator,
    page: u32,
    formatter: &dyn DashboardFormatter,
    out: &mut W,
) -> Result<()> {
    if !coordinator.set_page(page) {
        let total = coordinator.visible().total_pages;
        writeln!(
            out,
            "{}",
            formatter.format_notice(&format!(
                "Page {page} not loaded (out of 1..={total} or changed too quickly)"
            ))
        )?;
    }
    Ok(())
}

fn report<W: Write>(
    outcome: &Outcome,
    coordinator: &Coordinator,
    formatter: &dyn DashboardFormatter,
    out: &mut W,
) -> Result<()> {
    match outcome {
        Outcome::Issued { seq, query } => info!("Query #{seq}: {query}"),
        Outcome::Applied { .. } => {
            writeln!(out, "{}", formatter.format_page(coordinator.visible()))?;
        }
        Outcome::Stale { .. } => {}
        Outcome::Failed { error, .. } => writeln!(
            out,
            "{}",
            formatter.format_notice(&format!("List not updated: {error}"))
        )?,
        Outcome::StatsUpdated(stats) => info!("Stats updated: {stats:?}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use medidash_lib::{ClientBuilder, RateLimitConfig};
    use serde_json::json;
    use test_utils::{mock_patient_api, page_json, patient_json};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    use super::dashboard;
    use crate::commands::CommandParams;
    use crate::formatters::page::PlainFormatter;

    async fn run(server: &MockServer, input: &str) -> String {
        let client = ClientBuilder::builder()
            .base_url(format!("{}/api", server.uri()))
            .build()
            .client()
            .unwrap();
        let params = CommandParams {
            client,
            formatter: Box::new(PlainFormatter),
            rate_limits: RateLimitConfig::from_options(
                Some(Duration::from_millis(10)),
                Some(Duration::from_millis(10)),
            ),
        };
        let mut out = Vec::new();
        dashboard(params, input.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    fn stats() -> serde_json::Value {
        json!({"total": 2, "male": 1, "female": 1, "critical": 0})
    }

    #[tokio::test]
    async fn test_prints_first_page_on_eof() {
        let server = mock_patient_api!(
            [
                patient_json!("p1", "Asha Rao", 47, "Female"),
                patient_json!("p2", "Ravi Kumar", 61, "Male")
            ],
            stats: stats()
        );

        let out = run(&server, "").await;
        assert!(out.contains("Page 1 of 1 (2 records)"), "{out}");
        assert!(out.contains("p1  Asha Rao, 47, Female"), "{out}");
        assert!(out.contains("p2  Ravi Kumar, 61, Male"), "{out}");
    }

    #[tokio::test]
    async fn test_filter_shows_filtered_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/patients/"))
            .and(query_param("gender", "Female"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json!(
                [patient_json!("p1", "Asha Rao", 47, "Female")],
                1,
                1
            )))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/patients/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(page_json!(
                        [
                            patient_json!("p1", "Asha Rao", 47, "Female"),
                            patient_json!("p2", "Ravi Kumar", 61, "Male")
                        ],
                        2,
                        1
                    ))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/patients/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(stats()))
            .mount(&server)
            .await;

        // The slow unfiltered response arrives last and must not win
        let out = run(&server, "filter female\n").await;
        let last_page = out.rsplit("Page ").next().unwrap();
        assert!(last_page.starts_with("1 of 1 (1 records)"), "{out}");
        assert!(!last_page.contains("Ravi Kumar"), "{out}");
    }

    #[tokio::test]
    async fn test_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let out = run(&server, "").await;
        assert!(out.contains("[!] List not updated"), "{out}");
        assert!(out.contains("503"), "{out}");
    }

    #[tokio::test]
    async fn test_stats_and_invalid_commands() {
        let server = mock_patient_api!([], stats: stats());

        let out = run(&server, "refresh\nstats\nfly away\npage 7\nquit\nstats\n").await;
        assert!(out.contains("Unknown command `fly`"), "{out}");
        assert!(out.contains("Page 7 not loaded"), "{out}");
        assert!(out.contains("No patients found"), "{out}");
    }

    #[tokio::test]
    async fn test_piped_search_is_sent_before_exit() {
        let server = mock_patient_api!([], stats: stats());
        Mock::given(method("GET"))
            .and(path("/api/patients/"))
            .and(query_param("search", "fever"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json!(
                [patient_json!("p3", "Noor Ali", 38, "Female")],
                1,
                1
            )))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;

        let out = run(&server, "search fever
").await;
        let last_page = out.rsplit("Page ").next().unwrap();
        assert!(last_page.contains("Noor Ali"), "{out}");
    }

    #[tokio::test]
    async fn test_next_waits_for_current_page() {
        let server = mock_patient_api!([], stats: stats());
        Mock::given(method("GET"))
            .and(path("/api/patients/"))
            .and(query_param("page", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(page_json!(
                        [patient_json!("p1", "Asha Rao", 47, "Female")],
                        25,
                        3
                    ))
                    .set_delay(Duration::from_millis(100)),
            )
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/patients/"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_json!(
                [patient_json!("p11", "Kai Berg", 70, "Male")],
                25,
                3
            )))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;

        let out = run(&server, "next
").await;
        assert!(!out.contains("not loaded"), "{out}");
        let last_page = out.rsplit("Page ").next().unwrap();
        assert!(last_page.starts_with("2 of 3 (25 records)"), "{out}");
        assert!(last_page.contains("Kai Berg"), "{out}");
    }

    #[tokio::test]
    async fn test_list_events_are_reported_after_slow_show() {
        let server = mock_patient_api!(
            [patient_json!("p1", "Asha Rao", 47, "Female")],
            stats: stats()
        );
        Mock::given(method("GET"))
            .and(path("/api/patients/65f9"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({
                        "patient": patient_json!("65f9", "Omar Haddad", 58, "Male"),
                        "recommendation": null
                    }))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;

        let out = run(&server, "show 65f9
").await;
        assert!(out.contains("65f9  Omar Haddad, 58, Male"), "{out}");
        assert!(out.contains("Page 1 of 1 (1 records)"), "{out}");
        assert!(out.contains("p1  Asha Rao, 47, Female"), "{out}");
    }

    #[tokio::test]
    async fn test_show_and_admit() {
        let server = mock_patient_api!([], stats: stats());
        Mock::given(method("GET"))
            .and(path("/api/patients/65f1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "patient": patient_json!("65f1", "Meera Shah", 33, "Female"),
                "recommendation": null
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/patients/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "patient_id": "65f2",
                "ai_recommendation": {
                    "possible_condition": "Migraine",
                    "suggested_tests": ["MRI"],
                    "dosage_recommendation": "Rest",
                    "precautionary_measures": [],
                    "ai_analysis_summary": "Likely migraine."
                }
            })))
            .mount(&server)
            .await;

        let input = "show 65f1\nadmit {\"name\":\"Lee Park\",\"age\":29,\"gender\":\"Male\"}\n";
        let out = run(&server, input).await;
        assert!(out.contains("65f1  Meera Shah, 33, Female"), "{out}");
        assert!(out.contains("No recommendation on file"), "{out}");
        assert!(out.contains("Admitted Lee Park as 65f2"), "{out}");
        assert!(out.contains("Possible condition: Migraine"), "{out}");
    }
}
