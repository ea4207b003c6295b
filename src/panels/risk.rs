use std::fmt::Write;

use crate::client::AnalyticsClient;
use crate::fetch::FetchState;
use crate::format;
use crate::models::{ClusterCounts, ClusterSummary, RiskLevel, RiskPrediction};
use crate::render::{self, Badge, Table, Theme, Tone};

pub const RESULT_COLUMNS: [&str; 6] = [
    "Student ID",
    "GPA",
    "Study Time (h)",
    "Absences",
    "Risk Probability",
    "Risk Level",
];

#[derive(Debug, Default)]
pub struct RiskPanel {
    clusters: FetchState<ClusterSummary>,
    assessment: FetchState<Vec<RiskPrediction>>,
    query: String,
}

impl RiskPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clusters(&self) -> &FetchState<ClusterSummary> {
        &self.clusters
    }

    pub fn assessment(&self) -> &FetchState<Vec<RiskPrediction>> {
        &self.assessment
    }

    pub async fn activate(&mut self, client: &AnalyticsClient) {
        self.clusters.run(client.clustering()).await;
    }

    /// Runs the population assessment. The previous result stays visible
    /// only until the new attempt starts.
    pub async fn analyze(&mut self, client: &AnalyticsClient) {
        self.assessment.run(client.risk_predictions()).await;
    }

    /// Activates and analyzes at once; the two requests are in flight together.
    pub async fn activate_and_analyze(&mut self, client: &AnalyticsClient) {
        let Self {
            clusters,
            assessment,
            ..
        } = self;
        tokio::join!(
            clusters.run(client.clustering()),
            assessment.run(client.risk_predictions())
        );
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Stored predictions narrowed by the current query, `None` before any
    /// successful assessment.
    pub fn filtered(&self) -> Option<Vec<&RiskPrediction>> {
        self.assessment
            .value()
            .map(|rows| filter_predictions(rows, &self.query))
    }

    pub fn render(&self, theme: Theme) -> String {
        let mut out = String::new();
        self.render_clusters(&mut out, theme);
        let _ = writeln!(out);
        self.render_assessment(&mut out, theme);
        out
    }

    fn render_clusters(&self, out: &mut String, theme: Theme) {
        render::heading(out, 2, "Cluster Distribution");
        render::caption(out, theme, "Student grouping by risk level");
        match &self.clusters {
            FetchState::Idle => {}
            FetchState::Loading => {
                render::notice(out, theme, Tone::Muted, "Loading cluster distribution...");
            }
            FetchState::Error { message, .. } => {
                render::notice(out, theme, Tone::Red, &format!("Error: {message}"));
            }
            FetchState::Success(summary) => {
                for card in cluster_cards(&summary.clusters) {
                    let _ = writeln!(
                        out,
                        "- {}: {} ({} of students)",
                        Badge::new(card.level.label(), level_tone(card.level)).render(theme),
                        card.count,
                        card.share
                    );
                }
            }
        }
    }

    fn render_assessment(&self, out: &mut String, theme: Theme) {
        render::heading(out, 2, "Risk Prediction");
        render::caption(out, theme, "Analyze all students for risk assessment");
        let trigger = if self.assessment.is_loading() {
            "[Analyzing...]"
        } else {
            "[Analyze All Students]"
        };
        let _ = writeln!(out, "{trigger}");

        if let Some((_, message)) = self.assessment.error() {
            render::notice(out, theme, Tone::Red, &format!("Error: {message}"));
        }

        let (Some(rows), Some(filtered)) = (self.assessment.value(), self.filtered()) else {
            return;
        };

        let _ = writeln!(out);
        render::heading(out, 3, "Risk Assessment Results");
        let mut summary = format!("{} students analyzed", format::count(rows.len() as u64));
        if !self.query.is_empty() {
            let _ = write!(
                summary,
                ", showing {} matching \"{}\"",
                format::count(filtered.len() as u64),
                self.query
            );
        }
        render::caption(out, theme, &summary);
        results_table(&filtered, theme).render(out);
    }
}

/// Keeps rows whose student ID or risk label contains `query`,
/// ignoring case. An empty query keeps everything.
pub fn filter_predictions<'a>(rows: &'a [RiskPrediction], query: &str) -> Vec<&'a RiskPrediction> {
    if query.is_empty() {
        return rows.iter().collect();
    }
    let needle = query.to_lowercase();
    rows.iter()
        .filter(|row| {
            row.student_id
                .is_some_and(|id| id.to_string().contains(&needle))
                || row.risk_label().to_lowercase().contains(&needle)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterCard {
    pub level: RiskLevel,
    pub count: String,
    pub share: String,
}

pub fn cluster_cards(counts: &ClusterCounts) -> Vec<ClusterCard> {
    let total = counts.total();
    RiskLevel::ALL
        .iter()
        .map(|level| ClusterCard {
            level: *level,
            count: format::count(counts.count(*level)),
            share: format::percent_of(counts.count(*level), total),
        })
        .collect()
}

fn level_tone(level: RiskLevel) -> Tone {
    match level {
        RiskLevel::Minimal => Tone::Blue,
        RiskLevel::Low => Tone::Green,
        RiskLevel::Medium => Tone::Orange,
        RiskLevel::High => Tone::Red,
    }
}

pub fn risk_badge(row: &RiskPrediction) -> Badge {
    let tone = if row.at_risk { Tone::Red } else { Tone::Green };
    Badge::new(row.risk_label(), tone)
}

/// Display values of one result row, in [`RESULT_COLUMNS`] order, with the
/// risk level as its plain label.
pub fn prediction_cells(row: &RiskPrediction) -> [String; 6] {
    [
        row.student_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| format::MISSING.to_string()),
        format::fixed(row.gpa, 2),
        format::fixed(row.study_time_weekly, 1),
        row.absences.to_string(),
        format::percent(row.risk_probability),
        row.risk_label().to_string(),
    ]
}

pub fn results_table(rows: &[&RiskPrediction], theme: Theme) -> Table {
    let mut table = Table::new(RESULT_COLUMNS);
    if rows.is_empty() {
        table.span("No results found");
        return table;
    }
    for row in rows {
        let [id, gpa, study, absences, probability, _] = prediction_cells(row);
        table.row(vec![
            id,
            gpa,
            study,
            absences,
            probability,
            risk_badge(row).render(theme),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::error::ErrorKind;
    use crate::render::Row;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prediction(id: i64, at_risk: bool) -> RiskPrediction {
        RiskPrediction {
            student_id: Some(id),
            gpa: 2.0,
            study_time_weekly: 5.0,
            absences: 3,
            risk_probability: if at_risk { 80.0 } else { 10.0 },
            at_risk,
        }
    }

    fn client_for(server: &MockServer) -> AnalyticsClient {
        let config = DashboardConfig::new(&server.uri(), Some(5), false).unwrap();
        AnalyticsClient::new(&config).unwrap()
    }

    async fn respond(server: &MockServer, route: &str, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(route))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[test]
    fn cluster_shares_use_the_bucket_total() {
        let counts = ClusterCounts {
            level_0: 10,
            level_1: 20,
            level_2: 0,
            level_3: 0,
        };
        let cards = cluster_cards(&counts);
        assert_eq!(cards.len(), 4);
        assert_eq!(cards[1].count, "20");
        assert_eq!(cards[1].share, "66.7%");
        assert_eq!(cards[0].share, "33.3%");
        assert_eq!(cards[3].share, "0.0%");
    }

    #[test]
    fn empty_clusters_are_zero_percent() {
        let cards = cluster_cards(&ClusterCounts::default());
        assert!(cards.iter().all(|card| card.share == "0.0%" && card.count == "0"));
    }

    #[test]
    fn empty_query_is_identity() {
        let rows = vec![prediction(1, true), prediction(2, false)];
        let filtered = filter_predictions(&rows, "");
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0], &rows[0]);
        assert_eq!(filtered[1], &rows[1]);
    }

    #[test]
    fn query_matches_id_or_label() {
        let rows = vec![
            prediction(1001, true),
            prediction(1002, false),
            prediction(2003, false),
        ];

        let ids: Vec<Option<i64>> = filter_predictions(&rows, "100")
            .iter()
            .map(|row| row.student_id)
            .collect();
        assert_eq!(ids, vec![Some(1001), Some(1002)]);

        let at_risk = filter_predictions(&rows, "AT RISK");
        assert_eq!(at_risk.len(), 3);

        let not_at_risk = filter_predictions(&rows, "not at");
        assert_eq!(not_at_risk.len(), 2);

        assert!(filter_predictions(&rows, "xyz").is_empty());
    }

    #[test]
    fn rows_without_ids_match_only_by_label() {
        let rows = vec![RiskPrediction {
            student_id: None,
            at_risk: true,
            ..RiskPrediction::default()
        }];
        assert!(filter_predictions(&rows, "n/a").is_empty());
        assert_eq!(filter_predictions(&rows, "risk").len(), 1);
    }

    #[test]
    fn prediction_row_formatting() {
        let row = RiskPrediction {
            student_id: Some(5),
            gpa: 3.1,
            study_time_weekly: 7.25,
            absences: 2,
            risk_probability: 42.3,
            at_risk: true,
        };
        assert_eq!(
            prediction_cells(&row),
            [
                "5".to_string(),
                "3.10".to_string(),
                "7.3".to_string(),
                "2".to_string(),
                "42.3%".to_string(),
                "At Risk".to_string(),
            ]
        );
        let badge = risk_badge(&row);
        assert_eq!(badge.label, "At Risk");
        assert_eq!(badge.tone, Tone::Red);
        assert_eq!(risk_badge(&prediction(6, false)).tone, Tone::Green);
    }

    #[test]
    fn empty_filter_result_spans_the_table() {
        let table = results_table(&[], Theme::plain());
        assert_eq!(table.rows(), &[Row::Span("No results found".into())]);
        assert_eq!(table.width(), 6);
    }

    #[tokio::test]
    async fn activation_loads_clusters_only() {
        let server = MockServer::start().await;
        respond(
            &server,
            "/api/clustering",
            ResponseTemplate::new(200).set_body_json(json!({
                "clusters": {"Risk_Level_0": 10, "Risk_Level_1": 20, "Risk_Level_2": 0, "Risk_Level_3": 0},
                "cluster_data": [{"StudentID": 1}]
            })),
        )
        .await;
        Mock::given(method("POST"))
            .and(path("/api/risk-prediction"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut panel = RiskPanel::new();
        panel.activate(&client_for(&server)).await;

        assert!(panel.assessment().is_idle());
        let text = panel.render(Theme::plain());
        assert!(text.contains("- [Low Risk]: 20 (66.7% of students)"));
        assert!(text.contains("[Analyze All Students]"));
        assert!(!text.contains("Risk Assessment Results"));
    }

    #[tokio::test]
    async fn cluster_failure_does_not_block_assessment() {
        let server = MockServer::start().await;
        respond(&server, "/api/clustering", ResponseTemplate::new(500)).await;
        respond(
            &server,
            "/api/risk-prediction",
            ResponseTemplate::new(200).set_body_json(json!({
                "all_students": [
                    {"StudentID": 5, "GPA": 3.1, "StudyTimeWeekly": 7.25, "Absences": 2, "RiskProbability": 42.3, "AtRisk": true},
                    {"StudentID": 6, "GPA": 3.9, "StudyTimeWeekly": 15.0, "Absences": 0, "RiskProbability": 4.0, "AtRisk": false}
                ]
            })),
        )
        .await;

        let mut panel = RiskPanel::new();
        panel.activate_and_analyze(&client_for(&server)).await;

        assert_eq!(
            panel.clusters().error().map(|(kind, _)| kind),
            Some(ErrorKind::TransportOrServer)
        );
        assert_eq!(panel.assessment().value().map(Vec::len), Some(2));

        let text = panel.render(Theme::plain());
        assert!(text.contains("! Error: /api/clustering returned 500"));
        assert!(text.contains("2 students analyzed"));
        assert!(text.contains("| 5          | 3.10 | 7.3            | 2        | 42.3%            | [At Risk]     |"));
    }

    #[tokio::test]
    async fn filtering_never_refetches() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/risk-prediction"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "all_students": [
                    {"StudentID": 5, "AtRisk": true},
                    {"StudentID": 6, "AtRisk": false}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut panel = RiskPanel::new();
        panel.analyze(&client_for(&server)).await;

        panel.set_query("not");
        assert_eq!(panel.filtered().map(|rows| rows.len()), Some(1));
        panel.set_query("zzz");
        assert_eq!(panel.filtered().map(|rows| rows.len()), Some(0));
        assert!(panel.render(Theme::plain()).contains("No results found"));
        panel.set_query("");
        assert_eq!(panel.filtered().map(|rows| rows.len()), Some(2));
    }

    #[test]
    fn pending_assessment_shows_busy_trigger() {
        let mut panel = RiskPanel::new();
        panel.assessment.begin();
        let text = panel.render(Theme::plain());
        assert!(text.contains("[Analyzing...]"));
        assert!(panel.filtered().is_none());
    }
}
