use std::collections::BTreeMap;
use std::fmt::Write;

use crate::client::AnalyticsClient;
use crate::error::ErrorKind;
use crate::fetch::FetchState;
use crate::format;
use crate::models::{DashboardStats, DatasetInfo};
use crate::render::{self, Table, Theme, Tile, Tone};

pub const FETCH_FAILED: &str = "Failed to fetch data";

#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub stats: DashboardStats,
    pub dataset: DatasetInfo,
}

#[derive(Debug, Default)]
pub struct OverviewPanel {
    state: FetchState<Overview>,
}

impl OverviewPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FetchState<Overview> {
        &self.state
    }

    pub async fn activate(&mut self, client: &AnalyticsClient) {
        self.state.begin();
        let (stats, dataset) = tokio::join!(client.dashboard_stats(), client.dataset_info());

        match (stats, dataset) {
            (Ok(stats), Ok(dataset)) => {
                self.state.settle(Ok(Overview { stats, dataset }));
            }
            (stats, dataset) => {
                for err in [stats.err(), dataset.err()].into_iter().flatten() {
                    tracing::warn!(error = %err, "overview fetch failed");
                }
                self.state.fail(ErrorKind::TransportOrServer, FETCH_FAILED);
            }
        }
    }

    pub fn render(&self, theme: Theme) -> String {
        let mut out = String::new();
        match &self.state {
            FetchState::Idle => {}
            FetchState::Loading => {
                render::notice(&mut out, theme, Tone::Muted, "Loading overview...");
            }
            FetchState::Error { message, .. } => {
                render::notice(&mut out, theme, Tone::Red, &format!("Error: {message}"));
            }
            FetchState::Success(overview) => render_overview(&mut out, theme, overview),
        }
        out
    }
}

fn render_overview(out: &mut String, theme: Theme, overview: &Overview) {
    render::heading(out, 2, "Overview");
    render::tiles(out, theme, &stat_tiles(&overview.stats));

    let distributions = [
        ("Gender Distribution", &overview.stats.gender_distribution),
        ("Grade Distribution", &overview.stats.grade_distribution),
        (
            "Extracurricular Participation",
            &overview.stats.extracurricular_participation,
        ),
    ];
    for (title, values) in distributions {
        if !values.is_empty() {
            let _ = writeln!(out);
            render::heading(out, 3, title);
            render_distribution(out, values);
        }
    }

    let _ = writeln!(out);
    render::heading(out, 3, "Column Information");
    render::caption(out, theme, "Database schema and data types");
    match column_table(&overview.dataset) {
        Some(table) => table.render(out),
        None => render::notice(out, theme, Tone::Muted, "No column information available"),
    }

    let _ = writeln!(out);
    render::heading(out, 3, "Sample Data");
    render::caption(out, theme, "Preview of student records");
    match sample_table(&overview.dataset) {
        Some(table) => table.render(out),
        None => render::notice(out, theme, Tone::Muted, "No sample data available"),
    }
}

fn render_distribution(out: &mut String, values: &BTreeMap<String, f64>) {
    for (key, value) in values {
        let _ = writeln!(out, "- {key}: {}", format::number(*value));
    }
}

pub fn stat_tiles(stats: &DashboardStats) -> Vec<Tile> {
    vec![
        Tile {
            title: "Total Students",
            value: format::count(stats.total_students),
            caption: "Students in database",
        },
        Tile {
            title: "Students with Tutors",
            value: format::count(stats.students_with_tutors),
            caption: "Receiving tutoring support",
        },
        Tile {
            title: "Average Study Time",
            value: format!("{}h", format::fixed(stats.average_study_time, 1)),
            caption: "Hours per week",
        },
        Tile {
            title: "Average Absences",
            value: format::fixed(stats.average_absences, 1),
            caption: "Days per semester",
        },
        Tile {
            title: "Average GPA",
            value: format::fixed(stats.average_gpa, 2),
            caption: "Overall performance",
        },
    ]
}

/// Column name and type pairs, `None` when the schema is empty.
pub fn column_table(dataset: &DatasetInfo) -> Option<Table> {
    if dataset.columns.is_empty() {
        return None;
    }
    let mut table = Table::new(["Column Name", "Data Type"]);
    for column in &dataset.columns {
        let data_type = dataset
            .data_types
            .get(column)
            .cloned()
            .unwrap_or_else(|| format::MISSING.to_string());
        table.row(vec![column.clone(), data_type]);
    }
    Some(table)
}

/// Sample rows laid out in schema column order.
pub fn sample_table(dataset: &DatasetInfo) -> Option<Table> {
    if dataset.columns.is_empty() || dataset.sample_data.is_empty() {
        return None;
    }
    let mut table = Table::new(dataset.columns.iter().cloned());
    for row in &dataset.sample_data {
        table.row(
            dataset
                .columns
                .iter()
                .map(|column| format::cell(row.get(column)))
                .collect(),
        );
    }
    Some(table)
}
