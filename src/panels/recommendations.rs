use std::fmt::Write;

use crate::client::AnalyticsClient;
use crate::error::ErrorKind;
use crate::fetch::FetchState;
use crate::models::StudentRecommendation;
use crate::render::{self, Badge, Theme, Tone};

/// Per-student recommendation lookup.
///
/// A search settles into exactly one of found, not found, or error.
#[derive(Debug, Default)]
pub struct RecommendationsPanel {
    input: String,
    state: FetchState<StudentRecommendation>,
}

impl RecommendationsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&mut self, student_id: &str) {
        self.input = student_id.trim().to_string();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn can_search(&self) -> bool {
        !self.input.is_empty() && !self.state.is_loading()
    }

    /// Looks up the current input. Returns `false` without touching any
    /// state when the input is empty or a lookup is already running.
    pub async fn search(&mut self, client: &AnalyticsClient) -> bool {
        if !self.can_search() {
            return false;
        }
        let student_id = self.input.clone();
        tracing::debug!(%student_id, "searching recommendations");
        self.state.run(client.recommendations(&student_id)).await;
        true
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn not_found(&self) -> bool {
        matches!(self.state.error(), Some((ErrorKind::NotFound, _)))
    }

    /// Generic failure description; a missing student is not reported here.
    pub fn error(&self) -> Option<&str> {
        match self.state.error() {
            Some((ErrorKind::TransportOrServer, message)) => Some(message),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&StudentRecommendation> {
        self.state.value()
    }

    pub fn render(&self, theme: Theme) -> String {
        let mut out = String::new();
        render::heading(&mut out, 2, "Student Recommendations");
        render::caption(
            &mut out,
            theme,
            "Enter a student ID to view personalized recommendations",
        );
        let action = if self.is_loading() { "[Searching...]" } else { "[Search]" };
        let shown = if self.input.is_empty() { "Enter Student ID" } else { self.input.as_str() };
        let _ = writeln!(out, "Student ID: <{shown}> {action}");

        if let Some(message) = self.error() {
            let _ = writeln!(out);
            render::notice(&mut out, theme, Tone::Red, &format!("Error: {message}"));
        }
        if self.not_found() {
            let _ = writeln!(out);
            render::notice(&mut out, theme, Tone::Orange, "Student ID not found in database");
            render::caption(&mut out, theme, "Please check the ID and try again");
        }
        if let Some(data) = self.data() {
            let _ = writeln!(out);
            render_recommendation(&mut out, theme, data);
        }
        out
    }
}

fn render_recommendation(out: &mut String, theme: Theme, data: &StudentRecommendation) {
    render::heading(out, 3, &format!("Student ID: {}", data.student_id));

    if !data.risk_factors.is_empty() {
        let _ = writeln!(out, "Identified Risk Factors");
        let tags: Vec<String> = data
            .risk_factors
            .iter()
            .map(|factor| Badge::new(factor.as_str(), Tone::Orange).render(theme))
            .collect();
        let _ = writeln!(out, "{}", tags.join(" "));
    }

    if !data.recommendations.is_empty() {
        let _ = writeln!(out);
        render::heading(out, 3, "Personalized Recommendations");
        render::caption(out, theme, "Suggested interventions based on student data");
        for rec in &data.recommendations {
            let _ = writeln!(
                out,
                "- {}",
                Badge::new(rec.category.as_str(), Tone::Blue).render(theme)
            );
            let _ = writeln!(out, "  Issue: {}", rec.issue);
            let _ = writeln!(out, "  Recommendation: {}", rec.recommendation);
        }
    }

    if !data.next_steps.is_empty() {
        let _ = writeln!(out);
        render::heading(out, 3, "Next Steps");
        render::caption(out, theme, "Action items to support this student");
        for (idx, step) in data.next_steps.iter().enumerate() {
            let _ = writeln!(out, "{}. {step}", idx + 1);
        }
    }
}
