use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::client::AnalyticsClient;
use crate::panels::{OverviewPanel, RecommendationsPanel, RiskPanel};
use crate::render::Theme;

/// Every panel mounted and fetched once, ready to be written out.
#[derive(Debug)]
pub struct Snapshot {
    pub overview: OverviewPanel,
    pub recommendations: Option<RecommendationsPanel>,
    pub risk: RiskPanel,
}

impl Snapshot {
    pub async fn capture(
        client: &AnalyticsClient,
        student_id: Option<&str>,
        assess: bool,
    ) -> Self {
        let mut overview = OverviewPanel::new();
        let mut risk = RiskPanel::new();
        let mut recommendations = student_id.map(|id| {
            let mut panel = RecommendationsPanel::new();
            panel.set_input(id);
            panel
        });

        let risk_flow = async {
            if assess {
                risk.activate_and_analyze(client).await;
            } else {
                risk.activate(client).await;
            }
        };
        let lookup = async {
            if let Some(panel) = recommendations.as_mut() {
                panel.search(client).await;
            }
        };
        tokio::join!(overview.activate(client), risk_flow, lookup);

        Self {
            overview,
            recommendations,
            risk,
        }
    }
}

pub fn build_report(snapshot: &Snapshot, source: &str, generated_at: DateTime<Utc>) -> String {
    let theme = Theme::plain();
    let mut output = String::new();

    let _ = writeln!(output, "# Student Risk Dashboard Report");
    let _ = writeln!(
        output,
        "Generated {} from {}",
        generated_at.format("%Y-%m-%d %H:%M UTC"),
        source
    );
    let _ = writeln!(output);
    output.push_str(&snapshot.overview.render(theme));

    if let Some(panel) = &snapshot.recommendations {
        let _ = writeln!(output);
        output.push_str(&panel.render(theme));
    }

    let _ = writeln!(output);
    output.push_str(&snapshot.risk.render(theme));
    output
}
