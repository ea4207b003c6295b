use std::fmt::Write;
use std::str::FromStr;

use crate::client::AnalyticsClient;
use crate::panels::{OverviewPanel, RecommendationsPanel, RiskPanel};
use crate::render::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Recommendations,
    Risk,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Overview, Tab::Recommendations, Tab::Risk];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Recommendations => "Recommendations",
            Tab::Risk => "Risk",
        }
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "overview" => Ok(Tab::Overview),
            "recommendations" | "recommend" => Ok(Tab::Recommendations),
            "risk" => Ok(Tab::Risk),
            other => Err(format!("unknown tab: {other}")),
        }
    }
}

#[derive(Debug)]
pub enum ActivePanel {
    Overview(OverviewPanel),
    Recommendations(RecommendationsPanel),
    Risk(RiskPanel),
}

impl ActivePanel {
    pub fn tab(&self) -> Tab {
        match self {
            ActivePanel::Overview(_) => Tab::Overview,
            ActivePanel::Recommendations(_) => Tab::Recommendations,
            ActivePanel::Risk(_) => Tab::Risk,
        }
    }

    pub fn render(&self, theme: Theme) -> String {
        match self {
            ActivePanel::Overview(panel) => panel.render(theme),
            ActivePanel::Recommendations(panel) => panel.render(theme),
            ActivePanel::Risk(panel) => panel.render(theme),
        }
    }
}

#[derive(Debug)]
pub struct TabContainer {
    active: ActivePanel,
}

impl Default for TabContainer {
    fn default() -> Self {
        Self {
            active: ActivePanel::Overview(OverviewPanel::new()),
        }
    }
}

impl TabContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_tab(&self) -> Tab {
        self.active.tab()
    }

    pub fn active(&self) -> &ActivePanel {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut ActivePanel {
        &mut self.active
    }

    /// Mounts a fresh panel for `tab` and runs its activation fetches.
    pub async fn open(&mut self, tab: Tab, client: &AnalyticsClient) {
        tracing::debug!(tab = tab.title(), "mounting panel");
        self.active = match tab {
            Tab::Overview => {
                let mut panel = OverviewPanel::new();
                panel.activate(client).await;
                ActivePanel::Overview(panel)
            }
            Tab::Recommendations => ActivePanel::Recommendations(RecommendationsPanel::new()),
            Tab::Risk => {
                let mut panel = RiskPanel::new();
                panel.activate(client).await;
                ActivePanel::Risk(panel)
            }
        };
    }

    pub fn render(&self, theme: Theme) -> String {
        let mut out = String::new();
        let strip: Vec<String> = Tab::ALL
            .iter()
            .map(|tab| {
                if *tab == self.active_tab() {
                    format!("[{}]", tab.title())
                } else {
                    format!(" {} ", tab.title())
                }
            })
            .collect();
        let _ = writeln!(out, "{}", strip.join(" "));
        let _ = writeln!(out);
        out.push_str(&self.active.render(theme));
        out
    }
}
