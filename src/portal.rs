use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::client::AnalyticsClient;
use crate::tabs::{ActivePanel, Tab, TabContainer};
use crate::render::Theme;

pub const HELP: &str = "\
Commands:
  overview | recommendations | risk   switch tab (reloads the tab)
  search <student id>                 look up recommendations
  analyze                             run the population risk assessment
  filter [query]                      filter assessment rows (empty clears)
  refresh                             reload the current tab
  help                                show this help
  quit                                leave the portal
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(Tab),
    Search(String),
    Analyze,
    Filter(String),
    Refresh,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(word, rest)| (word, rest.trim()))
        .unwrap_or((line, ""));

    let command = match word.to_ascii_lowercase().as_str() {
        "search" => Command::Search(rest.to_string()),
        "analyze" | "analyse" => Command::Analyze,
        "filter" => Command::Filter(rest.to_string()),
        "refresh" => Command::Refresh,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => match other.parse::<Tab>() {
            Ok(tab) => Command::Open(tab),
            Err(_) => return Err(format!("unknown command: {word} (try `help`)")),
        },
    };
    Ok(Some(command))
}

pub struct Portal {
    client: AnalyticsClient,
    tabs: TabContainer,
    theme: Theme,
}

impl Portal {
    pub fn new(client: AnalyticsClient, theme: Theme) -> Self {
        Self {
            client,
            tabs: TabContainer::new(),
            theme,
        }
    }

    pub fn tabs(&self) -> &TabContainer {
        &self.tabs
    }

    /// Applies one command and returns the text to show, or `None` on quit.
    pub async fn handle(&mut self, command: Command) -> Option<String> {
        match command {
            Command::Quit => return None,
            Command::Help => return Some(HELP.to_string()),
            Command::Open(tab) => self.tabs.open(tab, &self.client).await,
            Command::Refresh => {
                let tab = self.tabs.active_tab();
                self.tabs.open(tab, &self.client).await;
            }
            Command::Search(student_id) => match self.tabs.active_mut() {
                ActivePanel::Recommendations(panel) => {
                    panel.set_input(&student_id);
                    panel.search(&self.client).await;
                }
                _ => return Some(wrong_tab("search", Tab::Recommendations)),
            },
            Command::Analyze => match self.tabs.active_mut() {
                ActivePanel::Risk(panel) => panel.analyze(&self.client).await,
                _ => return Some(wrong_tab("analyze", Tab::Risk)),
            },
            Command::Filter(query) => match self.tabs.active_mut() {
                ActivePanel::Risk(panel) => panel.set_query(&query),
                _ => return Some(wrong_tab("filter", Tab::Risk)),
            },
        }
        Some(self.tabs.render(self.theme))
    }

    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.tabs.open(Tab::Overview, &self.client).await;
        output.write_all(self.tabs.render(self.theme).as_bytes()).await?;
        output.write_all(b"\nType `help` for commands.\n> ").await?;
        output.flush().await?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let text = match parse_command(&line) {
                Ok(None) => String::new(),
                Ok(Some(command)) => match self.handle(command).await {
                    Some(text) => text,
                    None => break,
                },
                Err(message) => format!("{message}\n"),
            };
            output.write_all(text.as_bytes()).await?;
            output.write_all(b"> ").await?;
            output.flush().await?;
        }
        output.write_all(b"\n").await?;
        output.flush().await?;
        Ok(())
    }
}

fn wrong_tab(command: &str, tab: Tab) -> String {
    format!(
        "`{command}` is only available on the {} tab; switch with `{}`\n",
        tab.title(),
        tab.title().to_ascii_lowercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_service() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/dashboard-stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total_students": 3})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/dataset-info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"columns": []})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/clustering"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "clusters": {"Risk_Level_0": 1, "Risk_Level_1": 1, "Risk_Level_2": 1, "Risk_Level_3": 0}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/risk-prediction"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "all_students": [
                    {"StudentID": 11, "AtRisk": true},
                    {"StudentID": 12, "AtRisk": false}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/recommendations/11"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        server
    }

    fn portal_for(server: &MockServer) -> Portal {
        let config = DashboardConfig::new(&server.uri(), Some(5), false).unwrap();
        Portal::new(AnalyticsClient::new(&config).unwrap(), Theme::plain())
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("  "), Ok(None));
        assert_eq!(parse_command("risk"), Ok(Some(Command::Open(Tab::Risk))));
        assert_eq!(
            parse_command("search  1001 "),
            Ok(Some(Command::Search("1001".into())))
        );
        assert_eq!(parse_command("search"), Ok(Some(Command::Search(String::new()))));
        assert_eq!(
            parse_command("filter Not At"),
            Ok(Some(Command::Filter("Not At".into())))
        );
        assert_eq!(parse_command("QUIT"), Ok(Some(Command::Quit)));
        assert!(parse_command("delete everything").is_err());
    }

    #[tokio::test]
    async fn commands_on_the_wrong_tab_are_hints() {
        let server = mock_service().await;
        let mut portal = portal_for(&server);

        let text = portal.handle(Command::Analyze).await.unwrap();
        assert!(text.starts_with("`analyze` is only available on the Risk tab"));
        assert_eq!(portal.tabs().active_tab(), Tab::Overview);
    }

    #[tokio::test]
    async fn risk_session_filters_locally() {
        let server = mock_service().await;
        let mut portal = portal_for(&server);

        portal.handle(Command::Open(Tab::Risk)).await;
        portal.handle(Command::Analyze).await;
        let text = portal.handle(Command::Filter("not".into())).await.unwrap();

        assert!(text.contains("2 students analyzed, showing 1 matching \"not\""));
        assert!(text.contains("[Not At Risk]"));
        assert!(!text.contains("| 11 "));
    }

    #[tokio::test]
    async fn scripted_session_runs_to_quit() {
        let server = mock_service().await;
        let mut portal = portal_for(&server);
        let script = b"recommendations\nsearch 11\nbogus\nquit\nrisk\n";
        let mut output = Vec::new();

        portal.run(&script[..], &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("- Total Students: 3"));
        assert!(text.contains("Student ID not found in database"));
        assert!(text.contains("unknown command: bogus"));
        assert_eq!(portal.tabs().active_tab(), Tab::Recommendations);
    }
}
