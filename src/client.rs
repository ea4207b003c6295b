use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::DashboardConfig;
use crate::error::ApiError;
use crate::models::{
    ClusterSummary, DashboardStats, DatasetInfo, RiskAssessment, RiskPrediction,
    StudentRecommendation,
};

#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AnalyticsClient {
    pub fn new(config: &DashboardConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.call(Method::GET, &["api", "dashboard-stats"]).await
    }

    pub async fn dataset_info(&self) -> Result<DatasetInfo, ApiError> {
        self.call(Method::GET, &["api", "dataset-info"]).await
    }

    /// Looks up recommendations for one student. A 404 becomes
    /// [`ApiError::NotFound`]; every other failure stays generic.
    pub async fn recommendations(
        &self,
        student_id: &str,
    ) -> Result<StudentRecommendation, ApiError> {
        match self
            .call(Method::POST, &["api", "recommendations", student_id])
            .await
        {
            Err(ApiError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Err(ApiError::NotFound {
                    student_id: student_id.to_string(),
                })
            }
            other => other,
        }
    }

    pub async fn clustering(&self) -> Result<ClusterSummary, ApiError> {
        self.call(Method::POST, &["api", "clustering"]).await
    }

    pub async fn risk_predictions(&self) -> Result<Vec<RiskPrediction>, ApiError> {
        let assessment: RiskAssessment = self.call(Method::POST, &["api", "risk-prediction"]).await?;
        Ok(assessment.all_students)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        let endpoint = url.path().to_string();
        tracing::debug!(%method, %endpoint, "sending analytics request");

        let mut request = self.http.request(method.clone(), url);
        // Only POSTs declare a JSON content type; GETs go out bare.
        if method == Method::POST {
            request = request.header(CONTENT_TYPE, "application/json");
        }

        let resp = request
            .send()
            .await
            .map_err(|source| {
                tracing::warn!(%endpoint, "analytics request failed: {source}");
                ApiError::Transport {
                    endpoint: endpoint.clone(),
                    source,
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%endpoint, status = status.as_u16(), "analytics service returned an error");
            return Err(ApiError::Status {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<T>()
            .await
            .map_err(|source| ApiError::Decode { endpoint, source })
    }
}
