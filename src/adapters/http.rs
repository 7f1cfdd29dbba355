use crate::config::toml_config::BackendConfig;
use crate::core::collector::extract_ref_id;
use crate::domain::model::{
    EntityId, RankingScope, RawEntry, SchoolClass, Student, Subject, TermReport,
};
use crate::domain::ports::{
    ClassSource, EntrySource, PositionStore, RosterSource, SubjectSource, TermReportSource,
};
use crate::utils::error::{RankingError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointPaths {
    pub students: String,
    pub classes: String,
    pub subjects: String,
    pub term_reports: String,
    pub entries: String,
    pub calculate_positions: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            students: "students/".to_string(),
            classes: "classes/".to_string(),
            subjects: "subjects/".to_string(),
            term_reports: "term-reports/".to_string(),
            entries: "result-entries/".to_string(),
            calculate_positions: "report-cards/calculate-positions/".to_string(),
        }
    }
}

/// School records REST API.
///
/// List endpoints may answer with a bare array or a paginated
/// `{"results": [...], "next": ...}` envelope; `next` links are followed.
#[derive(Debug, Clone)]
pub struct RestBackend {
    client: Client,
    base_url: Url,
    endpoints: EndpointPaths,
    headers: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl RestBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        // Url::join drops the last segment unless the base ends with '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized).map_err(|e| RankingError::InvalidConfigValueError {
            field: "backend.base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;

        Ok(Self {
            client: Client::new(),
            base_url,
            endpoints: EndpointPaths::default(),
            headers: HashMap::new(),
            timeout: None,
        })
    }

    pub fn from_config(config: &BackendConfig, endpoints: EndpointPaths) -> Result<Self> {
        let mut backend = Self::new(&config.base_url)?.with_endpoints(endpoints);
        if let Some(headers) = &config.headers {
            backend.headers = headers.clone();
        }
        backend.timeout = config.timeout_seconds.map(Duration::from_secs);
        Ok(backend)
    }

    pub fn with_endpoints(mut self, endpoints: EndpointPaths) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| RankingError::InvalidConfigValueError {
                field: "backend.endpoints".to_string(),
                value: path.to_string(),
                reason: format!("Cannot join with base URL: {}", e),
            })
    }

    fn prepare(&self, mut request: RequestBuilder) -> RequestBuilder {
        for (key, value) in &self.headers {
            request = request.header(key, value);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        request
    }

    async fn get_list(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<Value>> {
        let mut url = self.endpoint(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        let mut items = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(url);

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                return Err(RankingError::MalformedResponse {
                    endpoint: url.path().to_string(),
                    message: format!("pagination loops back to '{}'", url),
                });
            }
            tracing::debug!("📡 GET {}", url);
            let response = self.prepare(self.client.get(url.clone())).send().await?;
            let status = response.status();
            tracing::debug!("📡 {} -> {}", url.path(), status);

            if !status.is_success() {
                return Err(RankingError::BackendStatus {
                    endpoint: url.path().to_string(),
                    status: status.as_u16(),
                });
            }

            let body: Value = response.json().await?;
            let (page, next_link) = split_envelope(body).ok_or_else(|| {
                RankingError::MalformedResponse {
                    endpoint: url.path().to_string(),
                    message: "expected a JSON array or an object with `results`".to_string(),
                }
            })?;
            items.extend(page);

            next = match next_link {
                Some(link) => Some(url.join(&link).map_err(|e| {
                    RankingError::MalformedResponse {
                        endpoint: url.path().to_string(),
                        message: format!("invalid `next` link '{}': {}", link, e),
                    }
                })?),
                None => None,
            };
        }

        Ok(items)
    }
}

fn split_envelope(body: Value) -> Option<(Vec<Value>, Option<String>)> {
    match body {
        Value::Array(items) => Some((items, None)),
        Value::Object(mut obj) => {
            let next = obj
                .get("next")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            match obj.remove("results") {
                Some(Value::Array(items)) => Some((items, next)),
                _ => None,
            }
        }
        _ => None,
    }
}

fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn parse_student(value: &Value) -> Option<Student> {
    let obj = value.as_object()?;
    let id = extract_ref_id(obj.get("id")?)?;
    let name = text_field(obj, &["name", "full_name"]).or_else(|| {
        let first = text_field(obj, &["first_name"])?;
        Some(match text_field(obj, &["last_name"]) {
            Some(last) => format!("{} {}", first, last),
            None => first,
        })
    })?;
    let class_name = text_field(obj, &["class_name"]).or_else(|| {
        obj.get("current_class")
            .and_then(Value::as_object)
            .and_then(|class| text_field(class, &["name"]))
    });

    Some(Student {
        id,
        name,
        class_name,
    })
}

fn parse_named(value: &Value) -> Option<(EntityId, String)> {
    let obj = value.as_object()?;
    let id = extract_ref_id(obj.get("id")?)?;
    let name = text_field(obj, &["name"])?;
    Some((id, name))
}

fn parse_term_report(value: &Value) -> Option<TermReport> {
    let obj = value.as_object()?;
    let id = extract_ref_id(obj.get("id")?)?;
    let term = match obj.get("term")? {
        Value::Number(n) => u32::try_from(n.as_u64()?).ok()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    let academic_year = text_field(obj, &["academic_year"])?;
    Some(TermReport {
        id,
        term,
        academic_year,
    })
}

fn parse_all<T>(kind: &str, values: Vec<Value>, parse: impl Fn(&Value) -> Option<T>) -> Vec<T> {
    let total = values.len();
    let parsed: Vec<T> = values.iter().filter_map(parse).collect();
    if parsed.len() < total {
        tracing::warn!(
            "⚠️ Ignored {} of {} {} records with missing fields",
            total - parsed.len(),
            total,
            kind
        );
    }
    parsed
}

#[async_trait]
impl RosterSource for RestBackend {
    async fn roster(&self, class_id: &EntityId) -> Result<Vec<Student>> {
        let values = self
            .get_list(&self.endpoints.students, &[("class_id", class_id.to_string())])
            .await?;
        Ok(parse_all("student", values, parse_student))
    }
}

#[async_trait]
impl TermReportSource for RestBackend {
    async fn term_reports(&self, term: u32, academic_year: &str) -> Result<Vec<TermReport>> {
        let values = self
            .get_list(
                &self.endpoints.term_reports,
                &[
                    ("term", term.to_string()),
                    ("academic_year", academic_year.to_string()),
                ],
            )
            .await?;
        Ok(parse_all("term report", values, parse_term_report))
    }

    async fn all_term_reports(&self) -> Result<Vec<TermReport>> {
        let values = self.get_list(&self.endpoints.term_reports, &[]).await?;
        Ok(parse_all("term report", values, parse_term_report))
    }
}

#[async_trait]
impl EntrySource for RestBackend {
    async fn entries(&self, term_report_ids: &[EntityId]) -> Result<Vec<RawEntry>> {
        let joined = term_report_ids
            .iter()
            .map(EntityId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let values = self
            .get_list(&self.endpoints.entries, &[("term_report__in", joined)])
            .await?;

        Ok(parse_all("result entry", values, |value| {
            RawEntry::deserialize(value).ok()
        }))
    }
}

#[async_trait]
impl SubjectSource for RestBackend {
    async fn subjects(&self) -> Result<Vec<Subject>> {
        let values = self.get_list(&self.endpoints.subjects, &[]).await?;
        Ok(parse_all("subject", values, parse_named)
            .into_iter()
            .map(|(id, name)| Subject { id, name })
            .collect())
    }
}

#[async_trait]
impl ClassSource for RestBackend {
    async fn classes(&self) -> Result<Vec<SchoolClass>> {
        let values = self.get_list(&self.endpoints.classes, &[]).await?;
        Ok(parse_all("class", values, parse_named)
            .into_iter()
            .map(|(id, name)| SchoolClass { id, name })
            .collect())
    }
}

#[async_trait]
impl PositionStore for RestBackend {
    async fn recompute_positions(&self, scope: &RankingScope) -> Result<()> {
        let url = self.endpoint(&self.endpoints.calculate_positions)?;
        let body = json!({
            "class_id": scope.class_id,
            "term": scope.term,
            "academic_year": scope.academic_year,
        });

        tracing::debug!("📡 POST {}", url);
        let response = self
            .prepare(self.client.post(url.clone()).json(&body))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RankingError::PersistError {
                message: format!("{} returned {}", url.path(), status),
            });
        }
        Ok(())
    }
}
