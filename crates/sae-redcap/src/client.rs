//! Blocking REDCap API client.
//!
//! Every call is a form-encoded `POST` to the project's API endpoint,
//! authenticated by the project token.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, USER_AGENT};
use sae_model::{Assignment, SaeRecord};
use tracing::{debug, info};

use crate::error::{GatewayError, Result};
use crate::form::{
    COMPLETE_FIELD, RECORD_ID_FIELD, REPORT_TYPE_FIELD, RedcapForm, SAE_NUMBER_FIELD,
    STUDY_NUMBER_FIELD,
};
use crate::gateway::{ImportOutcome, SaeGateway};
use crate::rows::{
    ErrorResponse, ImportResponse, ImportRow, SaeRow, StudyNumberRow, sae_records, study_numbers,
};

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent string for API requests.
const USER_AGENT_VALUE: &str = concat!("sae-numbering/", env!("CARGO_PKG_VERSION"));

type Params = Vec<(String, String)>;

/// Client for one REDCap project.
pub struct RedcapClient {
    client: Client,
    api_url: String,
    token: String,
    form: RedcapForm,
}

impl RedcapClient {
    /// Create a client for the project behind `token`.
    pub fn new(
        api_url: impl Into<String>,
        token: impl Into<String>,
        form: RedcapForm,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            token: token.into(),
            form,
        })
    }

    pub fn form(&self) -> &RedcapForm {
        &self.form
    }

    fn base_params(&self, content: &str) -> Params {
        vec![
            ("token".to_string(), self.token.clone()),
            ("content".to_string(), content.to_string()),
            ("format".to_string(), "json".to_string()),
            ("type".to_string(), "flat".to_string()),
            ("returnFormat".to_string(), "json".to_string()),
        ]
    }

    fn post(&self, params: &Params) -> Result<String> {
        let response = self
            .client
            .post(&self.api_url)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(ACCEPT, "application/json")
            .form(params)
            .send()?;
        handle_response(response)
    }
}

impl fmt::Debug for RedcapClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedcapClient")
            .field("api_url", &self.api_url)
            .field("token", &"[REDACTED]")
            .field("form", &self.form)
            .finish_non_exhaustive()
    }
}

impl SaeGateway for RedcapClient {
    fn fetch_completed_sae_reports(&self) -> Result<Vec<SaeRecord>> {
        let fields = [
            RECORD_ID_FIELD,
            SAE_NUMBER_FIELD,
            REPORT_TYPE_FIELD,
            COMPLETE_FIELD,
        ];
        let params = export_params(
            self.base_params("record"),
            &fields,
            &[],
            &self.form.completed_filter(),
        );
        debug!(filter = %self.form.completed_filter(), "exporting completed SAE reports");

        let body = self.post(&params)?;
        let rows: Vec<SaeRow> = serde_json::from_str(&body)?;
        sae_records(rows, &self.form.repeat_instrument)
    }

    fn fetch_study_numbers(&self, record_ids: &[String]) -> Result<BTreeMap<String, String>> {
        let params = export_params(
            self.base_params("record"),
            &[RECORD_ID_FIELD, STUDY_NUMBER_FIELD],
            record_ids,
            &self.form.study_number_filter(),
        );
        debug!(records = record_ids.len(), "exporting study numbers");

        let body = self.post(&params)?;
        let rows: Vec<StudyNumberRow> = serde_json::from_str(&body)?;
        Ok(study_numbers(rows))
    }

    fn persist_sae_numbers(&self, assignments: &[Assignment]) -> Result<ImportOutcome> {
        if assignments.is_empty() {
            return Ok(ImportOutcome::default());
        }
        let rows: Vec<ImportRow<'_>> = assignments.iter().map(ImportRow::from).collect();
        let mut params = self.base_params("record");
        params.push(("overwriteBehavior".to_string(), "normal".to_string()));
        params.push(("returnContent".to_string(), "count".to_string()));
        params.push(("data".to_string(), serde_json::to_string(&rows)?));

        let body = self.post(&params)?;
        let response: ImportResponse = serde_json::from_str(&body)?;
        let outcome = ImportOutcome::new(assignments, response.count);
        info!(response = %body.trim(), "import response");
        Ok(outcome)
    }
}

/// Add field, record and filter selections to an export request.
fn export_params(mut params: Params, fields: &[&str], records: &[String], filter: &str) -> Params {
    for (idx, field) in fields.iter().enumerate() {
        params.push((format!("fields[{idx}]"), (*field).to_string()));
    }
    for (idx, record) in records.iter().enumerate() {
        params.push((format!("records[{idx}]"), record.clone()));
    }
    params.push(("filterLogic".to_string(), filter.to_string()));
    params
}

/// Check the status and return the body, mapping REDCap error payloads.
fn handle_response(response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text()?;
    if status.is_success() {
        return Ok(body);
    }

    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.error)
        .unwrap_or_else(|_| body.trim().to_string());
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(GatewayError::Unauthorized(message));
    }
    Err(GatewayError::Api {
        status: status.as_u16(),
        message,
    })
}
