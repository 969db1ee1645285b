use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{ClientError, PatientApi};
use crate::models::{NewPatient, Patient, PatientUpdate};

/// Blocking HTTP client for the `/api/patients` resource.
pub struct HttpPatientApi {
    base_url: String,
    client: Client,
    timeout_secs: u64,
}

/// Error body produced by the server (`{"error": {"code", "message"}}`).
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Deserialize)]
struct ErrorPayload {
    message: String,
}

impl HttpPatientApi {
    /// Create a client pointing at a server root such as `http://localhost:5001`.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    /// Local server on the default port with a 30-second timeout.
    pub fn default_local() -> Result<Self, ClientError> {
        Self::new(
            &format!("http://localhost:{}", crate::config::DEFAULT_PORT),
            30,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/api/patients", self.base_url)
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/api/patients/{id}", self.base_url)
    }

    fn send_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_connect() {
            ClientError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            ClientError::Transport(format!("Request timed out after {}s", self.timeout_secs))
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

/// Turn a non-success response into a `ClientError`, keeping the
/// server's message when it sent the structured error body.
fn check_status(response: Response, id: Option<i64>) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return Err(ClientError::NotFound(id));
        }
    }

    let body = response.text().unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    response
        .json()
        .map_err(|e| ClientError::ResponseParsing(e.to_string()))
}

impl PatientApi for HttpPatientApi {
    fn list_patients(&self) -> Result<Vec<Patient>, ClientError> {
        let response = self
            .client
            .get(self.collection_url())
            .send()
            .map_err(|e| self.send_error(e))?;
        parse_json(check_status(response, None)?)
    }

    fn create_patient(&self, data: &NewPatient) -> Result<Patient, ClientError> {
        let response = self
            .client
            .post(self.collection_url())
            .json(data)
            .send()
            .map_err(|e| self.send_error(e))?;
        parse_json(check_status(response, None)?)
    }

    fn update_patient(&self, id: i64, data: &PatientUpdate) -> Result<Patient, ClientError> {
        let response = self
            .client
            .put(self.item_url(id))
            .json(data)
            .send()
            .map_err(|e| self.send_error(e))?;
        parse_json(check_status(response, Some(id))?)
    }

    fn delete_patient(&self, id: i64) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(self.item_url(id))
            .send()
            .map_err(|e| self.send_error(e))?;
        check_status(response, Some(id))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::sync::Arc;

    use chrono::NaiveDate;

    use super::*;
    use crate::api::start_api_server_on;
    use crate::client::store::{PatientStore, FETCH_ERROR};
    use crate::core_state::CoreState;
    use crate::models::{Address, PatientStatus};

    fn new_patient(first: &str, last: &str) -> NewPatient {
        NewPatient {
            first_name: first.into(),
            middle_name: None,
            last_name: last.into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            status: PatientStatus::Active,
            address: Address {
                street: "1 A St".into(),
                city: "X".into(),
                state: "CA".into(),
                zip_code: "00000".into(),
            },
        }
    }

    #[test]
    fn base_url_is_trimmed() {
        let api = HttpPatientApi::new("http://localhost:5001/", 5).unwrap();
        assert_eq!(api.base_url(), "http://localhost:5001");
        assert_eq!(api.collection_url(), "http://localhost:5001/api/patients");
        assert_eq!(api.item_url(7), "http://localhost:5001/api/patients/7");
    }

    #[test]
    fn default_local_targets_default_port() {
        let api = HttpPatientApi::default_local().unwrap();
        assert_eq!(api.base_url(), "http://localhost:5001");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn store_round_trip_over_http() {
        let core = Arc::new(CoreState::in_memory().unwrap());
        let mut server = start_api_server_on(
            core,
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
        )
        .await
        .expect("server should start");
        let base_url = server.base_url();

        tokio::task::spawn_blocking(move || {
            let api = HttpPatientApi::new(&base_url, 5).unwrap();
            let mut store = PatientStore::new(api);

            store.fetch_patients().unwrap();
            assert_eq!(store.total_patients(), 0);

            let zed = store.create_patient(&new_patient("Ann", "Zed")).unwrap();
            let adams = store.create_patient(&new_patient("Bob", "Adams")).unwrap();
            assert_eq!(store.total_patients(), 2);
            // Prepended in creation order, sorted view is separate
            assert_eq!(store.patients()[0].id, adams.id);
            let sorted = store.patients_sorted_by_name();
            assert_eq!(sorted[0].last_name, "Adams");

            let updated = store
                .update_patient(zed.id, &PatientUpdate::status(PatientStatus::Churned))
                .unwrap();
            assert_eq!(updated.status, PatientStatus::Churned);
            assert_eq!(updated.created_at, zed.created_at);

            store.delete_patient(adams.id).unwrap();
            assert_eq!(store.total_patients(), 1);

            let err = store.delete_patient(adams.id).unwrap_err();
            assert!(matches!(err, ClientError::NotFound(id) if id == adams.id));
            assert_eq!(store.total_patients(), 1);

            store.fetch_patients().unwrap();
            assert_eq!(store.total_patients(), 1);
            assert_eq!(store.patients()[0].status, PatientStatus::Churned);
        })
        .await
        .unwrap();

        server.shutdown();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn validation_error_carries_server_message() {
        let core = Arc::new(CoreState::in_memory().unwrap());
        let mut server = start_api_server_on(
            core,
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
        )
        .await
        .expect("server should start");
        let base_url = server.base_url();

        tokio::task::spawn_blocking(move || {
            let api = HttpPatientApi::new(&base_url, 5).unwrap();
            let err = api.create_patient(&new_patient("", "Zed")).unwrap_err();
            match err {
                ClientError::Status { status, message } => {
                    assert_eq!(status, 400);
                    assert!(message.contains("firstName"));
                }
                other => panic!("expected Status error, got {other:?}"),
            }
        })
        .await
        .unwrap();

        server.shutdown();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unreachable_server_fails_fetch() {
        // Bind then drop to get a port nobody listens on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        tokio::task::spawn_blocking(move || {
            let api = HttpPatientApi::new(&format!("http://127.0.0.1:{port}"), 2).unwrap();
            let mut store = PatientStore::new(api);

            let err = store.fetch_patients().unwrap_err();
            assert!(matches!(
                err,
                ClientError::Connection(_) | ClientError::Transport(_)
            ));
            assert_eq!(store.error(), Some(FETCH_ERROR));
            assert!(!store.is_loading());
        })
        .await
        .unwrap();
    }
}
