use url::Url;

use super::multipart::MultipartForm;
use super::{BackendHealth, InferenceBackend, PredictError, wire};
use crate::config::{ClientSettings, ConfigError};
use crate::http_client;
use crate::session::PredictionResult;

const PREDICT_PATH: &str = "predict/";
const UPLOAD_FIELD: &str = "file";
const UPLOAD_FILE_NAME: &str = "image.jpg";
const UPLOAD_CONTENT_TYPE: &str = "image/jpeg";

const MAX_ERROR_RESPONSE_BYTES: usize = 64 * 1024;
const MAX_PREDICTION_RESPONSE_BYTES: usize = 64 * 1024 * 1024;

/// Blocking HTTP client for the inference service.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    agent: ureq::Agent,
    root: Url,
}

impl HttpBackend {
    /// Build a client from settings, validating the backend URL.
    pub fn new(settings: &ClientSettings) -> Result<Self, ConfigError> {
        let root = settings.backend_url()?;
        let agent =
            http_client::build_agent(settings.connect_timeout(), settings.request_timeout());
        Ok(Self::with_agent(root, agent))
    }

    pub fn with_agent(mut root: Url, agent: ureq::Agent) -> Self {
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        Self { agent, root }
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    fn predict_url(&self) -> Result<Url, PredictError> {
        self.root
            .join(PREDICT_PATH)
            .map_err(|err| PredictError::Transport(err.to_string()))
    }
}

impl InferenceBackend for HttpBackend {
    fn check_health(&self) -> BackendHealth {
        match self.agent.get(self.root.as_str()).call() {
            Ok(response) if response.status() == 200 => {
                tracing::info!("Backend online at {}", self.root);
                BackendHealth::Healthy
            }
            Ok(response) => {
                let status = response.status();
                tracing::warn!("Backend at {} answered HTTP {status}", self.root);
                BackendHealth::Degraded { status }
            }
            Err(ureq::Error::Status(status, _)) => {
                tracing::warn!("Backend at {} answered HTTP {status}", self.root);
                BackendHealth::Degraded { status }
            }
            Err(ureq::Error::Transport(err)) => {
                tracing::error!("{err}");
                tracing::error!("Backend offline");
                BackendHealth::Unreachable {
                    reason: err.to_string(),
                }
            }
        }
    }

    fn predict(&self, jpeg: &[u8]) -> Result<PredictionResult, PredictError> {
        let url = self.predict_url()?;
        let mut form = MultipartForm::new();
        form.add_file(UPLOAD_FIELD, UPLOAD_FILE_NAME, UPLOAD_CONTENT_TYPE, jpeg);
        let content_type = form.content_type();
        let body = form.finish();

        tracing::info!("Submitting {} byte image to {url}", jpeg.len());
        let response = match self
            .agent
            .post(url.as_str())
            .set("Accept", "application/json")
            .set("Content-Type", &content_type)
            .send_bytes(&body)
        {
            Ok(response) => response,
            Err(ureq::Error::Status(400, response)) => {
                let body = http_client::read_response_bytes(response, MAX_ERROR_RESPONSE_BYTES)
                    .unwrap_or_default();
                let message = wire::decode_validation_message(&body);
                tracing::warn!("Prediction rejected: {message}");
                return Err(PredictError::Validation(message));
            }
            Err(ureq::Error::Status(status, _)) => {
                tracing::error!("Prediction failed with HTTP {status}");
                return Err(PredictError::Status(status));
            }
            Err(ureq::Error::Transport(err)) => {
                tracing::error!("Prediction request failed: {err}");
                return Err(PredictError::Transport(err.to_string()));
            }
        };

        let status = response.status();
        if status != 200 {
            tracing::error!("Prediction failed with HTTP {status}");
            return Err(PredictError::Status(status));
        }
        let body = http_client::read_response_bytes(response, MAX_PREDICTION_RESPONSE_BYTES)
            .map_err(|err| PredictError::Transport(err.to_string()))?;
        let result = wire::decode_prediction(&body).inspect_err(|err| {
            tracing::error!("{err}");
        })?;
        tracing::info!("Prediction: {}", result.label);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::test_server::{json_response, serve_once};
    use std::net::TcpListener;
    use std::time::Duration;

    fn backend(url: &str) -> HttpBackend {
        let agent = http_client::build_agent(Duration::from_secs(2), Duration::from_secs(5));
        HttpBackend::with_agent(Url::parse(url).unwrap(), agent)
    }

    #[test]
    fn root_gets_trailing_slash() {
        let backend = backend("http://localhost:8000/api");
        assert_eq!(backend.root().as_str(), "http://localhost:8000/api/");
        assert_eq!(
            backend.predict_url().unwrap().as_str(),
            "http://localhost:8000/api/predict/"
        );
    }

    #[test]
    fn health_200_is_healthy() {
        let (url, _rx) = serve_once(json_response("200 OK", r#"{"status":"ok"}"#));
        assert_eq!(backend(&url).check_health(), BackendHealth::Healthy);
    }

    #[test]
    fn health_other_status_is_degraded() {
        let (url, _rx) = serve_once(json_response("503 Service Unavailable", "{}"));
        assert_eq!(
            backend(&url).check_health(),
            BackendHealth::Degraded { status: 503 }
        );
    }

    #[test]
    fn health_non_200_success_is_degraded() {
        let (url, _rx) = serve_once(json_response("204 No Content", ""));
        assert_eq!(
            backend(&url).check_health(),
            BackendHealth::Degraded { status: 204 }
        );
    }

    #[test]
    fn health_connection_failure_is_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let health = backend(&format!("http://{addr}")).check_health();
        assert!(matches!(health, BackendHealth::Unreachable { .. }));
    }

    #[test]
    fn predict_posts_multipart_jpeg_and_decodes_result() {
        let body = format!(
            r#"{{"Prediction": "pituitary", "Inference": "{}", "Boundaries": "{}"}}"#,
            wire::encode_png(4, 4),
            wire::encode_png(4, 4)
        );
        let (url, rx) = serve_once(json_response("200 OK", &body));
        let result = backend(&url).predict(b"\xFF\xD8jpeg").unwrap();
        assert_eq!(result.label, "pituitary");
        assert_eq!(result.inference_image.dimensions(), (4, 4));

        let request = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        let text = String::from_utf8_lossy(&request);
        assert!(text.starts_with("POST /predict/ HTTP/1.1"));
        assert!(text.contains("multipart/form-data; boundary="));
        assert!(text.contains("name=\"file\"; filename=\"image.jpg\""));
        assert!(text.contains("Content-Type: image/jpeg"));
        assert!(text.contains("jpeg"));
    }

    #[test]
    fn predict_400_surfaces_error_field() {
        let (url, _rx) = serve_once(json_response(
            "400 Bad Request",
            r#"{"error": "Uploaded file is not an MRI scan"}"#,
        ));
        let err = backend(&url).predict(b"jpeg").unwrap_err();
        assert_eq!(
            err,
            PredictError::Validation("Uploaded file is not an MRI scan".into())
        );
    }

    #[test]
    fn predict_other_status_is_unstructured() {
        let (url, _rx) = serve_once(json_response(
            "500 Internal Server Error",
            r#"{"error": "boom"}"#,
        ));
        let err = backend(&url).predict(b"jpeg").unwrap_err();
        assert_eq!(err, PredictError::Status(500));
    }

    #[test]
    fn predict_malformed_body_is_invalid_response() {
        let (url, _rx) = serve_once(json_response("200 OK", "not json"));
        let err = backend(&url).predict(b"jpeg").unwrap_err();
        assert!(matches!(err, PredictError::InvalidResponse(_)));
    }
}
