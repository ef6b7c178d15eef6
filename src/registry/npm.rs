use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{get_json, LicenseField, LicenseRegistry, RegistryError};

/// Client for the npm registry (`GET /{name}/latest`).
pub struct NpmRegistry {
    client: Client,
    base_url: String,
}

impl NpmRegistry {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl LicenseRegistry for NpmRegistry {
    async fn fetch_license(&self, name: &str) -> Result<LicenseField, RegistryError> {
        // Scoped packages need URL encoding: @scope/pkg → %40scope%2Fpkg
        let encoded_name = name.replace('@', "%40").replace('/', "%2F");
        let url = format!("{}/{}/latest", self.base_url, encoded_name);

        let data = get_json(&self.client, &url).await?;
        if !data.is_object() {
            return Err(RegistryError::Malformed(
                "expected a JSON object".to_string(),
            ));
        }

        Ok(extract_license(&data))
    }
}

/// Read `license` (string or `{type, url}`), falling back to the legacy
/// `licenses` array. Several legacy entries are joined with `OR`.
fn extract_license(manifest: &Value) -> LicenseField {
    match manifest.get("license") {
        Some(Value::String(text)) => return LicenseField::Text(text.clone()),
        Some(Value::Object(record)) => {
            return LicenseField::Structured {
                kind: record.get("type").and_then(Value::as_str).map(str::to_string),
            }
        }
        _ => {}
    }

    let legacy: Vec<&str> = manifest
        .get("licenses")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| match entry {
                    Value::String(text) => Some(text.as_str()),
                    Value::Object(record) => record.get("type").and_then(Value::as_str),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    match legacy.as_slice() {
        [] => LicenseField::Absent,
        [single] => LicenseField::Text(single.to_string()),
        several => LicenseField::Text(several.join(" OR ")),
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use serde_json::json;
    use tiny_http::{Response, Server};

    use super::*;

    #[test]
    fn test_string_license() {
        let field = extract_license(&json!({"name": "express", "license": "MIT"}));
        assert_eq!(field, LicenseField::Text("MIT".to_string()));
    }

    #[test]
    fn test_structured_license() {
        let field = extract_license(&json!({
            "license": {"type": "BSD-3-Clause", "url": "https://opensource.org/licenses/BSD-3-Clause"}
        }));
        assert_eq!(
            field,
            LicenseField::Structured {
                kind: Some("BSD-3-Clause".to_string()),
            }
        );
    }

    #[test]
    fn test_legacy_licenses_array() {
        let single = extract_license(&json!({"licenses": [{"type": "MIT", "url": "x"}]}));
        assert_eq!(single, LicenseField::Text("MIT".to_string()));

        let dual = extract_license(&json!({"licenses": [{"type": "MIT"}, {"type": "Apache-2.0"}]}));
        assert_eq!(dual, LicenseField::Text("MIT OR Apache-2.0".to_string()));
    }

    #[test]
    fn test_missing_license() {
        assert_eq!(extract_license(&json!({"name": "x"})), LicenseField::Absent);
        assert_eq!(extract_license(&json!({"license": 42})), LicenseField::Absent);
    }

    #[tokio::test]
    async fn test_fetch_scoped_package() {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let handle = thread::spawn(move || {
            let request = server.recv().unwrap();
            let url = request.url().to_string();
            let body = r#"{"name": "@babel/core", "version": "7.24.0", "license": "MIT"}"#;
            request.respond(Response::from_string(body)).unwrap();
            url
        });

        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        let registry = NpmRegistry::new(client, &format!("http://{}", addr));
        let field = registry.fetch_license("@babel/core").await.unwrap();
        let url = handle.join().unwrap();

        assert_eq!(url, "/%40babel%2Fcore/latest");
        assert_eq!(field, LicenseField::Text("MIT".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let handle = thread::spawn(move || {
            let request = server.recv().unwrap();
            thread::sleep(Duration::from_millis(500));
            let _ = request.respond(Response::from_string(r#"{"license": "MIT"}"#));
        });

        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();
        let registry = NpmRegistry::new(client, &format!("http://{}", addr));
        let err = registry.fetch_license("left-pad").await.unwrap_err();
        handle.join().unwrap();

        assert!(matches!(err, RegistryError::Transport(_)));
        assert!(err.is_transient());
    }
}
