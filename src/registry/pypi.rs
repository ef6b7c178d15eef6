use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{get_json, LicenseField, LicenseRegistry, RegistryError};

/// Longer `license` values are almost always the full license text.
const MAX_LICENSE_FIELD_LEN: usize = 100;

#[derive(Debug, Deserialize)]
struct PypiProject {
    info: PypiInfo,
}

#[derive(Debug, Default, Deserialize)]
struct PypiInfo {
    #[serde(default)]
    license: Option<String>,
    #[serde(default)]
    license_expression: Option<String>,
    #[serde(default)]
    classifiers: Option<Vec<String>>,
}

/// Client for the PyPI JSON API (`GET /pypi/{name}/json`, latest release).
pub struct PypiRegistry {
    client: Client,
    base_url: String,
}

impl PypiRegistry {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl LicenseRegistry for PypiRegistry {
    async fn fetch_license(&self, name: &str) -> Result<LicenseField, RegistryError> {
        let url = format!("{}/pypi/{}/json", self.base_url, name);
        let data = get_json(&self.client, &url).await?;
        let project: PypiProject =
            serde_json::from_value(data).map_err(|e| RegistryError::Malformed(e.to_string()))?;

        Ok(extract_license(&project.info))
    }
}

/// Pick the license from PyPI metadata.
///
/// Priority: `license` (short, single line, not "UNKNOWN") → `license_expression`
/// → the `License :: ...` classifiers.
fn extract_license(info: &PypiInfo) -> LicenseField {
    let license = info.license.as_deref().map(str::trim).filter(|l| {
        !l.is_empty()
            && !l.eq_ignore_ascii_case("unknown")
            && !l.contains('\n')
            && l.len() <= MAX_LICENSE_FIELD_LEN
    });
    if let Some(license) = license {
        return LicenseField::Text(license.to_string());
    }

    let expression = info
        .license_expression
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());
    if let Some(expression) = expression {
        return LicenseField::Text(expression.to_string());
    }

    let mut names: Vec<&str> = Vec::new();
    for name in info
        .classifiers
        .iter()
        .flatten()
        .filter(|c| c.starts_with("License ::"))
        .filter_map(|c| c.rsplit("::").next().map(str::trim))
        .filter(|name| !name.is_empty() && *name != "OSI Approved")
    {
        if !names.contains(&name) {
            names.push(name);
        }
    }

    // Several license classifiers mean a choice of licenses; joined with OR
    // they classify as compound rather than as whichever came first.
    match names.as_slice() {
        [] => LicenseField::Absent,
        [single] => LicenseField::Classifier(single.to_string()),
        several => LicenseField::Classifier(several.join(" OR ")),
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use tiny_http::{Response, Server};

    use super::*;
    use crate::config::RegistrySettings;
    use crate::models::{Dependency, Ecosystem};
    use crate::registry::testing::FakeRegistry;
    use crate::registry::Resolver;

    fn info(license: Option<&str>, expression: Option<&str>, classifiers: &[&str]) -> PypiInfo {
        PypiInfo {
            license: license.map(str::to_string),
            license_expression: expression.map(str::to_string),
            classifiers: Some(classifiers.iter().map(|c| c.to_string()).collect()),
        }
    }

    fn local_client() -> Client {
        Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap()
    }

    #[test]
    fn test_license_field_wins() {
        let field = extract_license(&info(
            Some("MIT"),
            Some("Apache-2.0"),
            &["License :: OSI Approved :: BSD License"],
        ));
        assert_eq!(field, LicenseField::Text("MIT".to_string()));
    }

    #[test]
    fn test_expression_fallback() {
        let field = extract_license(&info(Some(""), Some("Apache-2.0"), &[]));
        assert_eq!(field, LicenseField::Text("Apache-2.0".to_string()));
    }

    #[test]
    fn test_classifier_fallback() {
        let field = extract_license(&info(
            Some("UNKNOWN"),
            None,
            &[
                "Programming Language :: Python :: 3",
                "License :: OSI Approved :: BSD License",
            ],
        ));
        assert_eq!(field, LicenseField::Classifier("BSD License".to_string()));
    }

    #[test]
    fn test_full_license_text_is_skipped() {
        let text = "MIT License\n\nCopyright (c) 2020 Someone\n\nPermission is hereby granted...";
        let field = extract_license(&info(
            Some(text),
            None,
            &["License :: OSI Approved :: MIT License"],
        ));
        assert_eq!(field, LicenseField::Classifier("MIT License".to_string()));
    }

    #[test]
    fn test_several_classifiers_are_joined() {
        let field = extract_license(&info(
            None,
            None,
            &[
                "License :: OSI Approved :: GNU General Public License v3 (GPLv3)",
                "License :: OSI Approved :: MIT License",
                "License :: OSI Approved :: MIT License",
            ],
        ));
        assert_eq!(
            field,
            LicenseField::Classifier(
                "GNU General Public License v3 (GPLv3) OR MIT License".to_string()
            )
        );

        let classifier = crate::license::classifier::LicenseClassifier::new().unwrap();
        assert_eq!(classifier.classify(field.into_raw().as_deref()), "UNKNOWN");
    }

    #[test]
    fn test_bare_osi_classifier_is_ignored() {
        let field = extract_license(&info(None, None, &["License :: OSI Approved"]));
        assert_eq!(field, LicenseField::Absent);
    }

    #[test]
    fn test_nothing_is_absent() {
        assert_eq!(extract_license(&PypiInfo::default()), LicenseField::Absent);
    }

    #[tokio::test]
    async fn test_fetch_from_local_server() {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let handle = thread::spawn(move || {
            let request = server.recv().unwrap();
            assert_eq!(request.url(), "/pypi/requests/json");
            let body = r#"{"info": {"name": "requests", "license": "Apache 2.0", "classifiers": []}}"#;
            request.respond(Response::from_string(body)).unwrap();
        });

        let registry = PypiRegistry::new(local_client(), &format!("http://{}/", addr));
        let field = registry.fetch_license("requests").await.unwrap();
        handle.join().unwrap();

        assert_eq!(field, LicenseField::Text("Apache 2.0".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let handle = thread::spawn(move || {
            let request = server.recv().unwrap();
            let _ = request.respond(Response::from_string("Not Found").with_status_code(404));
        });

        let registry = PypiRegistry::new(local_client(), &format!("http://{}", addr));
        let err = registry.fetch_license("no-such-package").await.unwrap_err();
        handle.join().unwrap();

        assert!(matches!(err, RegistryError::NotFound));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let handle = thread::spawn(move || {
            let request = server.recv().unwrap();
            let _ = request.respond(Response::from_string("<html>oops</html>"));
        });

        let registry = PypiRegistry::new(local_client(), &format!("http://{}", addr));
        let err = registry.fetch_license("requests").await.unwrap_err();
        handle.join().unwrap();

        assert!(matches!(err, RegistryError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_transient() {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let handle = thread::spawn(move || {
            let request = server.recv().unwrap();
            let _ = request.respond(Response::from_string("busy").with_status_code(503));
        });

        let registry = PypiRegistry::new(local_client(), &format!("http://{}", addr));
        let err = registry.fetch_license("requests").await.unwrap_err();
        handle.join().unwrap();

        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_resolver_retries_after_service_unavailable() {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let handle = thread::spawn(move || {
            let first = server.recv().unwrap();
            let _ = first.respond(Response::from_string("busy").with_status_code(503));

            let second = server.recv().unwrap();
            let body = r#"{"info": {"name": "requests", "license": "Apache 2.0"}}"#;
            let _ = second.respond(Response::from_string(body));
        });

        let settings = RegistrySettings {
            timeout_ms: 5_000,
            retries: 1,
            ..RegistrySettings::default()
        };
        let registry = PypiRegistry::new(local_client(), &format!("http://{}", addr));
        let resolver = Resolver::new(registry, FakeRegistry::new(), &settings)
            .with_backoff(Duration::from_millis(1));

        let dep = Dependency::new("requests", None, Ecosystem::Python);
        let info = resolver.resolve(&dep).await;
        handle.join().unwrap();

        assert_eq!(info.raw_license_text.as_deref(), Some("Apache 2.0"));
        assert!(info.lookup_error.is_none());
    }
}
