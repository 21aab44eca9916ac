use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::MockServer;

/// Path at which the mock server answers instance discovery requests.
#[allow(dead_code)]
pub const DISCOVERY_PATH: &str = "/common/discovery/instance";

/// Authority on a host outside the well-known list.
#[allow(dead_code)]
pub const UNKNOWN_AUTHORITY: &str = "https://login.contoso.localhost/dummy.tenant.localhost";

/// Instance discovery endpoint served by `server`.
#[allow(dead_code)]
pub fn discovery_endpoint(server: &MockServer) -> String {
    format!("{}{}", server.uri(), DISCOVERY_PATH)
}

/// Minimal successful token endpoint response.
#[allow(dead_code)]
pub fn token_body(access_token: &str, expires_in: u64) -> serde_json::Value {
    serde_json::json!({
        "token_type": "Bearer",
        "expires_in": expires_in.to_string(),
        "ext_expires_in": expires_in.to_string(),
        "resource": "https://vault.azure.net",
        "access_token": access_token
    })
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("adal.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
