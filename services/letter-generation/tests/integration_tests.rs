//! Letter Generation Integration Tests
//!
//! End-to-end tests against a running service instance. Start the service
//! (`cargo run -p pretenza-letter-generation`) before un-ignoring these.

/// Test configuration
pub struct TestConfig {
    pub base_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8087".to_string(),
        }
    }
}

fn csv_line(values: &[(usize, &str)]) -> String {
    let mut cells = vec![String::new(); 30];
    for (idx, value) in values {
        cells[*idx] = value.to_string();
    }
    cells.join(",")
}

fn sample_reporting_csv() -> String {
    let header = csv_line(&[]);
    // order id 6, contractor 9, descriptive 10-13, amount 16, planned 17
    let row = csv_line(&[
        (6, "ORD-5"),
        (9, "1234567890 ООО \"Ромашка\""),
        (10, "1"),
        (11, "Клапан"),
        (12, "шт"),
        (13, "4"),
        (16, "1000"),
        (17, "01.01.2020"),
    ]);
    format!("{}\n{}", header, row)
}

fn sample_registry_csv() -> String {
    let header = csv_line(&[]);
    // entity 2, join key 5, reg number 7, reg date 15
    let row = csv_line(&[
        (2, "Завод Прогресс"),
        (5, "ORD-5"),
        (7, "Д-2025/14"),
        (15, "20.01.2020"),
    ]);
    format!("{}\n{}", header, row)
}

#[tokio::test]
#[ignore] // Requires a running service
async fn test_full_letter_generation_workflow() {
    let config = TestConfig::default();
    let client = reqwest::Client::new();

    // Step 1: Upload both tables
    let form = reqwest::multipart::Form::new()
        .part(
            "reporting_file",
            reqwest::multipart::Part::bytes(sample_reporting_csv().into_bytes())
                .file_name("reporting.csv"),
        )
        .part(
            "registry_file",
            reqwest::multipart::Part::bytes(sample_registry_csv().into_bytes())
                .file_name("registry.csv"),
        );

    let upload = client
        .post(format!("{}/api/v1/letters/upload", config.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(upload.status().is_success());

    // Step 2: Process
    let process = client
        .post(format!("{}/api/v1/letters/process", config.base_url))
        .send()
        .await
        .unwrap();
    assert!(process.status().is_success());

    let body: serde_json::Value = process.json().await.unwrap();
    assert_eq!(body["letters_count"], 1);
    let first_file = body["files_generated"][0].as_str().unwrap().to_string();

    // Step 3: Download one document
    let file = client
        .get(format!(
            "{}/api/v1/letters/files/{}",
            config.base_url, first_file
        ))
        .send()
        .await
        .unwrap();
    assert!(file.status().is_success());
    let text = file.text().await.unwrap();
    assert!(text.contains("Ромашка"));

    // Step 4: Download the archive
    let archive = client
        .get(format!("{}/api/v1/letters/archive", config.base_url))
        .send()
        .await
        .unwrap();
    assert!(archive.status().is_success());
    assert_eq!(
        archive.headers()["content-type"].to_str().unwrap(),
        "application/zip"
    );

    // Step 5: Status reflects the run
    let status = client
        .get(format!("{}/api/v1/letters/status", config.base_url))
        .send()
        .await
        .unwrap();
    let status: serde_json::Value = status.json().await.unwrap();
    assert_eq!(status["reporting_file_uploaded"], true);
    assert_eq!(status["generated_letters_count"], 2);
}

#[tokio::test]
#[ignore] // Requires a running service
async fn test_upload_rejects_non_spreadsheet() {
    let config = TestConfig::default();
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new()
        .part(
            "reporting_file",
            reqwest::multipart::Part::bytes(b"%PDF-1.4".to_vec()).file_name("reporting.pdf"),
        )
        .part(
            "registry_file",
            reqwest::multipart::Part::bytes(sample_registry_csv().into_bytes())
                .file_name("registry.csv"),
        );

    let response = client
        .post(format!("{}/api/v1/letters/upload", config.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore] // Requires a running service
async fn test_health_endpoint() {
    let config = TestConfig::default();
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", config.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["service"], "letter-generation");
}
