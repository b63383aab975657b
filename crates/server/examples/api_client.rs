//! Calls a locally running adfp server.
//!
//! Start the server first (`cargo run -p adfp-server`), then
//! `cargo run -p adfp-server --example api_client`.

use reqwest::Client;
use serde_json::{json, Value};

const SERVER_URL: &str = "http://localhost:8080";
const API_KEY: &str = "demo-key-12345";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();

    println!("1. Health Check:");
    let resp = client.get(format!("{SERVER_URL}/health")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("2. Compare competitor images against campaign creatives:");
    let resp = client
        .post(format!("{SERVER_URL}/api/v1/images/compare"))
        .header("X-API-Key", API_KEY)
        .json(&json!({
            "image_urls": [
                "https://upload.wikimedia.org/wikipedia/commons/4/47/PNG_transparency_demonstration_1.png",
                "https://upload.wikimedia.org/wikipedia/commons/3/3f/Fronalpstock_big.jpg",
                "https://example.com/not-an-image"
            ],
            "compare_with_reference_id": "campaign-42"
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    let body: Value = resp.json().await?;
    println!("Body: {}", serde_json::to_string_pretty(&body)?);
    println!();

    println!("3. Distance between two stored fingerprints:");
    let resp = client
        .post(format!("{SERVER_URL}/api/v1/images/distance"))
        .header("Authorization", format!("Bearer {API_KEY}"))
        .json(&json!({ "a": "c3d1e0f0f8783c1e", "b": "c3d1e0f0f8783c1f" }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("4. Missing API key:");
    let resp = client
        .post(format!("{SERVER_URL}/api/v1/images/compare"))
        .json(&json!({ "image_urls": [] }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);

    Ok(())
}
