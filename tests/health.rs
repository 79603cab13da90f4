mod common;

use reqwest::Client;

#[tokio::test]
async fn test_health_check_works() {
    let addr = common::spawn_server().await;

    let response = Client::new()
        .get(format!("{addr}/health"))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "healthy");
}
