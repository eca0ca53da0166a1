use serde_json::{json, Value};
use tokio::process::Command;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CREDENTIALS: [&str; 4] = [
    "SOURCE_KRAKEN_FUTURES_KEY",
    "SOURCE_KRAKEN_FUTURES_SECRET",
    "TARGET_KRAKEN_FUTURES_KEY",
    "TARGET_KRAKEN_FUTURES_SECRET",
];

fn mirror(config_dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mirror"));
    cmd.env("RUST_LOG", "info");
    for name in CREDENTIALS {
        cmd.env_remove(name);
    }
    cmd.env_remove("MIRROR_KRAKEN__API_URL")
        .current_dir(config_dir.path());
    cmd
}

#[tokio::test]
async fn test_missing_credentials_exit_with_configuration_code() {
    let dir = tempfile::tempdir().unwrap();
    let output = mirror(&dir)
        .args(["plan"])
        .env("SOURCE_KRAKEN_FUTURES_KEY", "present")
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(
        "SOURCE_KRAKEN_FUTURES_SECRET, TARGET_KRAKEN_FUTURES_KEY, TARGET_KRAKEN_FUTURES_SECRET"
    ));
}

#[tokio::test]
async fn test_plan_json_against_mock_venue() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/derivatives/api/v3/instruments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "success",
            "instruments": [{"symbol": "PF_XBTUSD", "tickSize": 0.5, "contractValueTradePrecision": 1}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/derivatives/api/v3/tickers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": "success",
            "tickers": [{"symbol": "PF_XBTUSD", "markPrice": 20000.3}]
        })))
        .mount(&server)
        .await;
    for (key, equity, positions) in [
        ("source-key", 10000.0, json!([{"side": "long", "symbol": "PF_XBTUSD", "size": 2.0}])),
        ("target-key", 1000.0, json!([])),
    ] {
        Mock::given(method("GET"))
            .and(path("/derivatives/api/v3/accounts"))
            .and(header("APIKey", key))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": "success",
                "accounts": {"flex": {"portfolioValue": equity}}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/derivatives/api/v3/openpositions"))
            .and(header("APIKey", key))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": "success",
                "openPositions": positions
            })))
            .mount(&server)
            .await;
    }
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let secret = "a3Jha2VuLWZ1dHVyZXMtdGVzdC1zZWNyZXQ=";
    let dir = tempfile::tempdir().unwrap();
    let output = mirror(&dir)
        .args(["plan", "--json"])
        .env("MIRROR_KRAKEN__API_URL", server.uri())
        .env("SOURCE_KRAKEN_FUTURES_KEY", "source-key")
        .env("SOURCE_KRAKEN_FUTURES_SECRET", secret)
        .env("TARGET_KRAKEN_FUTURES_KEY", "target-key")
        .env("TARGET_KRAKEN_FUTURES_SECRET", secret)
        .output()
        .await
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let plan: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(plan["ratio"]["ratio"], "0.1");
    assert_eq!(plan["intents"][0]["kind"], "cancel_all");
    assert_eq!(plan["intents"][1]["kind"], "adjust_position");
    assert_eq!(plan["intents"][1]["symbol"], "PF_XBTUSD");
    assert_eq!(plan["intents"][1]["delta"], "0.2");
    assert_eq!(plan["intents"][1]["limit_price"], "20000.5");
}
