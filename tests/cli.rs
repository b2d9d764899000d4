use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use httpmock::MockServer;
use predicates::str::contains;
use serde_json::json;
use tempfile::TempDir;

const ACCOUNT_WITH_ID: &str = "current_account: work
accounts:
- name: work
  api_token: tok-work
  account_id: acc-1
";

const ACCOUNT_WITHOUT_ID: &str = "current_account: work
accounts:
- name: work
  api_token: tok-work
";

fn config_in(dir: &TempDir, contents: Option<&str>) -> PathBuf {
    let path = dir.path().join("cfm.yaml");
    if let Some(contents) = contents {
        fs::write(&path, contents).expect("seed config");
    }
    path
}

fn cfm(config: &Path, api_base: &str) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cfm"));
    cmd.env_remove("CFM_ACCOUNT")
        .env_remove("CFM_OUTPUT_FORMAT")
        .env_remove("CF_API_TOKEN")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config)
        .arg("--api-base")
        .arg(api_base);
    cmd
}

fn envelope(result: serde_json::Value) -> serde_json::Value {
    json!({ "success": true, "errors": [], "messages": [], "result": result })
}

fn mock_zones(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method("GET")
            .path("/zones")
            .query_param("per_page", "50")
            .header("authorization", "Bearer tok-work");
        then.status(200).json_body(envelope(json!([
            { "id": "zone-1", "name": "example.com", "status": "active",
              "name_servers": ["ada.ns.cloudflare.com", "bob.ns.cloudflare.com"] }
        ])));
    })
}

#[test]
fn account_add_verifies_token_and_stores_account_id() {
    let server = MockServer::start();
    let accounts = server.mock(|when, then| {
        when.method("GET")
            .path("/accounts")
            .header("authorization", "Bearer tok-new");
        then.status(200)
            .json_body(envelope(json!([{ "id": "acc-123", "name": "Work Inc" }])));
    });

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, None);

    cfm(&config, &server.base_url())
        .args(["account", "add", "work", "--token", "tok-new"])
        .assert()
        .success()
        .stdout(contains("acc-123"));

    accounts.assert();
    let saved = fs::read_to_string(&config).unwrap();
    assert!(saved.contains("current_account: work"));
    assert!(saved.contains("account_id: acc-123"));
    assert!(saved.contains("api_token: tok-new"));
}

#[test]
fn account_add_with_rejected_token_writes_nothing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/accounts");
        then.status(403).json_body(json!({
            "success": false,
            "errors": [{ "code": 9109, "message": "Invalid access token" }],
            "messages": [],
            "result": null
        }));
    });

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, None);

    cfm(&config, &server.base_url())
        .args(["account", "add", "work", "--token", "bad"])
        .assert()
        .failure()
        .stderr(contains("Invalid access token"));

    assert!(!config.exists());
}

#[test]
fn account_list_without_accounts() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, None);

    cfm(&config, "http://127.0.0.1:9")
        .args(["account", "list"])
        .assert()
        .success()
        .stdout(contains("No accounts configured"));
}

#[test]
fn account_list_json_hides_tokens() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, Some(ACCOUNT_WITH_ID));

    let assert = cfm(&config, "http://127.0.0.1:9")
        .args(["--format", "json", "account", "list"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    let accounts: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(accounts[0]["name"], "work");
    assert_eq!(accounts[0]["current"], true);
    assert!(!stdout.contains("tok-work"));
}

#[test]
fn switch_to_unknown_account_fails_and_keeps_config() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, Some(ACCOUNT_WITH_ID));

    cfm(&config, "http://127.0.0.1:9")
        .args(["account", "switch", "personal"])
        .assert()
        .failure()
        .stderr(contains("not found: personal"));

    assert_eq!(fs::read_to_string(&config).unwrap(), ACCOUNT_WITH_ID);
}

#[test]
fn commands_without_account_fail_fast() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, None);

    cfm(&config, "http://127.0.0.1:9")
        .args(["zone", "list"])
        .assert()
        .failure()
        .stderr(contains("No current account set"));
}

#[test]
fn unimplemented_commands_exit_nonzero() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, Some(ACCOUNT_WITH_ID));
    let zone_file = dir.path().join("example.com.zone");
    fs::write(&zone_file, "example.com. 300 IN A 192.0.2.1\n").unwrap();

    cfm(&config, "http://127.0.0.1:9")
        .args(["dns", "import", "example.com"])
        .arg(&zone_file)
        .assert()
        .failure()
        .stderr(contains("DNS import is not implemented"));

    cfm(&config, "http://127.0.0.1:9")
        .args(["worker", "subdomain", "get"])
        .assert()
        .failure()
        .stderr(contains("Workers subdomain management is not implemented"));
}

#[test]
fn zone_list_sends_bearer_token() {
    let server = MockServer::start();
    let zones = mock_zones(&server);

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, Some(ACCOUNT_WITH_ID));

    cfm(&config, &server.base_url())
        .args(["zone", "list"])
        .assert()
        .success()
        .stdout(contains("example.com"))
        .stdout(contains("zone-1"))
        .stdout(contains("Total: 1 zones"));

    zones.assert();
}

#[test]
fn zone_list_json_prints_api_result() {
    let server = MockServer::start();
    mock_zones(&server);

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, Some(ACCOUNT_WITH_ID));

    let assert = cfm(&config, &server.base_url())
        .args(["zone", "list", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    let zones: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(zones[0]["id"], "zone-1");
    assert_eq!(zones[0]["name_servers"][1], "bob.ns.cloudflare.com");
}

#[test]
fn unknown_zone_is_reported() {
    let server = MockServer::start();
    mock_zones(&server);

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, Some(ACCOUNT_WITH_ID));

    cfm(&config, &server.base_url())
        .args(["dns", "list", "example.org"])
        .assert()
        .failure()
        .stderr(contains("Zone not found: example.org"));
}

#[test]
fn dns_create_posts_record_for_resolved_zone() {
    let server = MockServer::start();
    mock_zones(&server);
    let create = server.mock(|when, then| {
        when.method("POST")
            .path("/zones/zone-1/dns_records")
            .json_body(json!({
                "type": "MX",
                "name": "example.com",
                "content": "mail.example.com",
                "ttl": 1,
                "proxied": false,
                "priority": 20
            }));
        then.status(200).json_body(envelope(json!({
            "id": "rec-1", "type": "MX", "name": "example.com",
            "content": "mail.example.com", "ttl": 1, "priority": 20
        })));
    });

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, Some(ACCOUNT_WITH_ID));

    cfm(&config, &server.base_url())
        .args([
            "dns", "create", "example.com", "mx", "example.com", "mail.example.com",
            "--priority", "20",
        ])
        .assert()
        .success()
        .stdout(contains("rec-1"));

    create.assert();
}

#[test]
fn purge_without_flags_purges_everything() {
    let server = MockServer::start();
    mock_zones(&server);
    let purge = server.mock(|when, then| {
        when.method("POST")
            .path("/zones/zone-1/purge_cache")
            .json_body(json!({ "purge_everything": true }));
        then.status(200).json_body(envelope(json!({ "id": "zone-1" })));
    });

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, Some(ACCOUNT_WITH_ID));

    cfm(&config, &server.base_url())
        .args(["zone", "purge", "example.com"])
        .assert()
        .success()
        .stdout(contains("Cache purged successfully"));

    purge.assert();
}

#[test]
fn resolved_account_id_is_written_back() {
    let server = MockServer::start();
    let accounts = server.mock(|when, then| {
        when.method("GET").path("/accounts");
        then.status(200)
            .json_body(envelope(json!([{ "id": "acc-9", "name": "Work Inc" }])));
    });
    let buckets = server.mock(|when, then| {
        when.method("GET").path("/accounts/acc-9/r2/buckets");
        then.status(200).json_body(envelope(json!({ "buckets": [] })));
    });

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, Some(ACCOUNT_WITHOUT_ID));

    cfm(&config, &server.base_url())
        .args(["r2", "list"])
        .assert()
        .success()
        .stdout(contains("No R2 buckets found"));

    accounts.assert();
    buckets.assert();
    assert!(fs::read_to_string(&config)
        .unwrap()
        .contains("account_id: acc-9"));
}

#[test]
fn account_flag_overrides_current_account() {
    let server = MockServer::start();
    let zones = server.mock(|when, then| {
        when.method("GET")
            .path("/zones")
            .header("authorization", "Bearer tok-home");
        then.status(200).json_body(envelope(json!([])));
    });

    let dir = TempDir::new().unwrap();
    let config = config_in(
        &dir,
        Some(
            "current_account: work
accounts:
- name: work
  api_token: tok-work
- name: home
  api_token: tok-home
",
        ),
    );

    cfm(&config, &server.base_url())
        .args(["zone", "list", "--account", "home"])
        .assert()
        .success()
        .stdout(contains("No zones found"));

    zones.assert();
}

#[test]
fn kv_put_then_get_round_trips_raw_value() {
    let server = MockServer::start();
    let put = server.mock(|when, then| {
        when.method("PUT")
            .path("/accounts/acc-1/storage/kv/namespaces/ns-1/values/greeting")
            .header("content-type", "application/octet-stream")
            .body("hello world");
        then.status(200).json_body(envelope(json!(null)));
    });
    let get = server.mock(|when, then| {
        when.method("GET")
            .path("/accounts/acc-1/storage/kv/namespaces/ns-1/values/greeting");
        then.status(200).body("hello world");
    });

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, Some(ACCOUNT_WITH_ID));

    cfm(&config, &server.base_url())
        .args(["kv", "key", "put", "ns-1", "greeting", "hello world"])
        .assert()
        .success();

    cfm(&config, &server.base_url())
        .args(["kv", "key", "get", "ns-1", "greeting"])
        .assert()
        .success()
        .stdout("hello world");

    put.assert();
    get.assert();
}

#[test]
fn r2_create_sends_location_hint() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method("POST")
            .path("/accounts/acc-1/r2/buckets")
            .json_body(json!({ "name": "assets", "locationHint": "weur" }));
        then.status(200)
            .json_body(envelope(json!({ "name": "assets", "location": "WEUR" })));
    });

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, Some(ACCOUNT_WITH_ID));

    cfm(&config, &server.base_url())
        .args(["r2", "create", "assets", "--location", "weur"])
        .assert()
        .success()
        .stdout(contains("R2 bucket 'assets' created successfully"));

    create.assert();
}

#[test]
fn zone_resolution_walks_every_page() {
    let server = MockServer::start();
    let filler: Vec<serde_json::Value> = (0..50)
        .map(|i| json!({ "id": format!("zone-{}", i), "name": format!("site{}.example", i) }))
        .collect();
    let first = server.mock(|when, then| {
        when.method("GET")
            .path("/zones")
            .query_param("page", "1")
            .query_param("per_page", "50");
        then.status(200).json_body(json!({
            "success": true, "errors": [], "messages": [],
            "result": filler,
            "result_info": { "page": 1, "per_page": 50, "total_pages": 2, "count": 50, "total_count": 51 }
        }));
    });
    let second = server.mock(|when, then| {
        when.method("GET")
            .path("/zones")
            .query_param("page", "2")
            .query_param("per_page", "50");
        then.status(200).json_body(json!({
            "success": true, "errors": [], "messages": [],
            "result": [{ "id": "zone-target", "name": "target.com", "status": "active" }],
            "result_info": { "page": 2, "per_page": 50, "total_pages": 2, "count": 1, "total_count": 51 }
        }));
    });
    let info = server.mock(|when, then| {
        when.method("GET").path("/zones/zone-target");
        then.status(200).json_body(envelope(json!({
            "id": "zone-target", "name": "target.com", "status": "active"
        })));
    });

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, Some(ACCOUNT_WITH_ID));

    cfm(&config, &server.base_url())
        .args(["zone", "info", "target.com"])
        .assert()
        .success()
        .stdout(contains("zone-target"));

    cfm(&config, &server.base_url())
        .args(["zone", "list"])
        .assert()
        .success()
        .stdout(contains("target.com"))
        .stdout(contains("Total: 51 zones"));

    first.assert_calls(2);
    second.assert_calls(2);
    info.assert();
}

#[test]
fn dns_update_reuses_type_and_name() {
    let server = MockServer::start();
    mock_zones(&server);
    let current = server.mock(|when, then| {
        when.method("GET").path("/zones/zone-1/dns_records/rec-1");
        then.status(200).json_body(envelope(json!({
            "id": "rec-1", "type": "MX", "name": "example.com",
            "content": "mx1.example.com", "ttl": 3600, "priority": 10
        })));
    });
    let update = server.mock(|when, then| {
        when.method("PUT")
            .path("/zones/zone-1/dns_records/rec-1")
            .json_body(json!({
                "type": "MX",
                "name": "example.com",
                "content": "mx2.example.com",
                "ttl": 1,
                "proxied": false,
                "priority": 10
            }));
        then.status(200).json_body(envelope(json!({
            "id": "rec-1", "type": "MX", "name": "example.com",
            "content": "mx2.example.com", "ttl": 1, "priority": 10
        })));
    });

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, Some(ACCOUNT_WITH_ID));

    cfm(&config, &server.base_url())
        .args(["dns", "update", "example.com", "rec-1", "mx2.example.com"])
        .assert()
        .success()
        .stdout(contains("DNS record updated successfully"))
        .stdout(contains("mx2.example.com"));

    current.assert();
    update.assert();
}

#[test]
fn dns_export_prints_bind_text() {
    let server = MockServer::start();
    mock_zones(&server);
    let export = server.mock(|when, then| {
        when.method("GET").path("/zones/zone-1/dns_records/export");
        then.status(200)
            .header("content-type", "text/plain")
            .body(";; Domain: example.com.\nwww.example.com.\t300\tIN\tA\t192.0.2.1\n");
    });

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, Some(ACCOUNT_WITH_ID));

    cfm(&config, &server.base_url())
        .args(["dns", "export", "example.com"])
        .assert()
        .success()
        .stdout(";; Domain: example.com.\nwww.example.com.\t300\tIN\tA\t192.0.2.1\n");

    export.assert();
}

#[test]
fn worker_deploy_uploads_script_as_multipart() {
    let server = MockServer::start();
    let upload = server.mock(|when, then| {
        when.method("PUT")
            .path("/accounts/acc-1/workers/scripts/edge-router")
            .header_includes("content-type", "multipart/form-data")
            .body_includes(r#"{"body_part":"script"}"#)
            .body_includes("addEventListener('fetch'");
        then.status(200)
            .json_body(envelope(json!({ "id": "edge-router" })));
    });

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, Some(ACCOUNT_WITH_ID));
    let script = dir.path().join("worker.js");
    fs::write(
        &script,
        "addEventListener('fetch', e => e.respondWith(new Response('ok')));\n",
    )
    .unwrap();

    cfm(&config, &server.base_url())
        .args(["worker", "deploy", "edge-router"])
        .arg(&script)
        .assert()
        .success()
        .stdout(contains("Worker 'edge-router' deployed successfully"));

    upload.assert();
}

#[test]
fn worker_deploy_with_missing_script_makes_no_request() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, Some(ACCOUNT_WITH_ID));

    cfm(&config, "http://127.0.0.1:9")
        .args(["worker", "deploy", "edge-router"])
        .arg(dir.path().join("missing.js"))
        .assert()
        .failure()
        .stderr(contains("failed to read script file"));
}

#[test]
fn worker_route_create_and_delete() {
    let server = MockServer::start();
    mock_zones(&server);
    let create = server.mock(|when, then| {
        when.method("POST")
            .path("/zones/zone-1/workers/routes")
            .json_body(json!({ "pattern": "example.com/api/*", "script": "api" }));
        then.status(200).json_body(envelope(json!({ "id": "route-1" })));
    });
    let delete = server.mock(|when, then| {
        when.method("DELETE").path("/zones/zone-1/workers/routes/route-1");
        then.status(200).json_body(envelope(json!({ "id": "route-1" })));
    });

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, Some(ACCOUNT_WITH_ID));

    cfm(&config, &server.base_url())
        .args(["worker", "route", "create", "example.com", "example.com/api/*", "api"])
        .assert()
        .success()
        .stdout(contains("route-1"));

    cfm(&config, &server.base_url())
        .args(["worker", "route", "delete", "example.com", "route-1"])
        .assert()
        .success()
        .stdout(contains("Worker route deleted successfully"));

    create.assert();
    delete.assert();
}

#[test]
fn pages_deployment_list_shows_stage_status() {
    let server = MockServer::start();
    let deployments = server.mock(|when, then| {
        when.method("GET")
            .path("/accounts/acc-1/pages/projects/blog/deployments");
        then.status(200).json_body(envelope(json!([{
            "id": "0123456789abcdef",
            "environment": "production",
            "url": "https://0123456789abcdef.blog.pages.dev",
            "latest_stage": { "name": "deploy", "status": "success" },
            "created_on": "2024-03-01T12:00:00Z"
        }])));
    });

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, Some(ACCOUNT_WITH_ID));

    cfm(&config, &server.base_url())
        .args(["pages", "deployment", "list", "blog"])
        .assert()
        .success()
        .stdout(contains("012345678..."))
        .stdout(contains("production"))
        .stdout(contains("success"))
        .stdout(contains("2024-03-01 12:00:00"));

    deployments.assert();
}

#[test]
fn kv_namespace_create_and_rename() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method("POST")
            .path("/accounts/acc-1/storage/kv/namespaces")
            .json_body(json!({ "title": "sessions" }));
        then.status(200)
            .json_body(envelope(json!({ "id": "ns-9", "title": "sessions" })));
    });
    let rename = server.mock(|when, then| {
        when.method("PUT")
            .path("/accounts/acc-1/storage/kv/namespaces/ns-9")
            .json_body(json!({ "title": "sessions-v2" }));
        then.status(200).json_body(envelope(json!(null)));
    });

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, Some(ACCOUNT_WITH_ID));

    cfm(&config, &server.base_url())
        .args(["kv", "namespace", "create", "sessions"])
        .assert()
        .success()
        .stdout(contains("ns-9"));

    cfm(&config, &server.base_url())
        .args(["kv", "namespace", "rename", "ns-9", "sessions-v2"])
        .assert()
        .success()
        .stdout(contains("renamed to 'sessions-v2'"));

    create.assert();
    rename.assert();
}
