use std::collections::HashMap;

use jiraassets_provider::testing::{
    assert_error_contains, assert_plan_changes_attribute, ProviderTester,
};
use jiraassets_provider::{JiraAssetsProvider, ProviderError, ProviderService};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OBJECT: &str = "jiraassets_object";
const OBJECT_SCHEMA: &str = "jiraassets_object_schema";
const API: &str = "/jsm/assets/workspace/ws-1/v1";
// base64("admin@example.com:token")
const BASIC_AUTH: &str = "Basic YWRtaW5AZXhhbXBsZS5jb206dG9rZW4=";

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

async fn configured(server: &MockServer) -> ProviderTester<JiraAssetsProvider> {
    let tester = ProviderTester::new(
        JiraAssetsProvider::new("test")
            .with_base_url(server.uri())
            .with_env(HashMap::new()),
    );
    tester
        .configure(json!({
            "workspace_id": "ws-1",
            "user": "admin@example.com",
            "password": "token"
        }))
        .await
        .unwrap();
    tester
}

fn object_body(updated: &str) -> Value {
    json!({
        "workspaceId": "ws-1",
        "globalId": "ws-1:88",
        "id": "88",
        "label": "My Phone",
        "objectKey": "ITSM-88",
        "created": "2024-01-01T00:00:00.000Z",
        "updated": updated,
        "hasAvatar": false,
        "objectType": {"id": "117", "name": "Phone"}
    })
}

fn attribute_body(pairs: &[(&str, &str)]) -> Value {
    Value::Array(
        pairs
            .iter()
            .map(|(id, value)| {
                json!({
                    "objectTypeAttributeId": id,
                    "objectAttributeValues": [{"value": value, "displayValue": value}]
                })
            })
            .collect(),
    )
}

fn attribute_set(value: &Value) -> Vec<(String, String)> {
    let mut pairs: Vec<_> = value
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|a| {
                    (
                        a["attr_type_id"].as_str().unwrap_or_default().to_string(),
                        a["attr_value"].as_str().unwrap_or_default().to_string(),
                    )
                })
                .collect()
        })
        .unwrap_or_default();
    pairs.sort();
    pairs
}

async fn mount_read(server: &MockServer, updated: &str, attributes: &[(&str, &str)]) {
    Mock::given(method("GET"))
        .and(path(format!("{}/object/88", API)))
        .respond_with(ResponseTemplate::new(200).set_body_json(object_body(updated)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/object/88/attributes", API)))
        .respond_with(ResponseTemplate::new(200).set_body_json(attribute_body(attributes)))
        .mount(server)
        .await;
}

fn phone_config() -> Value {
    json!({
        "type_id": "117",
        "attributes": [
            {"attr_type_id": "1087", "attr_value": "My Phone"},
            {"attr_type_id": "1090", "attr_value": "1234567890"}
        ]
    })
}

#[tokio::test]
async fn test_configure_explicit_wins_over_environment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jsm/assets/workspace/ws-explicit/v1/objectschema/1"))
        .and(header("authorization", BASIC_AUTH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "1"})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = JiraAssetsProvider::new("test")
        .with_base_url(server.uri())
        .with_env(env(&[
            ("JIRAASSETS_WORKSPACE_ID", "ws-env"),
            ("JIRAASSETS_USER", "admin@example.com"),
            ("JIRAASSETS_PASSWORD", "token"),
        ]));
    let diagnostics = provider
        .configure(json!({"workspace_id": "ws-explicit"}))
        .await
        .unwrap();
    assert!(diagnostics.is_empty());

    provider
        .read_data_source(OBJECT_SCHEMA, json!({"id": "1"}))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_configure_reports_each_missing_setting() {
    let tester = ProviderTester::new(JiraAssetsProvider::new("test").with_env(HashMap::new()));
    let err = tester
        .configure(json!({"workspace_id": null, "user": null, "password": null}))
        .await
        .unwrap_err();

    let diagnostics = err.diagnostics();
    assert_eq!(diagnostics.len(), 3);
    let attributes: Vec<_> = diagnostics
        .iter()
        .map(|d| d.attribute.as_deref().unwrap_or_default())
        .collect();
    assert_eq!(attributes, vec!["workspace_id", "user", "password"]);
    assert_error_contains(diagnostics, "JIRAASSETS_WORKSPACE_ID");
}

#[tokio::test]
async fn test_create_object_lifecycle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{}/object/create", API)))
        .and(header("authorization", BASIC_AUTH))
        .and(body_json(json!({
            "objectTypeId": "117",
            "attributes": [
                {"objectTypeAttributeId": "1087", "objectAttributeValues": [{"value": "My Phone"}]},
                {"objectTypeAttributeId": "1090", "objectAttributeValues": [{"value": "1234567890"}]}
            ]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(object_body("2024-01-01T00:00:00.000Z")))
        .expect(1)
        .mount(&server)
        .await;
    mount_read(
        &server,
        "2024-01-01T00:00:00.000Z",
        &[("1", "ITSM-88"), ("1087", "My Phone"), ("1090", "1234567890")],
    )
    .await;

    let tester = configured(&server).await;
    let state = tester.lifecycle_create(OBJECT, phone_config()).await.unwrap();

    assert_eq!(state["workspace_id"], "ws-1");
    assert_eq!(state["global_id"], "ws-1:88");
    assert_eq!(state["id"], "88");
    assert_eq!(state["label"], "My Phone");
    assert_eq!(state["object_key"], "ITSM-88");
    assert_eq!(state["created"], "2024-01-01T00:00:00.000Z");
    assert_eq!(state["has_avatar"], false);
    assert_eq!(
        attribute_set(&state["attributes"]),
        vec![
            ("1087".to_string(), "My Phone".to_string()),
            ("1090".to_string(), "1234567890".to_string())
        ]
    );
}

#[tokio::test]
async fn test_read_never_adds_untracked_attributes() {
    let server = MockServer::start().await;
    mount_read(
        &server,
        "2024-03-01T00:00:00.000Z",
        &[("1", "ITSM-88"), ("1087", "Renamed Phone"), ("1091", "extra")],
    )
    .await;

    let tester = configured(&server).await;
    let state = tester
        .read(
            OBJECT,
            json!({
                "id": "88",
                "type_id": "117",
                "attributes": [{"attr_type_id": "1087", "attr_value": "My Phone"}]
            }),
        )
        .await
        .unwrap();

    assert_eq!(
        attribute_set(&state["attributes"]),
        vec![("1087".to_string(), "Renamed Phone".to_string())]
    );
    assert_eq!(state["updated"], "2024-03-01T00:00:00.000Z");
}

#[tokio::test]
async fn test_update_resends_configured_attributes_only() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("{}/object/88", API)))
        .and(body_json(json!({
            "objectTypeId": "117",
            "attributes": [
                {"objectTypeAttributeId": "1087", "objectAttributeValues": [{"value": "My Phone"}]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(object_body("2024-02-01T00:00:00.000Z")))
        .expect(1)
        .mount(&server)
        .await;
    // The API leaves the removed attribute in place.
    mount_read(
        &server,
        "2024-02-01T00:00:00.000Z",
        &[("1087", "My Phone"), ("1090", "1234567890")],
    )
    .await;

    let tester = configured(&server).await;
    let mut prior = phone_config();
    prior["id"] = json!("88");
    prior["has_avatar"] = json!(false);
    prior["updated"] = json!("2024-01-01T00:00:00.000Z");

    let proposed = json!({
        "type_id": "117",
        "attributes": [{"attr_type_id": "1087", "attr_value": "My Phone"}]
    });
    let plan = tester
        .plan_update(OBJECT, prior.clone(), proposed.clone())
        .await
        .unwrap();
    assert_plan_changes_attribute(&plan, "attributes");
    assert!(!plan.requires_replace);

    let state = tester.lifecycle_update(OBJECT, prior, proposed).await.unwrap();
    assert_eq!(state["id"], "88");
    assert_eq!(state["updated"], "2024-02-01T00:00:00.000Z");
    assert_eq!(
        attribute_set(&state["attributes"]),
        vec![("1087".to_string(), "My Phone".to_string())]
    );
}

#[tokio::test]
async fn test_import_then_read_fills_type_and_leaves_attributes_empty() {
    let server = MockServer::start().await;
    mount_read(&server, "2024-01-01T00:00:00.000Z", &[("1087", "My Phone")]).await;

    let tester = configured(&server).await;
    let states = tester.lifecycle_import(OBJECT, "88").await.unwrap();

    assert_eq!(states.len(), 1);
    assert_eq!(states[0]["object_key"], "ITSM-88");
    assert_eq!(states[0]["type_id"], "117");
    assert!(states[0]["attributes"].is_null());
}

#[tokio::test]
async fn test_read_object_schema() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{}/objectschema/100", API)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "workspaceId": "ws-1",
            "globalId": "ws-1:100",
            "id": "100",
            "name": "IT Assets",
            "objectSchemaKey": "ITSM",
            "status": "Ok",
            "description": "Hardware and software",
            "created": "2024-01-01T00:00:00.000Z",
            "updated": "2024-02-01T00:00:00.000Z",
            "objectCount": 42,
            "objectTypeCount": 7,
            "canManage": true,
            "idAsInt": 100
        })))
        .mount(&server)
        .await;

    let tester = configured(&server).await;
    tester
        .validate_data_source_config(OBJECT_SCHEMA, json!({"id": "100"}))
        .await
        .unwrap();
    let state = tester
        .read_data_source(OBJECT_SCHEMA, json!({"id": "100"}))
        .await
        .unwrap();

    for field in [
        "workspace_id",
        "global_id",
        "name",
        "object_schema_key",
        "status",
        "description",
        "created",
        "updated",
        "object_count",
        "object_type_count",
        "can_manage",
        "id_as_int",
    ] {
        assert!(!state[field].is_null(), "{} should be populated", field);
    }
    assert_eq!(state["name"], "IT Assets");
    assert_eq!(state["id_as_int"], 100);
}

#[tokio::test]
async fn test_read_object_schema_fails_on_other_status() {
    for status in [201u16, 404] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/objectschema/100", API)))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"id": "100"})))
            .mount(&server)
            .await;

        let tester = configured(&server).await;
        let err = tester
            .read_data_source(OBJECT_SCHEMA, json!({"id": "100"}))
            .await
            .unwrap_err();

        match (status, err) {
            (201, ProviderError::UnexpectedStatus { status, .. }) => assert_eq!(status, 201),
            (404, ProviderError::Api { operation, source }) => {
                assert_eq!(operation, "Unable to read Assets object schema");
                assert_eq!(source.status(), Some(404));
            },
            (_, other) => panic!("unexpected error {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_delete_failure_surfaces_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("{}/object/88", API)))
        .respond_with(ResponseTemplate::new(403).set_body_string("not allowed"))
        .mount(&server)
        .await;

    let tester = configured(&server).await;
    let err = tester
        .delete(OBJECT, json!({"id": "88", "type_id": "117", "attributes": []}))
        .await
        .unwrap_err();

    let diagnostic = err.to_diagnostic();
    assert_eq!(diagnostic.summary, "Error during object deletion");
    assert!(diagnostic.detail.unwrap_or_default().contains("not allowed"));
    assert_eq!(tonic::Status::from(err).code(), tonic::Code::PermissionDenied);
}
