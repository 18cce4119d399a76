//! End-to-end tests for multipart GraphQL requests
//!
//! These tests verify that:
//! - Single, multiple and batched uploads reach resolvers in map order
//! - Multipart and batching stay disabled unless configured
//! - Decoding failures are rejected with their reason code

use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use bytes::Bytes;
use graphql_upload::prelude::*;

const SINGLE_BOUNDARY: &str = "----WebKitFormBoundaryBpwmk50wSJmsTPAH";
const MULTIPLE_BOUNDARY: &str = "----WebKitFormBoundaryhvb6BzAACEqQKt0Z";
const BATCH_BOUNDARY: &str = "------------------------560b6209af099a26";

const SINGLE_UPLOAD: &str =
    r#"mutation($file: Upload!) { singleUpload(file: $file) { id } }"#;
const MULTIPLE_UPLOAD: &str =
    r#"mutation($files: [Upload!]!) { multipleUpload(files: $files) { id } }"#;

// =============================================================================
// Helpers
// =============================================================================

/// One part of a multipart body
enum Part<'a> {
    Field(&'a str, &'a str),
    File(&'a str, &'a str, &'a str),
}

fn multipart_body(boundary: &str, parts: &[Part<'_>]) -> Bytes {
    let mut body = String::new();
    for part in parts {
        body.push_str(&format!("--{}\r\n", boundary));
        match part {
            Part::Field(name, value) => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    name, value
                ));
            }
            Part::File(name, file_name, content) => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/plain\r\n\r\n{}\r\n",
                    name, file_name, content
                ));
            }
        }
    }
    body.push_str(&format!("--{}--\r\n", boundary));
    Bytes::from(body)
}

fn operations(query: &str, variables: Value) -> String {
    json!({ "query": query, "variables": variables }).to_string()
}

fn app(options: HandlerOptions) -> TestServer {
    let app = GraphQLServerBuilder::new()
        .with_options(options)
        .register_fn("Mutation", "singleUpload", |args, _ctx| {
            Ok(json!({ "id": args.upload("file")?.file_name() }))
        })
        .register_fn("Mutation", "multipleUpload", |args, _ctx| {
            let names: Vec<&str> = args
                .uploads("files")?
                .iter()
                .map(|file| file.file_name())
                .collect();
            Ok(json!({ "id": names.join(" ") }))
        })
        .build()
        .expect("Failed to build app");

    TestServer::try_new(app).expect("Failed to create test server")
}

fn enabled() -> HandlerOptions {
    HandlerOptions::new()
        .with_multipart_enabled(true)
        .with_batching_enabled(true)
}

async fn post(server: &TestServer, boundary: &str, body: Bytes) -> TestResponse {
    server
        .post("/graphql")
        .bytes(body)
        .content_type(&format!("multipart/form-data; boundary={}", boundary))
        .await
}

fn error_code(response: &TestResponse) -> String {
    let body: Value = response.json();
    body["errors"][0]["extensions"]["code"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

fn single_upload_body() -> Bytes {
    multipart_body(
        SINGLE_BOUNDARY,
        &[
            Part::Field("operations", &operations(SINGLE_UPLOAD, json!({ "file": null }))),
            Part::Field("map", r#"{"0":["variables.file"]}"#),
            Part::File("0", "a.txt", "alpha"),
        ],
    )
}

// =============================================================================
// Uploads
// =============================================================================

mod upload_tests {
    use super::*;

    #[tokio::test]
    async fn test_single_upload_mutation() {
        let server = app(enabled());

        let response = post(&server, SINGLE_BOUNDARY, single_upload_body()).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["singleUpload"]["id"], "a.txt");
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn test_multiple_upload_mutation() {
        let server = app(enabled());
        let body = multipart_body(
            MULTIPLE_BOUNDARY,
            &[
                Part::Field(
                    "operations",
                    &operations(MULTIPLE_UPLOAD, json!({ "files": [null, null] })),
                ),
                Part::Field("map", r#"{"0":["variables.files.0"],"1":["variables.files.1"]}"#),
                Part::File("0", "b.txt", "bravo"),
                Part::File("1", "c.txt", "charlie"),
            ],
        );

        let response = post(&server, MULTIPLE_BOUNDARY, body).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["multipleUpload"]["id"], "b.txt c.txt");
    }

    #[tokio::test]
    async fn test_batch_upload_mutation() {
        let server = app(enabled());
        let batch = json!([
            { "query": SINGLE_UPLOAD, "variables": { "file": null } },
            { "query": MULTIPLE_UPLOAD, "variables": { "files": [null, null] } }
        ])
        .to_string();
        let body = multipart_body(
            BATCH_BOUNDARY,
            &[
                Part::Field("operations", &batch),
                Part::Field(
                    "map",
                    r#"{"0":["0.variables.file"],"1":["1.variables.files.0"],"2":["1.variables.files.1"]}"#,
                ),
                Part::File("0", "a.txt", "alpha"),
                Part::File("1", "b.txt", "bravo"),
                Part::File("2", "c.txt", "charlie"),
            ],
        );

        let response = post(&server, BATCH_BOUNDARY, body).await;

        response.assert_status_ok();
        let body: Value = response.json();
        let results = body.as_array().expect("batch response must be an array");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["data"]["singleUpload"]["id"], "a.txt");
        assert_eq!(results[1]["data"]["multipleUpload"]["id"], "b.txt c.txt");
    }

    #[tokio::test]
    async fn test_one_file_fills_several_paths() {
        let server = app(enabled());
        let body = multipart_body(
            MULTIPLE_BOUNDARY,
            &[
                Part::Field(
                    "operations",
                    &operations(MULTIPLE_UPLOAD, json!({ "files": [null, null] })),
                ),
                Part::Field("map", r#"{"0":["variables.files.0","variables.files.1"]}"#),
                Part::File("0", "same.txt", "x"),
            ],
        );

        let response = post(&server, MULTIPLE_BOUNDARY, body).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["multipleUpload"]["id"], "same.txt same.txt");
    }

    #[tokio::test]
    async fn test_uploads_spooled_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let server = app(enabled().with_uploads_directory(dir.path()));

        let response = post(&server, SINGLE_BOUNDARY, single_upload_body()).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["singleUpload"]["id"], "a.txt");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_resolver_error_keeps_other_operations() {
        let server = app(enabled());
        let batch = json!([
            { "query": SINGLE_UPLOAD, "variables": { "file": null } },
            { "query": SINGLE_UPLOAD, "variables": { "file": "not a file" } }
        ])
        .to_string();
        let body = multipart_body(
            BATCH_BOUNDARY,
            &[
                Part::Field("operations", &batch),
                Part::Field("map", r#"{"0":["0.variables.file"]}"#),
                Part::File("0", "a.txt", "alpha"),
            ],
        );

        let response = post(&server, BATCH_BOUNDARY, body).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body[0]["data"]["singleUpload"]["id"], "a.txt");
        assert_eq!(body[1]["data"]["singleUpload"], Value::Null);
        assert_eq!(body[1]["errors"][0]["path"], json!(["singleUpload"]));
    }
}

// =============================================================================
// Rejections
// =============================================================================

mod rejection_tests {
    use super::*;

    #[tokio::test]
    async fn test_multipart_disabled() {
        let server = app(HandlerOptions::new());

        let response = post(&server, SINGLE_BOUNDARY, single_upload_body()).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&response), "MULTIPART_DISABLED");
    }

    #[tokio::test]
    async fn test_batching_disabled() {
        let server = app(HandlerOptions::new().with_multipart_enabled(true));
        let batch = json!([{ "query": SINGLE_UPLOAD, "variables": { "file": null } }]).to_string();
        let body = multipart_body(
            BATCH_BOUNDARY,
            &[
                Part::Field("operations", &batch),
                Part::Field("map", r#"{"0":["0.variables.file"]}"#),
                Part::File("0", "a.txt", "alpha"),
            ],
        );

        let response = post(&server, BATCH_BOUNDARY, body).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&response), "BATCHING_DISABLED");
    }

    #[tokio::test]
    async fn test_missing_operations() {
        let server = app(enabled());
        let body = multipart_body(
            SINGLE_BOUNDARY,
            &[
                Part::Field("map", r#"{"0":["variables.file"]}"#),
                Part::File("0", "a.txt", "alpha"),
            ],
        );

        let response = post(&server, SINGLE_BOUNDARY, body).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&response), "MISSING_OPERATIONS");
    }

    #[tokio::test]
    async fn test_invalid_operations_json() {
        let server = app(enabled());
        let body = multipart_body(
            SINGLE_BOUNDARY,
            &[
                Part::Field("operations", "{not json"),
                Part::Field("map", r#"{"0":["variables.file"]}"#),
                Part::File("0", "a.txt", "alpha"),
            ],
        );

        let response = post(&server, SINGLE_BOUNDARY, body).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&response), "INVALID_JSON");
    }

    #[tokio::test]
    async fn test_missing_file_part() {
        let server = app(enabled());
        let body = multipart_body(
            SINGLE_BOUNDARY,
            &[
                Part::Field("operations", &operations(SINGLE_UPLOAD, json!({ "file": null }))),
                Part::Field("map", r#"{"0":["variables.file"]}"#),
            ],
        );

        let response = post(&server, SINGLE_BOUNDARY, body).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&response), "MISSING_FILE_PART");
        let body: Value = response.json();
        assert_eq!(body["errors"][0]["extensions"]["field"], "0");
    }

    #[tokio::test]
    async fn test_unresolved_path() {
        let server = app(enabled());
        let body = multipart_body(
            SINGLE_BOUNDARY,
            &[
                Part::Field("operations", &operations(SINGLE_UPLOAD, json!({ "file": null }))),
                Part::Field("map", r#"{"0":["variables.document"]}"#),
                Part::File("0", "a.txt", "alpha"),
            ],
        );

        let response = post(&server, SINGLE_BOUNDARY, body).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&response), "UNRESOLVED_PATH");
    }

    #[tokio::test]
    async fn test_unused_file_part_policy() {
        let body = || {
            multipart_body(
                SINGLE_BOUNDARY,
                &[
                    Part::Field("operations", &operations(SINGLE_UPLOAD, json!({ "file": null }))),
                    Part::Field("map", r#"{"0":["variables.file"]}"#),
                    Part::File("0", "a.txt", "alpha"),
                    Part::File("extra", "extra.txt", "unused"),
                ],
            )
        };

        let response = post(&app(enabled()), SINGLE_BOUNDARY, body()).await;
        response.assert_status_ok();

        let strict = enabled().with_unused_file_parts(UnusedFilePolicy::Reject);
        let response = post(&app(strict), SINGLE_BOUNDARY, body()).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&response), "UNUSED_FILE_PART");
    }

    #[tokio::test]
    async fn test_file_too_large() {
        let server = app(enabled().with_max_file_size(3));

        let response = post(&server, SINGLE_BOUNDARY, single_upload_body()).await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(error_code(&response), "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_missing_boundary() {
        let server = app(enabled());

        let response = server
            .post("/graphql")
            .bytes(single_upload_body())
            .content_type("multipart/form-data")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&response), "INVALID_MULTIPART");
    }

    #[tokio::test]
    async fn test_multipart_request_too_large() {
        let server = app(enabled().with_max_request_size(64));

        let response = post(&server, SINGLE_BOUNDARY, single_upload_body()).await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(error_code(&response), "PAYLOAD_TOO_LARGE");
        let body: Value = response.json();
        assert_eq!(body["errors"][0]["extensions"]["limit"], 64);
    }

    #[tokio::test]
    async fn test_json_request_too_large() {
        let server = app(enabled().with_max_request_size(10));

        let response = server
            .post("/graphql")
            .json(&json!({ "query": "{ hello }" }))
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(error_code(&response), "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_duplicate_operations_part() {
        let body = multipart_body(
            SINGLE_BOUNDARY,
            &[
                Part::Field("operations", &operations(SINGLE_UPLOAD, json!({ "file": null }))),
                Part::Field("operations", r#"{"query":"{ hello }"}"#),
                Part::Field("map", r#"{"0":["variables.file"]}"#),
                Part::File("0", "a.txt", "alpha"),
            ],
        );

        let response = post(&app(enabled()), SINGLE_BOUNDARY, body).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&response), "INVALID_MULTIPART");
    }
}
