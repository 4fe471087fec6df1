//! Mock download manager and file share fixtures

use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Size of the generated failure indicator
pub const FALLBACK_SIZE: usize = 2048;

/// Write a failure indicator asset into `dir`
pub fn write_fallback_asset(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("stream-failed.mp4");
    let mut file = std::fs::File::create(&path).expect("Failed to create fallback asset");
    file.write_all(&vec![0xAB; FALLBACK_SIZE])
        .expect("Failed to write fallback asset");
    path
}

/// PROPFIND answer for `dir`: the directory itself, then `children`
///
/// Children ending in `/` are directories, the rest are files of the given size.
pub fn multistatus(dir: &str, children: &[(&str, u64)]) -> String {
    let mut body = String::from(
        r#"<?xml version="1.0" encoding="utf-8"?><D:multistatus xmlns:D="DAV:">"#,
    );
    body.push_str(&collection_response(dir));
    for (name, size) in children {
        let href = format!("{}{}", dir, name);
        if name.ends_with('/') {
            body.push_str(&collection_response(&href));
        } else {
            body.push_str(&format!(
                "<D:response><D:href>{href}</D:href><D:propstat><D:prop><D:resourcetype/>\
                 <D:getcontentlength>{size}</D:getcontentlength></D:prop>\
                 <D:status>HTTP/1.1 200 OK</D:status></D:propstat></D:response>"
            ));
        }
    }
    body.push_str("</D:multistatus>");
    body
}

fn collection_response(href: &str) -> String {
    format!(
        "<D:response><D:href>{href}</D:href><D:propstat><D:prop>\
         <D:resourcetype><D:collection/></D:resourcetype></D:prop>\
         <D:status>HTTP/1.1 200 OK</D:status></D:propstat></D:response>"
    )
}

/// Accept one `addurl` submission per expected call, answering with `job_id`
pub async fn mount_submission(manager: &MockServer, job_id: &str, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("mode", "addurl"))
        .and(query_param("apikey", "e2e-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "nzo_ids": [job_id]
        })))
        .expect(expected_calls)
        .mount(manager)
        .await;
}

/// Report the job as queued for the first `times` history calls
pub async fn mount_history_queued(manager: &MockServer, job_id: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("mode", "history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "history": {"slots": [{"nzo_id": job_id, "status": "Queued"}]}
        })))
        .up_to_n_times(times)
        .with_priority(1)
        .mount(manager)
        .await;
}

/// Report the job with its final `slot` fields from then on
pub async fn mount_history_final(manager: &MockServer, slot: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("mode", "history"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"history": {"slots": [slot]}})),
        )
        .mount(manager)
        .await;
}

/// Answer a Depth:1 PROPFIND of `dir`
pub async fn mount_listing(share: &MockServer, dir: &str, children: &[(&str, u64)]) {
    Mock::given(method("PROPFIND"))
        .and(path(dir))
        .respond_with(ResponseTemplate::new(207).set_body_string(multistatus(dir, children)))
        .mount(share)
        .await;
}
