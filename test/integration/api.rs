// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::HomeFixture;

use anyhow::{anyhow, Result};
use dotkeep::{api, archive::matcher::MatchStrategy, config::ServerSettings};
use pretty_assertions::assert_eq;
use rocket::{
    http::{ContentType, Header, Status},
    local::blocking::Client,
};
use serde_json::{json, Value};
use std::io::{Cursor, Write};
use zip::{write::SimpleFileOptions, ZipArchive, ZipWriter};

const BOUNDARY: &str = "dotkeep-test-boundary";

fn client(home: &HomeFixture) -> Result<Client> {
    let rocket = api::build(&ServerSettings::default(), home.state(MatchStrategy::default()));
    Client::tracked(rocket).map_err(|err| anyhow!("cannot start client: {err}"))
}

fn multipart(file_name: &str, bytes: &[u8]) -> (ContentType, Vec<u8>) {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"configFile\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/zip\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let content_type =
        ContentType::new("multipart", "form-data").with_params(("boundary", BOUNDARY));
    (content_type, body)
}

fn zip_of(members: &[(&str, &str)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in members {
        zip.start_file(*name, SimpleFileOptions::default())?;
        zip.write_all(content.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

fn json_of(response: rocket::local::blocking::LocalResponse<'_>) -> Result<Value> {
    response
        .into_json::<Value>()
        .ok_or_else(|| anyhow!("response body is not JSON"))
}

#[test]
fn health_reports_ok() -> Result<()> {
    let home = HomeFixture::new()?;
    let client = client(&home)?;

    let response = client.get("/api/health").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(json_of(response)?["status"], "ok");

    Ok(())
}

#[test]
fn categories_and_files_are_listed() -> Result<()> {
    let home = HomeFixture::new()?;
    home.write(".zshrc", "setopt autocd\n")?;
    let client = client(&home)?;

    let body = json_of(client.get("/api/categories").dispatch())?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(6));
    assert_eq!(body["data"][0]["id"], "shell");

    let body = json_of(client.get("/api/files").dispatch())?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["data"][0]["id"], "zshrc");
    assert_eq!(body["data"][0]["size"], 14);
    assert!(body["data"][0].get("content").is_none());

    Ok(())
}

#[test]
fn get_file_includes_content() -> Result<()> {
    let home = HomeFixture::new()?;
    home.write(".vimrc", "set number\n")?;
    let client = client(&home)?;

    let response = client.get("/api/files/vimrc").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let body = json_of(response)?;
    assert_eq!(body["data"]["content"], "set number\n");
    assert_eq!(body["data"]["isSymlink"], false);

    Ok(())
}

#[test]
fn missing_files_are_not_found() -> Result<()> {
    let home = HomeFixture::new()?;
    let client = client(&home)?;

    let response = client.get("/api/files/nope").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(
        json_of(response)?,
        json!({ "success": false, "error": "file not found: nope" })
    );

    let response = client.get("/api/files/bashrc").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    assert_eq!(json_of(response)?["success"], false);

    let response = client.post("/api/files/bashrc/backup").dispatch();
    assert_eq!(response.status(), Status::NotFound);

    Ok(())
}

#[test]
fn update_writes_file() -> Result<()> {
    let home = HomeFixture::new()?;
    let client = client(&home)?;

    let response = client
        .put("/api/files/sshconfig")
        .header(ContentType::JSON)
        .body(json!({ "content": "Host *\n\tServerAliveInterval 60\n" }).to_string())
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        json_of(response)?,
        json!({ "success": true, "message": "file saved" })
    );
    assert_eq!(home.read(".ssh/config")?, b"Host *\n\tServerAliveInterval 60\n");

    Ok(())
}

#[test]
fn update_rejects_malformed_payload() -> Result<()> {
    let home = HomeFixture::new()?;
    let client = client(&home)?;

    let response = client
        .put("/api/files/bashrc")
        .header(ContentType::JSON)
        .body(r#"{ "text": "wrong field" }"#)
        .dispatch();
    assert_eq!(response.status(), Status::BadRequest);
    let body = json_of(response)?;
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .is_some_and(|error| error.starts_with("invalid request payload")));
    assert!(!home.join(".bashrc").exists());

    Ok(())
}

#[test]
fn backup_is_created() -> Result<()> {
    let home = HomeFixture::new()?;
    home.write(".profile", "umask 022\n")?;
    let client = client(&home)?;

    let response = client.post("/api/files/profile/backup").dispatch();
    assert_eq!(response.status(), Status::Created);
    let body = json_of(response)?;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "backup created");

    let backup_path = body["data"]["backupPath"]
        .as_str()
        .ok_or_else(|| anyhow!("no backup path"))?;
    assert!(backup_path.contains(".profile.backup."));
    assert_eq!(std::fs::read(backup_path)?, b"umask 022\n");

    Ok(())
}

#[test]
fn export_downloads_archive() -> Result<()> {
    let home = HomeFixture::new()?;
    home.write(".bashrc", "set -o vi\n")?;
    let client = client(&home)?;

    let response = client.get("/api/export").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::ZIP));
    assert_eq!(
        response.headers().get_one("Content-Disposition"),
        Some("attachment; filename=linux-configs.zip")
    );

    let bytes = response
        .into_bytes()
        .ok_or_else(|| anyhow!("empty archive"))?;
    let archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut names = archive.file_names().collect::<Vec<_>>();
    names.sort();
    assert_eq!(names, ["Shell/.bashrc", "manifest.json"]);

    Ok(())
}

#[test]
fn import_accepts_uploaded_archive() -> Result<()> {
    let home = HomeFixture::new()?;
    let client = client(&home)?;
    let archive = zip_of(&[
        ("Shell/.zshrc", "bindkey -e\n"),
        ("Other/notes.txt", "not managed\n"),
    ])?;

    let (content_type, body) = multipart("configs.zip", &archive);
    let response = client.post("/api/import").header(content_type).body(body).dispatch();
    assert_eq!(response.status(), Status::Ok);

    let body = json_of(response)?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["importedFiles"], 1);
    assert_eq!(body["data"]["skippedFiles"], 1);
    assert_eq!(body["message"], "import finished: 1 imported, 1 skipped");
    assert_eq!(home.read(".zshrc")?, b"bindkey -e\n");

    Ok(())
}

#[test]
fn import_rejects_bad_uploads() -> Result<()> {
    let home = HomeFixture::new()?;
    let client = client(&home)?;

    let (content_type, body) = multipart("configs.tar", &zip_of(&[("Shell/.zshrc", "")])?);
    let response = client.post("/api/import").header(content_type).body(body).dispatch();
    assert_eq!(response.status(), Status::BadRequest);
    assert_eq!(json_of(response)?["success"], false);

    let (content_type, body) = multipart("configs.zip", b"not a zip at all");
    let response = client.post("/api/import").header(content_type).body(body).dispatch();
    assert_eq!(response.status(), Status::BadRequest);
    let body = json_of(response)?;
    assert!(body["error"]
        .as_str()
        .is_some_and(|error| error.starts_with("failed to read archive")));
    assert!(!home.join(".zshrc").exists());

    Ok(())
}

#[test]
fn unknown_routes_still_use_envelope() -> Result<()> {
    let home = HomeFixture::new()?;
    let client = client(&home)?;

    let response = client.get("/api/nothing/here").dispatch();
    assert_eq!(response.status(), Status::NotFound);
    let body = json_of(response)?;
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    Ok(())
}

#[test]
fn cors_headers_follow_allow_list() -> Result<()> {
    let home = HomeFixture::new()?;
    let client = client(&home)?;

    let response = client
        .options("/api/files")
        .header(Header::new("Origin", "http://localhost:5173"))
        .dispatch();
    assert_eq!(response.status(), Status::NoContent);
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Origin"),
        Some("http://localhost:5173")
    );

    let response = client
        .get("/api/health")
        .header(Header::new("Origin", "http://evil.example"))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.headers().get_one("Access-Control-Allow-Origin"), None);

    Ok(())
}
