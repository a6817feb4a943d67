// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Route handlers.
//!
//! Handlers stay thin. They translate between HTTP and the managed file
//! service, and push archive work onto the blocking thread pool.

use crate::{
    api::{
        envelope::{ApiError, ApiResult, ArchiveDownload, Envelope},
        AppState,
    },
    archive::{
        export::export,
        import::{import, ImportReport},
    },
    catalog::Category,
    manager::{BackupReceipt, ResolvedFile},
    system::SystemInfo,
};

use rocket::{
    form::{Errors, Form},
    fs::TempFile,
    http::Status,
    serde::json::{self, Json},
    Request, State,
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::Arc};
use tokio::{io::AsyncReadExt, task::spawn_blocking};
use tracing::info;

/// File name offered for exported archives.
pub const EXPORT_FILE_NAME: &str = "linux-configs.zip";

/// Liveness probe body.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Health {
    pub status: String,
    pub message: String,
}

/// Body of a file update request.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct UpdateFileRequest {
    pub content: String,
}

/// Multipart form carrying an archive to import.
#[derive(FromForm)]
pub struct ImportUpload<'r> {
    #[field(name = "configFile")]
    pub config_file: TempFile<'r>,
}

#[get("/health")]
pub fn health() -> Json<Health> {
    Json(Health {
        status: "ok".into(),
        message: "service is running".into(),
    })
}

#[get("/categories")]
pub fn categories(state: &State<AppState>) -> Json<Envelope<Vec<Category>>> {
    Json(Envelope::data(state.manager.categories().to_vec()))
}

#[get("/files")]
pub fn list_files(state: &State<AppState>) -> ApiResult<Vec<ResolvedFile>> {
    Ok(Json(Envelope::data(state.manager.list_files()?)))
}

#[get("/files/<id>")]
pub fn get_file(id: &str, state: &State<AppState>) -> ApiResult<ResolvedFile> {
    Ok(Json(Envelope::data(state.manager.get_file(id)?)))
}

#[put("/files/<id>", data = "<body>")]
pub fn update_file(
    id: &str,
    body: Result<Json<UpdateFileRequest>, json::Error<'_>>,
    state: &State<AppState>,
) -> ApiResult<()> {
    let body = body.map_err(|err| match err {
        json::Error::Io(err) => ApiError::InvalidPayload(err.to_string()),
        json::Error::Parse(_, err) => ApiError::InvalidPayload(err.to_string()),
    })?;

    state.manager.update_file(id, body.content.as_bytes())?;
    Ok(Json(Envelope::message("file saved", None)))
}

#[post("/files/<id>/backup")]
pub fn backup_file(
    id: &str,
    state: &State<AppState>,
) -> Result<(Status, Json<Envelope<BackupReceipt>>), ApiError> {
    let receipt = state.manager.backup_file(id)?;
    info!("backed up {id} to {:?}", receipt.backup_path.display());

    Ok((
        Status::Created,
        Json(Envelope::message(receipt.message.clone(), Some(receipt))),
    ))
}

#[get("/export")]
pub async fn export_archive(state: &State<AppState>) -> Result<ArchiveDownload, ApiError> {
    let manager = Arc::clone(&state.manager);
    let bytes = spawn_blocking(move || export(&*manager)).await??;

    Ok(ArchiveDownload::new(bytes, EXPORT_FILE_NAME))
}

#[post("/import", data = "<upload>")]
pub async fn import_archive(
    upload: Result<Form<ImportUpload<'_>>, Errors<'_>>,
    state: &State<AppState>,
) -> ApiResult<ImportReport> {
    let upload = upload.map_err(|errors| ApiError::InvalidPayload(errors.to_string()))?;
    let file = &upload.config_file;

    // INVARIANT: Only uploads named like ZIP archives are accepted.
    let is_zip = file
        .raw_name()
        .map(|name| {
            PathBuf::from(name.dangerous_unsafe_unsanitized_raw().as_str())
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
        })
        .unwrap_or(false);
    if !is_zip {
        return Err(ApiError::InvalidPayload(
            "uploaded file must be a .zip archive".into(),
        ));
    }

    let mut bytes = Vec::new();
    let reader = file.open().await.map_err(ApiError::Upload)?;
    tokio::pin!(reader);
    reader.read_to_end(&mut bytes).await.map_err(ApiError::Upload)?;

    let manager = Arc::clone(&state.manager);
    let matcher = state.matcher;
    let report = spawn_blocking(move || import(&*manager, &matcher, &bytes)).await??;

    Ok(Json(Envelope::message(report.message.clone(), Some(report))))
}

#[get("/system")]
pub async fn system_info() -> ApiResult<SystemInfo> {
    let info = spawn_blocking(SystemInfo::probe).await?;
    Ok(Json(Envelope::data(info)))
}

#[options("/<_..>")]
pub fn preflight() -> Status {
    Status::NoContent
}

#[catch(default)]
pub fn default_catcher(status: Status, req: &Request<'_>) -> (Status, Json<Envelope<()>>) {
    let reason = status.reason().unwrap_or("request failed");
    let message = format!("{} {}: {reason}", req.method(), req.uri().path());

    (status, Json(Envelope::failure(message)))
}
