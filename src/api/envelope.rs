// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Response envelope and error responder.

use crate::{archive::ArchiveError, manager::ManagerError};

use rocket::{
    http::{ContentType, Header, Status},
    request::Request,
    response::{self, Responder, Response},
    serde::json::Json,
};
use serde::{Deserialize, Serialize};
use std::{error::Error, io::Cursor};
use tracing::{error, warn};

/// Uniform wrapper around every JSON response body.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Successful response carrying data.
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    /// Successful response carrying a message and maybe data.
    pub fn message(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: true,
            data,
            error: None,
            message: Some(message.into()),
        }
    }

    /// Failed response carrying an error message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }
}

/// Handler result that always renders as an [`Envelope`].
pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

/// Request level error types.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Managed file service fails.
    #[error(transparent)]
    Manager(#[from] ManagerError),

    /// Archive export or import fails as a whole.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Request body is malformed.
    #[error("invalid request payload: {0}")]
    InvalidPayload(String),

    /// Uploaded file cannot be read back from temporary storage.
    #[error("failed to read uploaded file")]
    Upload(#[source] std::io::Error),

    /// Blocking worker panics or is cancelled.
    #[error(transparent)]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    /// HTTP status to report for this error.
    pub fn status(&self) -> Status {
        match self {
            Self::Manager(err) if err.is_not_found() => Status::NotFound,
            Self::Archive(ArchiveError::Unreadable(_)) => Status::BadRequest,
            Self::InvalidPayload(_) => Status::BadRequest,
            _ => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        let message = error_chain(&self);
        if status.class().is_server_error() {
            error!("{} {}: {message}", req.method(), req.uri());
        } else {
            warn!("{} {}: {message}", req.method(), req.uri());
        }

        (status, Json(Envelope::<()>::failure(message))).respond_to(req)
    }
}

/// ZIP archive offered as a file download.
#[derive(Debug)]
pub struct ArchiveDownload {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

impl ArchiveDownload {
    /// Construct new archive download.
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: file_name.into(),
        }
    }
}

impl<'r> Responder<'r, 'static> for ArchiveDownload {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        Response::build()
            .header(ContentType::ZIP)
            .header(Header::new(
                "Content-Disposition",
                format!("attachment; filename={}", self.file_name),
            ))
            .sized_body(self.bytes.len(), Cursor::new(self.bytes))
            .ok()
    }
}

fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}
