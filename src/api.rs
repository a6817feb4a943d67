// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! HTTP interface.
//!
//! Exposes the managed file service as a small JSON API mounted under `/api`.
//! Every JSON response, success or failure, is wrapped in an
//! [`Envelope`](envelope::Envelope) carrying an explicit success flag, so
//! clients never have to infer the outcome from the status code alone.
//!
//! # Routes
//!
//! | Method | Path                     | Purpose                          |
//! |--------|--------------------------|----------------------------------|
//! | GET    | /api/health              | Liveness probe                   |
//! | GET    | /api/categories          | List categories                  |
//! | GET    | /api/files               | List existing managed files      |
//! | GET    | /api/files/<id>          | Read one managed file            |
//! | PUT    | /api/files/<id>          | Replace one managed file         |
//! | POST   | /api/files/<id>/backup   | Timestamped backup of one file   |
//! | GET    | /api/export              | Download ZIP of all files        |
//! | POST   | /api/import              | Upload ZIP over managed files    |
//! | GET    | /api/system              | Host system information          |

pub mod envelope;
pub mod fairing;
pub mod routes;

use crate::{
    access::DynHome,
    archive::matcher::MatchStrategy,
    config::ServerSettings,
    manager::ConfigManager,
};

use rocket::{
    data::{Limits, ToByteUnit},
    Build, Rocket,
};
use std::sync::Arc;

/// Shared state handed to every request handler.
pub struct AppState {
    /// Managed file service.
    pub manager: Arc<ConfigManager<DynHome>>,

    /// Name matching used by archive import.
    pub matcher: MatchStrategy,
}

impl AppState {
    /// Construct new application state.
    pub fn new(manager: ConfigManager<DynHome>, matcher: MatchStrategy) -> Self {
        Self {
            manager: Arc::new(manager),
            matcher,
        }
    }
}

/// Assemble Rocket instance ready for launch.
///
/// Rocket's own logger is switched off. Requests are logged through
/// `tracing` by [`fairing::RequestLogger`] instead.
pub fn build(settings: &ServerSettings, state: AppState) -> Rocket<Build> {
    let upload_limit = settings.upload_limit_mib.mebibytes();
    let limits = Limits::default()
        .limit("file", upload_limit)
        .limit("data-form", upload_limit);
    let figment = rocket::Config::figment()
        .merge(("address", settings.address))
        .merge(("port", settings.port))
        .merge(("limits", limits))
        .merge(("log_level", "off"));

    rocket::custom(figment)
        .manage(state)
        .attach(fairing::RequestLogger)
        .attach(fairing::Cors::new(settings.allowed_origins.clone()))
        .mount(
            "/api",
            routes![
                routes::health,
                routes::categories,
                routes::list_files,
                routes::get_file,
                routes::update_file,
                routes::backup_file,
                routes::export_archive,
                routes::import_archive,
                routes::system_info,
                routes::preflight,
            ],
        )
        .register("/", catchers![routes::default_catcher])
}
