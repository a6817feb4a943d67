// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Request logging and cross-origin headers.

use rocket::{
    fairing::{Fairing, Info, Kind},
    http::Header,
    Data, Request, Response,
};
use std::time::Instant;
use tracing::info;

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS, PATCH";
const ALLOWED_HEADERS: &str = "Accept, Authorization, Content-Type, X-CSRF-Token, X-Requested-With";
const MAX_AGE_SECS: u32 = 300;

/// Log one line per handled request through `tracing`.
pub struct RequestLogger;

struct RequestStart(Instant);

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request logger",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, req: &mut Request<'_>, _: &mut Data<'_>) {
        req.local_cache(|| RequestStart(Instant::now()));
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let start = req.local_cache(|| RequestStart(Instant::now()));
        let remote = req
            .client_ip()
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "-".into());
        info!(
            "{remote} {} {} {} {:.2?}",
            req.method(),
            req.uri(),
            res.status(),
            start.0.elapsed()
        );
    }
}

/// Attach CORS headers for allowed origins.
///
/// Origins not in the allow list get no CORS headers at all, which leaves the
/// browser to reject the response.
#[derive(Debug, Default, Clone)]
pub struct Cors {
    allowed_origins: Vec<String>,
}

impl Cors {
    /// Construct new CORS fairing for target origins.
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }

    /// Origin is in the allow list.
    pub fn allows(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }
}

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Cross-origin headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let Some(origin) = req.headers().get_one("Origin") else {
            return;
        };

        if !self.allows(origin) {
            return;
        }

        res.set_header(Header::new("Access-Control-Allow-Origin", origin.to_string()));
        res.set_header(Header::new("Access-Control-Allow-Methods", ALLOWED_METHODS));
        res.set_header(Header::new("Access-Control-Allow-Headers", ALLOWED_HEADERS));
        res.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
        res.set_header(Header::new("Access-Control-Expose-Headers", "Link"));
        res.set_header(Header::new("Access-Control-Max-Age", MAX_AGE_SECS.to_string()));
        res.set_header(Header::new("Vary", "Origin"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_allow_list() {
        let cors = Cors::new(vec!["http://localhost:5173".into()]);
        assert!(cors.allows("http://localhost:5173"));
        assert!(!cors.allows("http://localhost:5174"));
        assert!(!cors.allows("http://evil.example"));
        assert!(!Cors::default().allows("http://localhost:5173"));
    }
}
