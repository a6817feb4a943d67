// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Host system information.
//!
//! Best effort only. Every probe falls back to a placeholder instead of
//! failing, so asking for system information never errors out.

use serde::{Deserialize, Serialize};
use std::{
    env,
    ffi::OsStr,
    fs::read_to_string,
    path::Path,
    process::Command,
};
use tracing::debug;

/// Basic facts about the host and the user running dotkeep.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub os: String,
    pub kernel: String,
    pub shell: String,
    pub home_dir: String,
    pub user: String,
}

impl SystemInfo {
    /// Probe current host.
    pub fn probe() -> Self {
        let os = read_to_string("/etc/os-release")
            .ok()
            .and_then(|data| os_release_pretty_name(&data))
            .or_else(|| {
                syscall_stdout("lsb_release", ["-d"])
                    .and_then(|out| out.split_once(':').map(|(_, os)| os.trim().to_string()))
            })
            .unwrap_or_else(|| "Linux".into());
        let kernel = syscall_stdout("uname", ["-r"]).unwrap_or_else(|| "Unknown".into());

        Self {
            os,
            kernel,
            shell: env::var("SHELL").unwrap_or_default(),
            home_dir: crate::path::home_dir()
                .map(|path| display(&path))
                .unwrap_or_default(),
            user: env::var("USER").unwrap_or_default(),
        }
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn os_release_pretty_name(data: &str) -> Option<String> {
    data.lines()
        .find_map(|line| line.strip_prefix("PRETTY_NAME="))
        .map(|value| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

fn syscall_stdout(
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
) -> Option<String> {
    let output = match Command::new(cmd.as_ref()).args(args).output() {
        Ok(output) => output,
        Err(err) => {
            debug!("cannot run {:?}: {err}", cmd.as_ref());
            return None;
        }
    };

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(output.stdout.as_slice())
        .trim()
        .to_string();
    (!stdout.is_empty()).then_some(stdout)
}
