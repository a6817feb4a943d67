// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Keep a fixed catalog of dotfiles viewable, editable, and portable.
//!
//! Dotkeep knows about a small set of well-known configuration files in the
//! user's home directory. It can list them, read and overwrite them, take
//! timestamped backups, and pack them into a ZIP archive that can later be
//! unpacked on top of another home directory. Everything is offered as a
//! local JSON service through [`api`], or directly through the `dotkeep`
//! binary.

#[macro_use]
extern crate rocket;

pub mod access;
pub mod api;
pub mod archive;
pub mod catalog;
pub mod config;
pub mod manager;
pub mod path;
pub mod system;
