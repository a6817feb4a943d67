// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::HomeFixture;

use anyhow::Result;
use dotkeep::archive::{
    export::{export, Manifest},
    import::import,
    matcher::MatchStrategy,
    MANIFEST_NAME,
};
use pretty_assertions::assert_eq;
use std::io::{Cursor, Read};
use zip::ZipArchive;

const FILES: [(&str, &str); 6] = [
    (".bashrc", "export EDITOR=vim\nalias ll='ls -la'\n"),
    (".zshrc", "setopt autocd\nbindkey -v\n"),
    (".profile", "umask 022\n"),
    (".gitconfig", "[user]\n\tname = Blah\n\temail = blah@blah.org\n"),
    (".vimrc", "syntax on\nset number\n"),
    (".ssh/config", "Host github.com\n\tUser git\n\tIdentityFile ~/.ssh/id_ed25519\n"),
];

#[test]
fn export_then_import_restores_every_file() -> Result<()> {
    let source = HomeFixture::new()?;
    for (path, content) in FILES {
        source.write(path, content)?;
    }
    let bytes = export(&source.manager())?;

    let target = HomeFixture::new()?;
    target.write(".bashrc", "stale\n")?;
    let report = import(&target.manager(), &MatchStrategy::Containment, &bytes)?;

    assert_eq!(report.imported, FILES.len());
    assert_eq!(report.skipped, 0);
    assert!(report.errors.is_empty());
    for (path, content) in FILES {
        assert_eq!(target.read(path)?, content.as_bytes(), "{path}");
    }

    Ok(())
}

#[test]
fn exact_matching_also_round_trips() -> Result<()> {
    let source = HomeFixture::new()?;
    for (path, content) in FILES {
        source.write(path, content)?;
    }
    let bytes = export(&source.manager())?;

    let target = HomeFixture::new()?;
    let report = import(&target.manager(), &MatchStrategy::Exact, &bytes)?;
    assert_eq!(report.imported, FILES.len());
    assert_eq!(report.skipped, 0);

    Ok(())
}

#[test]
fn manifest_describes_exactly_what_was_exported() -> Result<()> {
    let home = HomeFixture::new()?;
    home.write(".gitconfig", "[core]\n\tautocrlf = input\n")?;
    home.write(".ssh/config", "Host *\n")?;

    let bytes = export(&home.manager())?;
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut names = archive.file_names().map(String::from).collect::<Vec<_>>();
    names.sort();
    assert_eq!(names, ["Git/.gitconfig", "SSH/config", MANIFEST_NAME]);

    let mut data = String::new();
    archive.by_name(MANIFEST_NAME)?.read_to_string(&mut data)?;
    let manifest: Manifest = serde_json::from_str(&data)?;
    assert_eq!(manifest.total_files, 2);
    assert_eq!(manifest.files.len(), 2);
    assert_eq!(manifest.categories.len(), 6);
    assert_eq!(manifest.files[0].id, "gitconfig");
    assert_eq!(manifest.files[1].id, "sshconfig");
    assert!(manifest.files.iter().all(|file| file.content.is_none()));

    Ok(())
}
