use crate::error::UpdateError;
use crate::outcome::Outcome;
use crate::parsers::csproj_parser::CsprojParser;
use crate::parsers::{Parser, WalkOptions};
use crate::version::Version;
use log::info;
use std::path::{Path, PathBuf};

/// Outcomes of one run, in processing order
#[derive(Debug, Default)]
pub struct RunReport {
    pub entries: Vec<(PathBuf, Outcome)>,
}

impl RunReport {
    pub fn updated(&self) -> usize {
        self.entries.iter().filter(|(_, outcome)| outcome.is_updated()).count()
    }

    pub fn skipped(&self) -> usize {
        self.entries.iter().filter(|(_, outcome)| outcome.is_skipped()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|(_, outcome)| outcome.is_failed()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Validates `version` and writes it into every `.csproj` below `root`.
///
/// An invalid version aborts before the tree is even walked. After that, each
/// file is handled on its own and a failure never stops the rest of the batch.
pub fn run(
    root: impl AsRef<Path>,
    version: &str,
    options: &WalkOptions,
    sink: impl FnMut(&Path, &Outcome),
) -> Result<RunReport, UpdateError> {
    let version = Version::parse(version)?;
    run_version(root, &version, options, sink)
}

pub fn run_version(
    root: impl AsRef<Path>,
    version: &Version,
    options: &WalkOptions,
    sink: impl FnMut(&Path, &Outcome),
) -> Result<RunReport, UpdateError> {
    run_with::<CsprojParser>(root, version, options, sink)
}

/// Same as [`run_version`] for any descriptor format
pub fn run_with<P: Parser>(
    root: impl AsRef<Path>,
    version: &Version,
    options: &WalkOptions,
    sink: impl FnMut(&Path, &Outcome),
) -> Result<RunReport, UpdateError> {
    let root = root.as_ref();
    info!("Running update in directory: {} with version: {}", root.display(), version);

    let entries = P::update_version(root, version, options, sink).map_err(|err| {
        UpdateError::ScanFailure { path: root.to_path_buf(), reason: format!("{err:#}") }
    })?;
    Ok(RunReport { entries })
}
