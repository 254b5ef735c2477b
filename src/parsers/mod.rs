use crate::error::UpdateError;
use crate::outcome::Outcome;
use crate::version::{self, Version};
use anyhow::Result;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

pub mod csproj_parser;
pub mod property_groups;

use property_groups::TagSet;

/// Options controlling how the directory tree is walked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Descend into symlinked directories. Cycles are detected and skipped.
    pub follow_links: bool,
}

/// A project descriptor format: which files to pick up and which XML elements
/// hold the version.
pub trait Parser {
    /// Element that groups properties, matched at any depth
    const GROUP_TAG: &'static str;
    /// Version elements inside a group, highest priority first
    const VERSION_TAGS: &'static [&'static str];

    fn filename_match_regex() -> Result<regex::Regex>;

    fn tag_set() -> TagSet<'static> {
        TagSet { group: Self::GROUP_TAG, fields: Self::VERSION_TAGS }
    }

    /// Writes `version` into every descriptor below `path`, reporting each
    /// file's outcome to `sink` as soon as it is known.
    fn update_version(
        path: impl AsRef<Path>,
        version: &Version,
        options: &WalkOptions,
        mut sink: impl FnMut(&Path, &Outcome),
    ) -> Result<Vec<(PathBuf, Outcome)>> {
        info!("Updating version to {}", version);
        let files = Self::get_matching_files(path, options)?;
        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            let outcome = Self::apply_version(&file, version);
            sink(&file, &outcome);
            outcomes.push((file, outcome));
        }
        Ok(outcomes)
    }

    /// Rewrites the version fields of a single file.
    ///
    /// Never fails as a whole: read, parse and write errors come back as
    /// [`Outcome::Failed`] so the caller can move on to the next file.
    fn apply_version(file: impl AsRef<Path>, version: &Version) -> Outcome {
        let file = file.as_ref();
        debug!("Checking file: '{}'", file.display());

        let io_failure = |source: std::io::Error| UpdateError::IoFailure { path: file.to_path_buf(), source };
        let contents = match std::fs::read_to_string(file) {
            Ok(contents) => contents,
            Err(source) => return Outcome::Failed(io_failure(source)),
        };

        let rewrite =
            match property_groups::rewrite_groups(&contents, Self::tag_set(), version.as_str()) {
                Ok(Some(rewrite)) => rewrite,
                Ok(None) => return Outcome::Skipped,
                Err(source) => {
                    return Outcome::Failed(UpdateError::ParseFailure {
                        path: file.to_path_buf(),
                        source,
                    });
                }
            };

        debug!(
            "Writing {} version field(s) to '{}'",
            rewrite.fields_touched,
            file.display()
        );
        match std::fs::write(file, rewrite.bytes) {
            Ok(()) => Outcome::Updated,
            Err(source) => Outcome::Failed(io_failure(source)),
        }
    }

    /// Returns the first valid version found in the descriptors below `path`.
    ///
    /// Files that cannot be read or parsed are skipped.
    fn get_current_version(
        path: impl AsRef<Path>,
        options: &WalkOptions,
    ) -> Result<Option<Version>> {
        let files = Self::get_matching_files(path, options)?;

        for file in files {
            let contents = match std::fs::read_to_string(&file) {
                Ok(contents) => contents,
                Err(err) => {
                    debug!("Skipping unreadable file '{}': {}", file.display(), err);
                    continue;
                }
            };
            let groups = match property_groups::read_groups(&contents, Self::tag_set()) {
                Ok(groups) => groups,
                Err(err) => {
                    debug!("Skipping unparsable file '{}': {}", file.display(), err);
                    continue;
                }
            };

            for group in &groups {
                for tag in Self::VERSION_TAGS {
                    if let Some(value) = group.value(tag) {
                        if version::validate(value) {
                            debug!("Found current version: {} in '{}'", value, file.display());
                            return Ok(Some(Version::parse(value)?));
                        }
                    }
                }
            }
        }

        Ok(None)
    }

    /// Walks `path` depth first, entries sorted by file name within each
    /// directory, and returns the regular files matching the filename regex.
    fn get_matching_files(
        path: impl AsRef<Path>,
        options: &WalkOptions,
    ) -> Result<Vec<PathBuf>> {
        debug!("Checking matching files");
        let mut files: Vec<PathBuf> = vec![];
        let path = path.as_ref();
        let walkdir_iter = walkdir::WalkDir::new(path)
            .follow_links(options.follow_links)
            .sort_by_file_name();
        let filename_regex = Self::filename_match_regex()?;

        for item in walkdir_iter {
            let item = match item {
                Ok(item) => item,
                Err(err) => {
                    warn!("Skipping entry while walking '{}': {}", path.display(), err);
                    continue;
                }
            };
            if !item.file_type().is_file() {
                continue;
            }
            if filename_regex.is_match(item.file_name().to_string_lossy().as_ref()) {
                files.push(item.into_path());
            }
        }

        debug!("Found files: {:?}", files);
        Ok(files)
    }
}
