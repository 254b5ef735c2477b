use crate::arguments::Arguments;
use crate::error::UpdateError;
use crate::parsers::csproj_parser::CsprojParser;
use crate::parsers::{Parser, WalkOptions};
use crate::version::{self, Version};
use anyhow::{Result, anyhow};
use log::debug;
use std::io::{BufRead, Write};
use std::path::PathBuf;

const INVALID_VERSION_LINE: &str = "❌ Invalid version format. Use format X.X.X.X";

/// Where to run and which version to write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub root: PathBuf,
    pub version: Version,
}

/// Builds the request for silent mode; nothing is asked and nothing is inferred.
pub fn silent_request(args: &Arguments) -> Result<Request, UpdateError> {
    let version = args.new_version.as_deref().ok_or(UpdateError::MissingVersion)?;
    Ok(Request { root: args.root_or_current(), version: Version::parse(version)? })
}

/// Asks for the root directory (with `--choose-dir`) and the version.
///
/// The version prompt defaults to the version given on the command line, or to
/// the one found in the first descriptor under the root. It repeats until a
/// valid version is entered and fails if `input` is closed first.
pub fn prompt_request<R: BufRead, W: Write>(
    args: &Arguments,
    options: &WalkOptions,
    input: &mut R,
    output: &mut W,
) -> Result<Request> {
    let mut root = args.root_or_current();
    if args.choose_dir && args.path.is_none() {
        let prompt = format!("Root directory [{}]: ", root.display());
        match ask(input, output, &prompt)? {
            Some(dir) if !dir.is_empty() => root = PathBuf::from(dir),
            Some(_) => {}
            None => return Err(anyhow!("Input closed before a directory was chosen")),
        }
    }

    let default = match args.new_version.as_deref().filter(|v| version::validate(v)) {
        Some(v) => Some(v.to_string()),
        None => {
            let inferred = CsprojParser::get_current_version(&root, options)?;
            debug!("Inferred version: {:?}", inferred);
            inferred.map(|v| v.to_string())
        }
    };

    let prompt = match &default {
        Some(v) => format!("Version (format: X.X.X.X) [{v}]: "),
        None => "Version (format: X.X.X.X): ".to_string(),
    };
    loop {
        let line = ask(input, output, &prompt)?
            .ok_or_else(|| anyhow!("Input closed before a version was entered"))?;
        let candidate = match (line.is_empty(), &default) {
            (true, Some(default)) => default.clone(),
            _ => line,
        };
        match Version::parse(&candidate) {
            Ok(version) => return Ok(Request { root, version }),
            Err(_) => writeln!(output, "{INVALID_VERSION_LINE}")?,
        }
    }
}

/// Prints `prompt` and reads one trimmed line; `None` once input is exhausted
fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<Option<String>> {
    write!(output, "{prompt}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
