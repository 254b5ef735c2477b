use crate::parsers::Parser;
use regex::Regex;

/// MSBuild C# project files
pub struct CsprojParser;

impl Parser for CsprojParser {
    const GROUP_TAG: &'static str = "PropertyGroup";
    const VERSION_TAGS: &'static [&'static str] = &["Version", "AssemblyVersion"];

    fn filename_match_regex() -> anyhow::Result<Regex> {
        Ok(Regex::new(r#"\.csproj$"#)?)
    }
}
