//! Format TICKscript files

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::Builder;

use super::CliError;
use crate::{format, parse, to_json_pretty};

/// Extension appended to the original file when backups are requested.
pub const BACKUP_EXT: &str = ".orig";

/// Options for the format command
#[derive(Debug, Clone, Default)]
pub struct FormatOptions {
    /// Files to format
    pub paths: Vec<PathBuf>,
    /// Rewrite files in place instead of printing
    pub write: bool,
    /// Keep the original of each rewritten file as `<file>.orig`
    pub backup: bool,
    /// Print the syntax tree as JSON instead of script text
    pub json: bool,
}

/// Result of formatting one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatResult {
    /// The file was rewritten in place
    Written(PathBuf),
    /// Formatted output for stdout
    Output(String),
}

/// Parses `source` and renders it as script text, or as pretty JSON when
/// `json` is set.
pub fn format_source(source: &str, json: bool) -> Result<String, CliError> {
    let node = parse(source)?;
    if json {
        let mut out = to_json_pretty(&node)?;
        out.push('\n');
        Ok(out)
    } else {
        Ok(format(&node))
    }
}

/// Formats every file named in `options` in order, handing each result
/// to `on_result` as soon as it is ready. Stops at the first failure.
pub fn execute_format<F>(options: &FormatOptions, mut on_result: F) -> Result<(), CliError>
where
    F: FnMut(FormatResult) -> Result<(), CliError>,
{
    if options.paths.is_empty() && options.write {
        return Err(CliError::NoFiles);
    }
    for path in &options.paths {
        let result = format_file(path, options).map_err(|e| e.in_file(path))?;
        on_result(result)?;
    }
    Ok(())
}

fn format_file(path: &Path, options: &FormatOptions) -> Result<FormatResult, CliError> {
    let source = fs::read_to_string(path)?;
    let formatted = format_source(&source, options.json)?;
    if !options.write {
        return Ok(FormatResult::Output(formatted));
    }

    // Sibling of `path` so the final rename never crosses filesystems.
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = Builder::new().prefix(".tickfmt").tempfile_in(dir)?;
    tmp.write_all(formatted.as_bytes())?;
    if options.backup {
        let mut orig = path.as_os_str().to_owned();
        orig.push(BACKUP_EXT);
        fs::rename(path, PathBuf::from(orig))?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(FormatResult::Written(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn collect(options: &FormatOptions) -> (Vec<FormatResult>, Result<(), CliError>) {
        let mut results = Vec::new();
        let outcome = execute_format(options, |result| {
            results.push(result);
            Ok(())
        });
        (results, outcome)
    }

    #[test]
    fn test_format_source() {
        assert_eq!(format_source("var x=1", false).unwrap(), "var x = 1\n");
        let json = format_source("x", true).unwrap();
        assert!(json.contains("\"typeOf\": \"program\""), "{}", json);
        assert!(json.ends_with("}\n"));
    }

    #[test]
    fn test_write_in_place_with_backup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("task.tick");
        fs::write(&path, "stream|from()").unwrap();

        let options = FormatOptions {
            paths: vec![path.clone()],
            write: true,
            backup: true,
            json: false,
        };
        let (results, outcome) = collect(&options);
        outcome.unwrap();
        assert_eq!(results, vec![FormatResult::Written(path.clone())]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "stream\n    |from()\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("task.tick.orig")).unwrap(),
            "stream|from()"
        );
        // Only the rewritten file and its backup remain.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.tick");
        fs::write(&path, "var x = ").unwrap();

        let options = FormatOptions {
            paths: vec![path.clone()],
            write: true,
            ..FormatOptions::default()
        };
        let (results, outcome) = collect(&options);
        let err = outcome.unwrap_err();
        assert!(results.is_empty());
        assert!(err.to_string().starts_with(&format!("{}: parser:", path.display())));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "var x = ");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_output_before_failure_is_delivered() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.tick");
        let bad = dir.path().join("bad.tick");
        let never = dir.path().join("never.tick");
        fs::write(&good, "var x=1").unwrap();
        fs::write(&bad, "var = 2").unwrap();
        fs::write(&never, "var y=2").unwrap();

        let options = FormatOptions {
            paths: vec![good, bad.clone(), never],
            ..FormatOptions::default()
        };
        let (results, outcome) = collect(&options);
        assert_eq!(results, vec![FormatResult::Output("var x = 1\n".to_string())]);
        match outcome {
            Err(CliError::File { path, .. }) => assert_eq!(path, bad),
            other => panic!("expected file error, got {:?}", other),
        }
    }

    #[test]
    fn test_write_requires_files() {
        let options = FormatOptions {
            write: true,
            ..FormatOptions::default()
        };
        let (results, outcome) = collect(&options);
        let err = outcome.unwrap_err();
        assert!(results.is_empty());
        assert!(matches!(err, CliError::NoFiles));
        assert_eq!(err.exit_code(), 2);
    }
}
