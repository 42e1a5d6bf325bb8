pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;
use tracing::debug;

/// Structured input from `--input <file>` or, failing that, piped stdin.
/// `None` when neither is present.
pub fn read_structured<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        debug!(path, "reading input file");
        return Ok(Some(file::read_input_file(path)?));
    }
    match stdin::read_stdin()? {
        Some(data) => {
            debug!("reading input from stdin");
            Ok(Some(serde_json::from_value(data)?))
        }
        None => {
            debug!("no structured input supplied");
            Ok(None)
        }
    }
}
