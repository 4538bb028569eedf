pub mod file;
pub mod stdin;

use serde_json::Value;

/// Read JSON from `--input` or piped stdin; error when neither is present.
pub fn read_required(
    path: Option<&str>,
    command: &str,
) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_json_value(path);
    }
    if let Some(data) = stdin::read_stdin()? {
        return Ok(data);
    }
    Err(format!("--input <file.json> or piped stdin required for {command}").into())
}
