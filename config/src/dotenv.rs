//! Parse `.env` file into key-value map (no overwrite of existing env here; applied in lib).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// `.env` in `override_dir` if given, else in the current directory.
fn dotenv_path(override_dir: Option<&Path>) -> Option<PathBuf> {
    let dir = override_dir
        .map(Path::to_path_buf)
        .or_else(|| std::env::current_dir().ok())?;
    let path = dir.join(".env");
    path.is_file().then_some(path)
}

/// Strips matching quotes. Double quotes allow `\"`; unquoted values drop ` #` comments.
fn parse_value(raw: &str) -> String {
    let raw = raw.trim();
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return raw[1..raw.len() - 1].replace("\\\"", "\"");
    }
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return raw[1..raw.len() - 1].to_string();
    }
    match raw.find(" #") {
        Some(idx) => raw[..idx].trim_end().to_string(),
        None => raw.to_string(),
    }
}

/// `KEY=VALUE` lines; blank lines and `#` comments skipped; optional `export ` prefix.
/// No multiline values.
fn parse_dotenv(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (k, v) = line.split_once('=')?;
            let key = k.trim();
            (!key.is_empty()).then(|| (key.to_string(), parse_value(v)))
        })
        .collect()
}

/// Load `.env` from override_dir or current directory into a map. Missing file returns empty map.
pub fn load_env_map(override_dir: Option<&Path>) -> std::io::Result<HashMap<String, String>> {
    let path = match dotenv_path(override_dir) {
        Some(p) => p,
        None => return Ok(HashMap::new()),
    };
    let content = std::fs::read_to_string(&path)?;
    Ok(parse_dotenv(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_and_comments() {
        let m = parse_dotenv("\n# keys\nGROQ_API_KEY=gsk_123\n  \nCOHERE_API_KEY=co_456\n");
        assert_eq!(m.get("GROQ_API_KEY"), Some(&"gsk_123".to_string()));
        assert_eq!(m.get("COHERE_API_KEY"), Some(&"co_456".to_string()));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn quoting() {
        let m = parse_dotenv("A=\"hello world\"\nB='single # kept'\nC=\"say \\\"hi\\\"\"\nD=\"\"");
        assert_eq!(m["A"], "hello world");
        assert_eq!(m["B"], "single # kept");
        assert_eq!(m["C"], "say \"hi\"");
        assert_eq!(m["D"], "");
    }

    #[test]
    fn export_prefix_and_inline_comment() {
        let m = parse_dotenv("export WEFT_PROVIDER=mistral # chat provider\nURL=http://x/#frag");
        assert_eq!(m["WEFT_PROVIDER"], "mistral");
        assert_eq!(m["URL"], "http://x/#frag");
    }

    #[test]
    fn malformed_lines_skipped() {
        let m = parse_dotenv("NOT_KEY_VALUE\n=value_only\nKEY=\n");
        assert_eq!(m.len(), 1);
        assert_eq!(m["KEY"], "");
    }

    #[test]
    fn load_env_map_missing_and_present() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_map(Some(dir.path())).unwrap().is_empty());
        std::fs::write(dir.path().join(".env"), "A=1\nB=2\n").unwrap();
        let m = load_env_map(Some(dir.path())).unwrap();
        assert_eq!(m["A"], "1");
        assert_eq!(m["B"], "2");
    }
}
