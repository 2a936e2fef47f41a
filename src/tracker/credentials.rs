use anyhow::{Context, Result, bail};
use std::path::Path;

/// Pull the access token out of a line-oriented `key=value` credentials file.
///
/// An explicit `access_token=` line wins; otherwise the value on the second
/// line is used, which is where the broker's export puts it.
pub fn parse_access_token(contents: &str) -> Option<String> {
    let value_of = |line: &str| {
        line.split_once('=')
            .map(|(_, v)| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let explicit = contents.lines().find_map(|line| {
        let (key, _) = line.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("access_token") {
            value_of(line)
        } else {
            None
        }
    });

    explicit.or_else(|| contents.lines().nth(1).and_then(value_of))
}

/// Resolve the token: `TRACKER_ACCESS_TOKEN` first, then the credentials file.
pub fn load_access_token(path: impl AsRef<Path>) -> Result<String> {
    if let Ok(token) = std::env::var("TRACKER_ACCESS_TOKEN") {
        let token = token.trim().to_string();
        if !token.is_empty() {
            return Ok(token);
        }
    }

    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read credentials file {}", path.display()))?;

    match parse_access_token(&contents) {
        Some(token) => Ok(token),
        None => bail!("No access token found in {}", path.display()),
    }
}
