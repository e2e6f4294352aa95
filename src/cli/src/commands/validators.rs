use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref NAME_REGEX: Regex = Regex::new(r"^[\w][\w .:/-]*$").unwrap();
}

pub fn validate_path_exists(path: &str) -> Result<String, String> {
    if Path::new(path).exists() {
        Ok(path.to_string())
    } else {
        Err(format!("Path does not exist: {path}"))
    }
}

/// Ids and display names: letters, digits, `_`, plus inner spaces, dots,
/// colons, slashes and dashes.
pub fn validate_name(name: &str) -> Result<String, String> {
    if name.chars().count() > 100 {
        return Err("Name must be 100 characters or less".to_string());
    }
    if !NAME_REGEX.is_match(name) {
        return Err("Name must start with a letter, digit or '_'".to_string());
    }
    Ok(name.to_string())
}

pub fn validate_concurrency(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(format!("Concurrency must be a whole number of at least 1, got '{value}'")),
    }
}
