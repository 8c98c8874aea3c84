//! Loaders for the two static documents the harvest pipeline produces.
//! The geometry document is owned by `resolver::PrecomputedStore`; this
//! module only covers the name pool.

use std::path::Path;

use anyhow::{Context, Result};

/// Load the name pool document: a JSON array of street-name strings.
/// Read once at session start; read-only afterwards.
pub fn load_name_pool(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading name pool from {}", path.display()))?;
    let names: Vec<String> =
        serde_json::from_str(&raw).with_context(|| format!("parsing name pool {}", path.display()))?;
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_a_name_pool() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"["Avenida de Mayo", "Florida", "Defensa"]"#)
            .unwrap();
        let pool = load_name_pool(file.path()).unwrap();
        assert_eq!(pool, vec!["Avenida de Mayo", "Florida", "Defensa"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_name_pool(Path::new("/nonexistent/street_names.json")).is_err());
    }

    #[test]
    fn malformed_pool_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"not": "an array"}"#).unwrap();
        assert!(load_name_pool(file.path()).is_err());
    }
}
