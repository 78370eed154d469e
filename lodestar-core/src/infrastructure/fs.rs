// lodestar-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::io::Write;
use std::path::Path;

/// Write content to a file atomically using a temporary file in the target
/// directory: the artifact is either fully written or absent, never a
/// half-written CSV or JSON report.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));

    // Same directory so the final rename stays on one filesystem
    let mut temp_file = tempfile::NamedTempFile::new_in(parent).map_err(InfrastructureError::Io)?;

    temp_file
        .write_all(content.as_ref())
        .map_err(InfrastructureError::Io)?;

    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Serialize a value as pretty JSON and write it atomically.
pub fn write_json<P: AsRef<Path>, T: serde::Serialize>(
    path: P,
    value: &T,
) -> Result<(), InfrastructureError> {
    let content = serde_json::to_string_pretty(value)
        .map_err(|e| InfrastructureError::ConfigError(format!("JSON serialization: {e}")))?;
    atomic_write(path, content)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_creates_file() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("report.json");

        atomic_write(&file_path, "{}")?;

        assert!(file_path.exists());
        assert_eq!(fs::read_to_string(file_path)?, "{}");
        Ok(())
    }

    #[test]
    fn test_atomic_write_overwrites_existing() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("data.csv");

        atomic_write(&file_path, "a,b\n1,2\n")?;
        atomic_write(&file_path, "a,b\n3,4\n")?;

        assert_eq!(fs::read_to_string(file_path)?, "a,b\n3,4\n");
        Ok(())
    }

    #[test]
    fn test_write_json_round_trips() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("result.json");

        write_json(&file_path, &serde_json::json!({"rows": 3}))?;

        let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(file_path)?)?;
        assert_eq!(parsed["rows"], 3);
        Ok(())
    }
}
