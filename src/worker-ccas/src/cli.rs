//! Argument checks shared by the command line tools.

use std::path::PathBuf;

pub fn validate_input_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);

    if !path.exists() {
        return Err(format!("Input path does not exist: {}", path.display()));
    }

    if !path.is_file() {
        return Err(format!("Input path is not a file: {}", path.display()));
    }

    Ok(path)
}

pub fn validate_output_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);

    if path.exists() && path.is_dir() {
        return Err(format!("Output path is a directory: {}", path.display()));
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        return Err(format!(
            "Output file parent directory does not exist: {}",
            parent.display()
        ));
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cities.csv");
        std::fs::write(&file, "country,city\n").unwrap();

        assert_eq!(validate_input_file(file.to_str().unwrap()), Ok(file.clone()));
        assert!(validate_input_file(dir.path().join("missing.csv").to_str().unwrap()).is_err());
        assert!(validate_input_file(dir.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_output_file_checks() {
        let dir = tempfile::tempdir().unwrap();

        assert!(validate_output_file(dir.path().join("out.csv").to_str().unwrap()).is_ok());
        assert!(validate_output_file("out.csv").is_ok());

        let error = validate_output_file(dir.path().to_str().unwrap()).unwrap_err();
        assert!(error.contains("is a directory"));

        let error = validate_output_file(dir.path().join("nope").join("out.csv").to_str().unwrap()).unwrap_err();
        assert!(error.contains("parent directory does not exist"));
    }
}
