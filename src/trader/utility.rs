//! General utility functions.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Name of the application folder
const APP_FOLDER: &str = ".quotechart";

/// Find the app folder: the working directory's if present, else the home one
fn get_app_dir(folder_name: &str) -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let cwd_path = cwd.join(folder_name);

    // If the app folder exists in current working directory, use it
    if cwd_path.exists() {
        return cwd_path;
    }

    // Otherwise use home path
    let home_path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let temp_path = home_path.join(folder_name);

    if !temp_path.exists() {
        let _ = fs::create_dir_all(&temp_path);
    }

    temp_path
}

/// The app folder holding settings and logs
pub static TEMP_DIR: LazyLock<PathBuf> = LazyLock::new(|| get_app_dir(APP_FOLDER));

/// Get path for temp file with filename
pub fn get_file_path(filename: &str) -> PathBuf {
    TEMP_DIR.join(filename)
}

/// Get path for temp folder with folder name
pub fn get_folder_path(folder_name: &str) -> PathBuf {
    let folder_path = TEMP_DIR.join(folder_name);
    if !folder_path.exists() {
        let _ = fs::create_dir_all(&folder_path);
    }
    folder_path
}

/// Split a comma separated list, dropping blanks
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("RELIANCE.NS, MARUTI.NS,,TCS.NS "),
            vec!["RELIANCE.NS", "MARUTI.NS", "TCS.NS"]
        );
        assert!(split_list(" ").is_empty());
    }

    #[test]
    fn test_file_path_in_app_folder() {
        let path = get_file_path("chart_setting.json");
        assert!(path.ends_with("chart_setting.json"));
        assert!(path.parent().unwrap().ends_with(APP_FOLDER));
    }
}
