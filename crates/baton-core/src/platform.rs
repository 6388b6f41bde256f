use std::path::PathBuf;

pub fn config_dir() -> PathBuf {
    // Use ~/.config/baton/ on macOS too (avoid the Application Support
    // folder for consistency with the other dirs).
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("baton")
    }
    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("baton")
    }
}

pub fn data_dir() -> PathBuf {
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| std::env::temp_dir())
            .join(".local")
            .join("share")
            .join("baton")
    }
    #[cfg(windows)]
    {
        dirs::data_local_dir()
            .unwrap_or_else(|| std::env::temp_dir())
            .join("baton")
    }
}
