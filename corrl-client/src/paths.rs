use std::path::{Path, PathBuf};

pub const HOME_DIRNAME: &str = ".corrlang";
pub const PORT_FILE: &str = "PORT";
pub const VERSION_FILE: &str = "VERSION";
pub const CONFIG_FILE: &str = "config.toml";
pub const LIB_DIR: &str = "lib";
pub const BIN_DIR: &str = "bin";

pub const DEFAULT_PORT: u16 = 6969;
pub const SERVICE_MAIN_CLASS: &str = "io.corrlang.service.CoreServiceMain";

pub fn default_home(user_home: &Path) -> PathBuf {
    user_home.join(HOME_DIRNAME)
}

/// Written by the service once it listens; holds the bound port.
pub fn port_file(home: &Path) -> PathBuf {
    home.join(PORT_FILE)
}

pub fn version_file(home: &Path) -> PathBuf {
    home.join(VERSION_FILE)
}

pub fn config_file(home: &Path) -> PathBuf {
    home.join(CONFIG_FILE)
}

pub fn lib_dir(home: &Path) -> PathBuf {
    home.join(LIB_DIR)
}

pub fn bin_dir(home: &Path) -> PathBuf {
    home.join(BIN_DIR)
}
