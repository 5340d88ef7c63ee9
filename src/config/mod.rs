pub mod error;
pub mod load;
pub mod paths;
pub mod save;
pub mod settings;

pub use error::ConfigError;
pub use load::load_global_settings;
pub use save::{save_settings, write_settings};
pub use paths::{
    default_settings_path, default_state_root, request_database_path, GLOBAL_SETTINGS_FILE_NAME,
    GLOBAL_STATE_DIR, REQUEST_DATABASE_FILE_NAME,
};
pub use settings::{DedupConfig, DirectoryConfig, NotificationConfig, Settings};
