// src/constants.rs

use chrono::{NaiveDate, NaiveDateTime};

pub const UI_WIDTH: usize = 88;
pub const FILENAME_TRUNCATE_LENGTH: usize = 65;
pub const MAX_FILENAME_BYTES: usize = 200;
pub const CONFIG_DIR_NAME: &str = concat!(".", clap::crate_name!());
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const LOG_FILE_NAME: &str = concat!(clap::crate_name!(), ".log");
pub const LOG_FALLBACK_FILE_NAME: &str = "fallback.log";
pub const DEFAULT_SAVE_DIR: &str = ".";
pub const DEFAULT_SCAN_WORKERS: usize = 5;
pub const DEFAULT_DOWNLOAD_WORKERS: usize = 5;
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_12_3) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/56.0.2924.87 Safari/537.36";

pub const DEFAULT_BASE_URL: &str = "https://ilias.uni-mannheim.de/";
pub const DEFAULT_LOGIN_URL: &str = "https://cas.uni-mannheim.de/cas/login";

/// Folder under a course that collects all task units.
pub const TASKS_DIR: &str = "Aufgaben";
/// Breadcrumb entries up to and including the course itself.
pub const BREADCRUMB_COURSE_DEPTH: usize = 3;

/// Modification time used when the portal does not report one.
/// Any existing local copy is newer than this.
pub fn unknown_mod_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

pub const HELP_CONFIG_GUIDE: &str = r#"
The configuration file is created on the first run. It is a JSON document:
----------------------------------------------
{
  "user": "your-uni-id",
  "portal": {
    "base_url": "https://ilias.uni-mannheim.de/",
    "login_url": "https://cas.uni-mannheim.de/cas/login"
  },
  "network": {
    "connect_timeout_secs": 10,
    "timeout_secs": 600,
    "max_retries": 3
  },
  "workers": { "scan": 5, "download": 5 }
}
----------------------------------------------
The password is never stored. Provide it with --password, the ILIAS_PASSWORD
environment variable, or type it when prompted."#;

pub mod portal {
    /// Query string appended to the base url to open a repository object by ref id.
    pub const REPOSITORY_QUERY: &str =
        "ilias.php?ref_id={ref_id}&cmd=frameset&cmdClass=ilrepositorygui&cmdNode=vi&baseClass=ilrepositorygui";
    pub const DESKTOP_QUERY: &str = "ilias.php?baseClass=ilPersonalDesktopGUI";

    pub mod markers {
        pub const FILE: &str = "target=file";
        pub const DIRECT_LINK: &str = "calldirectlink";
        pub const THREADS: &str = "showThreads";
        pub const OVERVIEW: &str = "showOverview";
        pub const LEARNING_MATERIAL: &str = "ilHTLMPresentationGUI";
    }

    pub mod forms {
        pub const DOWNLOAD_SUBMISSIONS_KEY: &str = "cmd[downloadSubmissions]";
        pub const DOWNLOAD_SUBMISSIONS_VALUE: &str = "Alle Abgaben herunterladen";
        pub const USER_LOGIN_KEY: &str = "user_login";
    }
}
