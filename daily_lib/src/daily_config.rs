use stack_string::StackString;
use std::{
    env::var,
    ops::Deref,
    path::{Path, PathBuf},
    sync::Arc,
};
use time::{Date, OffsetDateTime};
use time_tz::{
    timezones::{db::UTC, get_by_name},
    OffsetDateTimeExt, Tz,
};

use crate::errors::DailyError as Error;

/// Load `path` into the environment. Logging isn't set up yet, so a bad
/// line is reported on stderr; keys before it stay loaded.
fn load_env_file(path: &Path) -> bool {
    match dotenvy::from_path(path) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", path.display());
            false
        }
    }
}

/// `DailyConfig` holds configuration information which can be set either
/// through environment variables or the config.env file, see the dotenvy crate
/// for more information about the config file format.
#[derive(Default, Debug)]
pub struct DailyConfigInner {
    pub home_dir: StackString,
    pub notion_token: StackString,
    pub template_page_id: StackString,
    pub daily_database_id: StackString,
    pub notion_api_url: StackString,
    pub notion_version: StackString,
    pub log_dir: PathBuf,
    pub date_property: StackString,
    pub sleep_property: StackString,
    pub title_property: StackString,
    pub steps_property: StackString,
    pub page_icon: StackString,
    pub timezone: Option<StackString>,
}

#[derive(Default, Debug, Clone)]
pub struct DailyConfig(Arc<DailyConfigInner>);

macro_rules! set_config_from_env {
    ($s:ident, $lookup:ident, $id:ident) => {
        if let Some($id) = $lookup(&stringify!($id).to_uppercase()) {
            $s.$id = $id.into()
        }
    };
}

macro_rules! set_config_option {
    ($s:ident, $lookup:ident, $id:ident) => {
        if let Some($id) = $lookup(&stringify!($id).to_uppercase()) {
            if !$id.is_empty() {
                $s.$id.replace($id.into());
            }
        }
    };
}

impl DailyConfigInner {
    /// Some variables have natural default values, which we set in the new()
    /// method.
    #[must_use]
    pub fn new() -> Self {
        let home_dir = dirs::home_dir().unwrap_or_else(|| Path::new("/tmp").to_path_buf());
        let log_dir = home_dir.join(".notion_daily").join("logs");

        Self {
            notion_api_url: "https://api.notion.com/v1".into(),
            notion_version: "2022-06-28".into(),
            log_dir,
            date_property: "🗓 Date".into(),
            sleep_property: "Sleep".into(),
            title_property: "✍️".into(),
            steps_property: "Steps".into(),
            page_icon: "✍🏻".into(),
            home_dir: home_dir.to_string_lossy().to_string().into(),
            ..Self::default()
        }
    }

    /// Each variable maps to an environment variable, if the variable exists,
    /// use it.
    #[must_use]
    pub fn from_env(self) -> Self {
        self.from_lookup(|key| var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup` instead of the
    /// process environment.
    #[must_use]
    pub fn from_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        set_config_from_env!(self, lookup, notion_token);
        set_config_from_env!(self, lookup, template_page_id);
        set_config_from_env!(self, lookup, daily_database_id);
        set_config_from_env!(self, lookup, notion_api_url);
        set_config_from_env!(self, lookup, notion_version);
        set_config_from_env!(self, lookup, log_dir);
        set_config_from_env!(self, lookup, date_property);
        set_config_from_env!(self, lookup, sleep_property);
        set_config_from_env!(self, lookup, title_property);
        set_config_from_env!(self, lookup, steps_property);
        set_config_from_env!(self, lookup, page_icon);
        set_config_option!(self, lookup, timezone);
        self
    }
}

impl DailyConfig {
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(DailyConfigInner::new()))
    }

    /// Pull configuration from a file if it exists,
    /// first look at `fname`, then try
    /// `${HOME}/.config/notion_daily/config.env`, then a `config.env` in the
    /// current directory, on top of whatever `.env` dotenvy finds.
    /// # Errors
    /// Returns error if a required variable isn't set
    pub fn get_config(fname: Option<&Path>) -> Result<Self, Error> {
        let default_fname = dirs::config_dir()
            .map(|d| d.join("notion_daily").join("config.env"))
            .unwrap_or_else(|| PathBuf::from("config.env"));

        let env_file = match fname {
            Some(fname) if fname.exists() => fname,
            _ => &default_fname,
        };

        dotenvy::dotenv().ok();

        if env_file.exists() {
            load_env_file(env_file);
        } else if Path::new("config.env").exists() {
            load_env_file(Path::new("config.env"));
        }

        Self::from_inner(DailyConfigInner::new().from_env())
    }

    /// # Errors
    /// Returns error if `NOTION_TOKEN`, `TEMPLATE_PAGE_ID` or
    /// `DAILY_DATABASE_ID` is empty
    pub fn from_inner(conf: DailyConfigInner) -> Result<Self, Error> {
        if conf.notion_token.is_empty() {
            Err(Error::StaticCustomError("No NOTION_TOKEN specified"))
        } else if conf.template_page_id.is_empty() {
            Err(Error::StaticCustomError("No TEMPLATE_PAGE_ID specified"))
        } else if conf.daily_database_id.is_empty() {
            Err(Error::StaticCustomError("No DAILY_DATABASE_ID specified"))
        } else {
            Ok(Self(Arc::new(conf)))
        }
    }

    /// Configured zone, falling back on the system zone and then UTC.
    #[must_use]
    pub fn local_tz(&self) -> &'static Tz {
        self.timezone
            .as_ref()
            .and_then(|tz| get_by_name(tz))
            .or_else(|| time_tz::system::get_timezone().ok())
            .unwrap_or(UTC)
    }

    #[must_use]
    pub fn today(&self) -> Date {
        OffsetDateTime::now_utc().to_timezone(self.local_tz()).date()
    }
}

impl Deref for DailyConfig {
    type Target = DailyConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
