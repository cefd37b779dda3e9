//! Command-line surface of `copytools`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use copytools_core::Settings;
use copytools_engine::Locator;

#[derive(Parser)]
#[command(name = "copytools")]
#[command(about = "Copy the text of any page element, disabled form controls included")]
#[command(version)]
pub(crate) struct Cli {
    /// Directory holding storage.json, copytools.ron and the log file
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace); overrides the config file
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// List the copy history, newest first
    History,

    /// Remove every history entry
    Clear,

    /// Show the settings, or change the ones given
    Settings(SettingsArgs),

    /// Switch copying on or off
    Toggle {
        #[arg(value_enum)]
        state: Switch,

        /// Page whose context should also be told
        #[arg(long)]
        page: Option<String>,
    },

    /// Report whether copying is enabled for a page
    Status {
        /// File path or http(s) URL
        page: String,
    },

    /// List the disabled form elements of a page
    Scan {
        /// File path or http(s) URL
        page: String,

        /// Copy the text of this result row afterwards
        #[arg(long)]
        copy: Option<usize>,
    },

    /// Double-click an element of a page and copy its text
    Copy {
        /// File path or http(s) URL
        page: String,

        #[command(flatten)]
        target: TargetArgs,

        /// Value typed into the element before clicking
        #[arg(long)]
        value: Option<String>,
    },

    /// Copy a history entry again
    Recopy {
        /// Row number as shown by `history`
        index: usize,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub(crate) struct TargetArgs {
    /// CSS selector of the element
    #[arg(long)]
    pub selector: Option<String>,

    /// XPath locator as printed by `scan`
    #[arg(long)]
    pub xpath: Option<String>,
}

impl TargetArgs {
    pub fn locator(&self) -> Option<Locator> {
        match (&self.selector, &self.xpath) {
            (Some(css), _) => Some(Locator::Css(css.clone())),
            (None, Some(xpath)) => Some(Locator::XPath(xpath.clone())),
            (None, None) => None,
        }
    }
}

#[derive(Args, Default)]
pub(crate) struct SettingsArgs {
    #[arg(long)]
    pub show_tooltip: Option<bool>,

    #[arg(long)]
    pub sound: Option<bool>,

    /// Number of history entries to keep (at least 1)
    #[arg(long)]
    pub max_history: Option<usize>,
}

impl SettingsArgs {
    pub fn is_empty(&self) -> bool {
        self.show_tooltip.is_none() && self.sound.is_none() && self.max_history.is_none()
    }

    /// `current` with the given fields replaced.
    pub fn apply(&self, current: Settings) -> Settings {
        Settings {
            show_tooltip: self.show_tooltip.unwrap_or(current.show_tooltip),
            sound_enabled: self.sound.unwrap_or(current.sound_enabled),
            max_history_size: self.max_history.unwrap_or(current.max_history_size),
            ..current
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn enabled(self) -> bool {
        matches!(self, Switch::On)
    }
}
