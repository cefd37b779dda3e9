mod app;
pub(crate) mod config;
pub(crate) mod logging;
pub(crate) mod popup;
mod ui;

pub(crate) use app::run;
