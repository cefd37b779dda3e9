mod constants;
pub(crate) mod render;
