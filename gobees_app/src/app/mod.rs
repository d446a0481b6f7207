mod app_cfg;
mod app_fns;
mod arg_parse;
mod count_output;
mod errors;
mod frame_loading;

pub(crate) use app_cfg::*;
pub(crate) use errors::*;

use count_output::CountOutput;

pub use app_fns::run_app;
