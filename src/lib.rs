pub mod event;
pub mod synapse;
pub mod tags;

mod context;
mod error;
mod handler;

pub use context::{roster_parameter_from_env, AppContext, TEAM_ROSTER_PARAM_ENV};
pub use error::AppError;
pub use handler::{derive_tags, handle_event, user_team_id};
