mod actions;
pub(crate) mod args;

pub(crate) use actions::handle_auth_command;
#[cfg(test)]
pub(crate) use actions::{load_credentials, render_status};
