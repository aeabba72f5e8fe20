use crate::api;
use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::{anyhow, Result};

/// Handle the server action
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Server { port, dsn } => api::new(port, dsn, globals).await,
        Action::CreateAdmin { .. } => Err(anyhow!("not a server action")),
    }
}
