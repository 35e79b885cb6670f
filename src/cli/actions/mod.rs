pub mod expirations;
pub mod keygen;
pub mod server;

// Single dispatch point for `Action`; new variants get a matching arm in `run`.
mod run;

#[derive(Debug)]
pub enum Action {
    Server(server::Args),
    Keygen,
    Expirations(expirations::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
