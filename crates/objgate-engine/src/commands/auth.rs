//! Connection authentication

use super::{Command, CommandContext, CommandOutcome};
use crate::error::{GatewayError, GatewayResult};
use crate::protocol::{unescape, ReturnObject, AUTH_COMMAND};

/// `A`: present the shared secret. Only dispatched by a connection that
/// requires authentication, and only as its first command.
pub struct AuthCommand {
    token: String,
}

impl AuthCommand {
    /// Command checking against `token`
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl Command for AuthCommand {
    fn name(&self) -> &'static str {
        AUTH_COMMAND
    }

    /// `Continue` once the token matches; on mismatch writes one error
    /// response and returns `Close`.
    fn execute(&self, ctx: &mut CommandContext<'_>) -> GatewayResult<CommandOutcome> {
        let presented = unescape(&ctx.read_line()?);
        ctx.read_end()?;

        if presented == self.token {
            tracing::debug!("connection authenticated");
            return ctx.respond(ReturnObject::Void);
        }
        tracing::warn!("authentication failed");
        let err = GatewayError::Authentication("authentication token mismatch".to_string());
        ctx.respond(ReturnObject::error(&err))?;
        Ok(CommandOutcome::Close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{run, session};

    #[test]
    fn test_token_match() {
        let session = session();
        let command = AuthCommand::new("s3cret");
        let (outcome, out) = run(&command, &session, &["s3cret", "e"]);
        assert_eq!(outcome.unwrap(), CommandOutcome::Continue);
        assert_eq!(out, "!yv\n");
    }

    #[test]
    fn test_token_mismatch_closes() {
        let session = session();
        let command = AuthCommand::new("s3cret");
        let (outcome, out) = run(&command, &session, &["guess", "e"]);
        assert_eq!(outcome.unwrap(), CommandOutcome::Close);
        assert!(out.starts_with("!xsAuthenticationError"));
    }
}
