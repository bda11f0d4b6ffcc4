//! Per-connection command loop

use std::io::{BufRead, Write};
use std::sync::Arc;

use crate::commands::{read_line, AuthCommand, Command, CommandContext, CommandOutcome, CommandRegistry};
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::Session;
use crate::protocol::{Response, ReturnObject, AUTH_COMMAND, QUIT_COMMAND};

/// One client connection: reads commands sequentially until the client
/// quits, the channel closes, a fatal error occurs or the gateway shuts
/// down.
pub struct Connection<R, W> {
    id: u64,
    session: Session,
    commands: Arc<CommandRegistry>,
    auth: Option<Arc<AuthCommand>>,
    authenticated: bool,
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Connection<R, W> {
    /// Create a connection. With `auth` set, the first command must be a
    /// successful authentication.
    pub fn new(
        id: u64,
        session: Session,
        commands: Arc<CommandRegistry>,
        auth: Option<Arc<AuthCommand>>,
        reader: R,
        writer: W,
    ) -> Self {
        let authenticated = auth.is_none();
        Self {
            id,
            session,
            commands,
            auth,
            authenticated,
            reader,
            writer,
        }
    }

    /// Whether the connection has passed authentication
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Serve commands until the connection ends
    pub fn run(&mut self) -> GatewayResult<()> {
        loop {
            if self.session.gateway().is_shutting_down() {
                tracing::debug!(connection = self.id, "gateway shutting down");
                return Ok(());
            }

            let Some(token) = read_line(&mut self.reader)? else {
                tracing::debug!(connection = self.id, "peer closed the connection");
                return Ok(());
            };
            if token.is_empty() {
                continue;
            }
            // Shutdown may have landed while this connection sat in read_line
            if self.session.gateway().is_shutting_down() {
                tracing::debug!(connection = self.id, command = %token, "dropping command after shutdown");
                return Ok(());
            }
            if token == QUIT_COMMAND {
                tracing::debug!(connection = self.id, "client quit");
                return Ok(());
            }

            match self.dispatch(&token) {
                Ok(CommandOutcome::Continue) => {}
                Ok(CommandOutcome::Close) => return Ok(()),
                Err(err) if err.is_channel_failure() => return Err(err),
                Err(err) => {
                    tracing::warn!(connection = self.id, command = %token, error = %err, "fatal protocol error");
                    let response = match &err {
                        GatewayError::Authentication(_) => Response::Return(ReturnObject::error(&err)),
                        _ => Response::Fatal(err.to_string()),
                    };
                    // The connection is closing either way
                    let _ = response.write_to(&mut self.writer);
                    return Err(err);
                }
            }
        }
    }

    fn dispatch(&mut self, token: &str) -> GatewayResult<CommandOutcome> {
        let auth = self.auth.clone();
        let command: &dyn Command = match (&auth, token == AUTH_COMMAND) {
            (Some(auth), true) => auth.as_ref(),
            (Some(_), false) if !self.authenticated => {
                return Err(GatewayError::Authentication(format!(
                    "authentication required before command '{}'",
                    token
                )));
            }
            _ => self
                .commands
                .get(token)
                .ok_or_else(|| GatewayError::Protocol(format!("unknown command '{}'", token)))?,
        };

        let outcome = {
            let mut ctx = CommandContext::new(&self.session, &mut self.reader, &mut self.writer);
            command.execute(&mut ctx)?
        };
        if token == AUTH_COMMAND && outcome == CommandOutcome::Continue {
            self.authenticated = true;
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};

    use crate::gateway::Gateway;
    use crate::reflect::ClassRegistry;

    fn drive(auth: Option<&str>, input: &str) -> (GatewayResult<()>, String, bool) {
        let gateway = Arc::new(Gateway::new(Arc::new(ClassRegistry::new())));
        let mut output = Vec::new();
        let (result, authenticated) = {
            let mut connection = Connection::new(
                1,
                gateway.session(),
                Arc::new(CommandRegistry::standard()),
                auth.map(|t| Arc::new(AuthCommand::new(t))),
                Cursor::new(input.as_bytes().to_vec()),
                &mut output,
            );
            let result = connection.run();
            (result, connection.is_authenticated())
        };
        (result, String::from_utf8_lossy(&output).into_owned(), authenticated)
    }

    #[test]
    fn test_commands_until_quit() {
        let (result, out, _) = drive(None, "i\ngate.util.ArrayList\ne\nc\no0\nsize\ne\nq\nc\no0\nsize\ne\n");
        assert!(result.is_ok());
        assert_eq!(out, "!ylo0\n!yi0\n");
    }

    #[test]
    fn test_decimal_operand_is_recoverable() {
        let (result, out, _) = drive(None, "i\ngate.util.ArrayList\ne\nc\no0\nadd\nD1.5\ne\nc\no0\nsize\ne\n");
        assert!(result.is_ok());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "!ylo0");
        assert!(lines[1].starts_with("!xsGatewayError: decimal values are not supported"), "{}", lines[1]);
        assert_eq!(lines[2], "!yi0");
    }

    #[test]
    fn test_collection_reference_tags() {
        let (result, out, _) = drive(
            None,
            "i\ngate.util.HashMap\ne\nc\no0\nput\nsk\ni1\ne\nc\no0\nkeySet\ne\nc\no1\niterator\ne\nc\no2\nnext\ne\n",
        );
        assert!(result.is_ok());
        assert_eq!(out, "!yao0\n!yn\n!yho1\n!ygo2\n!ysk\n");
    }

    #[test]
    fn test_unknown_command_is_fatal() {
        let (result, out, _) = drive(None, "Z\ne\nc\nt\nx\ne\n");
        assert!(matches!(result, Err(GatewayError::Protocol(_))));
        assert!(out.starts_with("!zsProtocolError: unknown command 'Z'"));
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn test_auth_gate_rejects_other_first_command() {
        let (result, out, authenticated) = drive(Some("tok"), "i\ngate.util.ArrayList\ne\n");
        assert!(matches!(result, Err(GatewayError::Authentication(_))));
        assert!(out.starts_with("!xsAuthenticationError"));
        assert!(!authenticated);
    }

    #[test]
    fn test_auth_gate_rejects_wrong_token() {
        let (result, out, authenticated) = drive(Some("tok"), "A\nnope\ne\ni\ngate.util.ArrayList\ne\n");
        assert!(result.is_ok());
        assert!(out.starts_with("!xsAuthenticationError"));
        assert_eq!(out.lines().count(), 1);
        assert!(!authenticated);
    }

    #[test]
    fn test_auth_gate_accepts_token_once() {
        let (result, out, authenticated) = drive(Some("tok"), "A\ntok\ne\ni\ngate.util.ArrayList\ne\nc\no0\nsize\ne\n");
        assert!(result.is_ok());
        assert_eq!(out, "!yv\n!ylo0\n!yi0\n");
        assert!(authenticated);
    }

    #[test]
    fn test_auth_without_configured_token_is_unknown() {
        let (result, _, _) = drive(None, "A\ntok\ne\n");
        assert!(matches!(result, Err(GatewayError::Protocol(_))));
    }

    /// Reader that requests shutdown the first time the handler blocks on it
    struct ShutdownOnRead {
        gateway: Arc<Gateway>,
        inner: Cursor<Vec<u8>>,
    }

    impl Read for ShutdownOnRead {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.gateway.shutdown();
            self.inner.read(buf)
        }
    }

    #[test]
    fn test_command_read_after_shutdown_is_not_run() {
        let gateway = Arc::new(Gateway::new(Arc::new(ClassRegistry::new())));
        let reader = BufReader::new(ShutdownOnRead {
            gateway: gateway.clone(),
            inner: Cursor::new(b"i\ngate.util.ArrayList\ne\n".to_vec()),
        });
        let mut output = Vec::new();
        let session = gateway.session();
        let result = {
            let mut connection = Connection::new(1, session, Arc::new(CommandRegistry::standard()), None, reader, &mut output);
            connection.run()
        };
        assert!(result.is_ok());
        assert!(gateway.is_shutting_down());
        assert!(output.is_empty());
    }

    #[test]
    fn test_truncated_command_closes_without_response() {
        let (result, out, _) = drive(None, "c\nt\n");
        assert!(matches!(result, Err(GatewayError::ChannelClosed)));
        assert!(out.is_empty());
    }
}
