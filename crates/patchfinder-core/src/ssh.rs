//! SSH transport for Cisco IOS. IOS serves one interactive shell per session,
//! so commands are written to a shell channel and output is read until the
//! exec prompt comes back.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client::{self, Handle, Msg};
use russh::{Channel, ChannelMsg, Disconnect};
use russh_keys::key::PublicKey;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::PollConfig;
use crate::transport::{DeviceTarget, DeviceTransport, TransportError};

const DISABLE_PAGING: &str = "terminal length 0";
const LOGIN: &str = "<login>";

struct SwitchHandler;

#[async_trait]
impl client::Handler for SwitchHandler {
    type Error = russh::Error;

    async fn check_server_key(&mut self, _server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        // switches are addressed by operator-supplied IP with no known_hosts store
        Ok(true)
    }
}

struct ShellSession {
    handle: Handle<SwitchHandler>,
    channel: Channel<Msg>,
    prompt: String,
}

pub struct SshTransport {
    port: u16,
    connect_timeout: Duration,
    command_timeout: Duration,
    session: Option<ShellSession>,
}

impl SshTransport {
    pub fn new(config: &PollConfig) -> Self {
        Self {
            port: config.ssh_port,
            connect_timeout: config.connect_timeout,
            command_timeout: config.command_timeout,
            session: None,
        }
    }

    async fn open(&self, target: &DeviceTarget) -> Result<ShellSession, TransportError> {
        let config = Arc::new(client::Config {
            inactivity_timeout: Some(self.command_timeout * 2),
            ..Default::default()
        });
        let addr = (target.host.as_str(), self.port);

        let mut handle = timeout(self.connect_timeout, client::connect(config, addr, SwitchHandler))
            .await
            .map_err(|_| TransportError::ConnectionTimeout)?
            .map_err(map_ssh_error)?;

        let authenticated = timeout(
            self.connect_timeout,
            handle.authenticate_password(
                target.credentials.username.clone(),
                target.credentials.password.clone(),
            ),
        )
        .await
        .map_err(|_| TransportError::ConnectionTimeout)?
        .map_err(map_ssh_error)?;
        if !authenticated {
            return Err(TransportError::AuthenticationFailed);
        }

        let mut channel = handle.channel_open_session().await.map_err(map_ssh_error)?;
        channel
            .request_pty(false, "vt100", 511, 24, 0, 0, &[])
            .await
            .map_err(map_ssh_error)?;
        channel.request_shell(false).await.map_err(map_ssh_error)?;

        // the prompt is read from the reply to a bare newline, clear of any MOTD banner
        read_until(&mut channel, self.connect_timeout, LOGIN, has_prompt).await?;
        channel.data(&b"\n"[..]).await.map_err(map_ssh_error)?;
        let reply = read_until(&mut channel, self.connect_timeout, LOGIN, has_prompt).await?;
        let prompt = detect_prompt(&reply).ok_or_else(|| TransportError::Command {
            command: LOGIN.to_string(),
            reason: "no exec prompt after login".to_string(),
        })?;
        debug!(%prompt, "detected exec prompt");

        let mut session = ShellSession {
            handle,
            channel,
            prompt,
        };
        run_in_shell(&mut session, DISABLE_PAGING, self.command_timeout).await?;
        Ok(session)
    }
}

#[async_trait]
impl DeviceTransport for SshTransport {
    async fn connect(&mut self, target: &DeviceTarget) -> Result<(), TransportError> {
        if self.session.is_some() {
            self.disconnect().await?;
        }
        let session = self.open(target).await?;
        info!(host = %target.host, "ssh session established");
        self.session = Some(session);
        Ok(())
    }

    async fn send_command(&mut self, command: &str) -> Result<String, TransportError> {
        let command_timeout = self.command_timeout;
        let Some(session) = self.session.as_mut() else {
            return Err(TransportError::NotConnected);
        };
        run_in_shell(session, command, command_timeout).await
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        // no `exit`/`logout`: some IOS releases hang waiting on it
        if let Err(err) = session.channel.close().await {
            warn!(error = %err, "failed to close shell channel");
        }
        session
            .handle
            .disconnect(Disconnect::ByApplication, "", "English")
            .await
            .map_err(map_ssh_error)
    }

    fn is_connected(&self) -> bool {
        self.session.is_some()
    }
}

async fn run_in_shell(
    session: &mut ShellSession,
    command: &str,
    limit: Duration,
) -> Result<String, TransportError> {
    let line = format!("{command}\n");
    session
        .channel
        .data(line.as_bytes())
        .await
        .map_err(map_ssh_error)?;

    let prompt = session.prompt.clone();
    let raw = read_until(&mut session.channel, limit, command, |buf| {
        buf.trim_end().ends_with(prompt.as_str())
    })
    .await?;

    Ok(clean_command_output(&raw, command, &prompt))
}

async fn read_until<F>(
    channel: &mut Channel<Msg>,
    limit: Duration,
    command: &str,
    done: F,
) -> Result<String, TransportError>
where
    F: Fn(&str) -> bool,
{
    let mut buf = String::new();
    let read = async {
        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } | ChannelMsg::ExtendedData { ref data, .. } => {
                    buf.push_str(&String::from_utf8_lossy(data));
                    if done(&buf) {
                        return Ok(());
                    }
                }
                ChannelMsg::Eof | ChannelMsg::Close => break,
                _ => {}
            }
        }
        Err(TransportError::Command {
            command: command.to_string(),
            reason: "channel closed by device".to_string(),
        })
    };

    match timeout(limit, read).await {
        Ok(Ok(())) => Ok(buf),
        Ok(Err(err)) => Err(err),
        Err(_) => Err(TransportError::CommandTimeout {
            command: command.to_string(),
        }),
    }
}

fn has_prompt(buf: &str) -> bool {
    detect_prompt(buf).is_some()
}

/// A hostname followed by `#` or `>`, e.g. `SW-ACCESS-01#` or `core(config)#`.
pub fn is_prompt(line: &str) -> bool {
    let Some(name) = line.strip_suffix('#').or_else(|| line.strip_suffix('>')) else {
        return false;
    };
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | ':' | '/' | '(' | ')'))
}

/// Last non-empty line of shell output when it is an exec prompt.
pub fn detect_prompt(output: &str) -> Option<String> {
    output
        .replace('\r', "")
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .filter(|line| is_prompt(line))
        .map(str::to_string)
}

/// Drops the echoed command line and the trailing prompt from shell output.
pub fn clean_command_output(raw: &str, command: &str, prompt: &str) -> String {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "");
    let mut lines: Vec<&str> = normalized.lines().collect();

    if let Some(first) = lines.first() {
        if first.trim_end().ends_with(command.trim()) {
            lines.remove(0);
        }
    }
    while let Some(last) = lines.last() {
        let last = last.trim();
        if last.is_empty() || last == prompt {
            lines.pop();
        } else {
            break;
        }
    }

    lines.join("\n")
}

fn map_ssh_error(err: russh::Error) -> TransportError {
    match err {
        russh::Error::IO(io) if io.kind() == std::io::ErrorKind::TimedOut => {
            TransportError::ConnectionTimeout
        }
        other => TransportError::Io(other.to_string()),
    }
}
