//! src/platforms/twitch_irc/client.rs

use std::io;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter, split};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use tokio_native_tls::TlsConnector;
use tracing::{debug, error, info, trace};

use super::message::IrcLine;
use crate::Error;

pub const TWITCH_IRC_HOST: &str = "irc.chat.twitch.tv";
pub const TWITCH_IRC_TLS_PORT: u16 = 6697;

/// A chat line received from the server, left unparsed for the chat parser.
#[derive(Debug, Clone)]
pub struct IrcIncomingEvent {
    pub channel: Option<String>,
    pub raw_line: String,
    pub command: String,
}

/// TLS chat connection that only does what the bot needs: log in, join one
/// channel, answer keep-alives and hand chat lines upstream.
pub struct TwitchIrcClient {
    raw_outgoing: mpsc::UnboundedSender<String>,

    /// Taken by whoever consumes chat lines.
    pub incoming: Option<mpsc::UnboundedReceiver<IrcIncomingEvent>>,

    read_task: JoinHandle<()>,
    write_task: JoinHandle<()>,
}

impl TwitchIrcClient {
    /// Connects with TLS, logs in and requests the tags/commands capabilities.
    pub async fn connect(login: &str, oauth_token: &str) -> Result<Self, Error> {
        let tcp = TcpStream::connect((TWITCH_IRC_HOST, TWITCH_IRC_TLS_PORT))
            .await
            .map_err(|e| Error::Platform(format!("TCP connect error: {e}")))?;

        let connector = native_tls::TlsConnector::new()
            .map_err(|e| Error::Platform(format!("TLSConnector::new() => {e}")))?;
        let tls_stream = TlsConnector::from(connector)
            .connect(TWITCH_IRC_HOST, tcp)
            .await
            .map_err(|e| Error::Platform(format!("TLS connect() => {e}")))?;

        let (read_half, write_half) = split(tls_stream);

        let (tx_outgoing, rx_outgoing) = mpsc::unbounded_channel::<String>();
        let (tx_incoming, rx_incoming) = mpsc::unbounded_channel::<IrcIncomingEvent>();

        let write_task = tokio::spawn(Self::writer_loop(write_half, rx_outgoing));

        let token = if oauth_token.starts_with("oauth:") {
            oauth_token.to_string()
        } else {
            format!("oauth:{oauth_token}")
        };
        tx_outgoing.send(format!("PASS {token}")).ok();
        tx_outgoing.send(format!("NICK {}", login.to_lowercase())).ok();
        tx_outgoing.send("CAP REQ :twitch.tv/tags twitch.tv/commands".to_string()).ok();

        let read_task = tokio::spawn(Self::reader_loop(read_half, tx_incoming, tx_outgoing.clone()));

        info!("(TwitchIrcClient) connected to {}:{} as '{}'", TWITCH_IRC_HOST, TWITCH_IRC_TLS_PORT, login);

        Ok(Self {
            raw_outgoing: tx_outgoing,
            incoming: Some(rx_incoming),
            read_task,
            write_task,
        })
    }

    async fn reader_loop<R>(
        read_half: R,
        tx_incoming: mpsc::UnboundedSender<IrcIncomingEvent>,
        tx_outgoing: mpsc::UnboundedSender<String>,
    )
    where
        R: tokio::io::AsyncRead + Unpin,
    {
        let mut reader = BufReader::new(read_half);
        let mut line_buffer = String::new();

        loop {
            line_buffer.clear();
            match reader.read_line(&mut line_buffer).await {
                Ok(0) => {
                    info!("(TwitchIrcClient) read_loop => EOF");
                    break;
                }
                Ok(_) => {
                    let line = line_buffer.trim_end();
                    if line.is_empty() {
                        continue;
                    }
                    trace!("<< {}", line);

                    if let Some(event) = Self::route_line(line, &tx_outgoing) {
                        if tx_incoming.send(event).is_err() {
                            debug!("(TwitchIrcClient) nobody is reading chat lines anymore");
                            break;
                        }
                    }
                }
                Err(e) => {
                    error!("(TwitchIrcClient) read error => {:?}", e);
                    break;
                }
            }
        }

        info!("(TwitchIrcClient) reader_loop ended.");
    }

    /// Answers PINGs and returns the lines worth forwarding (PRIVMSG only).
    fn route_line(line: &str, tx_outgoing: &mpsc::UnboundedSender<String>) -> Option<IrcIncomingEvent> {
        let parsed = IrcLine::parse(line);

        if parsed.is_command("PING") {
            let server = parsed.trailing.unwrap_or(TWITCH_IRC_HOST);
            tx_outgoing.send(format!("PONG :{server}")).ok();
            debug!("Auto PONG -> {}", server);
            return None;
        }

        if parsed.is_command("PRIVMSG") {
            return Some(IrcIncomingEvent {
                channel: parsed.channel().map(str::to_string),
                raw_line: line.to_string(),
                command: "PRIVMSG".to_string(),
            });
        }

        debug!("(TwitchIrcClient) ignoring {}", parsed.command);
        None
    }

    async fn writer_loop<W>(
        mut write_half: W,
        mut rx_outgoing: mpsc::UnboundedReceiver<String>,
    )
    where
        W: tokio::io::AsyncWrite + Unpin,
    {
        let mut writer = BufWriter::new(&mut write_half);

        while let Some(line) = rx_outgoing.recv().await {
            if line.starts_with("PASS ") {
                debug!(">> PASS ***");
            } else {
                debug!(">> {}", line);
            }
            if let Err(e) = Self::write_line(&mut writer, &line).await {
                error!("writer error => {:?}", e);
                break;
            }
        }

        info!("(TwitchIrcClient) writer_loop ended.");
    }

    async fn write_line<W>(writer: &mut W, line: &str) -> io::Result<()>
    where
        W: tokio::io::AsyncWrite + Unpin,
    {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\r\n").await?;
        writer.flush().await
    }

    pub fn send_raw_line(&self, line: &str) {
        let _ = self.raw_outgoing.send(line.to_string());
    }

    /// Joins `#channel`; a missing `#` is added.
    pub fn join_channel(&self, channel: &str) {
        let channel = channel.trim_start_matches('#').to_lowercase();
        self.send_raw_line(&format!("JOIN #{channel}"));
    }

    pub fn shutdown(self) {
        self.read_task.abort();
        self.write_task.abort();
    }
}
