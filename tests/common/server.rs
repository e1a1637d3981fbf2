//! Server end of a scripted connection.

use futures_util::{SinkExt, StreamExt};
use tmi_proto::{IrcCodec, RawMessage};
use tokio::io::DuplexStream;
use tokio::time::timeout;
use tokio_util::codec::Framed;

use super::WAIT;

/// Fake chat server speaking the line protocol over an in-memory pipe.
pub struct FakeServer {
    framed: Framed<DuplexStream, IrcCodec>,
}

#[allow(dead_code)]
impl FakeServer {
    pub fn new(stream: DuplexStream) -> Self {
        Self {
            framed: Framed::new(stream, IrcCodec::new()),
        }
    }

    /// Receive the next frame the client wrote.
    pub async fn recv(&mut self) -> anyhow::Result<RawMessage> {
        match timeout(WAIT, self.framed.next()).await? {
            Some(frame) => Ok(frame?),
            None => Err(anyhow::anyhow!("client closed the connection")),
        }
    }

    /// Receive the next frame rendered as a line (without terminator).
    pub async fn recv_line(&mut self) -> anyhow::Result<String> {
        Ok(self.recv().await?.to_string())
    }

    /// Send a raw line to the client.
    pub async fn send_line(&mut self, line: &str) -> anyhow::Result<()> {
        let msg: RawMessage = line
            .parse()
            .map_err(|e| anyhow::anyhow!("bad test line {line:?}: {e}"))?;
        self.framed.send(msg).await?;
        Ok(())
    }

    /// Consume `PASS`, `NICK` and `USER`; returns `(password, nickname)`.
    pub async fn expect_registration(&mut self) -> anyhow::Result<(String, String)> {
        let pass = self.recv().await?;
        anyhow::ensure!(pass.command == "PASS", "expected PASS, got {pass}");
        let nick = self.recv().await?;
        anyhow::ensure!(nick.command == "NICK", "expected NICK, got {nick}");
        let user = self.recv().await?;
        anyhow::ensure!(user.command == "USER", "expected USER, got {user}");

        let nickname = nick.params[0].clone();
        anyhow::ensure!(
            user.to_string() == format!("USER {nickname} 8 * :{nickname}"),
            "unexpected USER frame: {user}"
        );
        Ok((pass.params[0].clone(), nickname))
    }

    /// Send a welcome ending in end-of-MOTD.
    pub async fn welcome(&mut self, nickname: &str) -> anyhow::Result<()> {
        self.send_line(&format!(":tmi.twitch.tv 001 {nickname} :Welcome, GLHF!"))
            .await?;
        self.send_line(&format!(":tmi.twitch.tv 372 {nickname} :You are in a maze of twisty passages."))
            .await?;
        self.send_line(&format!(":tmi.twitch.tv 376 {nickname} :>")).await
    }
}
