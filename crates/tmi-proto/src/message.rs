//! Raw protocol records.
//!
//! A [`RawMessage`] is one protocol line split into its prefix, command and
//! ordered parameters. It carries no interpretation of the command; that is
//! the classifier's job.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::{take_until, take_while, take_while1};
use nom::character::complete::{char, space0, space1};
use nom::combinator::{opt, rest};
use nom::multi::many0;
use nom::sequence::{preceded, terminated};

use crate::error::{MessageParseError, ProtocolError};

/// Commands whose final parameter is free text and always written in
/// trailing (`:`) form.
const TEXT_COMMANDS: &[&str] = &["PRIVMSG", "NOTICE", "USER"];

/// One decoded protocol line.
///
/// # Example
///
/// ```
/// use tmi_proto::RawMessage;
///
/// let msg: RawMessage = ":bob!bob@bob.tmi.twitch.tv PRIVMSG #chan :hi there".parse().unwrap();
/// assert_eq!(msg.command, "PRIVMSG");
/// assert_eq!(msg.params, vec!["#chan", "hi there"]);
/// assert_eq!(msg.sender(), Some("bob"));
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawMessage {
    /// Message prefix without the leading `:`.
    pub prefix: Option<String>,
    /// Command verb or three-digit numeric.
    pub command: String,
    /// Ordered parameters; the trailing parameter is stored without its `:`.
    pub params: Vec<String>,
}

impl RawMessage {
    /// Create a message without a prefix.
    pub fn new(command: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            prefix: None,
            command: command.into(),
            params,
        }
    }

    /// Attach a prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// `PASS <password>`
    pub fn pass(password: &str) -> Self {
        Self::new("PASS", vec![password.to_owned()])
    }

    /// `NICK <nickname>`
    pub fn nick(nickname: &str) -> Self {
        Self::new("NICK", vec![nickname.to_owned()])
    }

    /// `USER <nickname> 8 * :<nickname>`
    pub fn user(nickname: &str) -> Self {
        Self::new(
            "USER",
            vec![
                nickname.to_owned(),
                "8".to_owned(),
                "*".to_owned(),
                nickname.to_owned(),
            ],
        )
    }

    /// `JOIN <channel>`
    pub fn join(channel: &str) -> Self {
        Self::new("JOIN", vec![channel.to_owned()])
    }

    /// `PART <channel>`
    pub fn part(channel: &str) -> Self {
        Self::new("PART", vec![channel.to_owned()])
    }

    /// `PRIVMSG <target> :<text>`
    pub fn privmsg(target: &str, text: &str) -> Self {
        Self::new("PRIVMSG", vec![target.to_owned(), text.to_owned()])
    }

    /// Bare `PING`.
    pub fn ping() -> Self {
        Self::new("PING", Vec::new())
    }

    /// `PONG`, echoing whatever token the server's PING carried.
    pub fn pong(params: Vec<String>) -> Self {
        Self::new("PONG", params)
    }

    /// Get a parameter by index.
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// Nickname portion of the prefix (text before `!` or `@`).
    pub fn source_nickname(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        let end = prefix.find(['!', '@']).unwrap_or(prefix.len());
        Some(&prefix[..end])
    }

    /// Sender identity: the nickname when the prefix is a `nick[!user]@host`
    /// mask, otherwise the prefix verbatim.
    pub fn sender(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        if prefix.contains('@') {
            self.source_nickname().filter(|nick| !nick.is_empty())
        } else {
            Some(prefix)
        }
    }

    /// Whether the command is a three-digit numeric reply.
    pub fn is_numeric(&self) -> bool {
        self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit())
    }

    /// Numeric reply code, if the command is numeric.
    pub fn numeric_code(&self) -> Option<u16> {
        if self.is_numeric() {
            self.command.parse().ok()
        } else {
            None
        }
    }
}

impl FromStr for RawMessage {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<RawMessage, Self::Err> {
        let invalid = |cause| ProtocolError::InvalidMessage {
            string: s.to_owned(),
            cause,
        };

        let line = s.trim_end_matches(['\r', '\n']).trim_start_matches(' ');
        if line.is_empty() {
            return Err(invalid(MessageParseError::EmptyMessage));
        }

        // Tags are not negotiated by this client; skip them if a server sends any.
        let rest = if line.starts_with('@') {
            parse_tags(line)
                .map(|(rest, _)| rest)
                .map_err(|_| invalid(MessageParseError::MissingCommand))?
        } else {
            line
        };

        let (rest, prefix) = opt(parse_prefix)(rest)
            .map_err(|_| invalid(MessageParseError::InvalidPrefix(s.to_owned())))?;
        if prefix == Some("") {
            return Err(invalid(MessageParseError::InvalidPrefix(s.to_owned())));
        }

        let (rest, command) =
            parse_command(rest).map_err(|_| invalid(MessageParseError::MissingCommand))?;
        let (_, params) =
            parse_params(rest).map_err(|_| invalid(MessageParseError::MissingCommand))?;

        Ok(RawMessage {
            prefix: prefix.map(str::to_owned),
            command: command.to_ascii_uppercase(),
            params: params.into_iter().map(str::to_owned).collect(),
        })
    }
}

/// Message tags: `@` up to the first space, plus the separating spaces.
fn parse_tags(input: &str) -> IResult<&str, &str> {
    terminated(preceded(char('@'), take_until(" ")), space1)(input)
}

/// Prefix after `:`; may come back empty, which the caller rejects.
fn parse_prefix(input: &str) -> IResult<&str, &str> {
    terminated(preceded(char(':'), take_while(|c: char| c != ' ')), space0)(input)
}

fn parse_command(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c != ' ')(input)
}

/// One space-separated parameter. A `:` parameter takes the rest of the line.
fn parse_param(input: &str) -> IResult<&str, &str> {
    preceded(
        space1,
        alt((
            preceded(char(':'), rest),
            take_while1(|c: char| c != ' '),
        )),
    )(input)
}

fn parse_params(input: &str) -> IResult<&str, Vec<&str>> {
    many0(parse_param)(input)
}

impl Display for RawMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(ref prefix) = self.prefix {
            write!(f, ":{} ", prefix)?;
        }

        write!(f, "{}", self.command)?;

        let last = self.params.len().saturating_sub(1);
        for (i, param) in self.params.iter().enumerate() {
            let trailing = i == last
                && (param.is_empty()
                    || param.contains(' ')
                    || param.starts_with(':')
                    || TEXT_COMMANDS.contains(&self.command.as_str()));
            if trailing {
                write!(f, " :{}", param)?;
            } else {
                write!(f, " {}", param)?;
            }
        }

        Ok(())
    }
}
