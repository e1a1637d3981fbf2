//! Command verbs and numerics this dialect uses.

/// `PASS` - connection password.
pub const PASS: &str = "PASS";
/// `NICK` - nickname registration.
pub const NICK: &str = "NICK";
/// `USER` - user registration.
pub const USER: &str = "USER";
/// `PING` - keep-alive probe.
pub const PING: &str = "PING";
/// `PONG` - keep-alive reply.
pub const PONG: &str = "PONG";
/// `JOIN` - channel join.
pub const JOIN: &str = "JOIN";
/// `PART` - channel leave.
pub const PART: &str = "PART";
/// `PRIVMSG` - chat and control-service messages.
pub const PRIVMSG: &str = "PRIVMSG";
/// `NOTICE` - server notices.
pub const NOTICE: &str = "NOTICE";
/// Platform capability request that enables control-service messages.
pub const TWITCHCLIENT: &str = "TWITCHCLIENT";

/// `372` RPL_MOTD - one line of the message of the day.
pub const RPL_MOTD: &str = "372";
/// `376` RPL_ENDOFMOTD - registration finished.
pub const RPL_ENDOFMOTD: &str = "376";
