use std::borrow::Cow;

use futures_util::SinkExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Framed, LinesCodec};

use crate::models::ConnectionError;

/// Line sent after every response payload.
pub const RESPONSE_TERMINATOR: &str = "EOF";

/// Payload for any line that does not match the command grammar.
pub const INVALID_REQUEST: &str = "Invalid Request.";

pub type LineStream<T> = Framed<T, LinesCodec>;

pub fn framed<T: AsyncRead + AsyncWrite>(io: T, max_line_length: usize) -> LineStream<T> {
    Framed::new(io, LinesCodec::new_with_max_length(max_line_length))
}

/// Decodes one percent-encoded token. `+` stands for a space.
pub fn decode(token: &str) -> Result<String, ConnectionError> {
    let spaced: Cow<'_, str> = if token.contains('+') {
        Cow::Owned(token.replace('+', " "))
    } else {
        Cow::Borrowed(token)
    };
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    Ok(String::from_utf8(bytes.into_owned())?)
}

pub fn encode(text: &str) -> String {
    urlencoding::encode(text).into_owned()
}

/// A response and whether the connection should close after it is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub payload: String,
    pub close: bool,
}

impl Reply {
    pub fn text(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            close: false,
        }
    }

    /// Document content and other free-form text, percent-encoded for the wire.
    pub fn encoded(content: &str) -> Self {
        Self::text(encode(content))
    }

    pub fn closing(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            close: true,
        }
    }
}

/// Writes `<payload>\nEOF\n`.
pub async fn write_reply<T>(lines: &mut LineStream<T>, reply: &Reply) -> Result<(), ConnectionError>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    lines.feed(reply.payload.as_str()).await?;
    lines.send(RESPONSE_TERMINATOR).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_handles_escapes_and_plus() {
        assert_eq!(decode("a%20b+c").unwrap(), "a b c");
        assert_eq!(decode("caf%C3%A9").unwrap(), "café");
        assert_eq!(decode("plain").unwrap(), "plain");
        assert_eq!(decode("1%2B1").unwrap(), "1+1");
    }

    #[test]
    fn decode_rejects_invalid_utf8() {
        assert!(matches!(decode("%FF%FE"), Err(ConnectionError::Encoding(_))));
    }

    #[test]
    fn encode_protects_framing_characters() {
        assert_eq!(encode("hello world"), "hello%20world");
        assert_eq!(encode("line\nbreak"), "line%0Abreak");
        assert_eq!(decode(&encode("tab\tand+plus é")).unwrap(), "tab\tand+plus é");
    }

    #[tokio::test]
    async fn reply_is_terminated_by_eof_line() {
        use tokio::io::AsyncReadExt;

        let (client, server) = tokio::io::duplex(256);
        let mut lines = framed(server, 1024);
        write_reply(&mut lines, &Reply::encoded("a b")).await.unwrap();
        drop(lines);

        let mut out = String::new();
        let mut client = client;
        client.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "a%20b\nEOF\n");
    }
}
