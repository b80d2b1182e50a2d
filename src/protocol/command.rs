use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::{FontWeight, ProtocolError, Style};

const VERBS: [&str; 14] = [
    "new", "switch", "rename", "insert", "delete", "view", "list", "replaceOne", "replaceAll",
    "style", "giveStyle", "hello", "help", "exit",
];

static DOCUMENT_NAME: OnceLock<Regex> = OnceLock::new();

fn document_name_pattern() -> &'static Regex {
    DOCUMENT_NAME.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+\.txt$").expect("static pattern"))
}

/// One parsed command line.
///
/// Free-form arguments (`text`, `from`, `to`) are kept percent-encoded; the
/// handlers decode them, since a payload that is not valid UTF-8 ends the
/// connection rather than being reported as an invalid request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New(Option<String>),
    Switch(String),
    Rename(String),
    Insert { pos: usize, text: String },
    Delete { begin: usize, end: usize },
    View,
    List,
    ReplaceOne { from: String, to: String },
    ReplaceAll { from: String, to: String },
    Style(Style),
    GiveStyle,
    Hello,
    Help,
    Exit,
}

impl Command {
    pub fn verb(&self) -> &'static str {
        match self {
            Command::New(_) => "new",
            Command::Switch(_) => "switch",
            Command::Rename(_) => "rename",
            Command::Insert { .. } => "insert",
            Command::Delete { .. } => "delete",
            Command::View => "view",
            Command::List => "list",
            Command::ReplaceOne { .. } => "replaceOne",
            Command::ReplaceAll { .. } => "replaceAll",
            Command::Style(_) => "style",
            Command::GiveStyle => "giveStyle",
            Command::Hello => "hello",
            Command::Help => "help",
            Command::Exit => "exit",
        }
    }
}

fn number<T: FromStr>(token: &str, verb: &'static str) -> Result<T, ProtocolError> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProtocolError::BadArguments(verb));
    }
    // all digits, so a failure here is overflow
    token.parse().map_err(|_| ProtocolError::BadArguments(verb))
}

fn document_name(token: &str, verb: &'static str) -> Result<String, ProtocolError> {
    if document_name_pattern().is_match(token) {
        Ok(token.to_string())
    } else {
        Err(ProtocolError::BadArguments(verb))
    }
}

fn replace_tokens(args: &[&str], verb: &'static str) -> Result<(String, String), ProtocolError> {
    match args {
        [from, to] if !from.is_empty() && !to.is_empty() => Ok((from.to_string(), to.to_string())),
        _ => Err(ProtocolError::BadArguments(verb)),
    }
}

impl FromStr for Command {
    type Err = ProtocolError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        if line.is_empty() {
            return Err(ProtocolError::Empty);
        }
        if !line.is_ascii() {
            return Err(ProtocolError::NotAscii);
        }

        // The insert text is everything after the position, spaces included.
        if let Some(rest) = line.strip_prefix("insert ") {
            let (pos, text) = rest.split_once(' ').ok_or(ProtocolError::BadArguments("insert"))?;
            return Ok(Command::Insert {
                pos: number(pos, "insert")?,
                text: text.to_string(),
            });
        }

        let tokens: Vec<&str> = line.split(' ').collect();
        let verb = VERBS
            .iter()
            .copied()
            .find(|verb| *verb == tokens[0])
            .ok_or_else(|| ProtocolError::UnknownVerb(tokens[0].to_string()))?;
        let args = &tokens[1..];

        let command = match (verb, args) {
            ("new", []) => Command::New(None),
            ("new", [name]) => Command::New(Some(document_name(name, verb)?)),
            ("switch", [name]) => Command::Switch(document_name(name, verb)?),
            ("rename", [name]) => Command::Rename(document_name(name, verb)?),
            ("delete", [begin, end]) => Command::Delete {
                begin: number(begin, verb)?,
                end: number(end, verb)?,
            },
            ("view", []) => Command::View,
            ("list", []) => Command::List,
            ("replaceOne", _) => {
                let (from, to) = replace_tokens(args, verb)?;
                Command::ReplaceOne { from, to }
            }
            ("replaceAll", _) => {
                let (from, to) = replace_tokens(args, verb)?;
                Command::ReplaceAll { from, to }
            }
            ("style", [font, weight, size, color]) => {
                let weight = FontWeight::from_code(number(weight, verb)?)
                    .ok_or(ProtocolError::BadArguments(verb))?;
                Command::Style(Style::new(
                    number(font, verb)?,
                    weight,
                    number(size, verb)?,
                    number(color, verb)?,
                ))
            }
            ("giveStyle", []) => Command::GiveStyle,
            ("hello", []) => Command::Hello,
            ("help", []) => Command::Help,
            ("exit", []) => Command::Exit,
            _ => return Err(ProtocolError::BadArguments(verb)),
        };
        Ok(command)
    }
}
