//! Nom-based IRC line parser.
//!
//! Splits a raw line into prefix, command, and parameters. IRCv3 tag
//! sections are tolerated and skipped; this library does not interpret
//! them.

use nom::{
    bytes::complete::{take_until, take_while1},
    character::complete::{char, space0},
    combinator::opt,
    error::ErrorKind,
    sequence::preceded,
    IResult,
};
use smallvec::SmallVec;

use crate::error::MessageParseError;

/// Parse (and discard) IRCv3 message tags: `@` up to the first space.
fn parse_tags(input: &str) -> IResult<&str, &str> {
    preceded(char('@'), take_until(" "))(input)
}

/// Parse the message prefix: `:` up to the first space.
fn parse_prefix(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(|c| c != ' '))(input)
}

/// Parse the command name (RFC 2812: `1*letter / 3digit`).
fn parse_command(input: &str) -> IResult<&str, &str> {
    let (rest, cmd) = take_while1(|c: char| c.is_alphanumeric())(input)?;

    let is_all_letters = cmd.chars().all(|c| c.is_ascii_alphabetic());
    let is_three_digits = cmd.len() == 3 && cmd.chars().all(|c| c.is_ascii_digit());

    if is_all_letters || is_three_digits {
        Ok((rest, cmd))
    } else {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            ErrorKind::AlphaNumeric,
        )))
    }
}

/// Parse parameters: space-separated tokens plus an optional `:trailing`
/// that may contain spaces. Runs of spaces collapse; at most 15 parameters.
fn parse_params(input: &str) -> SmallVec<[&str; 15]> {
    let mut params: SmallVec<[&str; 15]> = SmallVec::new();
    let mut rest = input;

    while rest.as_bytes().first() == Some(&b' ') {
        if params.len() >= 15 {
            break;
        }

        while rest.as_bytes().first() == Some(&b' ') {
            rest = &rest[1..];
        }

        if rest.is_empty() || rest.starts_with('\r') || rest.starts_with('\n') {
            break;
        }

        if let Some(after_colon) = rest.strip_prefix(':') {
            let end = after_colon.find(['\r', '\n']).unwrap_or(after_colon.len());
            params.push(&after_colon[..end]);
            break;
        }

        let end = rest.find([' ', '\r', '\n']).unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    params
}

/// A raw IRC line split into its components, borrowing from the input.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedLine<'a> {
    pub prefix: Option<&'a str>,
    pub command: &'a str,
    pub params: SmallVec<[&'a str; 15]>,
}

impl<'a> ParsedLine<'a> {
    /// Split a raw line. The input must already have line endings stripped
    /// or still attached; both are accepted.
    pub fn parse(input: &'a str) -> Result<Self, MessageParseError> {
        match parse_line(input) {
            Ok((_rest, line)) => Ok(line),
            Err(_) => Err(MessageParseError::InvalidCommand),
        }
    }
}

fn parse_line(input: &str) -> IResult<&str, ParsedLine<'_>> {
    let (input, _tags) = opt(parse_tags)(input)?;
    let (input, _) = space0(input)?;

    let (input, prefix) = opt(parse_prefix)(input)?;
    let (input, _) = space0(input)?;

    let (input, command) = parse_command(input)?;

    let params = parse_params(input);

    Ok(("", ParsedLine { prefix, command, params }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_command() {
        let line = ParsedLine::parse("PING").unwrap();
        assert_eq!(line.command, "PING");
        assert!(line.prefix.is_none());
        assert!(line.params.is_empty());
    }

    #[test]
    fn command_with_trailing() {
        let line = ParsedLine::parse("PRIVMSG #lobby :Hello, world!").unwrap();
        assert_eq!(line.command, "PRIVMSG");
        assert_eq!(line.params.as_slice(), &["#lobby", "Hello, world!"]);
    }

    #[test]
    fn prefix_and_crlf() {
        let line = ParsedLine::parse(":bob!rob@host PRIVMSG #lobby :hi\r\n").unwrap();
        assert_eq!(line.prefix, Some("bob!rob@host"));
        assert_eq!(line.params.as_slice(), &["#lobby", "hi"]);
    }

    #[test]
    fn tags_are_skipped() {
        let line = ParsedLine::parse("@time=2026-01-01T00:00:00Z :bob PRIVMSG #l :hi").unwrap();
        assert_eq!(line.prefix, Some("bob"));
        assert_eq!(line.command, "PRIVMSG");
    }

    #[test]
    fn numeric_reply() {
        let line = ParsedLine::parse(":server 353 me = #lobby :a b c").unwrap();
        assert_eq!(line.command, "353");
        assert_eq!(line.params.as_slice(), &["me", "=", "#lobby", "a b c"]);
    }

    #[test]
    fn empty_trailing() {
        let line = ParsedLine::parse("PRIVMSG #lobby :").unwrap();
        assert_eq!(line.params.as_slice(), &["#lobby", ""]);
    }

    #[test]
    fn rejects_malformed_commands() {
        assert!(ParsedLine::parse("PING123 x").is_err());
        assert!(ParsedLine::parse("12").is_err());
        assert!(ParsedLine::parse("1234").is_err());
        assert!(ParsedLine::parse(":prefix-only").is_err());
    }

    #[test]
    fn params_cap_at_fifteen() {
        let raw = "CMD p1 p2 p3 p4 p5 p6 p7 p8 p9 p10 p11 p12 p13 p14 p15 p16";
        let line = ParsedLine::parse(raw).unwrap();
        assert_eq!(line.params.len(), 15);
        assert_eq!(line.params[14], "p15");
    }
}
