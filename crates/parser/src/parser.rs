/// Winnow-based parser for the compact history text DSL.
///
/// Grammar:
/// ```text
/// history     = line*
/// line        = (comment | blank | event_line) NEWLINE
/// comment     = "//" REST_OF_LINE
/// event_line  = time WS "p" process WS phase WS "read" read_body
///             | time WS "p" process WS phase WS "write" write_body
/// phase       = "invoke" | "ok"
/// read_body   = /* invoke */ ""
///             | /* ok */ WS write_id "=" value
/// write_body  = /* invoke */ WS write_id "<-" prev_write_id "=" value
///             | /* ok */ WS write_id
/// time        = INTEGER
/// process     = INTEGER
/// write_id, prev_write_id, value = IDENT
/// ```
use register_check_core::Event;
use winnow::ascii::{dec_uint, till_line_ending};
use winnow::combinator::{alt, opt};
use winnow::prelude::*;
use winnow::token::{literal, take_while};
use winnow::ModalResult;

/// A parse error with human-readable location information.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "parse error at line {}, column {}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

/// Parse a history DSL string into a list of events, one per non-blank,
/// non-comment line, in file order. Callers pass the result through
/// [`register_check_core::normalize`] before checking, the same as any
/// other event slice.
///
/// # Errors
///
/// Returns a [`ParseError`] with line/column information when a line does
/// not conform to the grammar.
pub fn parse_history(input: &str) -> Result<Vec<Event<String, String>>, ParseError> {
    let mut events = Vec::new();
    for (idx, raw_line) in input.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        let mut stream: &str = raw_line;
        let original_len = raw_line.len();
        match event_line.parse_next(&mut stream) {
            Ok(event) => events.push(event),
            Err(e) => {
                let consumed = original_len.saturating_sub(stream.len());
                return Err(ParseError {
                    message: e.to_string(),
                    line,
                    column: consumed + 1,
                });
            }
        }
    }
    Ok(events)
}

fn inline_ws(input: &mut &str) -> ModalResult<()> {
    take_while(1.., |c: char| c == ' ' || c == '\t')
        .void()
        .parse_next(input)
}

fn opt_inline_ws(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c == ' ' || c == '\t')
        .void()
        .parse_next(input)
}

fn ident(input: &mut &str) -> ModalResult<String> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_')
        .map(ToString::to_string)
        .parse_next(input)
}

fn time(input: &mut &str) -> ModalResult<u64> {
    dec_uint.parse_next(input)
}

fn process(input: &mut &str) -> ModalResult<u64> {
    literal("p").parse_next(input)?;
    dec_uint.parse_next(input)
}

fn phase(input: &mut &str) -> ModalResult<bool> {
    // true => invoke, false => ok
    alt((literal("invoke").value(true), literal("ok").value(false))).parse_next(input)
}

fn read_line(
    input: &mut &str,
    time: u64,
    process: u64,
    invoke: bool,
) -> ModalResult<Event<String, String>> {
    if invoke {
        Ok(Event::InvokeRead { time, process })
    } else {
        inline_ws.parse_next(input)?;
        let write_id = ident.parse_next(input)?;
        opt_inline_ws.parse_next(input)?;
        literal("=").parse_next(input)?;
        opt_inline_ws.parse_next(input)?;
        let value = ident.parse_next(input)?;
        Ok(Event::OkRead {
            time,
            process,
            write_id,
            value,
        })
    }
}

fn write_line(
    input: &mut &str,
    time: u64,
    process: u64,
    invoke: bool,
) -> ModalResult<Event<String, String>> {
    inline_ws.parse_next(input)?;
    let write_id = ident.parse_next(input)?;
    if invoke {
        opt_inline_ws.parse_next(input)?;
        literal("<-").parse_next(input)?;
        opt_inline_ws.parse_next(input)?;
        let prev_write_id = ident.parse_next(input)?;
        opt_inline_ws.parse_next(input)?;
        literal("=").parse_next(input)?;
        opt_inline_ws.parse_next(input)?;
        let value = ident.parse_next(input)?;
        Ok(Event::InvokeWrite {
            time,
            process,
            write_id,
            prev_write_id,
            value,
        })
    } else {
        Ok(Event::OkWrite {
            time,
            process,
            write_id,
        })
    }
}

fn event_line(input: &mut &str) -> ModalResult<Event<String, String>> {
    opt_inline_ws.parse_next(input)?;
    let t = time.parse_next(input)?;
    inline_ws.parse_next(input)?;
    let p = process.parse_next(input)?;
    inline_ws.parse_next(input)?;
    let is_invoke = phase.parse_next(input)?;
    inline_ws.parse_next(input)?;
    let op = alt((literal("read"), literal("write"))).parse_next(input)?;
    let event = if op == "read" {
        read_line(input, t, p, is_invoke)?
    } else {
        write_line(input, t, p, is_invoke)?
    };
    opt_inline_ws.parse_next(input)?;
    opt(till_line_ending).parse_next(input)?;
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_invoke_read() {
        let events = parse_history("3 p1 invoke read\n").expect("should parse");
        assert_eq!(
            events,
            vec![Event::InvokeRead {
                time: 3,
                process: 1
            }]
        );
    }

    #[test]
    fn parses_ok_read() {
        let events = parse_history("4 p1 ok read w1=v1\n").expect("should parse");
        assert_eq!(
            events,
            vec![Event::OkRead {
                time: 4,
                process: 1,
                write_id: "w1".to_string(),
                value: "v1".to_string(),
            }]
        );
    }

    #[test]
    fn parses_invoke_write_with_spaces() {
        let events = parse_history("1 p0 invoke write w1 <- w0 = v1\n").expect("should parse");
        assert_eq!(
            events,
            vec![Event::InvokeWrite {
                time: 1,
                process: 0,
                write_id: "w1".to_string(),
                prev_write_id: "w0".to_string(),
                value: "v1".to_string(),
            }]
        );
    }

    #[test]
    fn parses_ok_write() {
        let events = parse_history("2 p0 ok write w1\n").expect("should parse");
        assert_eq!(
            events,
            vec![Event::OkWrite {
                time: 2,
                process: 0,
                write_id: "w1".to_string(),
            }]
        );
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let input = "// a comment\n\n1 p0 invoke write w1 <- w0 = v1\n";
        let events = parse_history(input).expect("should parse");
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn parses_multiple_lines_in_order() {
        let input = "\
1 p0 invoke write w1 <- w0 = v1
2 p0 ok write w1
3 p1 invoke read
4 p1 ok read w1=v1
";
        let events = parse_history(input).expect("should parse");
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].time(), 1);
        assert_eq!(events[3].time(), 4);
    }

    #[test]
    fn reports_line_and_column_on_error() {
        let input = "1 p0 invoke write w1 <- w0 = v1\n@bad\n";
        let err = parse_history(input).expect_err("should fail");
        assert_eq!(err.line, 2, "expected error on line 2, got: {err}");
    }

    #[test]
    fn error_display_mentions_line() {
        let err = parse_history("@bad\n").expect_err("should fail");
        let msg = err.to_string();
        assert!(msg.contains("line 1"), "{msg}");
    }
}
