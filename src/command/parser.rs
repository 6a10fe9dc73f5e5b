use crate::command::command_model::{Command, CommandError, ScrollDirection};

/// Parse one line of decision-maker output.
///
/// ```text
/// SCROLL (UP|DOWN)
/// CLICK <id>
/// TYPESUBMIT <id> "<text>"
/// SAVE TEXT <id> "<text>"
/// SAVE LINK <id> "<text>"
/// ```
///
/// Keywords are case-insensitive; quoted text is taken verbatim.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let (keyword, rest) = next_token(line).ok_or(CommandError::Empty)?;

    match keyword.to_ascii_uppercase().as_str() {
        "SCROLL" => {
            let (direction, rest) = next_token(rest).ok_or(CommandError::MissingArgument {
                command: "SCROLL",
                argument: "direction",
            })?;
            let direction = match direction.to_ascii_uppercase().as_str() {
                "UP" => ScrollDirection::Up,
                "DOWN" => ScrollDirection::Down,
                _ => return Err(CommandError::InvalidDirection(direction.to_string())),
            };
            expect_end(rest)?;
            Ok(Command::Scroll { direction })
        }

        "CLICK" => {
            let (id, rest) = parse_id("CLICK", rest)?;
            expect_end(rest)?;
            Ok(Command::Click { id })
        }

        "TYPESUBMIT" => {
            let (id, rest) = parse_id("TYPESUBMIT", rest)?;
            let text = parse_quoted("TYPESUBMIT", rest)?;
            Ok(Command::TypeSubmit { id, text })
        }

        "SAVE" => {
            let (target, rest) = next_token(rest).ok_or(CommandError::MissingArgument {
                command: "SAVE",
                argument: "target (TEXT or LINK)",
            })?;

            match target.to_ascii_uppercase().as_str() {
                "TEXT" => {
                    let (id, rest) = parse_id("SAVE TEXT", rest)?;
                    let text = parse_quoted("SAVE TEXT", rest)?;
                    Ok(Command::SaveText { id, text })
                }
                "LINK" => {
                    let (id, rest) = parse_id("SAVE LINK", rest)?;
                    let text = parse_quoted("SAVE LINK", rest)?;
                    Ok(Command::SaveLink { id, text })
                }
                _ => Err(CommandError::UnknownKeyword(format!("SAVE {}", target))),
            }
        }

        _ => Err(CommandError::UnknownKeyword(keyword.to_string())),
    }
}

/// Split off the next whitespace-delimited token.
fn next_token(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }

    match input.find(char::is_whitespace) {
        Some(end) => Some((&input[..end], input[end..].trim_start())),
        None => Some((input, "")),
    }
}

fn parse_id<'a>(command: &'static str, input: &'a str) -> Result<(usize, &'a str), CommandError> {
    let (token, rest) = next_token(input).ok_or(CommandError::MissingArgument {
        command,
        argument: "element id",
    })?;
    let id = token
        .parse::<usize>()
        .map_err(|_| CommandError::InvalidId(token.to_string()))?;
    Ok((id, rest))
}

/// Text between the opening quote and the last quote on the line.
fn parse_quoted(command: &'static str, input: &str) -> Result<String, CommandError> {
    let input = input.trim();
    let Some(body) = input.strip_prefix('"') else {
        return Err(CommandError::MissingArgument {
            command,
            argument: "quoted text",
        });
    };

    let close = body.rfind('"').ok_or(CommandError::UnterminatedQuote)?;
    expect_end(&body[close + 1..])?;
    Ok(body[..close].to_string())
}

fn expect_end(rest: &str) -> Result<(), CommandError> {
    let rest = rest.trim();
    if rest.is_empty() {
        Ok(())
    } else {
        Err(CommandError::TrailingInput(rest.to_string()))
    }
}
