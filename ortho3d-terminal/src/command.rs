/// Command language for the `:` prompt and `--script` files
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{multispace0, multispace1},
    combinator::{all_consuming, map, value},
    number::complete::float,
    sequence::{preceded, separated_pair, terminated},
    IResult,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Switch to a topic by id
    Topic(String),
    /// Set a slider of the active topic
    Set { param: String, value: f32 },
    /// Orbit by a drag of `dx`, `dy` pixels
    Orbit { dx: f32, dy: f32 },
    /// Pan by a drag of `dx`, `dy` pixels
    Pan { dx: f32, dy: f32 },
    /// Zoom by a wheel delta
    Zoom(f32),
    /// Camera back to its start-up view
    Reset,
    Help,
    Quit,
}

pub const HELP: &str = "topic <id> | set <param> <value> | orbit <dx> <dy> | pan <dx> <dy> | zoom <delta> | reset | help | quit";

/// Parse one command line
pub fn parse_command(input: &str) -> Result<Command, String> {
    match all_consuming(terminated(preceded(multispace0, command), multispace0))(input) {
        Ok((_, command)) => Ok(command),
        Err(e) => Err(format!("Failed to parse command `{}`: {:?}", input.trim(), e)),
    }
}

/// Parse a script: one command per line, `#` starts a comment.
///
/// Errors carry the 1-based line number.
pub fn parse_script(source: &str) -> Result<Vec<Command>, String> {
    let mut commands = Vec::new();
    for (number, line) in source.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default();
        if line.trim().is_empty() {
            continue;
        }
        let command = parse_command(line).map_err(|e| format!("line {}: {}", number + 1, e))?;
        commands.push(command);
    }
    Ok(commands)
}

fn command(input: &str) -> IResult<&str, Command> {
    alt((topic, set, orbit, pan, zoom, reset, help, quit))(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_')(input)
}

fn pair(input: &str) -> IResult<&str, (f32, f32)> {
    separated_pair(float, multispace1, float)(input)
}

fn topic(input: &str) -> IResult<&str, Command> {
    let (input, _) = alt((tag("topic"), tag("t")))(input)?;
    let (input, id) = preceded(multispace1, identifier)(input)?;
    Ok((input, Command::Topic(id.to_string())))
}

fn set(input: &str) -> IResult<&str, Command> {
    let (input, _) = tag("set")(input)?;
    let (input, param) = preceded(multispace1, identifier)(input)?;
    let (input, value) = preceded(multispace1, float)(input)?;
    Ok((
        input,
        Command::Set {
            param: param.to_string(),
            value,
        },
    ))
}

fn orbit(input: &str) -> IResult<&str, Command> {
    map(preceded(terminated(tag("orbit"), multispace1), pair), |(dx, dy)| {
        Command::Orbit { dx, dy }
    })(input)
}

fn pan(input: &str) -> IResult<&str, Command> {
    map(preceded(terminated(tag("pan"), multispace1), pair), |(dx, dy)| Command::Pan {
        dx,
        dy,
    })(input)
}

fn zoom(input: &str) -> IResult<&str, Command> {
    map(preceded(terminated(tag("zoom"), multispace1), float), Command::Zoom)(input)
}

fn reset(input: &str) -> IResult<&str, Command> {
    value(Command::Reset, tag("reset"))(input)
}

fn help(input: &str) -> IResult<&str, Command> {
    value(Command::Help, alt((tag("help"), tag("?"))))(input)
}

fn quit(input: &str) -> IResult<&str, Command> {
    value(Command::Quit, alt((tag("quit"), tag("q"))))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_topic() {
        assert_eq!(parse_command("topic lines"), Ok(Command::Topic("lines".to_string())));
        assert_eq!(parse_command("  t planes  "), Ok(Command::Topic("planes".to_string())));
    }

    #[test]
    fn test_parse_set() {
        assert_eq!(
            parse_command("set line-theta 42.5"),
            Ok(Command::Set {
                param: "line-theta".to_string(),
                value: 42.5
            })
        );
        assert_eq!(
            parse_command("set point-y -3"),
            Ok(Command::Set {
                param: "point-y".to_string(),
                value: -3.0
            })
        );
    }

    #[test]
    fn test_parse_camera_commands() {
        assert_eq!(parse_command("orbit 120 -40"), Ok(Command::Orbit { dx: 120.0, dy: -40.0 }));
        assert_eq!(parse_command("pan 10 5"), Ok(Command::Pan { dx: 10.0, dy: 5.0 }));
        assert_eq!(parse_command("zoom -200"), Ok(Command::Zoom(-200.0)));
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(parse_command("quit"), Ok(Command::Quit));
        assert_eq!(parse_command("q"), Ok(Command::Quit));
        assert_eq!(parse_command("help"), Ok(Command::Help));
        assert_eq!(parse_command("reset"), Ok(Command::Reset));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_command("set point-x").is_err());
        assert!(parse_command("topic").is_err());
        assert!(parse_command("quit now").is_err());
        assert!(parse_command("").is_err());
    }

    #[test]
    fn test_parse_script_skips_comments() {
        let script = "# tour\ntopic points\n\nset point-x -4 # move left\nquit\n";
        assert_eq!(
            parse_script(script),
            Ok(vec![
                Command::Topic("points".to_string()),
                Command::Set {
                    param: "point-x".to_string(),
                    value: -4.0
                },
                Command::Quit,
            ])
        );
    }

    #[test]
    fn test_parse_script_reports_line() {
        let err = parse_script("topic points\nfly away\n").unwrap_err();
        assert!(err.starts_with("line 2:"), "{err}");
    }
}
