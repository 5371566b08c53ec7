//! Stdin line parsing.

/// One line of terminal input, mapped to a search-input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Query(String),
    Down,
    Up,
    Enter,
    Escape,
    Blur,
    Focus,
    Pick(String),
    Clear,
    Refresh,
    Quit,
}

/// Plain text becomes the new query. `:`-prefixed words are key presses;
/// `\:` escapes a query that really starts with a colon.
pub fn parse_input(line: &str) -> Result<Input, String> {
    if let Some(rest) = line.strip_prefix("\\:") {
        return Ok(Input::Query(format!(":{rest}")));
    }
    let Some(command) = line.strip_prefix(':') else {
        return Ok(Input::Query(line.to_string()));
    };

    let (word, arg) = match command.split_once(' ') {
        Some((word, arg)) => (word, arg.trim()),
        None => (command.trim(), ""),
    };
    match word {
        "down" | "j" => Ok(Input::Down),
        "up" | "k" => Ok(Input::Up),
        "enter" => Ok(Input::Enter),
        "esc" | "escape" => Ok(Input::Escape),
        "blur" => Ok(Input::Blur),
        "focus" => Ok(Input::Focus),
        "pick" if !arg.is_empty() => Ok(Input::Pick(arg.to_string())),
        "pick" => Err(":pick needs a title".to_string()),
        "clear" => Ok(Input::Clear),
        "refresh" => Ok(Input::Refresh),
        "quit" | "q" => Ok(Input::Quit),
        other => Err(format!("unknown command ':{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_query() {
        assert_eq!(parse_input("rust async"), Ok(Input::Query("rust async".into())));
        assert_eq!(parse_input(""), Ok(Input::Query(String::new())));
    }

    #[test]
    fn commands_map_to_keys() {
        assert_eq!(parse_input(":down"), Ok(Input::Down));
        assert_eq!(parse_input(":k"), Ok(Input::Up));
        assert_eq!(parse_input(":enter"), Ok(Input::Enter));
        assert_eq!(parse_input(":esc"), Ok(Input::Escape));
        assert_eq!(parse_input(":q"), Ok(Input::Quit));
    }

    #[test]
    fn pick_takes_title() {
        assert_eq!(parse_input(":pick Rust Ownership"), Ok(Input::Pick("Rust Ownership".into())));
        assert!(parse_input(":pick").is_err());
    }

    #[test]
    fn escaped_colon_is_query() {
        assert_eq!(parse_input("\\:down"), Ok(Input::Query(":down".into())));
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert_eq!(parse_input(":fly"), Err("unknown command ':fly'".to_string()));
    }
}
