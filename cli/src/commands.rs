//! Input line parsing
//!
//! Lines starting with one of the known slash commands drive the session;
//! everything else, unknown slash words included, is a query.

/// One line of user input
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Submit text; an empty line submits the current draft
    Submit(String),
    /// Copy the last query back into the draft
    Retry,
    /// Put suggestion N (1-based) into the draft
    Pick(usize),
    /// Sign in as the given username
    Login(String),
    /// Sign out
    Logout,
    /// Leave the program
    Quit,
}

/// Help text printed at startup
pub const USAGE: &str = "Commands: /login NAME, /logout, /pick N, /retry, /quit. \
                         Anything else is sent as a query; an empty line sends the draft.";

/// Parse a typed line
///
/// # Errors
///
/// Returns a usage message when `/pick` is missing a valid number.
pub fn parse(line: &str) -> Result<Command, String> {
    let trimmed = line.trim();
    let (word, rest) = trimmed
        .split_once(char::is_whitespace)
        .map_or((trimmed, ""), |(w, r)| (w, r.trim()));

    match word {
        "/retry" => Ok(Command::Retry),
        "/logout" => Ok(Command::Logout),
        "/quit" | "/exit" => Ok(Command::Quit),
        "/login" => Ok(Command::Login(rest.to_string())),
        "/pick" => rest
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(Command::Pick)
            .ok_or_else(|| "usage: /pick N (N starts at 1)".to_string()),
        _ => Ok(Command::Submit(line.to_string())),
    }
}

/// Text an Enter press should submit
pub fn submission(line: &str, draft: &str) -> String {
    if line.trim().is_empty() {
        draft.to_string()
    } else {
        line.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_commands() {
        assert_eq!(parse("/retry"), Ok(Command::Retry));
        assert_eq!(parse("  /logout "), Ok(Command::Logout));
        assert_eq!(parse("/quit"), Ok(Command::Quit));
        assert_eq!(parse("/pick 2"), Ok(Command::Pick(2)));
        assert_eq!(
            parse("/login  ada lovelace "),
            Ok(Command::Login("ada lovelace".to_string()))
        );
        assert_eq!(parse("/login"), Ok(Command::Login(String::new())));
    }

    #[test]
    fn test_bad_pick() {
        assert!(parse("/pick").is_err());
        assert!(parse("/pick 0").is_err());
        assert!(parse("/pick two").is_err());
    }

    #[test]
    fn test_everything_else_is_a_query() {
        assert_eq!(
            parse("python for data science"),
            Ok(Command::Submit("python for data science".to_string()))
        );
        assert_eq!(parse("/python"), Ok(Command::Submit("/python".to_string())));
        assert_eq!(parse(""), Ok(Command::Submit(String::new())));
    }

    #[test]
    fn test_empty_line_sends_draft() {
        assert_eq!(submission("   ", "Python for beginners"), "Python for beginners");
        assert_eq!(submission("java", "Python for beginners"), "java");
        assert_eq!(submission("", ""), "");
    }
}
