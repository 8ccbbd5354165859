//! Line commands accepted by the interactive loop.

/// One parsed interactive command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    Page(usize),
    Group(String),
    Groups,
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  n, next           next listing page
  p, prev           previous listing page
  page <N>          jump to page N
  group <NAME>      filter by county (\"All\" for every county)
  groups            list selectable counties
  show              print the report again
  q, quit           exit";

impl Command {
    /// Parse one input line. Blank lines re-show the report.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "" | "show" => Ok(Command::Show),
            "n" | "next" => Ok(Command::Next),
            "p" | "prev" | "previous" => Ok(Command::Previous),
            "page" => rest
                .parse()
                .map(Command::Page)
                .map_err(|_| format!("not a page number: {rest:?}")),
            "group" | "county" if !rest.is_empty() => Ok(Command::Group(rest.to_string())),
            "group" | "county" => Err("group needs a name".to_string()),
            "groups" => Ok(Command::Groups),
            "h" | "help" | "?" => Ok(Command::Help),
            "q" | "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paging_commands() {
        assert_eq!(Command::parse("n"), Ok(Command::Next));
        assert_eq!(Command::parse(" NEXT "), Ok(Command::Next));
        assert_eq!(Command::parse("prev"), Ok(Command::Previous));
        assert_eq!(Command::parse("page 7"), Ok(Command::Page(7)));
    }

    #[test]
    fn test_parse_group_keeps_spaces() {
        assert_eq!(
            Command::parse("group Walla Walla"),
            Ok(Command::Group("Walla Walla".to_string()))
        );
        assert_eq!(Command::parse("groups"), Ok(Command::Groups));
    }

    #[test]
    fn test_parse_blank_line_shows_report() {
        assert_eq!(Command::parse(""), Ok(Command::Show));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("page two").is_err());
        assert!(Command::parse("group").is_err());
        assert!(Command::parse("jump").is_err());
    }

    #[test]
    fn test_parse_quit() {
        assert_eq!(Command::parse("q"), Ok(Command::Quit));
        assert_eq!(Command::parse("exit"), Ok(Command::Quit));
    }
}
