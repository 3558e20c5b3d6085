/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Next,
    Prev,
    Page(u32),
    Refresh,
    Open(String),
    Back,
    New,
    Name(String),
    Email(String),
    Submit,
    Another,
    ViewCreated,
    Close,
    Delete,
    Copy,
    Help,
    Quit,
}

pub const HELP: &str = "\
list:    next | prev | page <n> | refresh | open <id>
form:    new | name <text> | email <text> | submit | another | view | close
detail:  back | delete | copy | refresh
         help | quit";

pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim_start();

    let command = match word.to_ascii_lowercase().as_str() {
        "n" | "next" => Command::Next,
        "p" | "prev" | "previous" => Command::Prev,
        "page" => Command::Page(
            rest.parse()
                .map_err(|_| format!("not a page number: {rest:?}"))?,
        ),
        "r" | "refresh" => Command::Refresh,
        "open" if !rest.is_empty() => Command::Open(rest.to_string()),
        "open" => return Err("usage: open <id>".to_string()),
        "b" | "back" => Command::Back,
        "new" => Command::New,
        "name" => Command::Name(rest.to_string()),
        "email" => Command::Email(rest.to_string()),
        "submit" => Command::Submit,
        "another" => Command::Another,
        "view" => Command::ViewCreated,
        "close" => Command::Close,
        "delete" => Command::Delete,
        "copy" => Command::Copy,
        "" | "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command {other:?}; try `help`")),
    };
    Ok(command)
}
