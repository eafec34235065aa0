use agri_core::models::{Language, LoginForm, UnknownLanguage};
use agri_core::screen::{Screen, UnknownScreen};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatAction {
    Open,
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login(LoginFields),
    Go(Screen),
    Back,
    Logout,
    Theme,
    Image(String),
    Analyze,
    Ask(String),
    Chat(ChatAction),
    Say(String),
    Mic,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginFields {
    pub name: Option<String>,
    pub language: Language,
    pub location: Option<String>,
}

impl LoginFields {
    pub fn into_form(self) -> LoginForm {
        LoginForm {
            name: self.name,
            language: self.language,
            location: self.location,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: {0} (type `help`)")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("unknown login field: {0} (use name=, lang=, location=)")]
    UnknownField(String),
    #[error("`chat` takes `open` or `close`, got {0}")]
    InvalidChatAction(String),
    #[error(transparent)]
    Screen(#[from] UnknownScreen),
    #[error(transparent)]
    Language(#[from] UnknownLanguage),
}

pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "login" => Command::Login(parse_login_fields(rest)?),
        "go" => Command::Go(required(rest, "go")?.parse()?),
        "back" => Command::Back,
        "logout" => Command::Logout,
        "theme" => Command::Theme,
        "image" => Command::Image(required(rest, "image")?.to_string()),
        "analyze" => Command::Analyze,
        "ask" => Command::Ask(rest.to_string()),
        "chat" => match required(rest, "chat")?.to_ascii_lowercase().as_str() {
            "open" => Command::Chat(ChatAction::Open),
            "close" => Command::Chat(ChatAction::Close),
            other => return Err(CommandError::InvalidChatAction(other.to_string())),
        },
        "say" => Command::Say(rest.to_string()),
        "mic" => Command::Mic,
        "show" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}

fn required<'a>(rest: &'a str, verb: &'static str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument(verb))
    } else {
        Ok(rest)
    }
}

/// Parses `name=.. lang=.. location=..`; values may contain spaces.
fn parse_login_fields(rest: &str) -> Result<LoginFields, CommandError> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for token in rest.split_whitespace() {
        match token.split_once('=') {
            Some((key, value)) if is_login_key(key) => {
                pairs.push((key.to_ascii_lowercase(), value.to_string()));
            }
            _ => match pairs.last_mut() {
                Some((_, value)) => {
                    value.push(' ');
                    value.push_str(token);
                }
                None => return Err(CommandError::UnknownField(token.to_string())),
            },
        }
    }

    let mut fields = LoginFields::default();
    for (key, value) in pairs {
        match key.as_str() {
            "name" => fields.name = Some(value),
            "lang" | "language" => fields.language = value.parse()?,
            "location" => fields.location = Some(value),
            other => return Err(CommandError::UnknownField(other.to_string())),
        }
    }

    Ok(fields)
}

fn is_login_key(key: &str) -> bool {
    matches!(
        key.to_ascii_lowercase().as_str(),
        "name" | "lang" | "language" | "location"
    )
}

pub const HELP: &str = "\
Commands:
  login [name=..] [lang=en|hi|ta|pa] [location=..]   sign in
  go <screen>          home, disease, market, advisory, schemes, analytics,
                       voice, settings, insurance
  back                 return to Home
  logout               end the session
  theme                toggle light/dark mode
  image <path|data:>   select a leaf photo (Disease Detection)
  analyze              diagnose the selected photo
  ask <question>       ask the crop advisor (Crop Advisory)
  chat open|close      open or close the chat panel (Home)
  say <message>        send a chat message
  mic                  toggle the microphone (Voice Assistant)
  show                 redraw the current screen
  quit                 exit";
