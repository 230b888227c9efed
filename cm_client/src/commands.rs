use chef_market::auth::{
    ChefProfilePayload, LoginPayload, ProfileUpdatePayload, RegisterPayload,
};
use serde_json::Value;
use std::fmt;

/// A parsed line of user input.
#[derive(Debug, Clone)]
pub enum Command {
    Register(RegisterPayload),
    Login(LoginPayload),
    /// Re-check the session held in the cookie store
    Session,
    Update(ProfileUpdatePayload),
    Chef(ChefProfilePayload),
    Specialty(Vec<String>),
    Logout,
    State,
    Help,
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Command is missing required arguments.
    MissingArguments { usage: &'static str },
    /// `update` was given a field it does not know.
    UnknownField(String),
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArguments { usage } => write!(f, "Missing arguments. Usage: {}", usage),
            Self::UnknownField(field) => write!(
                f,
                "Unknown field '{}'. Use one of: {}",
                field,
                UPDATE_FIELDS.join(", ")
            ),
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Type 'help' to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

const REGISTER_USAGE: &str = "register EMAIL PASSWORD [chef]";
const LOGIN_USAGE: &str = "login EMAIL PASSWORD";
const UPDATE_USAGE: &str = "update FIELD VALUE";
const CHEF_USAGE: &str = "chef CUISINE[,CUISINE..] [BIO..]";
const SPECIALTY_USAGE: &str = "specialty CUISINE[,CUISINE..]";

const UPDATE_FIELDS: [&str; 7] = [
    "email",
    "password",
    "first-name",
    "last-name",
    "description",
    "allergies",
    "cuisine",
];

/// Help text listing every command.
pub const HELP: &str = "\
Commands:
  register EMAIL PASSWORD [chef]    Create an account and sign in
  login EMAIL PASSWORD              Sign in
  session                           Re-check the current session
  update FIELD VALUE                Update one profile field
                                    (email, password, first-name, last-name,
                                     description, allergies, cuisine)
  chef CUISINE[,CUISINE..] [BIO..]  Register as a chef
  specialty CUISINE[,CUISINE..]     Replace your cuisine specialty
  logout                            Sign out
  state                             Show the session state
  help                              Show this help
  quit                              Exit
";

/// Parse a command string into a [`Command`].
///
/// # Examples
///
/// ```
/// use cm_client::commands::{Command, parse_command};
///
/// assert!(matches!(parse_command("logout"), Ok(Command::Logout)));
/// assert!(matches!(parse_command("login a@b.com secret1"), Ok(Command::Login(_))));
/// assert!(parse_command("login a@b.com").is_err());
/// ```
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();

    // Try single-word commands first
    match trimmed {
        "session" => return Ok(Command::Session),
        "logout" => return Ok(Command::Logout),
        "state" => return Ok(Command::State),
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        _ => {}
    }

    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (trimmed, ""),
    };

    match command {
        "register" => parse_register(rest),
        "login" => parse_login(rest),
        "update" => parse_update(rest),
        "chef" => parse_chef(rest),
        "specialty" => parse_specialty(rest),
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

/// Parse "register EMAIL PASSWORD [chef]"
fn parse_register(rest: &str) -> Result<Command, ParseError> {
    let parts: Vec<&str> = rest.split_ascii_whitespace().collect();
    match parts.as_slice() {
        [email, password] => Ok(Command::Register(RegisterPayload {
            email: Some(Value::from(*email)),
            password: Some(Value::from(*password)),
            chef: None,
        })),
        [email, password, "chef"] => Ok(Command::Register(RegisterPayload {
            email: Some(Value::from(*email)),
            password: Some(Value::from(*password)),
            chef: Some(Value::Bool(true)),
        })),
        _ => Err(ParseError::MissingArguments {
            usage: REGISTER_USAGE,
        }),
    }
}

/// Parse "login EMAIL PASSWORD"
fn parse_login(rest: &str) -> Result<Command, ParseError> {
    let parts: Vec<&str> = rest.split_ascii_whitespace().collect();
    match parts.as_slice() {
        [email, password] => Ok(Command::Login(LoginPayload {
            email: Some(Value::from(*email)),
            password: Some(Value::from(*password)),
        })),
        _ => Err(ParseError::MissingArguments { usage: LOGIN_USAGE }),
    }
}

/// Parse "update FIELD VALUE", where VALUE may contain spaces
fn parse_update(rest: &str) -> Result<Command, ParseError> {
    let Some((field, value)) = rest.split_once(char::is_whitespace) else {
        return Err(ParseError::MissingArguments {
            usage: UPDATE_USAGE,
        });
    };
    let value = value.trim().to_string();

    let mut payload = ProfileUpdatePayload::default();
    match field {
        "email" => payload.email = Some(Value::String(value)),
        "password" => payload.password = Some(Value::String(value)),
        "first-name" => payload.first_name = Some(value),
        "last-name" => payload.last_name = Some(value),
        "description" => payload.description = Some(value),
        "allergies" => payload.allergies = Some(split_list(&value)),
        "cuisine" => payload.favorite_cuisine = Some(split_list(&value)),
        other => return Err(ParseError::UnknownField(other.to_string())),
    }

    Ok(Command::Update(payload))
}

/// Parse "chef CUISINE[,CUISINE..] [BIO..]"
fn parse_chef(rest: &str) -> Result<Command, ParseError> {
    if rest.is_empty() {
        return Err(ParseError::MissingArguments { usage: CHEF_USAGE });
    }

    let (cuisines, bio) = match rest.split_once(char::is_whitespace) {
        Some((cuisines, bio)) => (cuisines, Some(bio.trim().to_string())),
        None => (rest, None),
    };

    Ok(Command::Chef(ChefProfilePayload {
        cuisine_specialty: split_list(cuisines),
        bio: bio.filter(|bio| !bio.is_empty()),
    }))
}

/// Parse "specialty CUISINE[,CUISINE..]"
fn parse_specialty(rest: &str) -> Result<Command, ParseError> {
    let cuisines = split_list(rest);
    if cuisines.is_empty() {
        return Err(ParseError::MissingArguments {
            usage: SPECIALTY_USAGE,
        });
    }
    Ok(Command::Specialty(cuisines))
}

/// Split a comma separated list, dropping empty entries
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
