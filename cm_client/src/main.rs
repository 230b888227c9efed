//! Interactive client for the chef marketplace server.
//!
//! Checks for an existing session on start, then reads commands line by line.

use anyhow::Result;
use cm_client::{
    api_client::ApiClient,
    commands::{Command, HELP as COMMANDS_HELP, parse_command},
    session::{OpResult, SessionContext, SessionState},
};
use pico_args::Arguments;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Connect to a chef marketplace server

USAGE:
  cm_client [OPTIONS]

OPTIONS:
  --server URL          Server URL  [default: env CM_SERVER_URL or http://127.0.0.1:3001]

FLAGS:
  -h, --help            Print help information
";

struct Args {
    server_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        server_url: match pargs.opt_value_from_str("--server")? {
            Some(url) => url,
            None => std::env::var("CM_SERVER_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:3001".to_string()),
        },
    };

    env_logger::builder().format_target(false).init();

    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let context = SessionContext::new(ApiClient::new(args.server_url)?);

    // Report sign-in changes as they happen
    let mut updates = context.subscribe();
    let watcher = tokio::spawn(async move {
        let mut signed_in_as: Option<String> = None;
        while updates.changed().await.is_ok() {
            let current = updates
                .borrow_and_update()
                .profile
                .as_ref()
                .map(|user| user.email.clone());
            if current != signed_in_as {
                match &current {
                    Some(email) => println!("* signed in as {}", email),
                    None if signed_in_as.is_some() => println!("* signed out"),
                    None => {}
                }
                signed_in_as = current;
            }
        }
    });

    println!("Connecting to {}...", context.api().base_url());
    if !context.check_session().await.result {
        println!("No active session. Type 'help' for commands.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        let outcome = match command {
            Command::Register(payload) => context.register(payload).await,
            Command::Login(payload) => context.login(payload).await,
            Command::Session => context.check_session().await,
            Command::Update(payload) => context.update_profile(payload).await,
            Command::Chef(payload) => context.register_chef(payload).await,
            Command::Specialty(list) => context.update_chef_specialty(list).await,
            Command::Logout => context.logout().await,
            Command::State => {
                print_state(&context.state());
                continue;
            }
            Command::Help => {
                print!("{COMMANDS_HELP}");
                continue;
            }
            Command::Quit => break,
        };
        print_outcome(&outcome);
    }

    context.unmount();
    watcher.abort();
    Ok(())
}

fn print_outcome(outcome: &OpResult) {
    if outcome.result {
        println!("ok");
    } else {
        for message in &outcome.message {
            println!("error: {}", message);
        }
    }
}

fn print_state(state: &SessionState) {
    println!("authenticated: {}", state.is_authenticated);
    println!("loading:       {}", state.is_loading);
    match &state.profile {
        Some(user) => match serde_json::to_string_pretty(user) {
            Ok(json) => println!("profile:\n{}", json),
            Err(e) => println!("profile: <unprintable: {}>", e),
        },
        None => println!("profile:       none"),
    }
}
