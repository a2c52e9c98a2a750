use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use dialoguer::Input;
use tandem_client::{CallState, CallUpdate, ClientCommand, ClientConfig, ClientRuntime};
use tandem_core::utils::DEFAULT_PORT;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tandem")]
#[command(about = "Join a room on a tandem relay, chat and place calls")]
struct Args {
    /// Relay WebSocket endpoint
    #[arg(long, default_value_t = format!("ws://127.0.0.1:{}/ws", DEFAULT_PORT))]
    url: String,

    #[arg(short, long)]
    room: Option<String>,

    /// Display name shown to the room
    #[arg(short, long)]
    name: Option<String>,

    /// STUN/TURN urls, repeatable
    #[arg(long = "ice-server")]
    ice_servers: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let room = match args.room {
        Some(room) => room,
        None => prompt("Room")?,
    };
    let name = match args.name {
        Some(name) => name,
        None => prompt("Your name")?,
    };

    let mut config = ClientConfig::new(args.url, room.as_str(), name.as_str());
    if !args.ice_servers.is_empty() {
        config.ice_servers = args.ice_servers;
    }

    println!("{}", format!("Connecting to {} ...", config.url).cyan());
    let runtime = ClientRuntime::connect(config)
        .await
        .context("Could not reach the relay")?;
    println!(
        "{} {} {}",
        "Joined".green().bold(),
        room.bold(),
        format!("as {} ({})", name, runtime.local_id()).dimmed()
    );
    print_help();

    let updates = runtime.subscribe();
    let (command_tx, command_rx) = mpsc::channel(32);

    tokio::spawn(print_updates(updates));
    tokio::spawn(read_commands(command_tx, name));

    runtime.run(command_rx).await.context("Relay connection ended")?;
    println!("{}", "Bye".green());
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(label)
        .interact_text()
        .with_context(|| format!("Failed to read {}", label.to_lowercase()))
}

fn print_help() {
    println!(
        "{}",
        "Commands: /call  /end  /audio  /video  /quit  (anything else is sent as chat)".dimmed()
    );
}

async fn read_commands(commands: mpsc::Sender<ClientCommand>, name: String) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let Some(command) = parse_line(&line) else {
            continue;
        };
        if let ClientCommand::Chat(text) = &command {
            println!("{} {}", format!("{}:", name).blue().bold(), text);
        }
        let quit = command == ClientCommand::Quit;
        if commands.send(command).await.is_err() || quit {
            return;
        }
    }

    let _ = commands.send(ClientCommand::Quit).await;
}

fn parse_line(line: &str) -> Option<ClientCommand> {
    let line = line.trim();
    match line {
        "" => None,
        "/call" => Some(ClientCommand::StartCall),
        "/end" => Some(ClientCommand::EndCall),
        "/audio" => Some(ClientCommand::ToggleAudio),
        "/video" => Some(ClientCommand::ToggleVideo),
        "/quit" | "/exit" => Some(ClientCommand::Quit),
        "/help" => {
            print_help();
            None
        }
        _ if line.starts_with('/') => {
            println!("{}", format!("Unknown command {}", line).yellow());
            None
        }
        text => Some(ClientCommand::Chat(text.to_owned())),
    }
}

async fn print_updates(mut updates: broadcast::Receiver<CallUpdate>) {
    loop {
        match updates.recv().await {
            Ok(CallUpdate::StateChanged(state)) => {
                let label = format!("call {}", state);
                let colored = match state {
                    CallState::Connected => label.green().bold(),
                    CallState::Offering | CallState::Answering => label.yellow(),
                    CallState::Ended => label.red(),
                    CallState::Idle => label.dimmed(),
                };
                println!("{} {}", "*".cyan(), colored);
            }
            Ok(CallUpdate::TracksChanged { audio, video }) => {
                println!(
                    "{} audio {}, video {}",
                    "*".cyan(),
                    on_off(audio),
                    on_off(video)
                );
            }
            Ok(CallUpdate::Chat(message)) => {
                println!("{} {}", format!("{}:", message.sender).magenta().bold(), message.text);
            }
            Ok(CallUpdate::Error(error)) => {
                println!("{} {}", "error:".red().bold(), error);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                println!("{}", format!("({} updates skipped)", skipped).dimmed());
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn on_off(enabled: bool) -> ColoredString {
    if enabled { "on".green() } else { "off".red() }
}
