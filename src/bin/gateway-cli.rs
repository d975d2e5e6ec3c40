use clap::{Parser, Subcommand};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use agent_gateway::session::ChatMessage;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the Agent Gateway", long_about = None)]
struct Cli {
    #[arg(short, long, env = "AGENT_GATEWAY_URL", default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or list agents
    Agents {
        #[command(subcommand)]
        command: AgentCommands,
    },
    /// Store provider credentials
    Credentials {
        #[command(subcommand)]
        command: CredentialCommands,
    },
    /// Open a WebSocket chat, send each message and print the replies
    Chat {
        /// Text of the opening handshake frame (never answered)
        #[arg(long, default_value = "hello")]
        handshake: String,

        messages: Vec<String>,
    },
}

#[derive(Subcommand)]
enum AgentCommands {
    /// List agents
    List,
    /// Create an agent from a JSON file
    Create { file: PathBuf },
}

#[derive(Subcommand)]
enum CredentialCommands {
    /// Create a credential from a JSON file
    Create { file: PathBuf },
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Agents { command: AgentCommands::List } => {
            let res = client.get(format!("{}/v1/agents", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Agents { command: AgentCommands::Create { file } } => {
            let body = read_json(&file)?;
            let res = client.post(format!("{}/v1/agents", cli.url)).json(&body).send().await?;
            print_response(res).await?;
        }
        Commands::Credentials { command: CredentialCommands::Create { file } } => {
            let body = read_json(&file)?;
            let res = client
                .post(format!("{}/v1/credentials", cli.url))
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Chat { handshake, messages } => {
            chat(&cli.url, handshake, messages).await?;
        }
    }

    Ok(())
}

fn read_json(path: &Path) -> CliResult<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn chat_url(base: &str) -> CliResult<Url> {
    let mut url = Url::parse(base)?;
    let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
    url.set_scheme(scheme)
        .map_err(|()| format!("cannot use {base} as a WebSocket URL"))?;
    url.set_path("/v1/agents/chat");
    Ok(url)
}

fn frame(id: String, text: String) -> CliResult<Message> {
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs().to_string();
    let message = ChatMessage {
        id,
        from: "cli".to_string(),
        text,
        timestamp,
    };
    Ok(Message::text(message.encode()?))
}

async fn chat(base: &str, handshake: String, messages: Vec<String>) -> CliResult<()> {
    let url = chat_url(base)?;
    let (mut socket, _) = tokio_tungstenite::connect_async(url.as_str()).await?;
    socket.send(frame("handshake".to_string(), handshake)?).await?;

    for (index, text) in messages.into_iter().enumerate() {
        socket.send(frame(format!("cli-{}", index + 1), text)?).await?;

        loop {
            match socket.next().await {
                Some(Ok(Message::Text(reply))) => {
                    match ChatMessage::decode(reply.as_str().as_bytes()) {
                        Ok(reply) => println!("[{}] {}: {}", reply.id, reply.from, reply.text),
                        Err(_) => println!("{}", reply.as_str()),
                    }
                    break;
                }
                Some(Ok(Message::Close(_))) | None => {
                    eprintln!("Error: gateway closed the chat");
                    return Ok(());
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
            }
        }
    }

    socket.close(None).await?;
    Ok(())
}

async fn print_response(res: reqwest::Response) -> CliResult<()> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
