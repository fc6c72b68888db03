//! Line-oriented terminal front end.

use anyhow::Result;
use parley::policy::UnknownMode;
use parley::{
    Attachment, Config, ConversationMode, CredentialSlot, GeminiGateway, Message, Role, Session,
    TurnInput, TurnOrchestrator,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Type a message and press Enter.
  /mode <standard|search|fast>  switch conversation mode
  /attach <path>                attach an image to the next message
  /key <api key>                use another API key
  /help                         show this help
  /quit                         exit";

#[derive(Debug, PartialEq)]
enum Command {
    Say(String),
    Mode(Result<ConversationMode, UnknownMode>),
    Attach(PathBuf),
    Key(String),
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let Some(rest) = line.trim().strip_prefix('/') else {
            return Command::Say(line.to_string());
        };
        let (name, arg) = rest
            .split_once(char::is_whitespace)
            .map(|(name, arg)| (name, arg.trim()))
            .unwrap_or((rest, ""));
        match name {
            "mode" => Command::Mode(arg.parse()),
            "attach" if !arg.is_empty() => Command::Attach(PathBuf::from(arg)),
            "key" if !arg.is_empty() => Command::Key(arg.to_string()),
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(line.trim().to_string()),
        }
    }
}

fn render(message: &Message) -> String {
    let who = match message.role {
        Role::User => "you",
        Role::Ai => "ai",
    };
    let time = message.display_time().unwrap_or_default();
    let mut out = format!("[{}] {}: {}", time, who, message.content);
    if let Some(attachment) = &message.attachment {
        out.push_str(&format!("\n    (image: {})", attachment.name));
    }
    for (i, source) in message.sources.iter().enumerate() {
        out.push_str(&format!(
            "\n    [{}] {} <{}>",
            i + 1,
            source.display_title(),
            source.uri
        ));
    }
    out
}

/// Runs `prepare` on the calling thread before the runtime spawns its
/// workers, then drives `body` to completion.
fn launch<T>(prepare: impl FnOnce(), body: impl Future<Output = Result<T>>) -> Result<T> {
    prepare();
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(body)
}

fn main() -> Result<()> {
    launch(
        || {
            parley::config::load_dotenv();
            parley::init_tracing();
        },
        run(),
    )
}

async fn run() -> Result<()> {
    let config = Config::from_env()?;
    let credentials = CredentialSlot::new(config.api_key.clone());
    let gateway = Arc::new(GeminiGateway::new(&config, credentials.clone()));
    let turns = TurnOrchestrator::new(
        gateway,
        Arc::new(|| println!("A valid API key is needed. Set one with /key <value>.")),
    );
    let mut session = Session::new(config.default_mode);
    let mut staged: Option<Attachment> = None;
    let mut shown = 0;

    println!("parley ({} mode). /help for commands.", session.state().mode());
    if !credentials.is_set() {
        println!("No API key found. Set GEMINI_API_KEY or use /key <value>.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Say(text) => {
                let mut input = TurnInput::text(text);
                input.attachment = staged.take();
                turns.submit_turn(&mut session, input).await;
                for message in &session.state().turns()[shown..] {
                    println!("{}", render(message));
                }
                shown = session.state().len();
            }
            Command::Mode(Ok(mode)) => {
                turns.change_mode(&mut session, mode);
                println!("Switched to {} mode.", mode);
            }
            Command::Mode(Err(err)) => println!("{}", err),
            Command::Attach(path) => {
                let attachment = Attachment::from_path(path);
                println!("Attached {} to the next message.", attachment.name);
                staged = Some(attachment);
            }
            Command::Key(key) => {
                credentials.set(Some(key));
                println!("API key updated.");
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
            Command::Unknown(raw) => println!("Unknown command: {}", raw),
        }
    }

    Ok(())
}
