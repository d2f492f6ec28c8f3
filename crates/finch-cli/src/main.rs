use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rustyline::Editor;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use tracing_subscriber::EnvFilter;

use finch_client::{ChatContext, SendOutcome};
use finch_core::{Role, Turn, TurnId};
use finch_gateway::GatewayConfig;

const COMMANDS: &[&str] = &[
    "/sessions", "/new", "/switch", "/rate", "/register", "/login", "/whoami", "/logout",
    "/summary", "/help", "/quit",
];

#[derive(Parser)]
#[command(name = "finch")]
#[command(about = "Finch - terminal client for a retrieval-augmented support assistant", long_about = None)]
struct Cli {
    /// Base URL of the assistant backend (overrides FINCH_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Profile directory (defaults to the user config dir)
    #[arg(long)]
    profile_dir: Option<PathBuf>,
}

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = GatewayConfig::from_env();
    if let Some(api_url) = cli.api_url {
        config = config.with_base_url(api_url);
    }

    let ctx = ChatContext::init(cli.profile_dir, config)?;

    println!("{}", "=== Finch ===".bright_magenta().bold());
    println!(
        "{}",
        "Type a message to chat, '/help' for commands, or '/quit' to exit.".bright_black()
    );
    println!();

    println!("{}", "Connecting...".bright_black());
    if let Err(e) = ctx.remote.health().await {
        eprintln!(
            "{}",
            format!("Warning: backend not healthy: {}", e.user_message()).yellow()
        );
    }
    ctx.boot().await;
    report_state(&ctx).await;

    let helper = CliHelper::new();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(helper));

    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                if trimmed == "/quit" || trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }

                if trimmed.starts_with('/') {
                    if let Err(e) = run_command(&ctx, trimmed).await {
                        eprintln!("{}", format!("Error: {}", e).red());
                    }
                } else {
                    send_message(&ctx, trimmed).await;
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}

async fn report_state(ctx: &ChatContext) {
    let snapshot = ctx.conversation.snapshot().await;
    if let Some(error) = &snapshot.error {
        eprintln!("{}", format!("Warning: {}", error).yellow());
    }
    if let Some(session) = ctx.registry.current().await {
        println!(
            "{}",
            format!(
                "Session #{}: {} ({} messages)",
                session.id,
                session.display_title(),
                session.message_count
            )
            .bright_black()
        );
        for turn in &snapshot.turns {
            render_turn(turn);
        }
    }
}

async fn send_message(ctx: &ChatContext, text: &str) {
    match ctx.conversation.send(text).await {
        SendOutcome::Ignored => {
            println!("{}", "Nothing sent.".bright_black());
        }
        SendOutcome::Delivered | SendOutcome::Failed => {
            let snapshot = ctx.conversation.snapshot().await;
            if let Some(turn) = snapshot.turns.last() {
                render_turn(turn);
            }
            if let Some(error) = snapshot.error {
                eprintln!("{}", format!("Error: {}", error).red());
            }
        }
    }
}

fn render_turn(turn: &Turn) {
    match turn.role() {
        Role::User => {
            println!("{}", format!("> {}", turn.content()).green());
        }
        Role::Assistant => {
            let tag = match turn.id() {
                TurnId::Remote(id) => format!("[#{}] ", id),
                TurnId::Local(_) => String::new(),
            };
            if turn.is_error() {
                println!("{}{}", tag.bright_black(), turn.content().red());
            } else {
                for (i, line) in turn.content().lines().enumerate() {
                    if i == 0 {
                        println!("{}{}", tag.bright_black(), line.bright_blue());
                    } else {
                        println!("{}", line.bright_blue());
                    }
                }
            }
            render_evidence(turn);
        }
    }
}

fn render_evidence(turn: &Turn) {
    let sources = turn.sources();
    if !sources.is_empty() {
        println!("{}", "Sources:".bright_black());
        for source in sources {
            let title = source.title.as_deref().unwrap_or(&source.id);
            let score = source
                .score_norm
                .map(|s| format!(" ({:.2})", s))
                .unwrap_or_default();
            println!("{}", format!("  - {}{}", title, score).bright_black());
        }
    }
    if let Turn::Enriched(t) = turn
        && let Some(metrics) = &t.metrics
    {
        let mut parts = Vec::new();
        if let Some(model) = &metrics.model_used {
            parts.push(model.clone());
        }
        if let Some(latency) = metrics.latency_ms {
            parts.push(format!("{:.0} ms", latency));
        }
        if metrics.context_chunks_used > 0 {
            parts.push(format!("{} chunks", metrics.context_chunks_used));
        }
        if !parts.is_empty() {
            println!("{}", format!("  [{}]", parts.join(", ")).bright_black());
        }
    }
}

async fn run_command(ctx: &ChatContext, input: &str) -> Result<()> {
    let mut parts = input.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    match command {
        "/help" => {
            println!("{}", "Commands:".bright_black());
            println!("{}", "  /sessions                list sessions".bright_black());
            println!("{}", "  /new                     start a fresh session".bright_black());
            println!("{}", "  /switch <id>             switch to a session".bright_black());
            println!("{}", "  /rate <id> up|down|clear rate an answer".bright_black());
            println!("{}", "  /register <email> <pw>   create an account".bright_black());
            println!("{}", "  /login <email> <pw>      log in".bright_black());
            println!("{}", "  /whoami                  show the current identity".bright_black());
            println!("{}", "  /logout                  log out (local)".bright_black());
            println!("{}", "  /summary                 session statistics".bright_black());
            println!("{}", "  /quit                    exit".bright_black());
        }
        "/sessions" => {
            let current = ctx.registry.current_id().await;
            for session in ctx.registry.sessions().await {
                let marker = if Some(session.id) == current { "*" } else { " " };
                println!(
                    "{}",
                    format!(
                        "{} #{:<6} {} ({} messages)",
                        marker,
                        session.id,
                        session.display_title(),
                        session.message_count
                    )
                    .bright_black()
                );
            }
        }
        "/new" => {
            let session = ctx.registry.create_new().await?;
            ctx.conversation.switch_to(session.id).await?;
            println!(
                "{}",
                format!("Started session #{}", session.id).bright_green()
            );
        }
        "/switch" => {
            let id: i64 = args
                .first()
                .ok_or_else(|| anyhow::anyhow!("usage: /switch <id>"))?
                .parse()?;
            ctx.conversation.switch_to(id).await?;
            report_state(ctx).await;
        }
        "/rate" => {
            let id: i64 = args
                .first()
                .ok_or_else(|| anyhow::anyhow!("usage: /rate <id> up|down|clear"))?
                .parse()?;
            let value = match args.get(1).copied() {
                Some("up") => 1,
                Some("down") => -1,
                Some("clear") => 0,
                _ => anyhow::bail!("usage: /rate <id> up|down|clear"),
            };
            match ctx.feedback.submit(id, value).await {
                Ok(finch_client::FeedbackOutcome::Applied) => {
                    println!("{}", "Feedback recorded.".bright_green());
                }
                Ok(finch_client::FeedbackOutcome::Ignored) => {
                    println!("{}", "That message cannot be rated.".bright_black());
                }
                Err(e) => {
                    eprintln!("{}", format!("Feedback failed: {}", e.user_message()).red());
                }
            }
        }
        "/register" => {
            let (email, password) = credentials(&args, "/register")?;
            let auth = ctx.auth.register(email, password).await?;
            println!(
                "{}",
                format!("Registered as user {}", auth.user_id).bright_green()
            );
        }
        "/login" => {
            let (email, password) = credentials(&args, "/login")?;
            let tokens = ctx.auth.login(email, password).await?;
            println!(
                "{}",
                format!("Logged in as user {}", tokens.user_id).bright_green()
            );
        }
        "/whoami" => {
            let user = ctx.auth.me().await?;
            let email = user.email.as_deref().unwrap_or("anonymous");
            println!(
                "{}",
                format!(
                    "User {} ({}){}",
                    user.user_id,
                    email,
                    if user.is_authenticated { "" } else { " [not authenticated]" }
                )
                .bright_black()
            );
        }
        "/logout" => {
            ctx.auth.logout();
            println!("{}", "Logged out.".bright_green());
        }
        "/summary" => {
            let summary = ctx.remote.sessions_summary().await?;
            println!(
                "{}",
                format!(
                    "{} sessions ({} active), {} messages, {:.1} messages/session",
                    summary.total_sessions,
                    summary.active_sessions,
                    summary.total_messages,
                    summary.average_messages_per_session
                )
                .bright_black()
            );
        }
        _ => {
            println!("{}", "Unknown command".bright_black());
        }
    }
    Ok(())
}

fn credentials<'a>(args: &[&'a str], usage: &str) -> Result<(&'a str, &'a str)> {
    match args {
        [email, password] => Ok((*email, *password)),
        _ => anyhow::bail!("usage: {} <email> <password>", usage),
    }
}
