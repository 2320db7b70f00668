//! Interactive chat session

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

use super::render;
use crate::backend::{self, BackendClient};
use crate::chat::{MessageId, StoreEvent};
use crate::flow::{FlowController, FlowError, FlowPhase, SubmitOutcome};
use crate::itinerary::{DayCursor, ItineraryDocument};
use crate::transcript::TranscriptLogger;

/// Terminal front end for the guided trip planner
pub struct ChatSession {
    backend: Arc<dyn BackendClient>,
    controller: FlowController,
    events: broadcast::Receiver<StoreEvent>,
    transcript: TranscriptLogger,
    require_password: bool,
    /// Last text printed per message, to avoid printing twice
    shown: HashMap<MessageId, String>,
    /// Latest itinerary and the day being shown
    itinerary: Option<(ItineraryDocument, DayCursor)>,
}

impl ChatSession {
    pub fn new(
        backend: Arc<dyn BackendClient>,
        controller: FlowController,
        transcript: TranscriptLogger,
        require_password: bool,
    ) -> Self {
        let events = controller.subscribe();
        Self {
            backend,
            controller,
            events,
            transcript,
            require_password,
            shown: HashMap::new(),
            itinerary: None,
        }
    }

    /// Run the session until /quit or end of input
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();
        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        if self.require_password && !self.password_gate(&mut rl).await? {
            println!("Goodbye!");
            return Ok(());
        }

        self.controller.start();
        self.drain_events();

        loop {
            let readline = rl.readline(&self.input_prompt());
            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input).await {
                            SlashResult::Continue => {}
                            SlashResult::Quit => break,
                        }
                    } else {
                        self.send(input).await;
                    }
                    self.drain_events();
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Ask for the access password until the backend accepts it
    ///
    /// Returns false when the user gives up (EOF or Ctrl+C).
    async fn password_gate(&mut self, rl: &mut DefaultEditor) -> Result<bool> {
        loop {
            let password = match rl.readline(&format!("{} ", "password:".yellow())) {
                Ok(line) => line.trim().to_string(),
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(false),
                Err(err) => return Err(eyre::eyre!("Readline error: {}", err)),
            };
            if password.is_empty() {
                continue;
            }

            match backend::validate_password(self.backend.as_ref(), &password).await {
                Ok(check) if check.success => {
                    debug!("password_gate: accepted");
                    return Ok(true);
                }
                Ok(check) => {
                    let reason = check.error.unwrap_or_else(|| "Incorrect password".to_string());
                    println!("{} {}", "✗".red(), reason);
                }
                Err(e) if e.is_transport() => {
                    warn!(error = %e, "password_gate: server unreachable");
                    println!("{} Could not reach the server: {}", "✗".red(), e);
                }
                Err(e) => {
                    warn!(error = %e, "password_gate: validation failed");
                    println!("{} Password check failed: {}", "✗".red(), e);
                }
            }
        }
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "TripGuide".bright_cyan().bold());
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        if let Some(path) = self.transcript.path() {
            println!("{} {}", "Transcript:".dimmed(), path.display());
        }
        println!();
    }

    fn input_prompt(&self) -> String {
        match self.controller.current_question() {
            Some(q) if !q.options.is_empty() => format!("[{}] {} ", q.options.join("/"), ">".bright_green()),
            _ => format!("{} ", ">".bright_green()),
        }
    }

    async fn send(&mut self, input: &str) {
        if self.controller.phase() == FlowPhase::Finished || self.controller.current_question().is_some_and(|q| q.is_api())
        {
            println!("{}", "(thinking... Ctrl+C to cancel)".dimmed());
        }
        let result = cancellable(self.controller.submit(input)).await;
        self.report(result);
    }

    fn report(&mut self, result: Option<Result<SubmitOutcome, FlowError>>) {
        match result {
            None => {
                println!("^C");
                self.controller.cancel_pending();
            }
            Some(Ok(outcome)) => debug!(?outcome, "report: done"),
            Some(Err(e)) => println!("{} {}", "!".yellow(), e),
        }
    }

    /// Print whatever changed in the store since the last drain
    fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.show(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(n)) => {
                    warn!(skipped = n, "drain_events: lagged behind store events");
                }
            }
        }
    }

    fn show(&mut self, event: StoreEvent) {
        match event {
            StoreEvent::Appended { id } | StoreEvent::Updated { id } => {
                let Some(message) = self.controller.store().get(&id).cloned() else {
                    return;
                };
                if self.shown.get(&id) == Some(&message.text) {
                    return;
                }
                if message.is_placeholder() {
                    return;
                }
                println!("{}", render::format_message(&message));
                println!();
                self.transcript.log_message(&message);
                if let Some(doc) = render::message_itinerary(&message) {
                    let cursor = doc.cursor();
                    self.itinerary = Some((doc, cursor));
                }
                self.shown.insert(id, message.text);
            }
            StoreEvent::Truncated { id, .. } => {
                println!("{}", "(conversation rewound)".dimmed());
                self.transcript.log_truncated(&id);
                let store = self.controller.store();
                self.shown.retain(|shown_id, _| store.get(shown_id).is_some());
            }
            StoreEvent::Reset => {
                println!("{}", "(session reset)".dimmed());
                self.transcript.log_reset();
                self.shown.clear();
                self.itinerary = None;
            }
        }
    }

    async fn handle_slash_command(&mut self, input: &str) -> SlashResult {
        let mut parts = input.splitn(3, char::is_whitespace);
        let cmd = parts.next().unwrap_or("");
        let arg = parts.next();

        match cmd {
            "/help" | "/h" => self.print_help(),
            "/quit" | "/q" | "/exit" => return SlashResult::Quit,
            "/history" => self.print_history(),
            "/answers" => self.print_answers(),
            "/retry" => {
                let Some(id) = self.controller.store().latest_assistant().map(|m| m.id.clone()) else {
                    println!("{}", "Nothing to retry.".dimmed());
                    return SlashResult::Continue;
                };
                let result = cancellable(self.controller.retry(&id)).await;
                if matches!(result, Some(Ok(SubmitOutcome::Ignored))) {
                    println!("{}", "The latest response cannot be retried.".dimmed());
                }
                self.report(result);
            }
            "/edit" => {
                let index = arg.and_then(|n| n.parse::<usize>().ok());
                let text = parts.next().unwrap_or("").trim();
                let target = index
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| self.controller.store().as_slice().get(i))
                    .filter(|m| m.is_user())
                    .map(|m| m.id.clone());
                match target {
                    Some(id) if !text.is_empty() => {
                        let result = cancellable(self.controller.edit(&id, text)).await;
                        self.report(result);
                    }
                    _ => println!("Usage: {} (n from /history, a message you sent)", "/edit <n> <text>".yellow()),
                }
            }
            "/reset" => {
                self.controller.reset();
            }
            "/next" | "/prev" | "/day" => self.navigate(cmd, arg),
            "/map" => self.print_map(arg),
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
            }
        }
        SlashResult::Continue
    }

    fn navigate(&mut self, cmd: &str, arg: Option<&str>) {
        let Some((doc, cursor)) = self.itinerary.as_mut() else {
            println!("{}", "No itinerary yet.".dimmed());
            return;
        };
        if cursor.is_empty() {
            println!("{}", "This itinerary has no day sections.".dimmed());
            return;
        }
        match cmd {
            "/next" => {
                cursor.next();
            }
            "/prev" => {
                cursor.previous();
            }
            _ => {
                let index = arg.and_then(|n| n.parse::<usize>().ok()).and_then(|n| n.checked_sub(1));
                if !index.is_some_and(|i| cursor.go_to(i)) {
                    println!("Usage: {} (1 to {})", "/day <n>".yellow(), cursor.len());
                    return;
                }
            }
        }
        if let Some(index) = cursor.current() {
            println!("{}", render::format_day(doc, index));
            println!();
        }
    }

    fn print_map(&self, arg: Option<&str>) {
        let Some((doc, cursor)) = self.itinerary.as_ref() else {
            println!("{}", "No itinerary yet.".dimmed());
            return;
        };
        let Some(map) = cursor.current().and_then(|i| doc.map(i)) else {
            return;
        };
        match arg.and_then(|n| n.parse::<usize>().ok()) {
            Some(number) => match map.select(number) {
                Some(poi) => println!(
                    "{} ({:.4}, {:.4})\n  {}",
                    poi.name.bold(),
                    poi.coordinates.lat,
                    poi.coordinates.lon,
                    poi.description
                ),
                None => println!("No point of interest numbered {}.", number),
            },
            None => println!("{}", render::format_map(&map)),
        }
        println!();
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:18} Show this help", "/help".yellow());
        println!("  {:18} Exit", "/quit".yellow());
        println!("  {:18} Show the conversation", "/history".yellow());
        println!("  {:18} Show the answers collected so far", "/answers".yellow());
        println!("  {:18} Ask the latest question to the server again", "/retry".yellow());
        println!("  {:18} Change an earlier answer and continue from there", "/edit <n> <text>".yellow());
        println!("  {:18} Start over", "/reset".yellow());
        println!("  {:18} Browse itinerary days", "/next /prev".yellow());
        println!("  {:18} Jump to a day", "/day <n>".yellow());
        println!("  {:18} Map of the current day; with n, show that point", "/map [n]".yellow());
        println!();
    }

    fn print_history(&self) {
        let store = self.controller.store();
        if store.is_empty() {
            println!("{}", "No conversation history.".dimmed());
            return;
        }
        println!();
        println!("{}", "Conversation History:".bright_cyan());
        for (i, msg) in store.iter().enumerate() {
            let role = if msg.is_user() {
                "You".bright_green()
            } else {
                "Guide".bright_blue()
            };
            let preview: String = msg.text.lines().next().unwrap_or("").chars().take(60).collect();
            let preview = if preview.len() < msg.text.len() {
                format!("{}...", preview)
            } else {
                preview
            };
            println!("  {}. {}: {}", i + 1, role, preview);
        }
        println!();
    }

    fn print_answers(&self) {
        let state = self.controller.state();
        if state.answers.is_empty() {
            println!("{}", "No answers yet.".dimmed());
            return;
        }
        for question in self.controller.definition().iter() {
            if let Some(answer) = state.answers.get(&question.storage_key) {
                println!("  {:20} {}", question.storage_key.yellow(), answer);
            }
        }
    }
}

/// Run `fut`, giving up on Ctrl+C
async fn cancellable<F: Future>(fut: F) -> Option<F::Output> {
    tokio::select! {
        output = fut => Some(output),
        _ = tokio::signal::ctrl_c() => None,
    }
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Quit,
}
