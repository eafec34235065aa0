use std::io;
use std::path::Path;
use std::time::Duration;

use agri_core::fixtures::Fixtures;
use agri_core::image::{ImagePayload, ImagePayloadError};
use agri_core::llm::{AdvisoryGateway, ConfigurationError};
use agri_core::models::Theme;
use agri_core::navigation::{AppEvent, Navigator, Ticket, TransitionError};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::commands::{self, ChatAction, Command, HELP};
use crate::render::render;

pub const VOICE_RECOGNITION_DELAY: Duration = Duration::from_secs(3);
pub const NOT_CONFIGURED_MESSAGE: &str =
    "AI service is not configured. Set GEMINI_API_KEY and try again.";

/// Result of a background task, fed back into the event loop.
#[derive(Debug)]
pub enum Completion {
    Diagnosis {
        ticket: Ticket,
        outcome: Result<String, ConfigurationError>,
    },
    Advice {
        ticket: Ticket,
        outcome: Result<String, ConfigurationError>,
    },
    ChatReply {
        ticket: Ticket,
        outcome: Result<String, ConfigurationError>,
    },
    Transcript {
        ticket: Ticket,
    },
}

impl Completion {
    fn into_event(self) -> AppEvent {
        match self {
            Self::Diagnosis { ticket, outcome } => AppEvent::DiagnosisCompleted {
                ticket,
                text: text_or_not_configured(outcome),
            },
            Self::Advice { ticket, outcome } => AppEvent::AdvisoryCompleted {
                ticket,
                text: text_or_not_configured(outcome),
            },
            Self::ChatReply { ticket, outcome } => AppEvent::ChatReplied {
                ticket,
                text: text_or_not_configured(outcome),
            },
            Self::Transcript { ticket } => AppEvent::TranscriptReady { ticket },
        }
    }
}

fn text_or_not_configured(outcome: Result<String, ConfigurationError>) -> String {
    outcome.unwrap_or_else(|err| {
        error!("advisory call rejected: {err}");
        NOT_CONFIGURED_MESSAGE.to_string()
    })
}

#[derive(Debug, Error)]
pub enum CommandFailure {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Image(#[from] ImagePayloadError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    navigator: Navigator,
    gateway: AdvisoryGateway,
    fixtures: Fixtures,
    completions: mpsc::UnboundedSender<Completion>,
    voice_delay: Duration,
    /// Spawned tasks whose completion has not been applied yet.
    pending: usize,
}

impl App {
    pub fn new(
        theme: Theme,
        gateway: AdvisoryGateway,
        fixtures: Fixtures,
    ) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (completions, receiver) = mpsc::unbounded_channel();
        let app = Self {
            navigator: Navigator::new(theme),
            gateway,
            fixtures,
            completions,
            voice_delay: VOICE_RECOGNITION_DELAY,
            pending: 0,
        };
        (app, receiver)
    }

    #[cfg(test)]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn screen_text(&self) -> String {
        render(self.navigator.state(), &self.fixtures)
    }

    /// Applies one command. Gateway calls and the voice timer are spawned and
    /// report back through the completion channel.
    pub fn execute(&mut self, command: Command) -> Result<Flow, CommandFailure> {
        match command {
            Command::Login(fields) => {
                self.navigator.login(fields.into_form().into_profile());
            }
            Command::Go(screen) => {
                self.navigator.navigate(screen)?;
            }
            Command::Back => {
                self.navigator.go_back()?;
            }
            Command::Logout => self.navigator.logout(),
            Command::Theme => {
                let theme = self.navigator.toggle_theme();
                info!(dark = theme.is_dark(), "theme toggled");
            }
            Command::Image(source) => {
                let image = if source.starts_with("data:") {
                    ImagePayload::from_data_uri(&source)?
                } else {
                    ImagePayload::from_file(Path::new(&source))?
                };
                self.navigator.select_image(image)?;
            }
            Command::Analyze => {
                let (ticket, image) = self.navigator.request_diagnosis()?;
                let gateway = self.gateway.clone();
                let completions = self.completions.clone();
                self.pending += 1;
                tokio::spawn(async move {
                    let outcome = gateway.diagnose_plant(&image).await;
                    let _ = completions.send(Completion::Diagnosis { ticket, outcome });
                });
            }
            Command::Ask(question) => {
                let (ticket, question, language) = self.navigator.request_advice(&question)?;
                let gateway = self.gateway.clone();
                let completions = self.completions.clone();
                self.pending += 1;
                tokio::spawn(async move {
                    let outcome = gateway
                        .ask_advisor(&question, language.prompt_name())
                        .await;
                    let _ = completions.send(Completion::Advice { ticket, outcome });
                });
            }
            Command::Chat(ChatAction::Open) => self.navigator.open_chat()?,
            Command::Chat(ChatAction::Close) => self.navigator.close_chat()?,
            Command::Say(text) => {
                let (ticket, text, language) = self.navigator.submit_chat(&text)?;
                let gateway = self.gateway.clone();
                let completions = self.completions.clone();
                self.pending += 1;
                tokio::spawn(async move {
                    let outcome = gateway.ask_advisor(&text, language.prompt_name()).await;
                    let _ = completions.send(Completion::ChatReply { ticket, outcome });
                });
            }
            Command::Mic => {
                if let Some(ticket) = self.navigator.toggle_microphone()? {
                    let delay = self.voice_delay;
                    let completions = self.completions.clone();
                    self.pending += 1;
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = completions.send(Completion::Transcript { ticket });
                    });
                }
            }
            Command::Show | Command::Help => {}
            Command::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    pub fn apply(&mut self, completion: Completion) -> Result<(), TransitionError> {
        self.pending = self.pending.saturating_sub(1);
        self.navigator.dispatch(completion.into_event()).map(|_| ())
    }
}

pub async fn run(
    app: App,
    completions: mpsc::UnboundedReceiver<Completion>,
) -> Result<(), io::Error> {
    run_with_input(app, completions, BufReader::new(tokio::io::stdin()))
        .await
        .map(|_| ())
}

/// Runs until `quit`, ctrl-c, or the end of `input`. After the input ends the
/// loop keeps applying completions until no spawned task is outstanding.
async fn run_with_input<R>(
    mut app: App,
    mut completions: mpsc::UnboundedReceiver<Completion>,
    mut input: R,
) -> Result<App, io::Error>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    let mut input_open = true;
    println!("{}", app.screen_text());

    loop {
        if !input_open && app.pending() == 0 {
            break;
        }

        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
            read = input.read_until(b'\n', &mut line), if input_open => {
                if read? == 0 {
                    debug!(pending = app.pending(), "input closed");
                    input_open = false;
                    continue;
                }
                let flow = match std::str::from_utf8(&line) {
                    Ok(text) => handle_line(&mut app, text),
                    Err(_) => {
                        println!("! input is not valid UTF-8");
                        Flow::Continue
                    }
                };
                line.clear();
                if flow == Flow::Quit {
                    break;
                }
            }
            Some(completion) = completions.recv() => {
                match app.apply(completion) {
                    Ok(()) => println!("\n{}", app.screen_text()),
                    Err(TransitionError::StaleResult(ticket)) => {
                        debug!(
                            screen = %ticket.screen,
                            generation = ticket.generation,
                            "discarded stale result"
                        );
                    }
                    Err(err) => warn!("completion rejected: {err}"),
                }
            }
        }
    }

    Ok(app)
}

fn handle_line(app: &mut App, line: &str) -> Flow {
    let command = match commands::parse(line) {
        Ok(Some(command)) => command,
        Ok(None) => return Flow::Continue,
        Err(err) => {
            println!("! {err}");
            return Flow::Continue;
        }
    };

    let show_help = command == Command::Help;
    match app.execute(command) {
        Ok(Flow::Quit) => Flow::Quit,
        Ok(Flow::Continue) if show_help => {
            println!("{HELP}");
            Flow::Continue
        }
        Ok(Flow::Continue) => {
            println!("\n{}", app.screen_text());
            Flow::Continue
        }
        Err(err) => {
            println!("! {err}");
            Flow::Continue
        }
    }
}
