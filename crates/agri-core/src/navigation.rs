//! Screen-navigation state machine.
//!
//! All transitions go through [`reduce`], a pure function from the current
//! [`AppState`] and an [`AppEvent`] to the next state. A rejected event leaves
//! the caller's state untouched. [`Navigator`] owns the live state, logs each
//! transition, and exposes the user-facing operations.
//!
//! Every view instance, chat panel and microphone capture draws a fresh value
//! from a monotonically increasing generation counter. Async work started from
//! a view is issued a [`Ticket`]; completions whose ticket no longer matches
//! the live state are rejected with [`TransitionError::StaleResult`].

use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::chat::ChatPanel;
use crate::image::ImagePayload;
use crate::models::{ChatMessage, Language, Session, Theme, UserProfile};
use crate::screen::Screen;

pub const VOICE_IDLE_PROMPT: &str = "Tap microphone to ask...";
pub const VOICE_LISTENING: &str = "Listening...";
pub const VOICE_SAMPLE_TRANSCRIPT: &str = "How can I increase my tomato yield?";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HomeView {
    pub chat: Option<ChatPanel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiagnosisView {
    pub image: Option<ImagePayload>,
    pub analyzing: bool,
    pub result: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdvisoryView {
    pub question: Option<String>,
    pub loading: bool,
    pub answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceView {
    /// Generation of the in-progress capture, if the microphone is on.
    pub listening: Option<u64>,
    pub transcript: String,
}

impl Default for VoiceView {
    fn default() -> Self {
        Self {
            listening: None,
            transcript: VOICE_IDLE_PROMPT.to_string(),
        }
    }
}

impl VoiceView {
    pub fn has_transcript(&self) -> bool {
        self.listening.is_none() && self.transcript != VOICE_IDLE_PROMPT
    }
}

/// The current screen together with its screen-local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Login,
    Home(HomeView),
    DiseaseDetection(DiagnosisView),
    MarketPrices,
    CropAdvisory(AdvisoryView),
    GovtSchemes,
    Analytics,
    VoiceAssistant(VoiceView),
    Settings,
    Insurance,
}

impl View {
    pub fn fresh(screen: Screen) -> Self {
        match screen {
            Screen::Login => Self::Login,
            Screen::Home => Self::Home(HomeView::default()),
            Screen::DiseaseDetection => Self::DiseaseDetection(DiagnosisView::default()),
            Screen::MarketPrices => Self::MarketPrices,
            Screen::CropAdvisory => Self::CropAdvisory(AdvisoryView::default()),
            Screen::GovtSchemes => Self::GovtSchemes,
            Screen::Analytics => Self::Analytics,
            Screen::VoiceAssistant => Self::VoiceAssistant(VoiceView::default()),
            Screen::Settings => Self::Settings,
            Screen::Insurance => Self::Insurance,
        }
    }

    pub fn screen(&self) -> Screen {
        match self {
            Self::Login => Screen::Login,
            Self::Home(_) => Screen::Home,
            Self::DiseaseDetection(_) => Screen::DiseaseDetection,
            Self::MarketPrices => Screen::MarketPrices,
            Self::CropAdvisory(_) => Screen::CropAdvisory,
            Self::GovtSchemes => Screen::GovtSchemes,
            Self::Analytics => Screen::Analytics,
            Self::VoiceAssistant(_) => Screen::VoiceAssistant,
            Self::Settings => Screen::Settings,
            Self::Insurance => Screen::Insurance,
        }
    }
}

/// Identifies the view instance an async operation was started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub screen: Screen,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub view: View,
    pub view_generation: u64,
    pub session: Option<Session>,
    pub theme: Theme,
    generation: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl AppState {
    pub fn new(theme: Theme) -> Self {
        Self {
            view: View::Login,
            view_generation: 0,
            session: None,
            theme,
            generation: 0,
        }
    }

    pub fn screen(&self) -> Screen {
        self.view.screen()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn language(&self) -> Language {
        self.session
            .as_ref()
            .map(|session| session.profile.language)
            .unwrap_or_default()
    }

    pub fn shows_bottom_nav(&self) -> bool {
        self.is_authenticated() && self.screen().shows_bottom_nav()
    }

    pub fn view_ticket(&self) -> Ticket {
        Ticket {
            screen: self.screen(),
            generation: self.view_generation,
        }
    }

    fn next_generation(&mut self) -> u64 {
        self.generation = self.generation.saturating_add(1);
        self.generation
    }

    fn enter(&mut self, screen: Screen) {
        self.view = View::fresh(screen);
        self.view_generation = self.next_generation();
    }
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    Login(Session),
    Navigate(Screen),
    GoBack,
    Logout,
    ToggleTheme,
    ImageSelected(ImagePayload),
    DiagnosisRequested,
    DiagnosisCompleted { ticket: Ticket, text: String },
    AdvisoryRequested { question: String },
    AdvisoryCompleted { ticket: Ticket, text: String },
    ChatOpened,
    ChatClosed,
    ChatSubmitted { text: String },
    ChatReplied { ticket: Ticket, text: String },
    MicrophoneToggled,
    TranscriptReady { ticket: Ticket },
}

impl AppEvent {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Login(_) => "login",
            Self::Navigate(_) => "navigate",
            Self::GoBack => "go_back",
            Self::Logout => "logout",
            Self::ToggleTheme => "toggle_theme",
            Self::ImageSelected(_) => "image_selected",
            Self::DiagnosisRequested => "diagnosis_requested",
            Self::DiagnosisCompleted { .. } => "diagnosis_completed",
            Self::AdvisoryRequested { .. } => "advisory_requested",
            Self::AdvisoryCompleted { .. } => "advisory_completed",
            Self::ChatOpened => "chat_opened",
            Self::ChatClosed => "chat_closed",
            Self::ChatSubmitted { .. } => "chat_submitted",
            Self::ChatReplied { .. } => "chat_replied",
            Self::MicrophoneToggled => "microphone_toggled",
            Self::TranscriptReady { .. } => "transcript_ready",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("{0} requires a signed-in session")]
    SessionRequired(Screen),
    #[error("action requires the {expected} screen but {current} is shown")]
    NotOnScreen { expected: Screen, current: Screen },
    #[error("no image has been selected")]
    NoImageSelected,
    #[error("a request from this screen is already in flight")]
    RequestInFlight,
    #[error("input is empty")]
    EmptyInput,
    #[error("the chat panel is not open")]
    ChatClosed,
    #[error("result for {} (generation {}) is stale", .0.screen, .0.generation)]
    StaleResult(Ticket),
}

pub fn reduce(state: &AppState, event: AppEvent) -> Result<AppState, TransitionError> {
    let mut next = state.clone();
    apply(&mut next, event)?;
    Ok(next)
}

fn apply(state: &mut AppState, event: AppEvent) -> Result<(), TransitionError> {
    match event {
        AppEvent::Login(session) => {
            sign_in(state, session);
            Ok(())
        }
        AppEvent::Navigate(target) => navigate_to(state, target),
        AppEvent::GoBack => navigate_to(state, Screen::Home),
        AppEvent::Logout => {
            sign_out(state);
            Ok(())
        }
        AppEvent::ToggleTheme => {
            state.theme = state.theme.toggled();
            Ok(())
        }
        AppEvent::ImageSelected(image) => {
            let view = diagnosis_view(state)?;
            if view.analyzing {
                return Err(TransitionError::RequestInFlight);
            }
            view.image = Some(image);
            view.result = None;
            Ok(())
        }
        AppEvent::DiagnosisRequested => {
            let view = diagnosis_view(state)?;
            if view.image.is_none() {
                return Err(TransitionError::NoImageSelected);
            }
            if view.analyzing {
                return Err(TransitionError::RequestInFlight);
            }
            view.analyzing = true;
            view.result = None;
            Ok(())
        }
        AppEvent::DiagnosisCompleted { ticket, text } => {
            ensure_view_ticket(state, ticket)?;
            let view = diagnosis_view(state)?;
            view.analyzing = false;
            view.result = Some(text);
            Ok(())
        }
        AppEvent::AdvisoryRequested { question } => {
            let question = non_empty(&question)?;
            let view = advisory_view(state)?;
            if view.loading {
                return Err(TransitionError::RequestInFlight);
            }
            view.question = Some(question);
            view.loading = true;
            Ok(())
        }
        AppEvent::AdvisoryCompleted { ticket, text } => {
            ensure_view_ticket(state, ticket)?;
            let view = advisory_view(state)?;
            view.loading = false;
            view.answer = Some(text);
            Ok(())
        }
        AppEvent::ChatOpened => {
            let generation = state.next_generation();
            let view = home_view(state)?;
            if view.chat.is_none() {
                view.chat = Some(ChatPanel::open(generation));
            }
            Ok(())
        }
        AppEvent::ChatClosed => {
            home_view(state)?.chat = None;
            Ok(())
        }
        AppEvent::ChatSubmitted { text } => {
            let text = non_empty(&text)?;
            let panel = chat_panel(state)?;
            if panel.loading {
                return Err(TransitionError::RequestInFlight);
            }
            panel.transcript.push(ChatMessage::user(text));
            panel.loading = true;
            Ok(())
        }
        AppEvent::ChatReplied { ticket, text } => {
            let panel = chat_panel(state).map_err(|_| TransitionError::StaleResult(ticket))?;
            if ticket.screen != Screen::Home || panel.generation != ticket.generation {
                return Err(TransitionError::StaleResult(ticket));
            }
            panel.transcript.push(ChatMessage::bot(text));
            panel.loading = false;
            Ok(())
        }
        AppEvent::MicrophoneToggled => {
            let generation = state.next_generation();
            let view = voice_view(state)?;
            if view.listening.is_some() {
                *view = VoiceView::default();
            } else {
                view.listening = Some(generation);
                view.transcript = VOICE_LISTENING.to_string();
            }
            Ok(())
        }
        AppEvent::TranscriptReady { ticket } => {
            let view = voice_view(state).map_err(|_| TransitionError::StaleResult(ticket))?;
            if ticket.screen != Screen::VoiceAssistant || view.listening != Some(ticket.generation)
            {
                return Err(TransitionError::StaleResult(ticket));
            }
            view.listening = None;
            view.transcript = VOICE_SAMPLE_TRANSCRIPT.to_string();
            Ok(())
        }
    }
}

fn sign_in(state: &mut AppState, session: Session) {
    state.session = Some(session);
    state.enter(Screen::Home);
}

fn sign_out(state: &mut AppState) {
    state.session = None;
    if state.screen() != Screen::Login {
        state.enter(Screen::Login);
    }
}

fn navigate_to(state: &mut AppState, target: Screen) -> Result<(), TransitionError> {
    if target == Screen::Login {
        // Login is only ever reached by ending the session.
        sign_out(state);
        return Ok(());
    }
    if state.session.is_none() {
        return Err(TransitionError::SessionRequired(target));
    }
    if state.screen() != target {
        state.enter(target);
    }
    Ok(())
}

fn ensure_view_ticket(state: &AppState, ticket: Ticket) -> Result<(), TransitionError> {
    if state.view_ticket() == ticket {
        Ok(())
    } else {
        Err(TransitionError::StaleResult(ticket))
    }
}

fn non_empty(text: &str) -> Result<String, TransitionError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(TransitionError::EmptyInput)
    } else {
        Ok(trimmed.to_string())
    }
}

fn wrong_screen(expected: Screen, state: &AppState) -> TransitionError {
    TransitionError::NotOnScreen {
        expected,
        current: state.screen(),
    }
}

fn home_view(state: &mut AppState) -> Result<&mut HomeView, TransitionError> {
    let err = wrong_screen(Screen::Home, state);
    match &mut state.view {
        View::Home(view) => Ok(view),
        _ => Err(err),
    }
}

fn chat_panel(state: &mut AppState) -> Result<&mut ChatPanel, TransitionError> {
    home_view(state)?
        .chat
        .as_mut()
        .ok_or(TransitionError::ChatClosed)
}

fn diagnosis_view(state: &mut AppState) -> Result<&mut DiagnosisView, TransitionError> {
    let err = wrong_screen(Screen::DiseaseDetection, state);
    match &mut state.view {
        View::DiseaseDetection(view) => Ok(view),
        _ => Err(err),
    }
}

fn advisory_view(state: &mut AppState) -> Result<&mut AdvisoryView, TransitionError> {
    let err = wrong_screen(Screen::CropAdvisory, state);
    match &mut state.view {
        View::CropAdvisory(view) => Ok(view),
        _ => Err(err),
    }
}

fn voice_view(state: &mut AppState) -> Result<&mut VoiceView, TransitionError> {
    let err = wrong_screen(Screen::VoiceAssistant, state);
    match &mut state.view {
        View::VoiceAssistant(view) => Ok(view),
        _ => Err(err),
    }
}

/// Owns the live [`AppState`] and applies events to it.
#[derive(Debug, Default)]
pub struct Navigator {
    state: AppState,
}

impl Navigator {
    pub fn new(theme: Theme) -> Self {
        Self {
            state: AppState::new(theme),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn current_screen(&self) -> Screen {
        self.state.screen()
    }

    pub fn session(&self) -> Option<&Session> {
        self.state.session.as_ref()
    }

    pub fn dispatch(&mut self, event: AppEvent) -> Result<&AppState, TransitionError> {
        let label = event.label();
        let from = self.state.screen();
        match reduce(&self.state, event) {
            Ok(next) => {
                self.state = next;
                debug!(
                    event = label,
                    from = %from,
                    to = %self.state.screen(),
                    generation = self.state.view_generation,
                    "transition applied"
                );
                Ok(&self.state)
            }
            Err(err) => {
                debug!(event = label, screen = %from, error = %err, "transition rejected");
                Err(err)
            }
        }
    }

    pub fn login(&mut self, profile: UserProfile) -> Uuid {
        let session = Session::start(profile);
        let session_id = session.session_id;
        info!(
            session_id = %session_id,
            language = %session.profile.language,
            "session started"
        );
        sign_in(&mut self.state, session);
        session_id
    }

    pub fn navigate(&mut self, target: Screen) -> Result<Screen, TransitionError> {
        self.dispatch(AppEvent::Navigate(target))
            .map(AppState::screen)
    }

    pub fn go_back(&mut self) -> Result<Screen, TransitionError> {
        self.dispatch(AppEvent::GoBack).map(AppState::screen)
    }

    pub fn logout(&mut self) {
        if let Some(session) = self.state.session.as_ref() {
            info!(session_id = %session.session_id, "session ended");
        }
        sign_out(&mut self.state);
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.state.theme = self.state.theme.toggled();
        self.state.theme
    }

    pub fn select_image(&mut self, image: ImagePayload) -> Result<(), TransitionError> {
        self.dispatch(AppEvent::ImageSelected(image)).map(|_| ())
    }

    /// Marks the diagnosis as in flight and returns what the caller must send.
    pub fn request_diagnosis(&mut self) -> Result<(Ticket, ImagePayload), TransitionError> {
        let state = self.dispatch(AppEvent::DiagnosisRequested)?;
        let ticket = state.view_ticket();
        match &state.view {
            View::DiseaseDetection(DiagnosisView {
                image: Some(image), ..
            }) => Ok((ticket, image.clone())),
            _ => Err(TransitionError::NoImageSelected),
        }
    }

    pub fn request_advice(
        &mut self,
        question: &str,
    ) -> Result<(Ticket, String, Language), TransitionError> {
        let state = self.dispatch(AppEvent::AdvisoryRequested {
            question: question.to_string(),
        })?;
        let question = match &state.view {
            View::CropAdvisory(view) => view.question.clone().unwrap_or_default(),
            _ => String::new(),
        };
        Ok((state.view_ticket(), question, state.language()))
    }

    pub fn open_chat(&mut self) -> Result<(), TransitionError> {
        self.dispatch(AppEvent::ChatOpened).map(|_| ())
    }

    pub fn close_chat(&mut self) -> Result<(), TransitionError> {
        self.dispatch(AppEvent::ChatClosed).map(|_| ())
    }

    pub fn submit_chat(
        &mut self,
        text: &str,
    ) -> Result<(Ticket, String, Language), TransitionError> {
        let state = self.dispatch(AppEvent::ChatSubmitted {
            text: text.to_string(),
        })?;
        let language = state.language();
        match &state.view {
            View::Home(HomeView { chat: Some(panel) }) => {
                let ticket = Ticket {
                    screen: Screen::Home,
                    generation: panel.generation,
                };
                let text = panel
                    .transcript
                    .last()
                    .map(|message| message.text.clone())
                    .unwrap_or_default();
                Ok((ticket, text, language))
            }
            _ => Err(TransitionError::ChatClosed),
        }
    }

    /// Returns the capture ticket when the microphone was switched on.
    pub fn toggle_microphone(&mut self) -> Result<Option<Ticket>, TransitionError> {
        let state = self.dispatch(AppEvent::MicrophoneToggled)?;
        match &state.view {
            View::VoiceAssistant(VoiceView {
                listening: Some(generation),
                ..
            }) => Ok(Some(Ticket {
                screen: Screen::VoiceAssistant,
                generation: *generation,
            })),
            _ => Ok(None),
        }
    }
}
