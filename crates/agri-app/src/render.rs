use agri_core::chat::ChatPanel;
use agri_core::fixtures::{Fixtures, WeatherSnapshot};
use agri_core::models::{ChatRole, Language, Session};
use agri_core::navigation::{AdvisoryView, AppState, DiagnosisView, HomeView, View, VoiceView};
use agri_core::screen::Screen;

const BAR_WIDTH: u32 = 30;
const VOICE_SAMPLE_RESPONSE: &str = "To increase tomato yield, ensure soil pH is between 6.0-6.8. \
     Apply NPK fertilizer in split doses. Prune the bottom leaves.";

pub fn render(state: &AppState, fixtures: &Fixtures) -> String {
    let mut lines = vec![header(state)];

    match &state.view {
        View::Login => login(&mut lines),
        View::Home(view) => home(
            &mut lines,
            state.session.as_ref(),
            view,
            &fixtures.dashboard.weather,
        ),
        View::DiseaseDetection(view) => diagnosis(&mut lines, view),
        View::MarketPrices => market(&mut lines, fixtures),
        View::CropAdvisory(view) => advisory(&mut lines, view),
        View::GovtSchemes => schemes(&mut lines, fixtures),
        View::Analytics => analytics(&mut lines, fixtures),
        View::VoiceAssistant(view) => voice(&mut lines, view),
        View::Settings => settings(&mut lines, state),
        View::Insurance => lines.push("Coming Soon".to_string()),
    }

    if state.shows_bottom_nav() {
        lines.push(String::new());
        lines.push(bottom_nav(state.screen()));
    }

    lines.join("\n")
}

fn header(state: &AppState) -> String {
    let screen = state.screen();
    let theme = if state.theme.is_dark() { "dark" } else { "light" };
    let back = if screen.requires_session() && !screen.shows_bottom_nav() {
        "  (`back` for Home)"
    } else {
        ""
    };
    format!("== {} == [{theme}]{back}", screen.title())
}

fn login(lines: &mut Vec<String>) {
    lines.push("Welcome to AgriSmart, your smart farming companion.".to_string());
    let languages = Language::ALL
        .iter()
        .map(|language| format!("{} ({})", language.native_name(), language.code()))
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(format!("Languages: {languages}"));
    lines.push("Sign in with: login name=<name> lang=<code> location=<place>".to_string());
}

fn home(
    lines: &mut Vec<String>,
    session: Option<&Session>,
    view: &HomeView,
    weather: &WeatherSnapshot,
) {
    if let Some(session) = session {
        let first_name = session
            .profile
            .name
            .split_whitespace()
            .next()
            .unwrap_or_default();
        lines.push(format!("Hello, {first_name}!"));
        lines.push(format!("Weather in {}", session.region()));
    }
    lines.push(format!(
        "  {}° {}  |  soil {} C  humidity {}%  wind {} m/s  rain {} mm",
        weather.temperature_c,
        weather.condition,
        weather.soil_temperature_c,
        weather.humidity_percent,
        weather.wind_speed_mps,
        weather.precipitation_mm
    ));
    lines.push(format!(
        "  sunrise {}  sunset {}",
        weather.sunrise, weather.sunset
    ));
    lines.push("Services:".to_string());
    for screen in [
        Screen::DiseaseDetection,
        Screen::MarketPrices,
        Screen::CropAdvisory,
        Screen::GovtSchemes,
        Screen::Insurance,
    ] {
        lines.push(format!("  go {:<18} {}", screen.as_str(), screen.title()));
    }

    match &view.chat {
        Some(panel) => chat(lines, panel),
        None => lines.push("Chat with the assistant: chat open".to_string()),
    }
}

fn chat(lines: &mut Vec<String>, panel: &ChatPanel) {
    lines.push("-- Chat --".to_string());
    for message in panel.transcript.iter() {
        let speaker = match message.role {
            ChatRole::User => "you",
            ChatRole::Bot => "bot",
        };
        lines.push(format!("  {speaker}: {}", message.text));
    }
    if panel.loading {
        lines.push("  bot is typing...".to_string());
    }
}

fn diagnosis(lines: &mut Vec<String>, view: &DiagnosisView) {
    match &view.image {
        Some(image) => lines.push(format!(
            "Selected image: {} ({} bytes)",
            image.mime_type(),
            image.len()
        )),
        None => lines.push("No Image Selected. Use: image <path|data-uri>".to_string()),
    }

    if view.analyzing {
        lines.push("Analyzing...".to_string());
    } else if let Some(result) = &view.result {
        lines.push("Diagnosis Result:".to_string());
        lines.push(result.clone());
    } else if view.image.is_some() {
        lines.push("Run: analyze".to_string());
    }
}

fn market(lines: &mut Vec<String>, fixtures: &Fixtures) {
    for item in &fixtures.market_prices {
        lines.push(format!(
            "  {:<16} ₹{:>6} / {:<8} {}",
            item.name,
            item.price,
            item.unit,
            item.trend.arrow()
        ));
    }
}

fn advisory(lines: &mut Vec<String>, view: &AdvisoryView) {
    if let Some(question) = &view.question {
        lines.push(format!("Q: {question}"));
    }
    if view.loading {
        lines.push("Thinking...".to_string());
    } else if let Some(answer) = &view.answer {
        lines.push(answer.clone());
    } else {
        lines.push("Ask anything: ask <question>".to_string());
    }
}

fn schemes(lines: &mut Vec<String>, fixtures: &Fixtures) {
    for scheme in &fixtures.schemes {
        lines.push(format!("* {}", scheme.title));
        lines.push(format!("  {}", scheme.description));
        lines.push(format!("  Eligibility: {}", scheme.eligibility));
    }
}

fn analytics(lines: &mut Vec<String>, fixtures: &Fixtures) {
    let dashboard = &fixtures.dashboard;

    lines.push("Market price trend (wheat / rice)".to_string());
    let peak = dashboard
        .price_trend
        .iter()
        .flat_map(|point| [point.wheat, point.rice])
        .max()
        .unwrap_or(0);
    for point in &dashboard.price_trend {
        lines.push(format!(
            "  {:<4} W {:<width$} {}",
            point.label,
            bar(point.wheat, peak),
            point.wheat,
            width = BAR_WIDTH as usize
        ));
        lines.push(format!(
            "  {:<4} R {:<width$} {}",
            "",
            bar(point.rice, peak),
            point.rice,
            width = BAR_WIDTH as usize
        ));
    }

    lines.push("Yield history (quintals/acre)".to_string());
    let peak = dashboard
        .yield_history
        .iter()
        .map(|point| point.quintals_per_acre)
        .max()
        .unwrap_or(0);
    for point in &dashboard.yield_history {
        lines.push(format!(
            "  {:<4} {:<width$} {}",
            point.label,
            bar(point.quintals_per_acre, peak),
            point.quintals_per_acre,
            width = BAR_WIDTH as usize
        ));
    }
}

fn bar(value: u32, peak: u32) -> String {
    if peak == 0 {
        return String::new();
    }
    let filled = u64::from(value) * u64::from(BAR_WIDTH) / u64::from(peak);
    "#".repeat(filled as usize)
}

fn voice(lines: &mut Vec<String>, view: &VoiceView) {
    let mic = if view.listening.is_some() { "on" } else { "off" };
    lines.push(format!("Microphone: {mic} (toggle with `mic`)"));
    if view.has_transcript() {
        lines.push(format!("\"{}\"", view.transcript));
        lines.push(format!("AI Response: {VOICE_SAMPLE_RESPONSE}"));
    } else {
        lines.push(view.transcript.clone());
    }
}

fn settings(lines: &mut Vec<String>, state: &AppState) {
    if let Some(session) = &state.session {
        lines.push(format!("Name:     {}", session.profile.name));
        lines.push(format!(
            "Language: {} ({})",
            session.profile.language.native_name(),
            session.profile.language.code()
        ));
        lines.push(format!("Location: {}", session.profile.location));
    }
    let mode = if state.theme.is_dark() { "on" } else { "off" };
    lines.push(format!("Dark mode: {mode} (toggle with `theme`)"));
    lines.push("Sign out with: logout".to_string());
}

fn bottom_nav(current: Screen) -> String {
    Screen::MAIN
        .iter()
        .map(|screen| {
            if *screen == current {
                format!("[{}]", screen.title())
            } else {
                screen.title().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}
