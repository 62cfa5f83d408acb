use crate::args::ThemeMode;
use crate::commands::Out;
use crate::model::Preferences;
use crate::session::Session;
use crate::Result;

/// Shows the dark-mode preference, or changes it when `mode` is given.
pub async fn theme(session: &mut Session, mode: Option<ThemeMode>) -> Result<Out<Preferences>> {
    let is_dark_mode = match mode {
        None => session.preferences().is_dark_mode,
        Some(ThemeMode::Dark) => session.set_dark_mode(true).await,
        Some(ThemeMode::Light) => session.set_dark_mode(false).await,
        Some(ThemeMode::Toggle) => session.toggle_dark_mode().await,
    };
    let name = if is_dark_mode { "dark" } else { "light" };
    let message = match mode {
        None => format!("The theme is {name}"),
        Some(_) => format!("The theme is now {name}"),
    };
    Ok(Out::new(message, *session.preferences()))
}
