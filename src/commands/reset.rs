use crate::commands::Out;
use crate::session::Session;
use crate::Result;
use std::path::PathBuf;

/// Deletes every pending transaction, zeroes the four totals and forgets the dark-mode setting.
/// Nothing happens unless `confirmed` is true.
///
/// When the session has a backup location, the ledger is saved there first and the backup path is
/// returned as the structured output.
pub async fn reset(session: &mut Session, confirmed: bool) -> Result<Out<Option<PathBuf>>> {
    if !confirmed {
        return Ok(format!(
            "Nothing was reset. Re-run with --yes to delete {} pending transaction(s) and zero \
            a total of {}",
            session.ledger().transactions().len(),
            session.ledger().counters().total()
        )
        .into());
    }
    let backup = session.reset_all().await;
    let message = match &backup {
        Some(path) => format!(
            "Everything was reset. The previous data was saved to {}",
            path.display()
        ),
        None => String::from("Everything was reset"),
    };
    Ok(Out::new(message, backup))
}
