use crate::args::LogArgs;
use crate::commands::{describe, Out};
use crate::model::Transaction;
use crate::session::Session;
use crate::Result;

/// Logs a new transaction. Amount validation has already happened while parsing `args`.
pub async fn log(session: &mut Session, args: &LogArgs) -> Result<Out<Transaction>> {
    let transaction = session
        .add_transaction(
            args.amount(),
            args.label().map(str::to_string),
            args.pre_approved(),
        )
        .await;
    let message = if transaction.is_pre_approved() {
        format!(
            "Logged pre-approved {}, it can be categorized in 24 hours",
            describe(&transaction)
        )
    } else {
        format!("Logged {}, it needs approval", describe(&transaction))
    };
    Ok(Out::new(message, transaction))
}
