use anyhow::{Context, Result};
use postday_core::post::RepositoryMode;
use postday_infrastructure::AppContext;

pub fn whoami(context: &AppContext) {
    if context.repository.mode() == RepositoryMode::Local {
        println!("Local mode: no sign-in required");
        return;
    }

    match context.session.current_session() {
        Some(session) => match session.email {
            Some(email) => println!("Signed in as {} <{}>", session.user_id, email),
            None => println!("Signed in as {}", session.user_id),
        },
        None => println!("Not signed in"),
    }
}

pub async fn sign_out(context: &AppContext) -> Result<()> {
    if let Err(err) = context.session.sign_out().await {
        let message = err
            .auth_failure_kind()
            .map(|kind| kind.user_message().to_string())
            .unwrap_or_else(|| err.to_string());
        tracing::warn!(error = %err, "sign-out failed");
        return Err(err).context(message);
    }
    println!("Signed out");
    Ok(())
}
