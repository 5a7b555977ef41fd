//! User account command handlers.

use tabled::Tabled;

use lxgate_core::{Monitor, UserAccount};

use crate::cli::{GlobalOpts, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Role")]
    role: String,
}

impl From<&UserAccount> for UserRow {
    fn from(user: &UserAccount) -> Self {
        Self {
            username: user.username.clone(),
            role: user.role.clone().unwrap_or_else(|| "-".into()),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(monitor: &Monitor, args: UsersArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = monitor.config().clone();

    match args.command {
        UsersCommand::List => {
            let users = Monitor::oneshot(config, |m| async move {
                let client = m.api().await?;
                Ok(client.list_users().await?)
            })
            .await?;

            let out = output::render_list(
                &global.output,
                &users,
                |u| UserRow::from(u),
                |u| u.username.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Add { username, role } => {
            let account = UserAccount {
                username: username.clone(),
                role: Some(role),
            };

            Monitor::oneshot(config, move |m| async move {
                let client = m.api().await?;
                client.create_user(&account).await?;
                Ok(())
            })
            .await?;

            if !global.quiet {
                eprintln!("User '{username}' created");
            }
            Ok(())
        }

        UsersCommand::Remove { username } => {
            if !util::confirm(&format!("Delete user '{username}'?"), global.yes)? {
                return Ok(());
            }

            let name = username.clone();
            Monitor::oneshot(config, move |m| async move {
                let client = m.api().await?;
                client.delete_user(&name).await?;
                Ok(())
            })
            .await?;

            if !global.quiet {
                eprintln!("User '{username}' deleted");
            }
            Ok(())
        }
    }
}
