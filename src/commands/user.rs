// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! User administration

use super::{finish_operation, href_of, list_resources, lookup, set_opt, Console, ListArgs};
use crate::fields::require_text;
use crate::types::{User, USERS_ENDPOINT};
use anyhow::{bail, Context, Result};
use serde_json::{json, Map, Value};

/// Arguments for user commands
#[derive(Debug, Clone, Default, clap::Args)]
pub struct UserArgs {
    /// Password for the new account
    #[arg(long)]
    pub user_password: Option<String>,

    /// Email address
    #[arg(long)]
    pub email: Option<String>,

    /// Given name
    #[arg(long)]
    pub first_name: Option<String>,

    /// Family name
    #[arg(long)]
    pub last_name: Option<String>,

    /// Grant staff access
    #[arg(long)]
    pub staff: Option<bool>,

    /// Enable or disable the account
    #[arg(long)]
    pub active: Option<bool>,
}

/// Run user command
pub async fn run(
    console: &Console,
    action: &str,
    username: Option<String>,
    args: UserArgs,
    list: ListArgs,
) -> Result<()> {
    match action {
        "list" | "ls" => {
            let source = console.client.page_source::<User>(USERS_ENDPOINT);
            list_resources(console, source, "users", &list).await
        }
        "show" => {
            let username = username.ok_or_else(|| anyhow::anyhow!("Username is required"))?;
            let user = lookup(console, USERS_ENDPOINT, "username", &username).await?;
            console.output.print_detail(&user)
        }
        "create" | "new" => {
            let username =
                require_text("username", username.as_deref().unwrap_or_default())?.to_string();
            let mut body = payload(args)?;
            body.insert("username".into(), json!(username));

            let created: Value = console
                .client
                .post(USERS_ENDPOINT, &body)
                .await
                .with_context(|| format!("Failed to create user {username}"))?;
            finish_operation(console, Some(created), &format!("Created user: {username}")).await
        }
        "update" | "edit" => {
            let username = username.ok_or_else(|| anyhow::anyhow!("Username is required"))?;
            let body = payload(args)?;
            if body.is_empty() {
                bail!("Nothing to update. Pass --email, --first-name, --last-name, --staff, --active or --user-password");
            }
            let href = href_of(&lookup(console, USERS_ENDPOINT, "username", &username).await?)?;
            let response: Value = console
                .client
                .patch(&href, &body)
                .await
                .with_context(|| format!("Failed to update user {username}"))?;
            finish_operation(console, Some(response), &format!("Updated user: {username}")).await
        }
        "delete" | "rm" => {
            let username = username.ok_or_else(|| anyhow::anyhow!("Username is required"))?;
            let href = href_of(&lookup(console, USERS_ENDPOINT, "username", &username).await?)?;
            console
                .client
                .delete(&href)
                .await
                .with_context(|| format!("Failed to delete user {username}"))?;
            println!("Deleted user: {username}");
            Ok(())
        }
        _ => bail!(
            "Unknown action: {}. Use list, show, create, update, or delete",
            action
        ),
    }
}

fn payload(args: UserArgs) -> Result<Map<String, Value>> {
    let mut payload = Map::new();
    if let Some(password) = &args.user_password {
        payload.insert("password".into(), json!(require_text("password", password)?));
    }
    set_opt(&mut payload, "email", args.email)?;
    set_opt(&mut payload, "first_name", args.first_name)?;
    set_opt(&mut payload, "last_name", args.last_name)?;
    set_opt(&mut payload, "is_staff", args.staff)?;
    set_opt(&mut payload, "is_active", args.active)?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_maps_flags_to_fields() {
        let payload = payload(UserArgs {
            email: Some("ops@example.org".into()),
            staff: Some(true),
            ..UserArgs::default()
        })
        .unwrap();
        assert_eq!(
            Value::Object(payload),
            json!({"email": "ops@example.org", "is_staff": true})
        );
    }

    #[test]
    fn test_blank_password_is_rejected() {
        let err = payload(UserArgs {
            user_password: Some("   ".into()),
            ..UserArgs::default()
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "password is required");
    }
}
