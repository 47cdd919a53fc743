//! # Access Control
//!
//! The two static tables built from configuration at startup:
//! the authorization table (sender -> permitted commands) and
//! the command registry (command -> webhook URL).
//! Both are read-only once built.

use std::collections::{HashMap, HashSet};

use crate::domain::config::AppConfig;

#[derive(Debug, Default, Clone)]
pub struct AuthorizationTable {
    entries: HashMap<String, HashSet<String>>,
}

impl AuthorizationTable {
    pub fn permitted_commands(&self, sender: &str) -> Option<&HashSet<String>> {
        self.entries.get(sender)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Default, Clone)]
pub struct CommandRegistry {
    webhooks: HashMap<String, String>,
}

impl CommandRegistry {
    pub fn webhook_for(&self, command: &str) -> Option<&str> {
        self.webhooks.get(command).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.webhooks.len()
    }
}

/// Builds both tables. Pure function of the configuration.
pub fn build(config: &AppConfig) -> (AuthorizationTable, CommandRegistry) {
    let entries = config
        .users
        .iter()
        .map(|(sender, commands)| (sender.clone(), commands.names().into_iter().collect()))
        .collect();

    let webhooks = config
        .webhooks
        .iter()
        .map(|(command, url)| (command.clone(), url.clone()))
        .collect();

    (AuthorizationTable { entries }, CommandRegistry { webhooks })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn tables(
        users: &[(&str, &[&str])],
        hooks: &[(&str, &str)],
    ) -> (AuthorizationTable, CommandRegistry) {
        let entries = users
            .iter()
            .map(|(sender, cmds)| {
                (
                    sender.to_string(),
                    cmds.iter().map(|c| c.to_string()).collect(),
                )
            })
            .collect();
        let webhooks = hooks
            .iter()
            .map(|(c, u)| (c.to_string(), u.to_string()))
            .collect();
        (AuthorizationTable { entries }, CommandRegistry { webhooks })
    }

    fn is_permitted(auth: &AuthorizationTable, sender: &str, command: &str) -> bool {
        auth.permitted_commands(sender)
            .is_some_and(|commands| commands.contains(command))
    }

    #[test]
    fn test_build_from_config() {
        let config = AppConfig::parse(
            r#"
matrix:
  server_url: https://matrix.example.org
  room_id: "!legacy:example.org"
  token: abc
users:
  "@alice:example.org": "deploy,restart"
webhooks:
  deploy: http://hooks.local/deploy
  restart: http://hooks.local/restart
  unused: http://hooks.local/unused
"#,
        )
        .unwrap();

        let (auth, registry) = build(&config);
        assert_eq!(auth.len(), 1);
        assert_eq!(registry.len(), 3);
        assert!(is_permitted(&auth, "@alice:example.org", "deploy"));
        assert!(is_permitted(&auth, "@alice:example.org", "restart"));
        assert!(!is_permitted(&auth, "@alice:example.org", "unused"));
        assert_eq!(
            registry.webhook_for("deploy"),
            Some("http://hooks.local/deploy")
        );
        assert_eq!(registry.webhook_for("missing"), None);
    }

    #[test]
    fn test_lookups_are_case_sensitive() {
        let (auth, registry) = tables(
            &[("@alice:example.org", &["deploy"])],
            &[("deploy", "http://hooks.local/deploy")],
        );
        assert!(!is_permitted(&auth, "@Alice:example.org", "deploy"));
        assert!(!is_permitted(&auth, "@alice:example.org", "Deploy"));
        assert!(auth.permitted_commands("@bob:example.org").is_none());
        assert_eq!(registry.webhook_for("DEPLOY"), None);
    }
}
