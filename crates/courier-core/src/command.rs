//! Command and result types flowing through the broker.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a submitted command.
///
/// Generated once at submit time and never reused for the lifetime
/// of the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(pub String);

impl CommandId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for CommandId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A primitive command argument.
///
/// Agents receive arguments exactly as submitted; only scalar shapes
/// are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandArg {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("command body must not be empty")]
    EmptyBody,

    #[error("threads must be at least 1")]
    ZeroThreads,
}

/// What a submitter asks to run. Validated before it becomes a [`Command`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSpec {
    /// The command text to execute.
    pub body: String,

    /// Optional destination name (e.g. which host the agent should act on).
    pub target: Option<String>,

    /// Execution-width hint, at least 1.
    pub threads: u32,

    /// Ordered scalar arguments.
    pub args: Vec<CommandArg>,
}

impl CommandSpec {
    /// Create a spec with default threads (1) and no target or args.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            target: None,
            threads: 1,
            args: Vec::new(),
        }
    }

    /// Check the submission rules: non-empty body, threads >= 1.
    pub fn validate(&self) -> Result<(), SubmitError> {
        if self.body.trim().is_empty() {
            return Err(SubmitError::EmptyBody);
        }
        if self.threads == 0 {
            return Err(SubmitError::ZeroThreads);
        }
        Ok(())
    }
}

/// A queued command, immutable once enqueued.
///
/// Serialized field names match what agents expect on the wire:
/// `command` for the body and `server_name` for the optional target,
/// with the target omitted entirely when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub id: CommandId,

    #[serde(rename = "command")]
    pub body: String,

    #[serde(rename = "server_name", skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    pub threads: u32,

    pub args: Vec<CommandArg>,
}

impl Command {
    /// Build a command from a validated spec with a fresh id.
    pub fn from_spec(spec: CommandSpec) -> Self {
        Self {
            id: CommandId::new(),
            body: spec.body,
            target: spec.target,
            threads: spec.threads,
            args: spec.args,
        }
    }
}

/// A posted result awaiting pickup by the submitter that issued the
/// matching command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    /// Result text.
    pub payload: String,

    /// Rendering hint: the payload is markup rather than plain text.
    pub is_markup: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    mod command_id {
        use super::*;

        #[test]
        fn new_generates_unique_ids() {
            let id1 = CommandId::new();
            let id2 = CommandId::new();
            assert_ne!(id1, id2);
        }

        #[test]
        fn display_shows_inner_string() {
            let id = CommandId("cmd-123".to_string());
            assert_eq!(format!("{}", id), "cmd-123");
        }

        #[test]
        fn serializes_as_bare_string() {
            let id = CommandId("abc".to_string());
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, "\"abc\"");
        }
    }

    mod command_arg {
        use super::*;

        #[test]
        fn deserializes_scalar_shapes() {
            let args: Vec<CommandArg> =
                serde_json::from_str(r#"["home", 8, 1.5, true]"#).unwrap();
            assert_eq!(
                args,
                vec![
                    CommandArg::Str("home".to_string()),
                    CommandArg::Int(8),
                    CommandArg::Float(1.5),
                    CommandArg::Bool(true),
                ]
            );
        }

        #[test]
        fn rejects_nested_shapes() {
            let parsed: Result<Vec<CommandArg>, _> = serde_json::from_str(r#"[["nested"]]"#);
            assert!(parsed.is_err());
        }
    }

    mod command_spec {
        use super::*;

        #[test]
        fn new_defaults() {
            let spec = CommandSpec::new("scan");
            assert_eq!(spec.body, "scan");
            assert_eq!(spec.threads, 1);
            assert!(spec.target.is_none());
            assert!(spec.args.is_empty());
        }

        #[test]
        fn validate_accepts_defaults() {
            assert!(CommandSpec::new("scan").validate().is_ok());
        }

        #[test]
        fn validate_rejects_empty_body() {
            assert_eq!(
                CommandSpec::new("").validate(),
                Err(SubmitError::EmptyBody)
            );
            assert_eq!(
                CommandSpec::new("   ").validate(),
                Err(SubmitError::EmptyBody)
            );
        }

        #[test]
        fn validate_rejects_zero_threads() {
            let mut spec = CommandSpec::new("scan");
            spec.threads = 0;
            assert_eq!(spec.validate(), Err(SubmitError::ZeroThreads));
        }
    }

    mod command {
        use super::*;

        #[test]
        fn from_spec_assigns_fresh_ids() {
            let c1 = Command::from_spec(CommandSpec::new("scan"));
            let c2 = Command::from_spec(CommandSpec::new("scan"));
            assert_ne!(c1.id, c2.id);
        }

        #[test]
        fn serializes_wire_field_names() {
            let mut spec = CommandSpec::new("hack");
            spec.target = Some("n00dles".to_string());
            spec.args = vec![CommandArg::Int(4)];
            let command = Command::from_spec(spec);

            let json = serde_json::to_value(&command).unwrap();
            assert_eq!(json["command"], "hack");
            assert_eq!(json["server_name"], "n00dles");
            assert_eq!(json["threads"], 1);
            assert_eq!(json["args"][0], 4);
        }

        #[test]
        fn omits_target_when_unset() {
            let command = Command::from_spec(CommandSpec::new("stats"));
            let json = serde_json::to_value(&command).unwrap();
            assert!(json.get("server_name").is_none());
        }
    }
}
