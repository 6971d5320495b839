//! CLI entry point for Courier.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::workflow::DEFAULT_STAR_COUNT;

/// Courier: delegate tasks to a connector agent and follow up on email.
#[derive(Parser, Debug)]
#[command(name = "courier", version, about = "Courier task delegation CLI")]
pub struct Cli {
    /// Chat model to use (overrides COURIER_MODEL)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Talk to the orchestrating assistant
    Chat(ChatArgs),
    /// Delegate one instruction and follow up on any email address in the result
    Run(RunArgs),
    /// Run a JSON file of tasks in order
    Batch(BatchArgs),
    /// Star emails from a sender and list some of them
    Star(StarArgs),
    /// Find the last email from a sender
    Find(FindArgs),
    /// Reply to the last email from a sender
    Reply(ReplyArgs),
}

#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Wait for complete answers instead of streaming them
    #[arg(long)]
    pub no_stream: bool,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    pub instruction: String,
}

#[derive(Parser, Debug)]
pub struct BatchArgs {
    /// JSON array of {"id": .., "instruction": ..} objects
    pub file: PathBuf,
}

#[derive(Parser, Debug)]
pub struct StarArgs {
    pub address: String,

    /// How many starred emails to list
    #[arg(short, long, default_value_t = DEFAULT_STAR_COUNT)]
    pub count: u32,
}

#[derive(Parser, Debug)]
pub struct FindArgs {
    pub address: String,
}

#[derive(Parser, Debug)]
pub struct ReplyArgs {
    pub address: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_chat_defaults_to_streaming() {
        let cli = Cli::try_parse_from(["courier", "chat"]).unwrap();
        assert!(cli.model.is_none());
        match cli.command {
            Commands::Chat(args) => assert!(!args.no_stream),
            other => panic!("expected Chat, got {other:?}"),
        }
    }

    #[test]
    fn parse_chat_no_stream_with_model_after_subcommand() {
        let cli = Cli::try_parse_from(["courier", "chat", "--no-stream", "--model", "gpt-4o-mini"])
            .unwrap();
        assert_eq!(cli.model.as_deref(), Some("gpt-4o-mini"));
        match cli.command {
            Commands::Chat(args) => assert!(args.no_stream),
            other => panic!("expected Chat, got {other:?}"),
        }
    }

    #[test]
    fn parse_run_instruction() {
        let cli = Cli::try_parse_from(["courier", "run", "Star emails from x@y.com"]).unwrap();
        match cli.command {
            Commands::Run(args) => assert_eq!(args.instruction, "Star emails from x@y.com"),
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn parse_batch_file() {
        let cli = Cli::try_parse_from(["courier", "batch", "tasks.json"]).unwrap();
        match cli.command {
            Commands::Batch(args) => assert_eq!(args.file, PathBuf::from("tasks.json")),
            other => panic!("expected Batch, got {other:?}"),
        }
    }

    #[test]
    fn parse_star_count_default_and_override() {
        let cli = Cli::try_parse_from(["courier", "star", "moe@picaos.com"]).unwrap();
        match cli.command {
            Commands::Star(args) => {
                assert_eq!(args.address, "moe@picaos.com");
                assert_eq!(args.count, 5);
            }
            other => panic!("expected Star, got {other:?}"),
        }

        let cli = Cli::try_parse_from(["courier", "star", "moe@picaos.com", "-c", "2"]).unwrap();
        match cli.command {
            Commands::Star(args) => assert_eq!(args.count, 2),
            other => panic!("expected Star, got {other:?}"),
        }
    }

    #[test]
    fn parse_reply_requires_body() {
        assert!(Cli::try_parse_from(["courier", "reply", "moe@picaos.com"]).is_err());
        let cli = Cli::try_parse_from(["courier", "reply", "moe@picaos.com", "Thanks!"]).unwrap();
        match cli.command {
            Commands::Reply(args) => {
                assert_eq!(args.address, "moe@picaos.com");
                assert_eq!(args.body, "Thanks!");
            }
            other => panic!("expected Reply, got {other:?}"),
        }
    }

    #[test]
    fn parse_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["courier"]).is_err());
    }
}
