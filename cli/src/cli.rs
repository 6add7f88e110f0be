//! # CLI Interface
//!
//! Command-line structure for `factom-cli`, built with `clap` derive.
//! Offline subcommands (`chain-id`, `compose-*`, `generate-address`) never
//! touch the network; the others talk to the node at `--url`.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::logging::LogFormat;

/// Compose and submit Factom entries and chains.
#[derive(Parser, Debug)]
#[command(
    name = "factom-cli",
    about = "Compose and submit Factom entries and chains",
    version,
    propagate_version = true
)]
pub struct FactomCli {
    /// Base URL of the factomd node; `/v2` is appended for JSON-RPC.
    #[arg(
        long,
        global = true,
        env = "FACTOMD_URL",
        default_value = "http://localhost:8088"
    )]
    pub url: String,

    /// Log output format: pretty or json.
    #[arg(long, global = true, env = "FACTOM_LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the chain id derived from a list of external ids.
    ChainId(ChainIdArgs),
    /// Print the commit and reveal of an entry without sending them.
    ComposeEntry(EntryArgs),
    /// Print the commit and reveal of a new chain without sending them.
    ComposeChain(ChainArgs),
    /// Commit and reveal an entry.
    AddEntry(SubmitEntryArgs),
    /// Commit and reveal a new chain.
    AddChain(SubmitChainArgs),
    /// Print the current Entry Credit rate (factoshis per EC).
    EcRate,
    /// Generate a fresh random address.
    GenerateAddress(GenerateAddressArgs),
}

#[derive(Args, Debug)]
pub struct ChainIdArgs {
    /// External id, UTF-8. Repeat for each id, in order.
    #[arg(long = "ext-id", short = 'e', required = true)]
    pub ext_ids: Vec<String>,
}

/// Fields shared by entries and first entries.
#[derive(Args, Debug)]
pub struct ContentArgs {
    /// External id, UTF-8. Repeat for each id, in order.
    #[arg(long = "ext-id", short = 'e')]
    pub ext_ids: Vec<String>,

    /// Entry content, UTF-8.
    #[arg(long, short = 'c', default_value = "")]
    pub content: String,

    /// Commit timestamp in milliseconds. Defaults to now.
    #[arg(long)]
    pub timestamp: Option<u64>,

    /// Paying Entry Credit address (`Es...`).
    #[arg(long, env = "FACTOM_EC_ADDRESS", hide_env_values = true)]
    pub ec_address: String,
}

#[derive(Args, Debug)]
pub struct EntryArgs {
    /// Target chain id, hex.
    #[arg(long)]
    pub chain_id: String,

    #[command(flatten)]
    pub content: ContentArgs,
}

#[derive(Args, Debug)]
pub struct ChainArgs {
    #[command(flatten)]
    pub content: ContentArgs,
}

/// Ack timeouts in seconds. A negative commit timeout sends commit and
/// reveal concurrently without waiting.
#[derive(Args, Debug)]
pub struct AckArgs {
    #[arg(long, default_value_t = 60, allow_negative_numbers = true)]
    pub commit_ack_timeout: i64,

    #[arg(long, default_value_t = 60, allow_negative_numbers = true)]
    pub reveal_ack_timeout: i64,
}

#[derive(Args, Debug)]
pub struct SubmitEntryArgs {
    #[command(flatten)]
    pub entry: EntryArgs,

    #[command(flatten)]
    pub ack: AckArgs,
}

#[derive(Args, Debug)]
pub struct SubmitChainArgs {
    #[command(flatten)]
    pub chain: ChainArgs,

    #[command(flatten)]
    pub ack: AckArgs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AddressKind {
    /// Entry Credit address pair.
    Ec,
    /// Factoid address pair.
    Fct,
}

#[derive(Args, Debug)]
pub struct GenerateAddressArgs {
    #[arg(value_enum)]
    pub kind: AddressKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        FactomCli::command().debug_assert();
    }

    #[test]
    fn parses_negative_ack_timeout() {
        let cli = FactomCli::try_parse_from([
            "factom-cli",
            "add-chain",
            "--ext-id",
            "a",
            "--ec-address",
            "Es2d1a3uPx7o5uXHmsCnSEK2EKatPA56n8RUFmW9uRrpPRBuk5bZ",
            "--commit-ack-timeout",
            "-1",
        ])
        .unwrap();
        match cli.command {
            Commands::AddChain(args) => {
                assert_eq!(args.ack.commit_ack_timeout, -1);
                assert_eq!(args.ack.reveal_ack_timeout, 60);
                assert_eq!(args.chain.content.ext_ids, vec!["a".to_string()]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn repeated_ext_ids_keep_order() {
        let cli =
            FactomCli::try_parse_from(["factom-cli", "chain-id", "-e", "one", "-e", "two"]).unwrap();
        match cli.command {
            Commands::ChainId(args) => assert_eq!(args.ext_ids, vec!["one", "two"]),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
