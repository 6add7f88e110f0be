// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Factom CLI
//!
//! Entry point for the `factom-cli` binary. Parses arguments, initializes
//! logging, and runs one subcommand:
//!
//! - `chain-id`        : derive a chain id from external ids
//! - `compose-entry`   : print an entry's commit and reveal
//! - `compose-chain`   : print a new chain's commit and reveal
//! - `add-entry`       : commit and reveal an entry
//! - `add-chain`       : commit and reveal a new chain
//! - `ec-rate`         : query the Entry Credit rate
//! - `generate-address`: create a random EC or Factoid address
//!
//! Results are printed to stdout as JSON.

mod cli;
mod logging;
mod transport;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use factom_protocol::address::Address;
use factom_protocol::entry::{
    compose_reveal, compose_signed_commit, compute_chain_id_from_ext_ids, Chain, Commitable, Entry,
};
use factom_protocol::network::submit::{self, AckPolicy, AddOptions, AddResult};

use cli::{AckArgs, AddressKind, Commands, ContentArgs, FactomCli};
use transport::HttpTransport;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = FactomCli::parse();
    logging::init_logging("factom_cli=info,factom_protocol=info", cli.log_format);

    let output = match cli.command {
        Commands::ChainId(args) => {
            let ext_ids: Vec<Vec<u8>> = args.ext_ids.into_iter().map(String::into_bytes).collect();
            let chain_id = compute_chain_id_from_ext_ids(&ext_ids)?;
            json!({ "chainid": hex::encode(chain_id) })
        }
        Commands::ComposeEntry(args) => {
            let ec_address = parse_ec_address(&args.content.ec_address)?;
            let entry = build_entry(Some(&args.chain_id), &args.content)?;
            composed(&entry, &ec_address)?
        }
        Commands::ComposeChain(args) => {
            let ec_address = parse_ec_address(&args.content.ec_address)?;
            let chain = build_chain(&args.content)?;
            composed(&chain, &ec_address)?
        }
        Commands::AddEntry(args) => {
            let ec_address = parse_ec_address(&args.entry.content.ec_address)?;
            let entry = build_entry(Some(&args.entry.chain_id), &args.entry.content)?;
            let transport = connect(&cli.url)?;
            let result = submit::add(&transport, &entry, &ec_address, add_options(&args.ack))
                .await
                .context("failed to add entry")?;
            add_result_json(&result)
        }
        Commands::AddChain(args) => {
            let ec_address = parse_ec_address(&args.chain.content.ec_address)?;
            let chain = build_chain(&args.chain.content)?;
            let transport = connect(&cli.url)?;
            let result = submit::add(&transport, &chain, &ec_address, add_options(&args.ack))
                .await
                .context("failed to add chain")?;
            add_result_json(&result)
        }
        Commands::EcRate => {
            let transport = connect(&cli.url)?;
            let rate = submit::entry_credit_rate(&transport)
                .await
                .context("failed to query the entry credit rate")?;
            json!({ "rate": rate })
        }
        Commands::GenerateAddress(args) => {
            let private = match args.kind {
                AddressKind::Ec => Address::generate_entry_credit(),
                AddressKind::Fct => Address::generate_factoid(),
            };
            json!({ "private": private.to_string(), "public": private.public().to_string() })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn connect(url: &str) -> Result<HttpTransport> {
    tracing::debug!(url, "connecting to factomd");
    HttpTransport::new(url).with_context(|| format!("invalid node URL '{}'", url))
}

fn parse_ec_address(text: &str) -> Result<Address> {
    let address: Address = text.parse().context("invalid --ec-address")?;
    anyhow::ensure!(
        matches!(address, Address::EntryCreditPrivate(_)),
        "--ec-address must be a private Entry Credit address (Es...)"
    );
    Ok(address)
}

fn build_entry(chain_id: Option<&str>, args: &ContentArgs) -> Result<Entry> {
    let mut builder = Entry::builder()
        .ext_ids(args.ext_ids.iter().map(|e| e.as_bytes().to_vec()))
        .content_str(&args.content);
    if let Some(chain_id) = chain_id {
        builder = builder.chain_id_hex(chain_id).context("invalid --chain-id")?;
    }
    if let Some(timestamp) = args.timestamp {
        builder = builder.timestamp(timestamp);
    }
    Ok(builder.build()?)
}

fn build_chain(args: &ContentArgs) -> Result<Chain> {
    Ok(Chain::new(build_entry(None, args)?)?)
}

fn composed<T: Commitable + ?Sized>(obj: &T, ec_address: &Address) -> Result<serde_json::Value> {
    let commit = compose_signed_commit(obj, ec_address)?;
    let reveal = compose_reveal(obj)?;
    Ok(json!({
        "txid": commit.tx_id_hex(),
        "entryhash": hex::encode(obj.entry_hash()?),
        "chainid": hex::encode(obj.target_chain_id()?),
        "commit": commit.hex(),
        "reveal": hex::encode(reveal),
    }))
}

fn add_options(args: &AckArgs) -> AddOptions {
    AddOptions {
        commit: AckPolicy::from_secs(args.commit_ack_timeout),
        reveal: AckPolicy::from_secs(args.reveal_ack_timeout),
    }
}

fn add_result_json(result: &AddResult) -> serde_json::Value {
    json!({
        "txid": result.tx_id,
        "repeatedCommit": result.repeated_commit,
        "chainid": result.chain_id,
        "entryhash": result.entry_hash,
    })
}
