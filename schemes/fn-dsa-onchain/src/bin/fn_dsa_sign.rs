//! Sign a message for on-chain FALCON verification.
//!
//! Generates a fresh key pair, signs the message, re-checks the signature
//! against the wire codecs and prints a ready-to-run `stellar contract
//! invoke` command.
//!
//! ```text
//! fn-dsa-sign "Hello, Soroban!"
//! fn-dsa-sign --file document.pdf
//! fn-dsa-sign --source bob --network testnet "My message"
//! ```

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::error;

use pqsigs_fn_dsa_onchain::{
    Falcon1024, Falcon512, FalconPadded1024, FalconPadded512, LedgerTarget, SignatureScheme,
    VerificationPipeline,
};
use pqsigs_fn_dsa_onchain::pipeline::TESTNET_CONTRACT_ID;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Degree {
    #[value(name = "512")]
    N512,
    #[value(name = "1024")]
    N1024,
}

#[derive(Parser, Debug)]
#[command(name = "fn-dsa-sign")]
#[command(about = "Generate FALCON signatures for on-chain verification", long_about = None)]
struct Cli {
    /// Message to sign
    #[arg(default_value = "Hello from Rust Falcon!")]
    message: String,

    /// Sign the contents of this file instead of the message argument
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// FALCON degree
    #[arg(short, long, value_enum, default_value_t = Degree::N512)]
    degree: Degree,

    /// Zero-pad signatures to the fixed padded length
    #[arg(long)]
    padded: bool,

    /// Account that submits the transaction
    #[arg(short, long, default_value = "alice")]
    source: String,

    /// Network name
    #[arg(short, long, default_value = "testnet")]
    network: String,

    /// Verifier contract id
    #[arg(long, default_value = TESTNET_CONTRACT_ID)]
    contract_id: String,

    /// Print the artifact as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("ERROR: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let message = match &cli.file {
        Some(path) => {
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
        }
        None => cli.message.as_bytes().to_vec(),
    };

    match (cli.degree, cli.padded) {
        (Degree::N512, false) => sign_with(Falcon512, cli, &message),
        (Degree::N512, true) => sign_with(FalconPadded512, cli, &message),
        (Degree::N1024, false) => sign_with(Falcon1024, cli, &message),
        (Degree::N1024, true) => sign_with(FalconPadded1024, cli, &message),
    }
}

fn sign_with<S: SignatureScheme>(scheme: S, cli: &Cli, message: &[u8]) -> Result<()> {
    let n = scheme.params().n;
    if !cli.json {
        match &cli.file {
            Some(path) => println!("Signing file: {}", path.display()),
            None => println!("Signing message: \"{}\"", cli.message),
        }
        println!();
        println!("Generating FALCON-{} keypair and signing ({} bytes)...", n, message.len());
    }

    let pipeline = VerificationPipeline::new(scheme);
    let artifact = pipeline
        .sign_and_prepare(message)
        .context("signature did not survive local verification")?;

    let target = LedgerTarget {
        contract_id: cli.contract_id.clone(),
        source: cli.source.clone(),
        network: cli.network.clone(),
    };

    if cli.json {
        let out = serde_json::json!({
            "artifact": artifact,
            "target": target,
            "command": artifact.invoke_command(&target),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let info = &artifact.verification;
    println!("  Public key: {} bytes", artifact.public_key_hex.len() / 2);
    println!(
        "  Signature: {} bytes ({} format, header {:#04x})",
        info.signature_len, info.format, info.header
    );
    println!(
        "  Squared norm: {} (bound: {})",
        info.norm.squared_norm, info.norm.bound
    );
    println!(
        "  Local verification: {}",
        if info.accepted() { "PASSED" } else { "FAILED" }
    );
    println!(
        "  Reference verification: {}",
        if artifact.verified { "PASSED" } else { "FAILED" }
    );

    let rule = "=".repeat(70);
    println!("\n{}", rule);
    println!("VERIFICATION COMMAND");
    println!("{}\n", rule);
    println!("{}\n", artifact.invoke_command(&target));
    println!("{}", rule);
    println!("Expected output: true");
    println!("{}", rule);

    Ok(())
}
