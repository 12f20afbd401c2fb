//! `sprout` command line: price and path utilities, position sizing and
//! batch pool provisioning.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use alloy::primitives::{Address, U256};
use bigdecimal::BigDecimal;
use clap::{Parser, Subcommand};
use eyre::{eyre, Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, LevelFilter};

use sprout::chain::ChainClient;
use sprout::config::Contract;
use sprout::liquidity::{size_position, PositionRequest, TickWidth};
use sprout::math::price::{decode_with_precision, encode_sqrt_price_x96};
use sprout::models::fee::FeeTier;
use sprout::models::pair::OrderedPair;
use sprout::path::{decode_path, encode_path};
use sprout::provision::{PoolProvisioner, ProvisionBatch};
use sprout::utils::app_context::AppContext;
use sprout::utils::logger::setup_logger;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level, overriding RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode reserve1 / reserve0 as a Q64.96 square-root price
    EncodePrice { reserve1: String, reserve0: String },
    /// Decode a Q64.96 square-root price into a reserve ratio
    DecodePrice {
        sqrt_price_x96: String,
        /// Significant digits to print
        #[arg(long, default_value_t = 15)]
        digits: u64,
    },
    /// Pack a multi-hop swap path
    EncodePath {
        /// Comma separated token addresses, in route order
        #[arg(long, value_delimiter = ',', required = true)]
        tokens: Vec<Address>,
        /// Comma separated fee tiers, one per hop
        #[arg(long, value_delimiter = ',', required = true)]
        fees: Vec<u32>,
        /// Pack for an exact-input swap (route reversed)
        #[arg(long)]
        exact_input: bool,
    },
    /// Unpack a hex encoded swap path
    DecodePath {
        path: String,
        /// The path was packed for an exact-input swap
        #[arg(long)]
        exact_input: bool,
    },
    /// Size a position against a live pool
    SizePosition {
        /// Token the amount is denominated in
        #[arg(long)]
        token: Address,
        /// The other token of the pool
        #[arg(long)]
        other: Address,
        /// Pool fee tier
        #[arg(long)]
        fee: u32,
        /// Deposit amount of `token`, display units
        #[arg(long)]
        amount: String,
        /// Range half-width in tick spacings
        #[arg(long)]
        width: u32,
    },
    /// Create, price and seed every pool of a batch file
    Provision { batch: PathBuf },
}

fn encode_price(reserve1: &str, reserve0: &str) -> Result<()> {
    let reserve1 = BigDecimal::from_str(reserve1).wrap_err_with(|| format!("invalid reserve1 {reserve1:?}"))?;
    let reserve0 = BigDecimal::from_str(reserve0).wrap_err_with(|| format!("invalid reserve0 {reserve0:?}"))?;
    println!("{}", encode_sqrt_price_x96(&reserve1, &reserve0)?);
    Ok(())
}

fn decode_price(sqrt_price_x96: &str, digits: u64) -> Result<()> {
    let sqrt_price_x96 = U256::from_str(sqrt_price_x96)
        .map_err(|e| eyre!("invalid sqrt price {sqrt_price_x96:?}: {e}"))?;
    println!("{}", decode_with_precision(sqrt_price_x96, digits));
    Ok(())
}

fn encode_swap_path(tokens: &[Address], fees: &[u32], exact_input: bool) -> Result<()> {
    let fees = fees
        .iter()
        .map(|fee| FeeTier::try_from(*fee))
        .collect::<Result<Vec<_>, _>>()?;
    println!("{}", encode_path(tokens, &fees, exact_input)?);
    Ok(())
}

fn decode_swap_path(path: &str, exact_input: bool) -> Result<()> {
    let bytes = hex::decode(path.trim_start_matches("0x")).wrap_err("path is not valid hex")?;
    println!("{}", decode_path(&bytes, exact_input)?);
    Ok(())
}

async fn size_live_position(
    token: Address,
    other: Address,
    fee: u32,
    amount: &str,
    width: u32,
) -> Result<()> {
    let fee = FeeTier::try_from(fee)?;
    let width = TickWidth::new(width)?;
    let pair = OrderedPair::new(token, (), other, ())?;
    let (token0, token1) = pair.addresses();

    let ctx = AppContext::new()?;
    let chain = ctx.read_only_chain();
    let factory = ctx.deployment.resolve(Contract::Factory)?;

    let pool = chain
        .pool_address(factory, token0, token1, fee)
        .await?
        .ok_or_else(|| eyre!("no pool for {token0}/{token1} fee {fee} on {}", ctx.config.network))?;
    let pool = chain.pool_state(pool).await?;
    let input = chain.token_descriptor(token).await?;
    let counterpart = chain.token_descriptor(other).await?;

    let position = size_position(&PositionRequest {
        chain_id: ctx.deployment.chain_id,
        pool: &pool,
        token0: &input,
        token1: &counterpart,
        input_token0_amount: amount,
        width,
    })
    .wrap_err_with(|| format!("failed to size {}/{} fee {fee}", input.symbol, counterpart.symbol))?;

    info!("main: {position}");
    println!("{}", serde_json::to_string_pretty(&position)?);
    Ok(())
}

async fn provision(batch: &Path) -> Result<()> {
    let batch = ProvisionBatch::load(batch)?;
    let ctx = AppContext::new()?;
    let provisioner = PoolProvisioner::new(
        ctx.signing_chain()?,
        ctx.deployment.clone(),
        batch.width,
        batch.slippage,
        ctx.config.deadline_secs,
    )?;

    info!(
        "main: Provisioning {} pools, width {} slippage {:?}",
        batch.pools.len(),
        batch.width,
        batch.slippage
    );

    let progress = ProgressBar::new(batch.pools.len() as u64);
    progress.set_style(ProgressStyle::with_template(
        "{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} pools",
    )?);

    let outcome = provisioner
        .provision_batch(&batch.pools, |index, outcome| {
            progress.println(format!("#{index}: {outcome}"));
            progress.inc(1);
        })
        .await;
    progress.finish();

    let completed = outcome.into_result()?;
    println!("{} pools provisioned", completed.len());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logger(cli.verbose.then_some(LevelFilter::Debug))?;

    match cli.command {
        Commands::EncodePrice { reserve1, reserve0 } => encode_price(&reserve1, &reserve0),
        Commands::DecodePrice {
            sqrt_price_x96,
            digits,
        } => decode_price(&sqrt_price_x96, digits),
        Commands::EncodePath {
            tokens,
            fees,
            exact_input,
        } => encode_swap_path(&tokens, &fees, exact_input),
        Commands::DecodePath { path, exact_input } => decode_swap_path(&path, exact_input),
        Commands::SizePosition {
            token,
            other,
            fee,
            amount,
            width,
        } => size_live_position(token, other, fee, &amount, width).await,
        Commands::Provision { batch } => provision(&batch).await,
    }
}
