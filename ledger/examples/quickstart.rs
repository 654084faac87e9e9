//! Guided tour of the Trellis ledger engine.
//!
//! Creates a small knowledge graph (three atoms, one claim), stakes on both
//! sides of the claim, walks a deposit quote and its fee waterfall, turns the
//! epoch, claims and sweeps fees, and exits — printing the ledger's view at
//! each step with ANSI-colored terminal rendering.
//!
//! Run with:
//!   cargo run --example quickstart

use std::sync::Arc;

use trellis_ledger::accounts::AccountId;
use trellis_ledger::approvals::ApprovalLevel;
use trellis_ledger::config::{LedgerConfig, ONE_TRL};
use trellis_ledger::curves::{CurveId, CurveRegistry};
use trellis_ledger::epochs::ManualEpochSource;
use trellis_ledger::multivault::MultiVault;
use trellis_ledger::terms::TermId;
use trellis_ledger::wallets::HashWalletResolver;

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";
const RED: &str = "\x1b[31m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn banner() {
    println!();
    println!("{BOLD}{CYAN}========================================================================{RESET}");
    println!("{BOLD}{WHITE}    TRELLIS LEDGER  --  Share-Accounting Walkthrough{RESET}");
    println!("{BOLD}{CYAN}========================================================================{RESET}");
    println!();
}

fn section(num: u32, title: &str) {
    println!();
    println!("{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]=============================================================={RESET}");
    println!("{BOLD}{WHITE}  {title}{RESET}");
    println!("{CYAN}------------------------------------------------------------------------{RESET}");
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn rejected(text: &str) {
    println!("{RED}  [NO] {text}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn term_row(name: &str, id: &TermId) {
    let hex = id.to_hex();
    println!(
        "  {BOLD}{name:<12}{RESET}  {DIM}{}...{}{RESET}",
        &hex[..8],
        &hex[56..]
    );
}

/// Renders motes as whole TRL with three decimals.
fn trl(motes: u128) -> String {
    let whole = motes / ONE_TRL;
    let milli = (motes % ONE_TRL) / (ONE_TRL / 1_000);
    format!("{whole}.{milli:03} TRL")
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    banner();

    let epochs = Arc::new(ManualEpochSource::starting_at(0));
    let mut vault = MultiVault::new(
        LedgerConfig::default(),
        CurveRegistry::standard(),
        epochs.clone(),
        Arc::new(HashWalletResolver::default()),
    )
    .expect("default config is valid");
    let curve: CurveId = vault.config().default_curve_id;

    let alice = AccountId::from("alice");
    let bob = AccountId::from("bob");
    let carol = AccountId::from("carol");

    // -----------------------------------------------------------------------
    // Step 1: Atoms
    // -----------------------------------------------------------------------
    section(1, "Atoms: content-addressed terms with their own vaults");

    let atom_cost = vault.atom_cost();
    info("atom cost", &trl(atom_cost));

    let stake = 2 * ONE_TRL;
    let lisbon = vault
        .create_atom(&alice, b"city:lisbon".to_vec(), atom_cost + stake)
        .expect("create lisbon");
    let capital = vault
        .create_atom(&alice, b"relation:capital-of".to_vec(), atom_cost + stake)
        .expect("create capital-of");
    let portugal = vault
        .create_atom(&alice, b"country:portugal".to_vec(), atom_cost + stake)
        .expect("create portugal");

    term_row("lisbon", &lisbon);
    term_row("capital-of", &capital);
    term_row("portugal", &portugal);
    let (assets, shares) = vault.vault_totals(&lisbon, curve);
    info("lisbon vault", &format!("{} / {} shares", trl(assets), trl(shares)));
    success("three atoms created, each with a funded default-curve vault");

    // -----------------------------------------------------------------------
    // Step 2: A claim and its counter
    // -----------------------------------------------------------------------
    section(2, "Triples: a claim and the counter-claim it implies");

    let claim = vault
        .create_triple(&alice, lisbon, capital, portugal, vault.triple_cost() + ONE_TRL)
        .expect("create claim");
    let counter = vault.counter_id_of(&claim).expect("claims have counters");
    term_row("claim", &claim);
    term_row("counter", &counter);
    success("\"lisbon capital-of portugal\" is now stakeable, pro or contra");

    // -----------------------------------------------------------------------
    // Step 3: Quotes and the fee waterfall
    // -----------------------------------------------------------------------
    section(3, "Deposits: quote first, then execute");

    let amount = ONE_TRL;
    let quote = vault
        .preview_deposit(&claim, curve, amount)
        .expect("quote the deposit");
    info("deposit", &trl(amount));
    info("protocol fee", &trl(quote.protocol_fee));
    info("entry fee", &trl(quote.entry_fee));
    info("deposit fraction", &trl(quote.deposit_fraction));
    info("staked", &trl(quote.assets_staked));

    let minted = vault
        .deposit(&bob, &bob, &claim, curve, amount, 0)
        .expect("bob stakes the claim");
    success(&format!("bob minted {} claim shares", trl(minted)));

    // The fraction flowed into the three component atoms' vaults.
    let (assets_after, _) = vault.vault_totals(&lisbon, curve);
    info("lisbon vault now", &trl(assets_after));

    // -----------------------------------------------------------------------
    // Step 4: One side per curve
    // -----------------------------------------------------------------------
    section(4, "Counter-staking: an account holds at most one side");

    match vault.deposit(&bob, &bob, &counter, curve, ONE_TRL, 0) {
        Err(err) => rejected(&format!("bob contra his own stake: {err}")),
        Ok(_) => unreachable!("bob already holds the positive side"),
    }
    vault
        .deposit(&carol, &carol, &counter, curve, ONE_TRL, 0)
        .expect("carol takes the other side");
    success("carol staked the counter-claim");

    // -----------------------------------------------------------------------
    // Step 5: Epochs, wallets, and the fee book
    // -----------------------------------------------------------------------
    section(5, "Fees: epoch buckets and atom wallets");

    info("epoch 0 protocol fees", &trl(vault.protocol_fees_accrued(0)));
    epochs.advance();
    info("epoch now", &vault.current_epoch().to_string());

    let wallet = vault.wallet_address_of(&lisbon).expect("atoms have wallets");
    info("lisbon wallet", wallet.as_str());
    info("accrued", &trl(vault.wallet_fees_accrued(&wallet)));
    let claimed = vault
        .claim_atom_wallet_fees(&wallet, &lisbon)
        .expect("wallet claims its fees");
    success(&format!("lisbon's wallet claimed {}", trl(claimed)));

    let admin = vault.config().admin.clone();
    let swept = vault
        .sweep_protocol_fees(&admin, 0)
        .expect("admin sweeps epoch 0");
    success(&format!("treasury swept {} from epoch 0", trl(swept)));

    // -----------------------------------------------------------------------
    // Step 6: Approvals and exit
    // -----------------------------------------------------------------------
    section(6, "Exit: delegated redemption down to the ghost floor");

    vault
        .approve(&bob, &carol, ApprovalLevel::Redeem)
        .expect("bob lets carol manage his exit");
    let held = vault.get_shares(&bob, &claim, curve);
    let exit = vault
        .preview_redeem(&claim, curve, held)
        .expect("quote the exit");
    info("bob's shares", &trl(held));
    info("gross value", &trl(exit.assets_gross));
    info("exit + protocol fees", &trl(exit.exit_fee + exit.protocol_fee));

    let paid = vault
        .redeem(&carol, &bob, &claim, curve, held, 0)
        .expect("carol redeems bob's position");
    success(&format!("bob was paid {}", trl(paid)));

    let (assets, shares) = vault.vault_totals(&claim, curve);
    info("claim vault after exit", &format!("{} / {} shares", trl(assets), trl(shares)));
    info("events logged", &vault.events().len().to_string());
    println!();
    success("walkthrough complete: every mote is in a vault, a bucket, or a payout");
    println!();
}
