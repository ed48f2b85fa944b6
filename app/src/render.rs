//! Terminal rendering of the session state.

use client::{
    logs::{
        fmt_sol,
        log_divider,
        timestamp,
    },
    print_kv,
    state::{
        AppState,
        StatusLevel,
    },
    submission::SubmissionState,
    LogColor,
};
use colored::Colorize;

pub fn records(state: &AppState) {
    if state.records.is_empty() {
        print_kv!("Meme coins", "none yet", LogColor::Header);
        return;
    }

    print_kv!("Meme coins", state.records.len(), LogColor::Header);
    for record in &state.records {
        log_divider();
        print_kv!(&record.name, &record.symbol, LogColor::Highlight, LogColor::Info);
        print_kv!("Record", record.address);
        print_kv!("Mint", record.mint);
        print_kv!("Creator", record.creator);
        print_kv!("Price", format!("{} SOL/token", record.price_in_sol));
        print_kv!(
            "Supply",
            format!("{} / {}", record.circulating_supply, record.total_supply)
        );
        print_kv!("Holders", record.holder_count);
        print_kv!("Volume", fmt_sol(record.total_volume));
        if !record.is_active {
            print_kv!("Status", "inactive", LogColor::Warning, LogColor::Warning);
        }
    }
}

pub fn portfolio(state: &AppState) {
    if let Some(wallet) = state.wallet {
        print_kv!("Wallet", wallet, LogColor::Header);
    }
    if let Some(balance) = state.balance {
        print_kv!("Balance", fmt_sol(balance), LogColor::Header);
    }
    if state.holdings.is_empty() {
        print_kv!("Holdings", "none", LogColor::Header);
        return;
    }

    for holding in &state.holdings {
        print_kv!(
            format!("{} ({})", holding.name, holding.symbol),
            format!(
                "{} tokens worth {}",
                holding.amount,
                fmt_sol(holding.value_lamports)
            ),
            LogColor::Highlight,
        );
    }
}

pub fn transition(state: &SubmissionState) {
    let detail = match state {
        SubmissionState::Submitted { signature }
        | SubmissionState::Confirming { signature }
        | SubmissionState::Confirmed { signature } => signature.to_string(),
        SubmissionState::Failed { error } => error.kind().to_string(),
        _ => String::new(),
    };
    print_kv!(state.name(), detail, LogColor::Gray);
}

pub fn status(state: &AppState) {
    let Some(status) = &state.status else {
        return;
    };
    let color = match status.level {
        StatusLevel::Pending => LogColor::Info,
        StatusLevel::Success => LogColor::Header,
        StatusLevel::Error => LogColor::Error,
    };
    print_kv!(timestamp(), &status.message, LogColor::FadedGray, color);
}
