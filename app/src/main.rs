//! Terminal front end for the meme coin program: list, create, buy, sell and portfolio views over
//! a client session.

use std::process::ExitCode;

use clap::Parser;
use client::{
    print_kv,
    session::Session,
    state::{
        AppEvent,
        Tab,
    },
    transactions::{
        CustomRpcClient,
        SendTransactionConfig,
    },
    wallet::KeypairWallet,
    LogColor,
};
use colored::Colorize;
use meme_coin_interface::{
    idl::Idl,
    seeds::find_record_address,
};

use crate::cli::{
    CliArgs,
    Command,
};

pub mod cli;
pub mod load_env;
pub mod render;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let CliArgs {
        url,
        debug,
        command,
    } = CliArgs::parse();

    Idl::bundled()?.check_compatibility()?;

    if let Command::Address { name } = &command {
        let (address, bump) = find_record_address(name)?;
        print_kv!("Record", address, LogColor::Header);
        print_kv!("Bump", bump);
        return Ok(ExitCode::SUCCESS);
    }

    let rpc = CustomRpcClient::new_from_url(
        &url.unwrap_or_else(load_env::rpc_url),
        SendTransactionConfig {
            debug_logs: debug,
            ..Default::default()
        },
    );
    let wallet = match load_env::wallet_keypair()? {
        Some(keypair) => KeypairWallet::connected(keypair),
        None => KeypairWallet::disconnected(),
    };
    print_kv!("RPC", rpc.url(), LogColor::FadedGray);

    let mut session = Session::new(rpc, wallet);
    session.load().await;

    let result = match command {
        Command::Trade => {
            session.dispatch(AppEvent::TabSelected(Tab::Trade));
            render::records(session.state());
            Ok(())
        }
        Command::Portfolio => {
            session.dispatch(AppEvent::TabSelected(Tab::Portfolio));
            render::portfolio(session.state());
            Ok(())
        }
        Command::Create(cmd) => {
            session.dispatch(AppEvent::TabSelected(Tab::Create));
            session
                .create(cmd.into(), render::transition)
                .await
                .map(|_| ())
        }
        Command::Buy(cmd) => {
            session.dispatch(AppEvent::TabSelected(Tab::Trade));
            session.buy(cmd.into(), render::transition).await.map(|_| ())
        }
        Command::Sell(cmd) => {
            session.dispatch(AppEvent::TabSelected(Tab::Trade));
            session.sell(cmd.into(), render::transition).await.map(|_| ())
        }
        Command::Address { .. } => unreachable!("Handled before connecting"),
    };

    render::status(session.state());

    Ok(match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    })
}
