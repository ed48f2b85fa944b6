use client::{
    e2e_helpers::E2e,
    logs::fmt_sol,
    print_kv,
    LogColor,
};
use colored::Colorize;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let mut e2e = E2e::new().await;
    print_kv!("Wallet", e2e.owner(), LogColor::Header);
    print_kv!("Balance", fmt_sol(e2e.balance()));

    let signature = e2e.create_coin("Doge", "MOON").await?;
    print_kv!("Created Doge", signature, LogColor::Info);

    e2e.buy("Doge", 25).await?;
    e2e.sell("Doge", 5).await?;

    for record in &e2e.session.state().records {
        println!("{record:#?}");
    }
    for holding in &e2e.session.state().holdings {
        print_kv!(
            format!("{} ({})", holding.name, holding.symbol),
            format!("{} tokens, {}", holding.amount, fmt_sol(holding.value_lamports)),
        );
    }
    print_kv!("Balance", fmt_sol(e2e.balance()));

    Ok(())
}
