use clap::{
    command,
    Args,
    Parser,
    Subcommand,
};
use client::state::{
    CreateForm,
    TradeForm,
};

#[derive(Parser)]
#[command(name = "meme-coin")]
pub struct CliArgs {
    /// RPC endpoint. Overrides `MEME_COIN_RPC_URL`.
    #[arg(short = 'u', long)]
    pub url: Option<String>,

    /// Print each relayed signature as it's submitted.
    #[arg(long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List every meme coin.
    Trade,
    /// Create a new meme coin with the connected wallet as creator.
    Create(CreateCommand),
    /// Buy tokens of an existing meme coin.
    Buy(TradeCommand),
    /// Sell tokens back to a meme coin.
    Sell(TradeCommand),
    /// Show the connected wallet's holdings and SOL balance.
    Portfolio,
    /// Derive a meme coin's record address without touching the network.
    Address {
        name: String,
    },
}

/// Numeric fields stay as typed so validation reports them the same way for every front end.
#[derive(Args)]
pub struct CreateCommand {
    #[arg(short = 'n', long)]
    pub name: String,

    #[arg(short = 's', long)]
    pub symbol: String,

    /// Metadata URI.
    #[arg(long)]
    pub uri: String,

    #[arg(long, default_value = "9")]
    pub decimals: String,

    /// Total supply in raw token units.
    #[arg(long, default_value = "1000000")]
    pub supply: String,

    /// Lamports per raw token unit.
    #[arg(short = 'p', long, default_value = "1000000")]
    pub price: String,
}

#[derive(Args)]
pub struct TradeCommand {
    /// Meme coin name.
    pub name: String,

    /// Raw token units.
    pub quantity: String,
}

impl From<CreateCommand> for CreateForm {
    fn from(cmd: CreateCommand) -> Self {
        CreateForm {
            name: cmd.name,
            symbol: cmd.symbol,
            uri: cmd.uri,
            decimals: cmd.decimals,
            initial_supply: cmd.supply,
            price_per_token: cmd.price,
        }
    }
}

impl From<TradeCommand> for TradeForm {
    fn from(cmd: TradeCommand) -> Self {
        TradeForm {
            name: cmd.name,
            quantity: cmd.quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults_match_the_form() {
        let args = CliArgs::parse_from([
            "meme-coin", "create", "-n", "Doge", "-s", "MOON", "--uri", "ipfs://doge",
        ]);
        let Command::Create(cmd) = args.command else {
            panic!("expected create");
        };
        let form = CreateForm::from(cmd);
        let defaults = CreateForm::default();
        assert_eq!(form.decimals, defaults.decimals);
        assert_eq!(form.initial_supply, defaults.initial_supply);
        assert_eq!(form.price_per_token, defaults.price_per_token);
    }

    #[test]
    fn trade_args_are_positional() {
        let args = CliArgs::parse_from(["meme-coin", "--debug", "sell", "Doge", "12"]);
        assert!(args.debug);
        let Command::Sell(cmd) = args.command else {
            panic!("expected sell");
        };
        assert_eq!(TradeForm::from(cmd), TradeForm {
            name: "Doge".into(),
            quantity: "12".into(),
        });
    }
}
