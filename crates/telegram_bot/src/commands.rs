//! The persistent command menu.
//!
//! Slash commands are not parsed here: every `/name` goes to the conversation
//! as a command event. This enum only describes what the menu shows.

use teloxide::{prelude::*, utils::command::BotCommands};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "snake_case", description = "Ledger commands:")]
pub enum MenuCommands {
    #[command(description = "Main menu.")]
    Start,
    #[command(description = "Dashboard with every figure.")]
    Dashboard,
    #[command(description = "Record a purchase.")]
    Buy,
    #[command(description = "Sell an item from the inventory.")]
    Sell,
    #[command(description = "Latest purchases.")]
    Purchases,
    #[command(description = "Latest sales.")]
    Sales,
    #[command(description = "Costs.")]
    Costs,
    #[command(description = "Debt payments and status.")]
    Debts,
    #[command(description = "Partner transactions and balances.")]
    Partners,
    #[command(description = "Latest transactions.")]
    Transactions,
    #[command(description = "Set the initial capital.")]
    Capital,
    #[command(description = "Download a backup.")]
    Backup,
    #[command(description = "Restore a backup file.")]
    Restore,
    #[command(description = "Cancel the current action.")]
    Cancel,
    #[command(description = "How to use the bot.")]
    Help,
}

pub(crate) async fn register_menu(bot: &Bot) -> ResponseResult<()> {
    bot.set_my_commands(MenuCommands::bot_commands()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use workflow::Command;

    use super::*;

    #[test]
    fn every_menu_entry_is_a_known_command() {
        for entry in MenuCommands::bot_commands() {
            assert!(
                entry.command.parse::<Command>().is_ok(),
                "{}",
                entry.command
            );
        }
    }
}
