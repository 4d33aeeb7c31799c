//! Command vocabulary.
//!
//! Commands travel as short strings (button payloads, slash commands):
//! a name, optionally followed by `:`-separated arguments, e.g. `sell:12` or
//! `partner:partner_a:cash_withdraw`.

use std::{fmt, str::FromStr};

use engine::{BackupKind, EngineError, EntityId, PartnerId, PartnerTxKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Home,
    Help,
    Cancel,
    Confirm,
    Dashboard,

    Buy,
    /// Pick an item to sell.
    Sell,
    SellItem(EntityId),
    Purchases,
    Purchase(EntityId),
    EditPurchase(EntityId),
    DeletePurchase(EntityId),

    Sales,
    Sale(EntityId),
    EditSale(EntityId),
    DeleteSale(EntityId),

    Costs,
    NewCost,
    Cost(EntityId),
    EditCost(EntityId),
    DeleteCost(EntityId),

    Transactions,

    Partners,
    PartnerBalances,
    PartnerTransactions,
    /// Pick the transaction type for a partner.
    Partner(PartnerId),
    PartnerEntry(PartnerId, PartnerTxKind),
    DeletePartnerTransaction(EntityId),

    Debts,
    DebtStatus,
    PaySaleDebt,
    PaySale(EntityId),
    PayPurchaseDebt,
    PayPurchase(EntityId),

    Capital,
    Backup,
    BackupOf(BackupKind),
    Restore,
    ClearAll,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("home"),
            Self::Help => f.write_str("help"),
            Self::Cancel => f.write_str("cancel"),
            Self::Confirm => f.write_str("confirm"),
            Self::Dashboard => f.write_str("dashboard"),
            Self::Buy => f.write_str("buy"),
            Self::Sell => f.write_str("sell"),
            Self::SellItem(id) => write!(f, "sell:{id}"),
            Self::Purchases => f.write_str("purchases"),
            Self::Purchase(id) => write!(f, "purchase:{id}"),
            Self::EditPurchase(id) => write!(f, "purchase_edit:{id}"),
            Self::DeletePurchase(id) => write!(f, "purchase_delete:{id}"),
            Self::Sales => f.write_str("sales"),
            Self::Sale(id) => write!(f, "sale:{id}"),
            Self::EditSale(id) => write!(f, "sale_edit:{id}"),
            Self::DeleteSale(id) => write!(f, "sale_delete:{id}"),
            Self::Costs => f.write_str("costs"),
            Self::NewCost => f.write_str("cost_new"),
            Self::Cost(id) => write!(f, "cost:{id}"),
            Self::EditCost(id) => write!(f, "cost_edit:{id}"),
            Self::DeleteCost(id) => write!(f, "cost_delete:{id}"),
            Self::Transactions => f.write_str("transactions"),
            Self::Partners => f.write_str("partners"),
            Self::PartnerBalances => f.write_str("partner_balance"),
            Self::PartnerTransactions => f.write_str("partner_list"),
            Self::Partner(partner) => write!(f, "partner:{partner}"),
            Self::PartnerEntry(partner, kind) => write!(f, "partner:{partner}:{}", kind.as_str()),
            Self::DeletePartnerTransaction(id) => write!(f, "partner_tx_delete:{id}"),
            Self::Debts => f.write_str("debts"),
            Self::DebtStatus => f.write_str("debt_status"),
            Self::PaySaleDebt => f.write_str("pay_sale_debt"),
            Self::PaySale(id) => write!(f, "pay_sale:{id}"),
            Self::PayPurchaseDebt => f.write_str("pay_purchase_debt"),
            Self::PayPurchase(id) => write!(f, "pay_purchase:{id}"),
            Self::Capital => f.write_str("capital"),
            Self::Backup => f.write_str("backup"),
            Self::BackupOf(kind) => write!(f, "backup:{}", kind.as_str()),
            Self::Restore => f.write_str("restore"),
            Self::ClearAll => f.write_str("clear_all"),
        }
    }
}

fn unknown(raw: &str) -> EngineError {
    EngineError::Validation(format!("unknown command \"{raw}\""))
}

impl FromStr for Command {
    type Err = EngineError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let mut parts = trimmed.split(':');
        let name = parts.next().unwrap_or_default();
        let first = parts.next();
        let second = parts.next();
        if parts.next().is_some() {
            return Err(unknown(raw));
        }

        let id = || -> Result<EntityId, EngineError> {
            first
                .and_then(|value| value.parse().ok())
                .ok_or_else(|| unknown(raw))
        };

        let command = match (name, first, second) {
            ("start" | "home" | "menu", None, None) => Self::Home,
            ("help", None, None) => Self::Help,
            ("cancel", None, None) => Self::Cancel,
            ("confirm", None, None) => Self::Confirm,
            ("dashboard" | "stats", None, None) => Self::Dashboard,
            ("buy", None, None) => Self::Buy,
            ("sell", None, None) => Self::Sell,
            ("sell", Some(_), None) => Self::SellItem(id()?),
            ("purchases" | "list_buys", None, None) => Self::Purchases,
            ("purchase", Some(_), None) => Self::Purchase(id()?),
            ("purchase_edit", Some(_), None) => Self::EditPurchase(id()?),
            ("purchase_delete", Some(_), None) => Self::DeletePurchase(id()?),
            ("sales" | "list_sales", None, None) => Self::Sales,
            ("sale", Some(_), None) => Self::Sale(id()?),
            ("sale_edit", Some(_), None) => Self::EditSale(id()?),
            ("sale_delete", Some(_), None) => Self::DeleteSale(id()?),
            ("costs", None, None) => Self::Costs,
            ("cost_new" | "cost", None, None) => Self::NewCost,
            ("cost", Some(_), None) => Self::Cost(id()?),
            ("cost_edit", Some(_), None) => Self::EditCost(id()?),
            ("cost_delete", Some(_), None) => Self::DeleteCost(id()?),
            ("transactions", None, None) => Self::Transactions,
            ("partners" | "partner", None, None) => Self::Partners,
            ("partner_balance", None, None) => Self::PartnerBalances,
            ("partner_list", None, None) => Self::PartnerTransactions,
            ("partner", Some(partner), None) => Self::Partner(PartnerId::new(partner)),
            ("partner", Some(partner), Some(kind)) => {
                Self::PartnerEntry(PartnerId::new(partner), PartnerTxKind::try_from(kind)?)
            }
            ("partner_tx_delete", Some(_), None) => Self::DeletePartnerTransaction(id()?),
            ("debts", None, None) => Self::Debts,
            ("debt_status", None, None) => Self::DebtStatus,
            ("pay_sale_debt", None, None) => Self::PaySaleDebt,
            ("pay_sale", Some(_), None) => Self::PaySale(id()?),
            ("pay_purchase_debt", None, None) => Self::PayPurchaseDebt,
            ("pay_purchase", Some(_), None) => Self::PayPurchase(id()?),
            ("capital", None, None) => Self::Capital,
            ("backup", None, None) => Self::Backup,
            ("backup", Some(kind), None) => Self::BackupOf(BackupKind::try_from(kind)?),
            ("restore", None, None) => Self::Restore,
            ("clear_all", None, None) => Self::ClearAll,
            _ => return Err(unknown(raw)),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        let commands = [
            Command::Home,
            Command::SellItem(12),
            Command::DeletePurchase(3),
            Command::PartnerEntry(PartnerId::new("partner_a"), PartnerTxKind::CashWithdraw),
            Command::Partner(PartnerId::new("partner_b")),
            Command::BackupOf(BackupKind::InventoryDebt),
            Command::DeletePartnerTransaction(9),
            Command::NewCost,
            Command::Cost(4),
        ];
        for command in commands {
            let wire = command.to_string();
            assert_eq!(wire.parse::<Command>().unwrap(), command, "{wire}");
        }
    }

    #[test]
    fn slash_commands_and_aliases_parse() {
        assert_eq!("/start".parse::<Command>().unwrap(), Command::Home);
        assert_eq!(" /list_buys ".parse::<Command>().unwrap(), Command::Purchases);
        assert_eq!("/cost".parse::<Command>().unwrap(), Command::NewCost);
        assert_eq!("stats".parse::<Command>().unwrap(), Command::Dashboard);
    }

    #[test]
    fn malformed_commands_are_rejected() {
        for raw in [
            "",
            "fly",
            "sell:abc",
            "sell:1:2",
            "purchase",
            "partner:a:gift",
            "backup:weekly",
            "home:1",
            "a:b:c:d",
        ] {
            assert!(raw.parse::<Command>().is_err(), "{raw}");
        }
    }
}
