use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{EngineError, EntityId, PartnerId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnerTxKind {
    CashWithdraw,
    CashDeposit,
    PersonalExpense,
    CompanyAssetUse,
    Other,
}

impl PartnerTxKind {
    pub const ALL: [PartnerTxKind; 5] = [
        Self::CashWithdraw,
        Self::CashDeposit,
        Self::PersonalExpense,
        Self::CompanyAssetUse,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CashWithdraw => "cash_withdraw",
            Self::CashDeposit => "cash_deposit",
            Self::PersonalExpense => "personal_expense",
            Self::CompanyAssetUse => "company_asset_use",
            Self::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::CashWithdraw => "Cash withdrawal",
            Self::CashDeposit => "Cash deposit",
            Self::PersonalExpense => "Personal expense for the company",
            Self::CompanyAssetUse => "Use of company assets",
            Self::Other => "Other",
        }
    }

    /// Sign applied to the amount in the partner's balance.
    ///
    /// Deposits and expenses paid out of pocket are owed back to the partner;
    /// withdrawals and asset use are owed to the company.
    pub fn balance_sign(self) -> i64 {
        match self {
            Self::CashDeposit | Self::PersonalExpense => 1,
            Self::CashWithdraw | Self::CompanyAssetUse => -1,
            Self::Other => 0,
        }
    }

    /// Sign applied to the amount in the company's cash balance.
    pub fn cash_sign(self) -> i64 {
        match self {
            Self::CashDeposit => 1,
            Self::CashWithdraw => -1,
            Self::PersonalExpense | Self::CompanyAssetUse | Self::Other => 0,
        }
    }
}

impl TryFrom<&str> for PartnerTxKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| EngineError::Validation(format!("invalid partner transaction type: {value}")))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerTransaction {
    pub id: EntityId,
    pub partner: PartnerId,
    #[serde(rename = "type")]
    pub kind: PartnerTxKind,
    pub amount: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
}

impl PartnerTransaction {
    /// Amount as it moves the partner's balance.
    pub fn signed_amount(&self) -> i64 {
        self.kind.balance_sign().saturating_mul(self.amount)
    }
}
