use std::{
    error::Error,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{
    BackupDocument, BackupKind, Dashboard, JsonFileStorage, LedgerStore, PartnerRoster,
    Transaction,
};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "ledger_admin")]
#[command(about = "Maintenance utilities for the ledger snapshot")]
struct Cli {
    /// Ledger snapshot file (also read from `LEDGER_DATA`).
    #[arg(long, env = "LEDGER_DATA", default_value = "ledger.json")]
    data: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every headline figure.
    Dashboard,
    /// Write a backup document.
    Export {
        #[arg(long, value_enum, default_value_t = Kind::Full)]
        kind: Kind,
        /// Defaults to the suggested backup file name.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Restore a backup document.
    Import { file: PathBuf },
    /// Write the transaction log as CSV.
    Transactions {
        #[arg(long)]
        out: PathBuf,
    },
    /// Remove every record.
    Clear {
        /// Skip the confirmation.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    Full,
    Inventory,
    InventoryDebt,
}

impl From<Kind> for BackupKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Full => BackupKind::Full,
            Kind::Inventory => BackupKind::Inventory,
            Kind::InventoryDebt => BackupKind::InventoryDebt,
        }
    }
}

/// One CSV line of the transaction log.
#[derive(Serialize)]
struct TransactionRow<'a> {
    id: u64,
    date: String,
    #[serde(rename = "type")]
    kind: &'a str,
    model: &'a str,
    amount: i64,
    debt: i64,
    profit: i64,
    description: &'a str,
}

impl<'a> From<&'a Transaction> for TransactionRow<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            id: tx.id,
            date: tx.date.format("%Y-%m-%d").to_string(),
            kind: tx.kind.as_str(),
            model: &tx.model,
            amount: tx.amount,
            debt: tx.debt,
            profit: tx.profit,
            description: &tx.description,
        }
    }
}

fn write_transactions<W: Write>(
    transactions: &[Transaction],
    out: W,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut writer = csv::Writer::from_writer(out);
    for tx in transactions {
        writer.serialize(TransactionRow::from(tx))?;
    }
    writer.flush()?;
    Ok(())
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Single keypress y/N. Anything but `y` declines.
fn confirm(prompt: &str) -> Result<bool, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        let answer = match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => false,
            KeyCode::Char('y' | 'Y') => true,
            _ => false,
        };
        execute!(out, Print(if answer { "y\r\n" } else { "n\r\n" }))?;
        out.flush()?;
        return Ok(answer);
    }
}

async fn open_store(path: &Path) -> LedgerStore {
    LedgerStore::builder()
        .storage(JsonFileStorage::new(path))
        .build()
        .await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let store = open_store(&cli.data).await;

    match cli.command {
        Command::Dashboard => {
            let ledger = store.snapshot().await;
            let dashboard = Dashboard::compute(&ledger, &PartnerRoster::default());
            println!("{}", serde_json::to_string_pretty(&dashboard)?);
        }
        Command::Export { kind, out } => {
            let ledger = store.snapshot().await;
            let document = ledger.export(kind.into(), Local::now().naive_local());
            let path = out.unwrap_or_else(|| PathBuf::from(document.file_name()));
            fs::write(&path, document.to_json()?)?;
            println!(
                "exported {} records to {}",
                document.item_count(),
                path.display()
            );
        }
        Command::Import { file } => {
            let document = BackupDocument::from_slice(&fs::read(&file)?)?;
            let today = Local::now().date_naive();
            let summary = store
                .mutate(move |ledger| ledger.restore(document, today))
                .await?;
            println!(
                "restored {} purchases and {} payments ({})",
                summary.purchases,
                summary.payments,
                summary.kind.label()
            );
        }
        Command::Transactions { out } => {
            let ledger = store.snapshot().await;
            write_transactions(ledger.transactions(), fs::File::create(&out)?)?;
            println!(
                "wrote {} transactions to {}",
                ledger.transactions().len(),
                out.display()
            );
        }
        Command::Clear { yes } => {
            if !yes && !confirm("Delete every record? [y/N] ")? {
                eprintln!("aborted");
                std::process::exit(1);
            }
            store
                .mutate(|ledger| {
                    ledger.clear();
                    Ok(())
                })
                .await?;
            println!("ledger cleared");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use engine::{Ledger, NewPurchase};

    use super::*;

    #[test]
    fn transactions_become_csv_rows() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut ledger = Ledger::default();
        ledger.set_capital(500, date).unwrap();
        ledger
            .create_purchase(NewPurchase::new(date, "A52, blue", 200))
            .unwrap();

        let mut out = Vec::new();
        write_transactions(ledger.transactions(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(
            lines[0],
            "id,date,type,model,amount,debt,profit,description"
        );
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains(",2026-03-01,capital,"));
        assert!(lines[2].contains("\"A52, blue\""));
    }

    #[test]
    fn kinds_map_to_backup_kinds() {
        assert_eq!(BackupKind::from(Kind::InventoryDebt), BackupKind::InventoryDebt);
        let cli = Cli::try_parse_from([
            "ledger_admin",
            "--data",
            "x.json",
            "export",
            "--kind",
            "inventory-debt",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Export {
                kind: Kind::InventoryDebt,
                out: None
            }
        ));
    }
}
