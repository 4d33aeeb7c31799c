use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use engine::{BackupKind, Dashboard, EngineError, Ledger, LedgerStore, PartnerRoster, ResultEngine};

use crate::{
    Attachment, Command, Event, EventKind, RenderableReply, SessionId, flows,
    parsing::{is_cancel, is_skip},
    render,
    session::{Pending, Session, SessionStore},
    step::{ActiveWorkflow, CommitContext, Feed, Input},
};

pub const DEFAULT_CURRENCY_LABEL: &str = "Toman";

/// The transport-independent bot.
///
/// Feed it [`Event`]s, get [`RenderableReply`]s back. Cheap to clone; every
/// clone shares the ledger store and the sessions.
#[derive(Clone)]
pub struct Conversation {
    store: LedgerStore,
    roster: Arc<PartnerRoster>,
    sessions: SessionStore,
    timezone: Tz,
    currency: Arc<str>,
}

impl std::fmt::Debug for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversation")
            .field("timezone", &self.timezone)
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

impl Conversation {
    /// Return a builder for `Conversation`. Help to build the struct.
    pub fn builder(store: LedgerStore) -> ConversationBuilder {
        ConversationBuilder {
            store,
            roster: PartnerRoster::default(),
            timezone: Tz::UTC,
            currency: DEFAULT_CURRENCY_LABEL.to_string(),
        }
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn roster(&self) -> &PartnerRoster {
        &self.roster
    }

    /// `true` while the session is inside a workflow or a confirmation.
    pub async fn in_progress(&self, session: SessionId) -> bool {
        !self.sessions.is_idle(session).await
    }

    pub async fn handle(&self, event: Event) -> RenderableReply {
        let session = self.sessions.take(event.session).await;
        let (next, reply) = match event.kind {
            EventKind::Command(raw) => match raw.parse::<Command>() {
                Ok(command) => self.on_command(session, command).await,
                Err(err) => {
                    tracing::warn!("unknown command {raw:?}");
                    (session, render::render_error(&err))
                }
            },
            EventKind::Text(text) => self.on_text(session, &text).await,
            EventKind::File(bytes) => self.on_file(session, &bytes).await,
        };
        self.sessions.put(event.session, next).await;
        reply
    }

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.timezone).naive_local()
    }

    async fn on_command(&self, session: Session, command: Command) -> (Session, RenderableReply) {
        match command {
            Command::Cancel => {
                if session.is_idle() {
                    (Session::Idle, render::render_home())
                } else {
                    (Session::Idle, render::render_cancelled())
                }
            }
            Command::Confirm => match session {
                Session::Confirm(pending) => (Session::Idle, self.run_pending(pending).await),
                other => (
                    other,
                    RenderableReply::text("Nothing to confirm.")
                        .action("🏠 Menu", &Command::Home),
                ),
            },
            command => {
                if let Session::InStep(progress) = &session {
                    tracing::debug!(action = progress.kind().as_str(), "workflow abandoned");
                }
                match self.dispatch(command).await {
                    Ok(next) => next,
                    Err(err) => (Session::Idle, render::render_error(&err)),
                }
            }
        }
    }

    /// Every command except cancel and confirm. Starting anything abandons
    /// whatever the session was doing.
    async fn dispatch(&self, command: Command) -> ResultEngine<(Session, RenderableReply)> {
        let currency = &*self.currency;
        let ledger = self.store.snapshot().await;

        match command {
            Command::Home | Command::Cancel | Command::Confirm => idle(render::render_home()),
            Command::Help => idle(render::render_help()),
            Command::Dashboard => {
                let dashboard = Dashboard::compute(&ledger, &self.roster);
                idle(render::render_dashboard(&dashboard, currency))
            }

            Command::Buy => Ok(begin(flows::purchase::start_new())),
            Command::Sell => idle(render::render_sell_picker(&ledger, currency)),
            Command::SellItem(id) => Ok(begin(flows::sale::start_new(&ledger, id)?)),
            Command::Purchases => idle(render::render_purchases(&ledger, currency)),
            Command::Purchase(id) => {
                let purchase = require(ledger.purchase(id), "purchase", id)?;
                idle(render::render_purchase(&ledger, purchase, currency))
            }
            Command::EditPurchase(id) => {
                Ok(begin(flows::purchase::start_edit(&ledger, id)?))
            }
            Command::DeletePurchase(id) => {
                let purchase = require(ledger.purchase(id), "purchase", id)?;
                if purchase.sold {
                    return Err(EngineError::InvariantViolation(format!(
                        "purchase #{id} is sold; delete its sale first"
                    )));
                }
                Ok(confirm(
                    Pending::DeletePurchase(id),
                    &format!("Delete purchase #{id} ({})?", purchase.model),
                ))
            }

            Command::Sales => idle(render::render_sales(&ledger, currency)),
            Command::Sale(id) => {
                let sale = require(ledger.sale(id), "sale", id)?;
                idle(render::render_sale(&ledger, sale, currency))
            }
            Command::EditSale(id) => Ok(begin(flows::sale::start_edit(&ledger, id)?)),
            Command::DeleteSale(id) => {
                let sale = require(ledger.sale(id), "sale", id)?;
                Ok(confirm(
                    Pending::DeleteSale(id),
                    &format!(
                        "Delete sale #{id} ({})? The item goes back into the inventory.",
                        sale.model
                    ),
                ))
            }

            Command::Costs => idle(render::render_costs(&ledger, currency)),
            Command::NewCost => Ok(begin(flows::cost::start_new())),
            Command::Cost(id) => {
                let cost = require(ledger.cost(id), "cost", id)?;
                idle(render::render_cost(cost, currency))
            }
            Command::EditCost(id) => Ok(begin(flows::cost::start_edit(&ledger, id)?)),
            Command::DeleteCost(id) => {
                let cost = require(ledger.cost(id), "cost", id)?;
                if let Some(tx_id) = cost.partner_transaction_id {
                    return Err(EngineError::InvariantViolation(format!(
                        "cost #{id} belongs to partner transaction #{tx_id}; delete that instead"
                    )));
                }
                Ok(confirm(
                    Pending::DeleteCost(id),
                    &format!("Delete cost #{id} ({})?", cost.title),
                ))
            }

            Command::Transactions => idle(render::render_transactions(&ledger, currency)),

            Command::Partners => idle(render::render_partners(&self.roster)),
            Command::PartnerBalances => idle(render::render_partner_balances(
                &ledger,
                &self.roster,
                currency,
            )),
            Command::PartnerTransactions => idle(render::render_partner_transactions(
                &ledger,
                &self.roster,
                currency,
            )),
            Command::Partner(partner) => {
                self.roster.require(&partner)?;
                idle(render::render_partner_kinds(&self.roster, &partner))
            }
            Command::PartnerEntry(partner, kind) => {
                Ok(begin(flows::partner::start(&self.roster, partner, kind)?))
            }
            Command::DeletePartnerTransaction(id) => {
                let tx = require(ledger.partner_transaction(id), "partner transaction", id)?;
                Ok(confirm(
                    Pending::DeletePartnerTransaction(id),
                    &format!(
                        "Delete partner transaction #{id} ({}, {})?",
                        self.roster.display_name(&tx.partner),
                        tx.kind.label()
                    ),
                ))
            }

            Command::Debts => idle(render::render_debts()),
            Command::DebtStatus => idle(render::render_debt_status(&ledger, currency)),
            Command::PaySaleDebt => idle(render::render_pay_sale_picker(&ledger, currency)),
            Command::PaySale(id) => Ok(begin(flows::debt::start_sale_payment(&ledger, id)?)),
            Command::PayPurchaseDebt => {
                idle(render::render_pay_purchase_picker(&ledger, currency))
            }
            Command::PayPurchase(id) => {
                Ok(begin(flows::debt::start_purchase_payment(&ledger, id)?))
            }

            Command::Capital => Ok(begin(flows::capital::start(&ledger))),
            Command::Backup => idle(render::render_backup_menu()),
            Command::BackupOf(kind) => idle(self.backup(&ledger, kind)?),
            Command::Restore => Ok(begin(flows::restore::start())),
            Command::ClearAll => Ok(confirm(
                Pending::ClearAll,
                "Delete ALL data (purchases, sales, costs, partners, capital)? This cannot be undone.",
            )),
        }
    }

    fn backup(&self, ledger: &Ledger, kind: BackupKind) -> ResultEngine<RenderableReply> {
        let document = ledger.export(kind, self.now());
        let attachment = Attachment {
            file_name: document.file_name(),
            bytes: document.to_json()?,
        };
        tracing::info!(kind = kind.as_str(), items = document.item_count(), "backup exported");
        Ok(RenderableReply::text(format!(
            "💾 {} backup: {} items.",
            kind.label(),
            document.item_count()
        ))
        .attachment(attachment)
        .action("🏠 Menu", &Command::Home))
    }

    async fn on_text(&self, session: Session, text: &str) -> (Session, RenderableReply) {
        if is_cancel(text) {
            return self.on_command(session, Command::Cancel).await;
        }
        match session {
            Session::InStep(progress) => {
                let input = if is_skip(text) {
                    match progress.skip() {
                        Some(skip) => skip.input(),
                        None => {
                            let err = EngineError::Validation(
                                "this field is required and cannot be skipped".to_string(),
                            );
                            let reply = render::render_step_error(&err, progress.as_ref());
                            return (Session::InStep(progress), reply);
                        }
                    }
                } else {
                    Input::Text(text)
                };
                self.advance(progress, input).await
            }
            Session::Confirm(pending) => (
                Session::Confirm(pending),
                render::render_confirm("Please answer with the buttons below."),
            ),
            Session::Idle => (Session::Idle, render::render_home()),
        }
    }

    async fn on_file(&self, session: Session, bytes: &[u8]) -> (Session, RenderableReply) {
        match session {
            Session::InStep(progress) => self.advance(progress, Input::File(bytes)).await,
            other => (
                other,
                RenderableReply::text("Not expecting a file right now. Use ♻️ Restore first.")
                    .action("♻️ Restore", &Command::Restore),
            ),
        }
    }

    async fn advance(
        &self,
        mut progress: Box<dyn ActiveWorkflow>,
        input: Input<'_>,
    ) -> (Session, RenderableReply) {
        let ledger = self.store.snapshot().await;
        match progress.feed(input, &ledger) {
            Ok(Feed::Next) => {
                let reply = render::render_prompt(progress.as_ref());
                (Session::InStep(progress), reply)
            }
            Ok(Feed::Complete) => (Session::Idle, self.commit(progress.as_ref()).await),
            Err(err) if err.is_recoverable_input() => {
                let reply = render::render_step_error(&err, progress.as_ref());
                (Session::InStep(progress), reply)
            }
            Err(err) => {
                tracing::warn!(action = progress.kind().as_str(), "workflow aborted: {err}");
                (Session::Idle, render::render_error(&err))
            }
        }
    }

    async fn commit(&self, progress: &dyn ActiveWorkflow) -> RenderableReply {
        let ctx = CommitContext {
            today: self.today(),
            roster: &self.roster,
            currency: &self.currency,
        };
        let action = progress.kind().as_str();
        match self.store.mutate(|ledger| progress.commit(ledger, &ctx)).await {
            Ok(receipt) => {
                tracing::info!(action, "workflow committed");
                render::render_receipt(receipt)
            }
            Err(err) => {
                tracing::warn!(action, "workflow rejected: {err}");
                render::render_error(&err)
            }
        }
    }

    async fn run_pending(&self, pending: Pending) -> RenderableReply {
        let result = self
            .store
            .mutate(|ledger| match pending {
                Pending::DeletePurchase(id) => ledger
                    .delete_purchase(id)
                    .map(|p| format!("🗑 Purchase #{id} ({}) deleted.", p.model)),
                Pending::DeleteSale(id) => ledger.delete_sale(id).map(|s| {
                    format!(
                        "🗑 Sale #{id} ({}) deleted; the item is back in the inventory.",
                        s.model
                    )
                }),
                Pending::DeleteCost(id) => ledger
                    .delete_cost(id)
                    .map(|c| format!("🗑 Cost #{id} ({}) deleted.", c.title)),
                Pending::DeletePartnerTransaction(id) => ledger
                    .delete_partner_transaction(id)
                    .map(|_| format!("🗑 Partner transaction #{id} deleted.")),
                Pending::ClearAll => {
                    ledger.clear();
                    Ok("🗑 All data deleted.".to_string())
                }
            })
            .await;
        match result {
            Ok(text) => {
                tracing::info!(?pending, "confirmed action applied");
                render::render_receipt(text)
            }
            Err(err) => {
                tracing::warn!(?pending, "confirmed action rejected: {err}");
                render::render_error(&err)
            }
        }
    }
}

fn require<'a, T>(found: Option<&'a T>, what: &str, id: u64) -> ResultEngine<&'a T> {
    found.ok_or_else(|| EngineError::NotFound(format!("{what} #{id}")))
}

fn idle(reply: RenderableReply) -> ResultEngine<(Session, RenderableReply)> {
    Ok((Session::Idle, reply))
}

fn begin(progress: Box<dyn ActiveWorkflow>) -> (Session, RenderableReply) {
    let reply = render::render_prompt(progress.as_ref());
    (Session::InStep(progress), reply)
}

fn confirm(pending: Pending, question: &str) -> (Session, RenderableReply) {
    (Session::Confirm(pending), render::render_confirm(question))
}

/// The builder for `Conversation`
pub struct ConversationBuilder {
    store: LedgerStore,
    roster: PartnerRoster,
    timezone: Tz,
    currency: String,
}

impl ConversationBuilder {
    pub fn roster(mut self, roster: PartnerRoster) -> ConversationBuilder {
        self.roster = roster;
        self
    }

    /// Timezone used for "today" on new records and for backup timestamps.
    pub fn timezone(mut self, timezone: Tz) -> ConversationBuilder {
        self.timezone = timezone;
        self
    }

    pub fn currency_label(mut self, label: &str) -> ConversationBuilder {
        self.currency = label.trim().to_string();
        self
    }

    pub fn build(self) -> Conversation {
        Conversation {
            store: self.store,
            roster: Arc::new(self.roster),
            sessions: SessionStore::default(),
            timezone: self.timezone,
            currency: Arc::from(self.currency),
        }
    }
}
