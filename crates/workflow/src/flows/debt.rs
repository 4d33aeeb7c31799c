use engine::{DebtPaymentNew, EngineError, EntityId, Ledger, ResultEngine, calc};

use crate::{
    render::money,
    step::{
        ActionKind, ActiveWorkflow, CommitContext, Input, Progress, Skip, Step, WorkflowDef,
        positive_amount, text,
    },
};

/// A payment against a sale debt (customer pays) or a purchase debt
/// (we pay the seller). `target` is the sale or purchase id.
#[derive(Clone, Debug, Default)]
pub(crate) struct PaymentDraft {
    target: EntityId,
    model: String,
    outstanding: i64,
    amount: i64,
    notes: String,
}

pub(crate) fn start_sale_payment(
    ledger: &Ledger,
    sale_id: EntityId,
) -> ResultEngine<Box<dyn ActiveWorkflow>> {
    let sale = ledger
        .sale(sale_id)
        .ok_or_else(|| EngineError::NotFound(format!("sale #{sale_id}")))?;
    let outstanding = calc::sale_outstanding(ledger, sale);
    if outstanding == 0 {
        return Err(EngineError::InvariantViolation(format!(
            "sale #{sale_id} has no outstanding debt"
        )));
    }
    let draft = PaymentDraft {
        target: sale_id,
        model: sale.model.clone(),
        outstanding,
        ..PaymentDraft::default()
    };
    Ok(Progress::start(&PAY_SALE, draft))
}

pub(crate) fn start_purchase_payment(
    ledger: &Ledger,
    purchase_id: EntityId,
) -> ResultEngine<Box<dyn ActiveWorkflow>> {
    let purchase = ledger
        .purchase(purchase_id)
        .ok_or_else(|| EngineError::NotFound(format!("purchase #{purchase_id}")))?;
    let outstanding = calc::purchase_outstanding(ledger, purchase);
    if outstanding == 0 {
        return Err(EngineError::InvariantViolation(format!(
            "purchase #{purchase_id} has no outstanding debt"
        )));
    }
    let draft = PaymentDraft {
        target: purchase_id,
        model: purchase.model.clone(),
        outstanding,
        ..PaymentDraft::default()
    };
    Ok(Progress::start(&PAY_PURCHASE, draft))
}

fn check_amount(draft: &mut PaymentDraft, input: Input<'_>, outstanding: i64) -> ResultEngine<()> {
    let value = positive_amount(input, draft.amount, "the payment")?;
    if value > outstanding {
        return Err(EngineError::Validation(format!(
            "the payment ({}) exceeds the outstanding debt ({})",
            money(value, ""),
            money(outstanding, "")
        )));
    }
    draft.outstanding = outstanding;
    draft.amount = value;
    Ok(())
}

fn accept_sale_amount(draft: &mut PaymentDraft, input: Input<'_>, ledger: &Ledger) -> ResultEngine<()> {
    let sale = ledger
        .sale(draft.target)
        .ok_or_else(|| EngineError::NotFound(format!("sale #{}", draft.target)))?;
    let outstanding = calc::sale_outstanding(ledger, sale);
    check_amount(draft, input, outstanding)
}

fn accept_purchase_amount(
    draft: &mut PaymentDraft,
    input: Input<'_>,
    ledger: &Ledger,
) -> ResultEngine<()> {
    let purchase = ledger
        .purchase(draft.target)
        .ok_or_else(|| EngineError::NotFound(format!("purchase #{}", draft.target)))?;
    let outstanding = calc::purchase_outstanding(ledger, purchase);
    check_amount(draft, input, outstanding)
}

fn accept_notes(draft: &mut PaymentDraft, input: Input<'_>, _: &Ledger) -> ResultEngine<()> {
    draft.notes = text(input, &draft.notes)?;
    Ok(())
}

static SALE_STEPS: [Step<PaymentDraft>; 2] = [
    Step {
        prompt: |d| {
            format!(
                "{}: the customer owes {}. Amount received?",
                d.model,
                money(d.outstanding, "")
            )
        },
        skip: None,
        accept: accept_sale_amount,
    },
    Step {
        prompt: |_| "Notes?".to_string(),
        skip: Some(Skip::Default),
        accept: accept_notes,
    },
];

static PURCHASE_STEPS: [Step<PaymentDraft>; 2] = [
    Step {
        prompt: |d| {
            format!(
                "{}: we owe the seller {}. Amount paid?",
                d.model,
                money(d.outstanding, "")
            )
        },
        skip: None,
        accept: accept_purchase_amount,
    },
    Step {
        prompt: |_| "Notes?".to_string(),
        skip: Some(Skip::Default),
        accept: accept_notes,
    },
];

static PAY_SALE: WorkflowDef<PaymentDraft> = WorkflowDef {
    kind: ActionKind::PaySaleDebt,
    steps: &SALE_STEPS,
    commit: commit_sale,
};

static PAY_PURCHASE: WorkflowDef<PaymentDraft> = WorkflowDef {
    kind: ActionKind::PayPurchaseDebt,
    steps: &PURCHASE_STEPS,
    commit: commit_purchase,
};

fn payment(draft: &PaymentDraft, ctx: &CommitContext<'_>) -> DebtPaymentNew {
    DebtPaymentNew::new(ctx.today, draft.target, draft.amount).notes(draft.notes.clone())
}

fn commit_sale(draft: &PaymentDraft, ledger: &mut Ledger, ctx: &CommitContext<'_>) -> ResultEngine<String> {
    ledger.pay_sale_debt(payment(draft, ctx))?;
    let ledger = &*ledger;
    let left = ledger
        .sale(draft.target)
        .map(|sale| calc::sale_outstanding(ledger, sale))
        .unwrap_or_default();
    Ok(format!(
        "✅ Payment received\n\n📱 {}\n💵 Received: {}\n⏳ Still owed: {}",
        draft.model,
        money(draft.amount, ctx.currency),
        money(left, ctx.currency)
    ))
}

fn commit_purchase(
    draft: &PaymentDraft,
    ledger: &mut Ledger,
    ctx: &CommitContext<'_>,
) -> ResultEngine<String> {
    ledger.pay_purchase_debt(payment(draft, ctx))?;
    let ledger = &*ledger;
    let left = ledger
        .purchase(draft.target)
        .map(|purchase| calc::purchase_outstanding(ledger, purchase))
        .unwrap_or_default();
    Ok(format!(
        "✅ Payment to the seller recorded\n\n📱 {}\n💸 Paid: {}\n⏳ Still owed: {}",
        draft.model,
        money(draft.amount, ctx.currency),
        money(left, ctx.currency)
    ))
}
