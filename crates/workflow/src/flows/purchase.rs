use engine::{
    EngineError, EntityId, Ledger, NewPurchase, PurchaseUpdate, ResultEngine, calc,
};

use crate::{
    render::money,
    step::{
        ActionKind, ActiveWorkflow, CommitContext, Input, Progress, Skip, Step, WorkflowDef,
        amount, required_text, text,
    },
};

#[derive(Clone, Debug, Default)]
pub(crate) struct PurchaseDraft {
    /// Set when editing.
    id: Option<EntityId>,
    model: String,
    buy_price: i64,
    delivery_cost: i64,
    extra_cost: i64,
    purchase_debt: i64,
    notes: String,
}

impl PurchaseDraft {
    fn total_cost(&self) -> i64 {
        self.buy_price
            .saturating_add(self.delivery_cost)
            .saturating_add(self.extra_cost)
    }
}

pub(crate) fn start_new() -> Box<dyn ActiveWorkflow> {
    Progress::start(&NEW_PURCHASE, PurchaseDraft::default())
}

/// Edits an unsold purchase, starting from its current values.
pub(crate) fn start_edit(ledger: &Ledger, id: EntityId) -> ResultEngine<Box<dyn ActiveWorkflow>> {
    let purchase = ledger
        .purchase(id)
        .ok_or_else(|| EngineError::NotFound(format!("purchase #{id}")))?;
    if purchase.sold {
        return Err(EngineError::InvariantViolation(format!(
            "purchase #{id} is sold and can no longer be edited"
        )));
    }
    let draft = PurchaseDraft {
        id: Some(id),
        model: purchase.model.clone(),
        buy_price: purchase.buy_price,
        delivery_cost: purchase.delivery_cost,
        extra_cost: purchase.extra_cost,
        purchase_debt: purchase.purchase_debt,
        notes: purchase.notes.clone(),
    };
    Ok(Progress::start(&EDIT_PURCHASE, draft))
}

fn accept_model(draft: &mut PurchaseDraft, input: Input<'_>, _: &Ledger) -> ResultEngine<()> {
    draft.model = required_text(input, &draft.model, "model")?;
    Ok(())
}

fn accept_buy_price(draft: &mut PurchaseDraft, input: Input<'_>, _: &Ledger) -> ResultEngine<()> {
    draft.buy_price = amount(input, draft.buy_price)?;
    Ok(())
}

fn accept_delivery(draft: &mut PurchaseDraft, input: Input<'_>, _: &Ledger) -> ResultEngine<()> {
    draft.delivery_cost = amount(input, draft.delivery_cost)?;
    Ok(())
}

fn accept_extra(draft: &mut PurchaseDraft, input: Input<'_>, _: &Ledger) -> ResultEngine<()> {
    draft.extra_cost = amount(input, draft.extra_cost)?;
    Ok(())
}

fn accept_debt(draft: &mut PurchaseDraft, input: Input<'_>, ledger: &Ledger) -> ResultEngine<()> {
    let debt = amount(input, draft.purchase_debt)?;
    let total = draft.total_cost();
    if debt > total {
        return Err(EngineError::Validation(format!(
            "the debt ({}) cannot exceed the total cost ({})",
            money(debt, ""),
            money(total, "")
        )));
    }
    if let Some(id) = draft.id {
        let paid = calc::purchase_paid(ledger, id);
        if debt < paid {
            return Err(EngineError::Validation(format!(
                "{} was already paid against this debt; the debt cannot be lower",
                money(paid, "")
            )));
        }
    }
    draft.purchase_debt = debt;
    Ok(())
}

fn accept_notes(draft: &mut PurchaseDraft, input: Input<'_>, _: &Ledger) -> ResultEngine<()> {
    draft.notes = text(input, &draft.notes)?;
    Ok(())
}

fn current(value: &str) -> String {
    if value.is_empty() {
        "(empty)".to_string()
    } else {
        value.to_string()
    }
}

static NEW_STEPS: [Step<PurchaseDraft>; 6] = [
    Step {
        prompt: |_| "Model of the item?".to_string(),
        skip: None,
        accept: accept_model,
    },
    Step {
        prompt: |_| "Buy price?".to_string(),
        skip: None,
        accept: accept_buy_price,
    },
    Step {
        prompt: |_| "Delivery cost?".to_string(),
        skip: Some(Skip::Default),
        accept: accept_delivery,
    },
    Step {
        prompt: |_| "Other costs (repair, parts, ...)?".to_string(),
        skip: Some(Skip::Default),
        accept: accept_extra,
    },
    Step {
        prompt: |d| {
            format!(
                "Total cost is {}. How much of it is owed to the seller?",
                money(d.total_cost(), "")
            )
        },
        skip: Some(Skip::Default),
        accept: accept_debt,
    },
    Step {
        prompt: |_| "Notes?".to_string(),
        skip: Some(Skip::Default),
        accept: accept_notes,
    },
];

static EDIT_STEPS: [Step<PurchaseDraft>; 6] = [
    Step {
        prompt: |d| format!("Model? Current: {}", d.model),
        skip: Some(Skip::Keep),
        accept: accept_model,
    },
    Step {
        prompt: |d| format!("Buy price? Current: {}", money(d.buy_price, "")),
        skip: Some(Skip::Keep),
        accept: accept_buy_price,
    },
    Step {
        prompt: |d| format!("Delivery cost? Current: {}", money(d.delivery_cost, "")),
        skip: Some(Skip::Keep),
        accept: accept_delivery,
    },
    Step {
        prompt: |d| format!("Other costs? Current: {}", money(d.extra_cost, "")),
        skip: Some(Skip::Keep),
        accept: accept_extra,
    },
    Step {
        prompt: |d| {
            format!(
                "Total cost is now {}. Debt to the seller? Current: {}",
                money(d.total_cost(), ""),
                money(d.purchase_debt, "")
            )
        },
        skip: Some(Skip::Keep),
        accept: accept_debt,
    },
    Step {
        prompt: |d| format!("Notes? Current: {}", current(&d.notes)),
        skip: Some(Skip::Keep),
        accept: accept_notes,
    },
];

static NEW_PURCHASE: WorkflowDef<PurchaseDraft> = WorkflowDef {
    kind: ActionKind::NewPurchase,
    steps: &NEW_STEPS,
    commit: commit_new,
};

static EDIT_PURCHASE: WorkflowDef<PurchaseDraft> = WorkflowDef {
    kind: ActionKind::EditPurchase,
    steps: &EDIT_STEPS,
    commit: commit_edit,
};

fn commit_new(
    draft: &PurchaseDraft,
    ledger: &mut Ledger,
    ctx: &CommitContext<'_>,
) -> ResultEngine<String> {
    let cmd = NewPurchase::new(ctx.today, draft.model.clone(), draft.buy_price)
        .delivery_cost(draft.delivery_cost)
        .extra_cost(draft.extra_cost)
        .purchase_debt(draft.purchase_debt)
        .notes(draft.notes.clone());
    let id = ledger.create_purchase(cmd)?;
    Ok(receipt("✅ Purchase saved", id, draft, ctx.currency))
}

fn commit_edit(
    draft: &PurchaseDraft,
    ledger: &mut Ledger,
    ctx: &CommitContext<'_>,
) -> ResultEngine<String> {
    let id = draft
        .id
        .ok_or_else(|| EngineError::NotFound("purchase".to_string()))?;
    let cmd = PurchaseUpdate {
        model: draft.model.clone(),
        buy_price: draft.buy_price,
        delivery_cost: draft.delivery_cost,
        extra_cost: draft.extra_cost,
        purchase_debt: draft.purchase_debt,
        notes: draft.notes.clone(),
    };
    ledger.update_purchase(id, cmd)?;
    Ok(receipt("✅ Purchase updated", id, draft, ctx.currency))
}

fn receipt(title: &str, id: EntityId, draft: &PurchaseDraft, currency: &str) -> String {
    let total = draft.total_cost();
    format!(
        "{title} (#{id})\n\n📱 {}\n💵 Total cost: {}\n💳 Owed to seller: {}\n💸 Paid in cash: {}",
        draft.model,
        money(total, currency),
        money(draft.purchase_debt, currency),
        money(total - draft.purchase_debt, currency),
    )
}
