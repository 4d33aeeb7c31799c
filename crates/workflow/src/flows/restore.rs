use engine::{BackupDocument, BackupKind, EngineError, Ledger, ResultEngine};

use crate::step::{ActionKind, ActiveWorkflow, CommitContext, Input, Progress, Step, WorkflowDef};

#[derive(Clone, Debug, Default)]
pub(crate) struct RestoreDraft {
    document: Option<BackupDocument>,
}

pub(crate) fn start() -> Box<dyn ActiveWorkflow> {
    Progress::start(&RESTORE, RestoreDraft::default())
}

fn accept_file(draft: &mut RestoreDraft, input: Input<'_>, _: &Ledger) -> ResultEngine<()> {
    let Input::File(bytes) = input else {
        return Err(EngineError::Validation(
            "send the backup as a JSON file".to_string(),
        ));
    };
    draft.document = Some(BackupDocument::from_slice(bytes)?);
    Ok(())
}

static STEPS: [Step<RestoreDraft>; 1] = [Step {
    prompt: |_| {
        "Send the backup file (JSON).\n\
         A full backup only restores into an empty ledger; inventory backups add their items."
            .to_string()
    },
    skip: None,
    accept: accept_file,
}];

static RESTORE: WorkflowDef<RestoreDraft> = WorkflowDef {
    kind: ActionKind::Restore,
    steps: &STEPS,
    commit,
};

fn commit(draft: &RestoreDraft, ledger: &mut Ledger, ctx: &CommitContext<'_>) -> ResultEngine<String> {
    let document = draft
        .document
        .clone()
        .ok_or_else(|| EngineError::MalformedImport("no backup received".to_string()))?;
    let summary = ledger.restore(document, ctx.today)?;
    let text = match summary.kind {
        BackupKind::Full => format!(
            "✅ Full backup restored: {} purchases, {} sales.",
            ledger.purchases().len(),
            ledger.sales().len()
        ),
        BackupKind::Inventory => format!(
            "✅ Inventory restored: {} items added.",
            summary.purchases
        ),
        BackupKind::InventoryDebt => format!(
            "✅ Inventory restored: {} items added with {} debt payments.",
            summary.purchases, summary.payments
        ),
    };
    Ok(text)
}
