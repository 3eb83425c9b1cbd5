// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Status workflows: an ordered list of `from -> to` transitions per record
//! type, and the single action button derived from the current status.

use crate::model::{
    AssignmentKind, AssignmentStatus, PurchaseOrderStatus, ReceivingStatus, TransferStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowTransition<S: 'static> {
    pub from: S,
    pub to: S,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Workflow<S: 'static> {
    transitions: &'static [WorkflowTransition<S>],
}

impl<S: Copy + PartialEq> Workflow<S> {
    pub const fn new(transitions: &'static [WorkflowTransition<S>]) -> Self {
        Self { transitions }
    }

    pub fn transitions(&self) -> &'static [WorkflowTransition<S>] {
        self.transitions
    }

    /// First transition whose `from` matches `current`.
    pub fn available(&self, current: S) -> Option<&'static WorkflowTransition<S>> {
        self.transitions
            .iter()
            .find(|transition| transition.from == current)
    }

    pub fn is_terminal(&self, current: S) -> bool {
        self.available(current).is_none()
    }

    pub fn allows(&self, from: S, to: S) -> bool {
        self.available(from)
            .is_some_and(|transition| transition.to == to)
    }

    /// Button for a record in `current` status. Unassigned records and
    /// terminal statuses get no action.
    pub fn button(&self, current: S, is_assigned: bool) -> WorkflowButton<S> {
        match self.available(current) {
            Some(transition) if is_assigned => WorkflowButton::Action {
                label: transition.label,
                to: transition.to,
            },
            _ => WorkflowButton::Disabled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowButton<S> {
    Action { label: &'static str, to: S },
    Disabled,
}

impl<S> WorkflowButton<S> {
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Self::Action { label, .. } => Some(label),
            Self::Disabled => None,
        }
    }

    pub fn target(&self) -> Option<&S> {
        match self {
            Self::Action { to, .. } => Some(to),
            Self::Disabled => None,
        }
    }

    /// Hands the target status to `on_transition` exactly once. The callback
    /// result (a `Result`, a future, anything) is returned untouched so the
    /// caller owns error handling and retries.
    pub fn press<T>(self, on_transition: impl FnOnce(S) -> T) -> Option<T> {
        match self {
            Self::Action { to, .. } => Some(on_transition(to)),
            Self::Disabled => None,
        }
    }
}

pub const PICKER_WORKFLOW: Workflow<AssignmentStatus> = Workflow::new(&[
    WorkflowTransition {
        from: AssignmentStatus::Pending,
        to: AssignmentStatus::Picking,
        label: "Start picking",
    },
    WorkflowTransition {
        from: AssignmentStatus::Picking,
        to: AssignmentStatus::Picked,
        label: "Complete picking",
    },
]);

pub const CHECKER_WORKFLOW: Workflow<AssignmentStatus> = Workflow::new(&[
    WorkflowTransition {
        from: AssignmentStatus::Pending,
        to: AssignmentStatus::Checking,
        label: "Start checking",
    },
    WorkflowTransition {
        from: AssignmentStatus::Checking,
        to: AssignmentStatus::Checked,
        label: "Mark checked",
    },
]);

pub const TAGGER_WORKFLOW: Workflow<AssignmentStatus> = Workflow::new(&[
    WorkflowTransition {
        from: AssignmentStatus::Pending,
        to: AssignmentStatus::Tagging,
        label: "Start tagging",
    },
    WorkflowTransition {
        from: AssignmentStatus::Tagging,
        to: AssignmentStatus::Tagged,
        label: "Mark tagged",
    },
]);

pub const TRANSFER_WORKFLOW: Workflow<TransferStatus> = Workflow::new(&[
    WorkflowTransition {
        from: TransferStatus::Pending,
        to: TransferStatus::InTransit,
        label: "Dispatch",
    },
    WorkflowTransition {
        from: TransferStatus::InTransit,
        to: TransferStatus::Completed,
        label: "Complete",
    },
]);

pub const RECEIVING_WORKFLOW: Workflow<ReceivingStatus> = Workflow::new(&[
    WorkflowTransition {
        from: ReceivingStatus::Draft,
        to: ReceivingStatus::Received,
        label: "Receive",
    },
    WorkflowTransition {
        from: ReceivingStatus::Received,
        to: ReceivingStatus::Inspected,
        label: "Inspect",
    },
    WorkflowTransition {
        from: ReceivingStatus::Inspected,
        to: ReceivingStatus::Approved,
        label: "Approve",
    },
]);

pub const PURCHASE_ORDER_WORKFLOW: Workflow<PurchaseOrderStatus> = Workflow::new(&[
    WorkflowTransition {
        from: PurchaseOrderStatus::Draft,
        to: PurchaseOrderStatus::Submitted,
        label: "Submit",
    },
    WorkflowTransition {
        from: PurchaseOrderStatus::Submitted,
        to: PurchaseOrderStatus::Approved,
        label: "Approve",
    },
    WorkflowTransition {
        from: PurchaseOrderStatus::Approved,
        to: PurchaseOrderStatus::Received,
        label: "Mark received",
    },
]);

pub const fn assignment_workflow(kind: AssignmentKind) -> Workflow<AssignmentStatus> {
    match kind {
        AssignmentKind::Picker => PICKER_WORKFLOW,
        AssignmentKind::Checker => CHECKER_WORKFLOW,
        AssignmentKind::Tagger => TAGGER_WORKFLOW,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CHECKER_WORKFLOW, PICKER_WORKFLOW, RECEIVING_WORKFLOW, TRANSFER_WORKFLOW, Workflow,
        WorkflowButton, WorkflowTransition, assignment_workflow,
    };
    use crate::model::{AssignmentKind, AssignmentStatus, ReceivingStatus, TransferStatus};
    use std::cell::Cell;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Step {
        A,
        B,
        C,
    }

    const STEPS: Workflow<Step> = Workflow::new(&[
        WorkflowTransition {
            from: Step::A,
            to: Step::B,
            label: "to B",
        },
        WorkflowTransition {
            from: Step::B,
            to: Step::C,
            label: "to C",
        },
    ]);

    #[test]
    fn button_follows_current_status() {
        assert_eq!(
            STEPS.button(Step::A, true),
            WorkflowButton::Action {
                label: "to B",
                to: Step::B,
            }
        );
        assert_eq!(
            STEPS.button(Step::B, true),
            WorkflowButton::Action {
                label: "to C",
                to: Step::C,
            }
        );
        assert_eq!(STEPS.button(Step::C, true), WorkflowButton::Disabled);
        assert!(STEPS.is_terminal(Step::C));
    }

    #[test]
    fn unassigned_records_get_no_action() {
        assert_eq!(STEPS.button(Step::A, false), WorkflowButton::Disabled);
    }

    #[test]
    fn first_matching_transition_wins() {
        const BRANCHING: Workflow<Step> = Workflow::new(&[
            WorkflowTransition {
                from: Step::A,
                to: Step::C,
                label: "skip",
            },
            WorkflowTransition {
                from: Step::A,
                to: Step::B,
                label: "step",
            },
        ]);
        assert_eq!(BRANCHING.button(Step::A, true).label(), Some("skip"));
        assert!(!BRANCHING.allows(Step::A, Step::B));
    }

    #[test]
    fn press_invokes_callback_once_with_target() {
        let calls = Cell::new(0);
        let result = STEPS.button(Step::A, true).press(|to| {
            calls.set(calls.get() + 1);
            to
        });
        assert_eq!(result, Some(Step::B));
        assert_eq!(calls.get(), 1);

        let skipped = STEPS.button(Step::C, true).press(|to| {
            calls.set(calls.get() + 1);
            to
        });
        assert_eq!(skipped, None);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn callback_errors_propagate_to_the_caller() {
        let outcome = STEPS
            .button(Step::A, true)
            .press(|_| Err::<(), _>(anyhow::anyhow!("backend down")));
        match outcome {
            Some(Err(error)) => assert_eq!(error.to_string(), "backend down"),
            other => panic!("expected callback error, got {other:?}"),
        }
    }

    #[test]
    fn warehouse_workflows_chain_to_terminal_status() {
        let picker = assignment_workflow(AssignmentKind::Picker);
        assert_eq!(picker, PICKER_WORKFLOW);
        assert_eq!(
            picker.button(AssignmentStatus::Pending, true).label(),
            Some("Start picking")
        );
        assert!(picker.is_terminal(AssignmentStatus::Picked));
        assert_eq!(
            CHECKER_WORKFLOW.button(AssignmentStatus::Checking, true).target(),
            Some(&AssignmentStatus::Checked)
        );

        assert!(TRANSFER_WORKFLOW.allows(TransferStatus::Pending, TransferStatus::InTransit));
        assert!(TRANSFER_WORKFLOW.is_terminal(TransferStatus::Cancelled));

        let mut status = ReceivingStatus::Draft;
        let mut steps = 0;
        while let Some(next) = RECEIVING_WORKFLOW.button(status, true).press(|to| to) {
            status = next;
            steps += 1;
        }
        assert_eq!(status, ReceivingStatus::Approved);
        assert_eq!(steps, 3);
    }
}
