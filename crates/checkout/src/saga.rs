//! Progress record for a single checkout attempt.

use common::OrderId;
use domain::ProductId;

/// A write that completed during a checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutStep {
    OrderCreated,
    LineItemsCreated,
    StockDecremented { product_id: ProductId, quantity: u32 },
}

impl CheckoutStep {
    /// Log label for the step.
    pub fn name(&self) -> &'static str {
        match self {
            CheckoutStep::OrderCreated => "create_order",
            CheckoutStep::LineItemsCreated => "create_line_items",
            CheckoutStep::StockDecremented { .. } => "decrement_stock",
        }
    }

    /// The action that undoes this step.
    ///
    /// Successful stock decrements are real inventory commitments and have no
    /// compensating action.
    pub fn compensation(&self) -> Option<CompensationAction> {
        match self {
            CheckoutStep::OrderCreated => Some(CompensationAction::DeleteOrder),
            CheckoutStep::LineItemsCreated => Some(CompensationAction::DeleteLineItems),
            CheckoutStep::StockDecremented { .. } => None,
        }
    }
}

/// A compensating delete issued during rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompensationAction {
    DeleteLineItems,
    DeleteOrder,
}

impl CompensationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompensationAction::DeleteLineItems => "delete_line_items",
            CompensationAction::DeleteOrder => "delete_order",
        }
    }
}

// NotStarted -> Running -> Completed
//                       -> Compensating -> Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    NotStarted,
    Running,
    Compensating,
    Completed,
    Failed,
}

/// Tracks the phase and completed steps of one checkout attempt.
///
/// The completed-step list drives rollback: compensation walks it in reverse
/// commit order.
#[derive(Debug, Clone)]
pub struct CheckoutSaga {
    order_id: OrderId,
    phase: Phase,
    completed_steps: Vec<CheckoutStep>,
}

impl CheckoutSaga {
    pub fn new(order_id: OrderId) -> Self {
        Self {
            order_id,
            phase: Phase::NotStarted,
            completed_steps: Vec::new(),
        }
    }

    /// Begins the write phases. Has no effect once started.
    pub fn start(&mut self) {
        if self.phase == Phase::NotStarted {
            self.phase = Phase::Running;
        }
    }

    /// Records a completed write.
    pub fn record(&mut self, step: CheckoutStep) {
        debug_assert_eq!(self.phase, Phase::Running);
        self.completed_steps.push(step);
    }

    /// Switches to compensation and returns the actions to run, newest
    /// first. Empty unless the saga is running.
    pub fn begin_compensation(&mut self) -> Vec<CompensationAction> {
        if self.phase != Phase::Running {
            return Vec::new();
        }
        self.phase = Phase::Compensating;
        self.completed_steps
            .iter()
            .rev()
            .filter_map(CheckoutStep::compensation)
            .collect()
    }

    pub fn finish_compensation(&mut self) {
        if self.phase == Phase::Compensating {
            self.phase = Phase::Failed;
        }
    }

    pub fn complete(&mut self) {
        if self.phase == Phase::Running {
            self.phase = Phase::Completed;
        }
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn completed_steps(&self) -> &[CheckoutStep] {
        &self.completed_steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_saga() -> CheckoutSaga {
        let mut saga = CheckoutSaga::new(OrderId::new());
        saga.start();
        saga
    }

    fn decremented(id: &str, quantity: u32) -> CheckoutStep {
        CheckoutStep::StockDecremented {
            product_id: ProductId::new(id),
            quantity,
        }
    }

    #[test]
    fn test_start_only_once() {
        let mut saga = CheckoutSaga::new(OrderId::new());
        assert_eq!(saga.phase, Phase::NotStarted);
        saga.start();
        saga.complete();
        saga.start();
        assert_eq!(saga.phase, Phase::Completed);
    }

    #[test]
    fn test_happy_path_records_steps_in_commit_order() {
        let mut saga = running_saga();
        saga.record(CheckoutStep::OrderCreated);
        saga.record(CheckoutStep::LineItemsCreated);
        saga.record(decremented("P1", 2));
        saga.complete();

        assert_eq!(saga.phase, Phase::Completed);
        let names: Vec<_> = saga.completed_steps().iter().map(CheckoutStep::name).collect();
        assert_eq!(names, ["create_order", "create_line_items", "decrement_stock"]);
    }

    #[test]
    fn test_compensation_runs_in_reverse_and_skips_stock() {
        let mut saga = running_saga();
        saga.record(CheckoutStep::OrderCreated);
        saga.record(CheckoutStep::LineItemsCreated);
        saga.record(decremented("P1", 1));

        let plan = saga.begin_compensation();
        assert_eq!(
            plan,
            vec![
                CompensationAction::DeleteLineItems,
                CompensationAction::DeleteOrder
            ]
        );
        assert_eq!(saga.phase, Phase::Compensating);

        saga.finish_compensation();
        assert_eq!(saga.phase, Phase::Failed);
    }

    #[test]
    fn test_compensation_after_order_only() {
        let mut saga = running_saga();
        saga.record(CheckoutStep::OrderCreated);
        assert_eq!(saga.begin_compensation(), vec![CompensationAction::DeleteOrder]);
    }

    #[test]
    fn test_compensation_with_no_writes_is_empty() {
        let mut saga = running_saga();
        assert!(saga.begin_compensation().is_empty());
        saga.finish_compensation();
        assert_eq!(saga.phase, Phase::Failed);
    }

    #[test]
    fn test_completed_saga_cannot_compensate() {
        let mut saga = running_saga();
        saga.record(CheckoutStep::OrderCreated);
        saga.complete();

        assert!(saga.begin_compensation().is_empty());
        assert_eq!(saga.phase, Phase::Completed);
    }
}
