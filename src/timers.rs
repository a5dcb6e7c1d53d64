use crate::Error;
use crate::dom::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerAction {
    DismissAlert(NodeId),
}

#[derive(Debug, Clone)]
pub(crate) struct ScheduledTask {
    pub(crate) id: i64,
    pub(crate) due_at: i64,
    pub(crate) order: i64,
    pub(crate) action: TimerAction,
}

/// Snapshot of a queued timer, as returned by [`Page::pending_timers`](crate::Page::pending_timers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: i64,
    pub due_at: i64,
    pub order: i64,
}

#[derive(Debug)]
pub(crate) struct Scheduler {
    pub(crate) now_ms: i64,
    pub(crate) task_queue: Vec<ScheduledTask>,
    pub(crate) timer_step_limit: usize,
    next_timer_id: i64,
    next_task_order: i64,
}

impl Scheduler {
    pub(crate) fn new(start_ms: i64, timer_step_limit: usize) -> Self {
        Self {
            now_ms: start_ms,
            task_queue: Vec::new(),
            timer_step_limit: timer_step_limit.max(1),
            next_timer_id: 1,
            next_task_order: 0,
        }
    }

    /// Queues `action` to run `delay_ms` from now and returns the timer id.
    pub(crate) fn schedule(&mut self, delay_ms: i64, action: TimerAction) -> i64 {
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        let order = self.allocate_task_order();
        let due_at = self.now_ms.saturating_add(delay_ms.max(0));
        self.task_queue.push(ScheduledTask {
            id,
            due_at,
            order,
            action,
        });
        id
    }

    fn allocate_task_order(&mut self) -> i64 {
        let order = self.next_task_order;
        self.next_task_order += 1;
        order
    }

    pub(crate) fn pending(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .task_queue
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    pub(crate) fn next_task_index(&self, due_limit: Option<i64>) -> Option<usize> {
        self.task_queue
            .iter()
            .enumerate()
            .filter(|(_, task)| due_limit.is_none_or(|limit| task.due_at <= limit))
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }

    /// Removes and returns the next task due by `due_limit` (any task when `None`).
    pub(crate) fn pop_next(&mut self, due_limit: Option<i64>) -> Option<ScheduledTask> {
        let idx = self.next_task_index(due_limit)?;
        Some(self.task_queue.remove(idx))
    }

    pub(crate) fn clear(&mut self) -> usize {
        let cleared = self.task_queue.len();
        self.task_queue.clear();
        cleared
    }

    pub(crate) fn step_limit_error(&self, steps: usize, due_limit: Option<i64>) -> Error {
        let due_limit_desc = due_limit
            .map(|value| value.to_string())
            .unwrap_or_else(|| "none".into());

        let next_task_desc = self
            .next_task_index(due_limit)
            .and_then(|idx| self.task_queue.get(idx))
            .map(|task| {
                format!(
                    "id={},due_at={},order={}",
                    task.id, task.due_at, task.order
                )
            })
            .unwrap_or_else(|| "none".into());

        Error::Timer(format!(
            "timer queue exceeded max task steps: limit={}, steps={steps}, now_ms={}, due_limit={}, pending_tasks={}, next_task={}",
            self.timer_step_limit,
            self.now_ms,
            due_limit_desc,
            self.task_queue.len(),
            next_task_desc
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_due_times_run_in_scheduling_order() {
        let mut scheduler = Scheduler::new(1_000, 10);
        let late = scheduler.schedule(50, TimerAction::DismissAlert(NodeId(1)));
        let first = scheduler.schedule(10, TimerAction::DismissAlert(NodeId(2)));
        let second = scheduler.schedule(10, TimerAction::DismissAlert(NodeId(3)));

        let pending = scheduler.pending();
        assert_eq!(
            pending.iter().map(|timer| timer.id).collect::<Vec<_>>(),
            vec![first, second, late]
        );
        assert_eq!(pending[0].due_at, 1_010);

        assert_eq!(scheduler.pop_next(Some(1_005)).map(|t| t.id), None);
        assert_eq!(scheduler.pop_next(Some(1_010)).map(|t| t.id), Some(first));
        assert_eq!(scheduler.pop_next(None).map(|t| t.id), Some(second));
        assert_eq!(scheduler.pop_next(None).map(|t| t.id), Some(late));
        assert!(scheduler.pop_next(None).is_none());
    }

    #[test]
    fn negative_delay_is_clamped_to_now() {
        let mut scheduler = Scheduler::new(500, 10);
        scheduler.schedule(-20, TimerAction::DismissAlert(NodeId(4)));
        assert_eq!(scheduler.pending()[0].due_at, 500);
        assert_eq!(scheduler.clear(), 1);
        assert!(scheduler.pending().is_empty());
    }

    #[test]
    fn step_limit_error_describes_queue() {
        let mut scheduler = Scheduler::new(0, 1);
        scheduler.schedule(5, TimerAction::DismissAlert(NodeId(4)));
        let err = scheduler.step_limit_error(2, None);
        let Error::Timer(message) = err else {
            panic!("expected timer error");
        };
        assert!(message.contains("limit=1"));
        assert!(message.contains("next_task=id=1,due_at=5,order=0"));
    }
}
