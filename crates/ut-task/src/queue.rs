//! An agent's ordered plan.

use std::collections::VecDeque;

use ut_core::{AgentId, Vec2I};

use crate::reservation::ReservationRegistry;
use crate::task::Task;

/// Ordered tasks owned by one agent.
///
/// Every mutation goes through the registry so reservations stay in step
/// with the queue: `push` registers the task's cell, `pop_front` and `clear`
/// release it first.  A cell is released only once no remaining task in
/// this queue names it.
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    owner: AgentId,
    tasks: VecDeque<Task>,
}

impl TaskQueue {
    pub fn new(owner: AgentId) -> Self {
        Self { owner, tasks: VecDeque::new() }
    }

    #[inline]
    pub fn owner(&self) -> AgentId {
        self.owner
    }

    pub fn push(&mut self, task: Task, reg: &mut ReservationRegistry) {
        if let Some(cell) = task.cell() {
            reg.register(cell, self.owner);
        }
        tracing::trace!(agent = %self.owner, task = task.name(), "push");
        self.tasks.push_back(task);
    }

    pub fn pop_front(&mut self, reg: &mut ReservationRegistry) -> Option<Task> {
        let task = self.tasks.pop_front()?;
        if let Some(cell) = task.cell() {
            self.release_if_unused(cell, reg);
        }
        Some(task)
    }

    pub fn clear(&mut self, reg: &mut ReservationRegistry) {
        for task in self.tasks.drain(..) {
            if let Some(cell) = task.cell() {
                reg.release(cell, self.owner);
            }
        }
    }

    #[inline]
    pub fn peek_front(&self) -> Option<&Task> {
        self.tasks.front()
    }

    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut Task> {
        self.tasks.front_mut()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// `true` if any queued task reserves `cell`.
    pub fn names_cell(&self, cell: Vec2I) -> bool {
        self.tasks.iter().any(|t| t.cell() == Some(cell))
    }

    fn release_if_unused(&self, cell: Vec2I, reg: &mut ReservationRegistry) {
        if !self.names_cell(cell) {
            reg.release(cell, self.owner);
        }
    }
}
