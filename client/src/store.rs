//! In-memory task list of the signed-in user, kept in step with the remote
//! repository through optimistic mutations.
//!
//! Every mutating call validates its input and applies the local change
//! before returning. The remote call happens inside the returned
//! [`PendingSync`] future; if it fails, the list is restored to the snapshot
//! taken just before the local change and the error is recorded in
//! [`TaskStore::last_error`] as well as returned.
//!
//! Snapshots are whole lists taken at call time. Two in-flight mutations of
//! the same task are not linearized: whichever rollback settles last wins.

use std::cell::{Ref, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use taskflow_shared::{
    sort_newest_first, Clock, SystemClock, Task, TaskDraft, TaskId, TaskPatch, TaskStats, UserId,
};
use tracing::{debug, info, warn};

use crate::{RepositoryError, StoreError, TaskRepository};

/// Remote half of a store operation. Resolves once the repository call has
/// settled and any rollback has been applied.
pub type PendingSync = Pin<Box<dyn Future<Output = Result<(), StoreError>>>>;

/// Cheaply clonable handle; clones share one task list.
pub struct TaskStore<R> {
    inner: Rc<Inner<R>>,
}

impl<R> Clone for TaskStore<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

struct Inner<R> {
    repo: R,
    clock: Box<dyn Clock>,
    state: RefCell<State>,
}

#[derive(Default)]
struct State {
    user: Option<UserId>,
    tasks: Vec<Task>,
    loads_in_flight: usize,
    last_error: Option<String>,
}

/// Task list as it was right before an optimistic mutation.
struct Snapshot {
    user: Option<UserId>,
    tasks: Vec<Task>,
}

impl<R: TaskRepository + 'static> TaskStore<R> {
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, SystemClock)
    }

    pub fn with_clock(repo: R, clock: impl Clock + 'static) -> Self {
        Self {
            inner: Rc::new(Inner {
                repo,
                clock: Box::new(clock),
                state: RefCell::new(State::default()),
            }),
        }
    }

    pub fn repository(&self) -> &R {
        &self.inner.repo
    }

    pub fn clock(&self) -> &dyn Clock {
        self.inner.clock.as_ref()
    }

    pub fn user(&self) -> Option<UserId> {
        self.inner.state.borrow().user.clone()
    }

    /// Current tasks, newest first. Do not hold the guard across an `.await`.
    pub fn tasks(&self) -> Ref<'_, [Task]> {
        Ref::map(self.inner.state.borrow(), |s| s.tasks.as_slice())
    }

    pub fn task(&self, id: &TaskId) -> Option<Task> {
        self.inner
            .state
            .borrow()
            .tasks
            .iter()
            .find(|t| &t.id == id)
            .cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loads_in_flight > 0
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.state.borrow().last_error.clone()
    }

    pub fn clear_error(&self) {
        self.inner.state.borrow_mut().last_error = None;
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::compute(&self.tasks(), self.clock())
    }

    /// Reacts to a change of the signed-in user: signing out clears the
    /// list, signing in (or re-authenticating) reloads it.
    pub fn set_user(&self, user: Option<UserId>) -> PendingSync {
        match user {
            Some(user) => self.load(user),
            None => {
                let mut state = self.inner.state.borrow_mut();
                state.user = None;
                state.tasks.clear();
                state.last_error = None;
                info!("signed out, task list cleared");
                Box::pin(async { Ok(()) })
            }
        }
    }

    /// Replaces the list with the remote list of `user`. On failure the
    /// previous list stays untouched. Results for a user who is no longer
    /// current are discarded.
    pub fn load(&self, user: UserId) -> PendingSync {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.user.as_ref() != Some(&user) {
                state.tasks.clear();
            }
            state.user = Some(user.clone());
            state.loads_in_flight += 1;
            state.last_error = None;
        }

        let inner = Rc::clone(&self.inner);
        Box::pin(async move {
            let result = inner.repo.list(&user).await;
            let mut state = inner.state.borrow_mut();
            state.loads_in_flight = state.loads_in_flight.saturating_sub(1);
            if state.user.as_ref() != Some(&user) {
                debug!(%user, "discarding task list of previous user");
                return Ok(());
            }
            match result {
                Ok(mut tasks) => {
                    sort_newest_first(&mut tasks);
                    info!(%user, count = tasks.len(), "tasks loaded");
                    state.tasks = tasks;
                    Ok(())
                }
                Err(err) => {
                    warn!(%user, error = %err, "task load failed");
                    Err(record(&mut state, err.into()))
                }
            }
        })
    }

    /// Creates a task from form input. Nothing is added locally until the
    /// server has assigned the id, then the returned record is inserted.
    pub fn add(&self, draft: TaskDraft) -> Result<PendingSync, StoreError> {
        let new_task = self
            .require_user()
            .and_then(|owner| Ok(draft.into_new_task(owner)?))
            .map_err(|err| self.surface(err))?;
        self.clear_error();

        let inner = Rc::clone(&self.inner);
        Ok(Box::pin(async move {
            let created = match inner.repo.create(&new_task).await {
                Ok(created) => created,
                Err(err) => {
                    warn!(error = %err, "task create failed");
                    return Err(record(&mut inner.state.borrow_mut(), err.into()));
                }
            };
            let task = new_task.into_task(created);
            let mut state = inner.state.borrow_mut();
            if state.user.as_ref() != Some(&task.user_id) {
                return Ok(());
            }
            if !state.tasks.iter().any(|t| t.id == task.id) {
                let at = state
                    .tasks
                    .iter()
                    .position(|t| t.created_at < task.created_at)
                    .unwrap_or(state.tasks.len());
                debug!(id = %task.id, "task created");
                state.tasks.insert(at, task);
            }
            Ok(())
        }))
    }

    /// Applies `patch` to the local task immediately, then sends it.
    pub fn update(&self, id: &TaskId, patch: TaskPatch) -> Result<PendingSync, StoreError> {
        let snapshot = self
            .apply_update(id, &patch)
            .map_err(|err| self.surface(err))?;
        debug!(%id, "optimistic update applied");

        let inner = Rc::clone(&self.inner);
        let id = id.clone();
        Ok(Box::pin(async move {
            match inner.repo.patch(&id, &patch).await {
                Ok(()) => Ok(()),
                Err(err) => Err(inner.roll_back(snapshot, &id, err)),
            }
        }))
    }

    /// Removes the local task immediately, then deletes it remotely.
    pub fn remove(&self, id: &TaskId) -> Result<PendingSync, StoreError> {
        let snapshot = self.apply_remove(id).map_err(|err| self.surface(err))?;
        debug!(%id, "optimistic removal applied");

        let inner = Rc::clone(&self.inner);
        let id = id.clone();
        Ok(Box::pin(async move {
            match inner.repo.delete(&id).await {
                Ok(()) => Ok(()),
                Err(err) => Err(inner.roll_back(snapshot, &id, err)),
            }
        }))
    }

    fn apply_update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Snapshot, StoreError> {
        patch.validate()?;
        self.require_user()?;
        let now = self.inner.clock.now();

        let mut state = self.inner.state.borrow_mut();
        let index = position(&state.tasks, id)?;
        let snapshot = Snapshot {
            user: state.user.clone(),
            tasks: state.tasks.clone(),
        };
        state.tasks[index].apply(patch, now);
        state.last_error = None;
        Ok(snapshot)
    }

    fn apply_remove(&self, id: &TaskId) -> Result<Snapshot, StoreError> {
        self.require_user()?;

        let mut state = self.inner.state.borrow_mut();
        let index = position(&state.tasks, id)?;
        let snapshot = Snapshot {
            user: state.user.clone(),
            tasks: state.tasks.clone(),
        };
        state.tasks.remove(index);
        state.last_error = None;
        Ok(snapshot)
    }

    fn require_user(&self) -> Result<UserId, StoreError> {
        self.user().ok_or(StoreError::NotAuthenticated)
    }

    fn surface(&self, err: StoreError) -> StoreError {
        record(&mut self.inner.state.borrow_mut(), err)
    }
}

impl<R> Inner<R> {
    fn roll_back(&self, snapshot: Snapshot, id: &TaskId, err: RepositoryError) -> StoreError {
        let mut state = self.state.borrow_mut();
        if state.user == snapshot.user {
            state.tasks = snapshot.tasks;
            warn!(%id, error = %err, "sync failed, local changes rolled back");
        } else {
            warn!(%id, error = %err, "sync failed after user change, nothing to roll back");
        }
        record(&mut state, err.into())
    }
}

fn position(tasks: &[Task], id: &TaskId) -> Result<usize, StoreError> {
    tasks
        .iter()
        .position(|t| &t.id == id)
        .ok_or_else(|| StoreError::NotFound(id.clone()))
}

fn record(state: &mut State, err: StoreError) -> StoreError {
    state.last_error = Some(err.to_string());
    err
}
