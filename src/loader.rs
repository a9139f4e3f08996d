//! Data loading driven by the model.
//!
//! Each loop iteration asks which queries the current selection needs,
//! schedules them on the [`QueryClient`] and feeds finished ones back into
//! `update` as messages.

use std::time::Instant;

use crate::api::{Completed, QueryClient, QueryKey};
use crate::message::Message;
use crate::model::{Loadable, Model};
use crate::update::update;

/// Queries the model is waiting on that have not been started.
#[must_use]
pub fn wanted_queries(model: &Model) -> Vec<QueryKey> {
    let mut keys = Vec::new();
    if model.repositories.is_idle() {
        keys.push(QueryKey::Repositories);
    }
    if model.reviews.is_idle() {
        keys.push(QueryKey::Reviews(None));
    }
    if let Some(repo) = &model.selected_repo {
        if model.files.is_idle() {
            keys.push(QueryKey::Files(repo.clone()));
        }
    }
    if let Some(file) = &model.selected_file {
        if !model.upload_mode && model.diff.is_idle() {
            keys.push(QueryKey::Diff(file.clone()));
        }
    }
    keys
}

/// Keys behind everything currently on screen.
fn active_queries(model: &Model) -> Vec<QueryKey> {
    let mut keys = vec![QueryKey::Repositories, QueryKey::Reviews(None)];
    if let Some(repo) = &model.selected_repo {
        keys.push(QueryKey::Files(repo.clone()));
    }
    if let Some(file) = model.selected_file.as_ref().filter(|_| !model.upload_mode) {
        keys.push(QueryKey::Diff(file.clone()));
    }
    keys
}

/// Drop cached results for everything on screen and reset it to idle so
/// the next pass refetches.
fn reload(model: &mut Model, client: &mut QueryClient) {
    log::info!("Reloading review data");
    for key in active_queries(model) {
        client.invalidate(&key);
    }
    model.repositories = Loadable::Idle;
    model.reviews = Loadable::Idle;
    model.files = Loadable::Idle;
    model.diff = Loadable::Idle;
    model.reload_requested = false;
}

/// Start wanted queries and apply every result that is due at `now`.
pub fn drive_queries(model: &mut Model, client: &mut QueryClient, now: Instant) {
    if model.reload_requested {
        reload(model, client);
    }

    // A resolved query can make new ones wanted (e.g. a repository picked
    // before the list arrived), so loop until nothing changes.
    loop {
        let wanted = wanted_queries(model);
        let completed = {
            let mut ready = Vec::new();
            for key in wanted {
                update(model, Message::QueryStarted(key.clone()));
                if let Some(data) = client.fetch(key.clone(), now) {
                    ready.push(Completed {
                        key,
                        result: Ok(data),
                    });
                }
            }
            ready.extend(client.poll(now));
            ready
        };

        if completed.is_empty() {
            break;
        }
        for done in completed {
            update(model, Message::QueryResolved(done));
        }
    }
}
