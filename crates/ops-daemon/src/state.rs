// state.rs — Shared handler state.

use ops_discussion::DiscussionService;
use ops_store::Store;
use ops_workflow::WorkflowEngine;

/// Everything a request handler can reach. Cheap to clone: the store is a
/// pool handle and the services hold only handles themselves.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub engine: WorkflowEngine,
    pub discussion: DiscussionService,
}
