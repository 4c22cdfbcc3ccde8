use crate::types::errors::ExecutorError;
use crate::types::plan::Action;

/// Performs the storage mutation (file move/delete, link-table update, version bookkeeping)
/// for one planned action.
pub trait ActionExecutor {
    /// Execute a single action.
    /// # Errors
    /// Returns an error if the storage mutation could not be completed.
    fn execute(&self, action: &Action) -> Result<(), ExecutorError>;
}

impl<T: ActionExecutor + ?Sized> ActionExecutor for Box<T> {
    fn execute(&self, action: &Action) -> Result<(), ExecutorError> {
        (**self).execute(action)
    }
}
