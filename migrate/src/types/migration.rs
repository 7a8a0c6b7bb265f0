use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use mongodb::Database;

/// A unit of schema or data change run against the database.
///
/// Implemented for any `Fn(Database) -> impl Future<Output = anyhow::Result<()>>`, so plain
/// async closures can be registered directly:
///
/// ```ignore
/// Migration::new(1, "create users").with_up(|db: Database| async move {
///     db.create_collection("users", None).await?;
///     Ok(())
/// });
/// ```
#[async_trait]
pub trait MigrationAction: Send + Sync {
    async fn run(&self, db: &Database) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> MigrationAction for F
where
    F: Fn(Database) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn run(&self, db: &Database) -> anyhow::Result<()> {
        // Database is an Arc handle, cloning it is cheap.
        (self)(db.clone()).await
    }
}

/// Traversal direction of a migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
        }
    }
}

/// Which actions a [`Migration`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Both,
    ForwardOnly,
    BackwardOnly,
    None,
}

impl Capability {
    /// Whether a migration with this capability takes part in a traversal in `direction`.
    pub fn supports(self, direction: Direction) -> bool {
        match (self, direction) {
            (Capability::Both, _) => true,
            (Capability::ForwardOnly, Direction::Up) => true,
            (Capability::BackwardOnly, Direction::Down) => true,
            (Capability::ForwardOnly, Direction::Down)
            | (Capability::BackwardOnly, Direction::Up)
            | (Capability::None, _) => false,
        }
    }
}

/// A versioned migration with optional forward (`up`) and backward (`down`) actions.
///
/// Versions must be unique within a catalog. Registering two migrations with the same version
/// is not detected and leaves their relative order unspecified.
#[derive(Clone)]
pub struct Migration {
    pub version: u64,
    pub description: String,
    up: Option<Arc<dyn MigrationAction>>,
    down: Option<Arc<dyn MigrationAction>>,
}

impl Migration {
    pub fn new(version: u64, description: impl Into<String>) -> Self {
        Self { version, description: description.into(), up: None, down: None }
    }

    pub fn with_up(mut self, action: impl MigrationAction + 'static) -> Self {
        self.up = Some(Arc::new(action));
        self
    }

    pub fn with_down(mut self, action: impl MigrationAction + 'static) -> Self {
        self.down = Some(Arc::new(action));
        self
    }

    pub fn capability(&self) -> Capability {
        match (self.up.is_some(), self.down.is_some()) {
            (true, true) => Capability::Both,
            (true, false) => Capability::ForwardOnly,
            (false, true) => Capability::BackwardOnly,
            (false, false) => Capability::None,
        }
    }

    pub fn has_forward(&self) -> bool {
        self.up.is_some()
    }

    pub fn has_backward(&self) -> bool {
        self.down.is_some()
    }

    /// The action to run when traversing in `direction`, if any.
    pub fn action(&self, direction: Direction) -> Option<&dyn MigrationAction> {
        match direction {
            Direction::Up => self.up.as_deref(),
            Direction::Down => self.down.as_deref(),
        }
    }
}

impl fmt::Debug for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("version", &self.version)
            .field("description", &self.description)
            .field("capability", &self.capability())
            .finish()
    }
}
