//! Persistence operations.

use tastypie_client::RequestMethod;

/// A single persistence operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Create a new resource (POST to the list endpoint).
    Create,
    /// Read a resource or a list (GET).
    Read,
    /// Replace a resource (PUT).
    Update,
    /// Partially update a resource (PATCH).
    Patch,
    /// Delete a resource (DELETE).
    Delete,
}

impl Operation {
    /// The HTTP method this operation maps to.
    pub fn method(&self) -> RequestMethod {
        match self {
            Operation::Create => RequestMethod::Post,
            Operation::Read => RequestMethod::Get,
            Operation::Update => RequestMethod::Put,
            Operation::Patch => RequestMethod::Patch,
            Operation::Delete => RequestMethod::Delete,
        }
    }

    /// Returns true if the request carries the resource's state as its body.
    pub fn sends_body(&self) -> bool {
        matches!(self, Operation::Create | Operation::Update | Operation::Patch)
    }

    /// Lowercase name of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Patch => "patch",
            Operation::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
