//! TaskKind - Cheap-to-clone task kind tag
//!
//! Uses Arc<str> internally so batches can be cloned into logs and metrics
//! labels without reallocating every kind string.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// Reserved kind that ends a task stream.
pub const SENTINEL_KIND: &str = "quit";

/// Task kind with cheap cloning.
///
/// # Examples
/// ```
/// use contracts::TaskKind;
///
/// let kind: TaskKind = "resize".into();
/// assert_eq!(kind, "resize");
/// assert!(!kind.is_sentinel());
/// assert!(TaskKind::from("QUIT").is_sentinel());
/// ```
#[derive(Clone, Default)]
pub struct TaskKind(Arc<str>);

impl TaskKind {
    /// Create a new TaskKind from a string slice.
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// The end-of-stream kind.
    #[inline]
    pub fn sentinel() -> Self {
        Self::new(SENTINEL_KIND)
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for `"quit"` in any ASCII case. Surrounding whitespace is not
    /// trimmed, so `" quit"` is an ordinary kind.
    #[inline]
    pub fn is_sentinel(&self) -> bool {
        self.0.eq_ignore_ascii_case(SENTINEL_KIND)
    }
}

impl Deref for TaskKind {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for TaskKind {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TaskKind {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskKind {
    #[inline]
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for TaskKind {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskKind({:?})", self.0)
    }
}

impl PartialEq for TaskKind {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for TaskKind {}

impl PartialEq<str> for TaskKind {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for TaskKind {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl Hash for TaskKind {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl Serialize for TaskKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TaskKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}
