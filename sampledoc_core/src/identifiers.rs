use derive_more::Deref;
use derive_more::Display;
use serde::Deserialize;
use serde::Serialize;

/// Identifies one configured compilation context, e.g. `jvm` or `js`. Symbol
/// resolution is always scoped to exactly one source set.
#[derive(
	Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deref, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SourceSetId(String);

impl SourceSetId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}
}

impl From<&str> for SourceSetId {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

/// Documentation resource identifier: the stable address of a documented
/// symbol, such as `com.example/Greeter/greet/#kotlin.String/`.
#[derive(
	Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deref, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Dri(String);

impl Dri {
	pub fn new(address: impl Into<String>) -> Self {
		Self(address.into())
	}
}

impl From<&str> for Dri {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}
