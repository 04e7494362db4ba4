//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. A
/// membership or a capability set is a value object; an employee record,
/// which keeps its identity while its fields change, is an [`crate::Entity`].
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
