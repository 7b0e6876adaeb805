use crate::prelude::*;

/// Human readable label attached to every spawned entity
#[derive(Component, Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub label: String,
}
