//! Cross-crate integration flows.

pub mod fixtures;

#[cfg(test)]
mod consistency;
#[cfg(test)]
mod dispatch;
#[cfg(test)]
mod lifecycle;
