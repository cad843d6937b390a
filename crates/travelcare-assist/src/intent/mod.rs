//! Intent classification of free-text chat messages.
//!
//! Maps a user utterance to exactly one [`Intent`](crate::types::Intent) by
//! ordered keyword matching.

pub mod keywords;
