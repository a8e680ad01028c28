//! SQL for each group of actor messages. Every function takes the pool (or an
//! open transaction) owned by the actor.

pub(super) mod account;
pub(super) mod catalog;
pub(super) mod maintenance;
pub(super) mod repository;
