//! Domain logic

pub mod notification;
