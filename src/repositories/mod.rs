//! Acceso a datos
//!
//! Un repositorio por colección; SQL plano con binding en runtime.

pub mod notification_repository;
pub mod order_repository;
pub mod user_repository;
pub mod vehicle_repository;
pub mod verification_repository;
