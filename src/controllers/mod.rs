//! Controllers
//!
//! Orquestación entre la capa HTTP, la máquina de estados y los
//! repositorios. Los controllers validan, ejecutan y persisten; nunca
//! contienen reglas de transición propias.

pub mod auth_controller;
pub mod driver_controller;
pub mod notification_controller;
pub mod order_controller;
pub mod vehicle_controller;
