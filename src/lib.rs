//! Sistema de gestión de alquiler de vehículos
//!
//! Backend HTTP: los clientes navegan el catálogo, crean pedidos de
//! alquiler y envían comprobantes de pago; administradores y conductores
//! procesan los pedidos a través del pipeline de estados.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
pub mod workflow;
