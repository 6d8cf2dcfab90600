//! Webhook de pagos
//!
//! Al confirmarse un pago, el pedido se envía por POST al endpoint
//! configurado para disparar el envío de la factura por correo.
//! El envío es best-effort: un fallo se registra y nunca hace fallar
//! la transición que lo originó.

use reqwest::Client;
use serde_json::json;
use tracing::{info, warn};

use crate::models::order::Order;
use crate::models::user::User;

pub struct WebhookService {
    client: Client,
    endpoint: Option<String>,
}

impl WebhookService {
    pub fn new(client: Client, endpoint: Option<String>) -> Self {
        Self { client, endpoint }
    }

    /// Notificar el pago confirmado de un pedido. Nunca devuelve error.
    pub async fn notify_payment_success(&self, order: &Order, customer: &User) {
        let endpoint = match &self.endpoint {
            Some(url) => url,
            None => {
                info!("Webhook de facturas no configurado, se omite el envío");
                return;
            }
        };

        let payload = json!({
            "event": "payment_success",
            "order": order,
            "customer": {
                "full_name": customer.full_name,
                "email": customer.email,
            },
        });

        match self.client.post(endpoint).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                info!("Webhook de pago enviado para el pedido {}", order.id);
            }
            Ok(response) => {
                warn!(
                    "Webhook de pago respondió {} para el pedido {}",
                    response.status(),
                    order.id
                );
            }
            Err(e) => {
                warn!("Error enviando webhook de pago del pedido {}: {}", order.id, e);
            }
        }
    }
}
