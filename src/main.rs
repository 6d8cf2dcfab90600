use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use rental_management::config::environment::EnvironmentConfig;
use rental_management::database::DatabaseConnection;
use rental_management::routes::create_app;
use rental_management::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚗 Rental Management - Sistema de alquiler de vehículos");
    info!("======================================================");

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let pool = db_connection.pool().clone();

    let config = EnvironmentConfig::from_env();
    let port = config.port;
    let app_state = AppState::new(pool, config);
    let app = create_app(app_state);

    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("👤 Auth:");
    info!("   POST /api/auth/register - Registrar usuario");
    info!("   POST /api/auth/login - Login");
    info!("   GET  /api/auth/me - Perfil actual");
    info!("   POST /api/auth/verification - Enviar documento de identidad");
    info!("   GET  /api/auth/verification/pending - Verificaciones pendientes (admin)");
    info!("   POST /api/auth/verification/:user_id/review - Resolver verificación (admin)");
    info!("🚙 Vehicle:");
    info!("   GET  /api/vehicle - Catálogo de vehículos");
    info!("   GET  /api/vehicle/:id - Detalle de vehículo");
    info!("   POST /api/vehicle - Crear vehículo (admin)");
    info!("   PUT  /api/vehicle/:id - Actualizar vehículo (admin)");
    info!("   DELETE /api/vehicle/:id - Eliminar vehículo (admin)");
    info!("   POST /api/vehicle/:id/check - Reporte de condición (conductor)");
    info!("📋 Order:");
    info!("   POST /api/order - Crear pedido");
    info!("   GET  /api/order - Listar pedidos");
    info!("   GET  /api/order/:id - Detalle de pedido");
    info!("   POST /api/order/:id/approve|reject - Resolver solicitud (admin)");
    info!("   POST /api/order/:id/payment-proof - Enviar comprobante del anticipo");
    info!("   POST /api/order/:id/cash-request|cash-approve|cash-reject - Flujo de efectivo");
    info!("   POST /api/order/:id/confirm-payment|complete|fully-paid - Cierre (admin)");
    info!("   POST /api/order/:id/balance-proof|balance-approve|balance-reject - Saldo restante");
    info!("   POST /api/order/:id/edit-request|edit-approve|edit-reject|edit-apply - Cambio de fechas");
    info!("   POST /api/order/:id/cancel - Cancelar pedido");
    info!("   POST /api/order/:id/assign-driver - Asignar conductor (admin)");
    info!("   GET  /api/order/:id/invoice/:kind - Factura (down_payment|full_payment|driver_copy)");
    info!("   GET  /api/order/:id/verifications - Historial de comprobantes (admin)");
    info!("🔔 Notification:");
    info!("   GET  /api/notification - Buzón del usuario");
    info!("   POST /api/notification/:id/read - Marcar como leída");
    info!("🧑‍✈️ Driver:");
    info!("   GET  /api/driver/orders - Pedidos asignados");
    info!("   GET  /api/driver/stats - Estadísticas del conductor");
    info!("📤 Upload:");
    info!("   POST /api/upload - Subir archivo al blob store");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            anyhow::anyhow!(e)
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
