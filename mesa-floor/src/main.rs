use mesa_floor::core::setup_environment;
use mesa_floor::tables::LayoutStore;
use mesa_floor::{FloorError, FloorSession, ReconciliationFacade};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 设置环境 (dotenv, 配置, 日志)
    let config = setup_environment();

    let Some(restaurant_id) = config.restaurant_id.clone() else {
        tracing::error!("MESA_RESTAURANT_ID is not set");
        return Err("MESA_RESTAURANT_ID is required".into());
    };

    tracing::info!(api_url = %config.api_url, restaurant_id = %restaurant_id, "floor-watch starting");

    // 2. 后端客户端与会话
    let backend = config.client_config().build_http_client()?;
    let session = FloorSession::with_layout_store(LayoutStore::new(Path::new(&config.work_dir)))?;
    let mut facade = ReconciliationFacade::new(backend, restaurant_id, session);

    // 3. 定时刷新
    let mut ticker = tokio::time::interval(config.tick());
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("floor-watch stopping");
                return Ok(());
            }
        }

        match facade.refresh().await {
            Ok(()) => {}
            Err(e) if e.requires_billing_redirect() => {
                tracing::error!("Subscription required, redirect to billing to continue");
                return Err(e.into());
            }
            Err(FloorError::Authentication) => {
                tracing::error!("Session token rejected, set MESA_TOKEN and restart");
                return Err(FloorError::Authentication.into());
            }
            Err(e) => {
                tracing::warn!(error = %e, "refresh failed, retrying next tick");
                continue;
            }
        }

        for view in facade.table_views() {
            tracing::info!(
                table = view.table_number,
                status = ?view.status,
                orders = view.order_ids.len(),
                amount_due = view.amount_due,
                "table"
            );
        }
        for row in facade.void_countdowns().iter().filter(|r| r.recoverable) {
            tracing::info!(
                void_item_id = %row.void_order_item_id,
                name = %row.name,
                remaining = %row.label(),
                "void item recoverable"
            );
        }
    }
}
