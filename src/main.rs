//! USD/JPY 看板服务
//!
//! 读取收盘价 CSV，在单个页面中展示最近数据表格与完整走势图

mod config;     // 配置加载
mod error;      // 错误类型
mod handlers;   // HTTP 请求处理器
mod models;     // 数据模型定义
mod services;   // 数据处理管线

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use crate::config::AppConfig;
use crate::handlers::AppState;
use crate::services::chart::{ChartSettings, PlottersChartRenderer};
use crate::services::page::{PageComposer, PageSettings};
use crate::services::store::{SeriesStore, SourceSettings};

/// 应用程序入口
///
/// 加载配置与数据后启动 HTTP 服务器，默认监听 0.0.0.0:5000
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统，默认日志级别为 info
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::load();

    // 数据只在启动时加载一次（除非开启 reload_on_request）
    let store = SeriesStore::load(SourceSettings::from(&config.data));
    let composer = PageComposer::new(
        Box::new(PlottersChartRenderer::new(ChartSettings::from(&config.chart))),
        PageSettings::from(&config),
    );
    let state = web::Data::new(AppState {
        store,
        composer,
        reload_on_request: config.data.reload_on_request,
    });

    let bind_addr = config.bind_addr();
    log::info!("启动 USD/JPY 看板服务: http://{}", bind_addr);

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())  // 添加请求日志中间件
            .app_data(state.clone())
            .configure(handlers::config)  // 配置路由
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(&bind_addr)?.run().await?;
    Ok(())
}
