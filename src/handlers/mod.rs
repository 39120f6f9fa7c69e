pub mod dashboard;

use actix_web::web;

use crate::services::page::PageComposer;
use crate::services::store::SeriesStore;

/// 请求间共享的应用状态
pub struct AppState {
    pub store: SeriesStore,
    pub composer: PageComposer,
    /// 每次请求前重新加载数据
    pub reload_on_request: bool,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.configure(dashboard::config);
}
