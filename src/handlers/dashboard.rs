use actix_web::{web, HttpResponse, Result};

use super::AppState;

/// 首页：最新数据表格与走势图
pub async fn index(state: web::Data<AppState>) -> Result<HttpResponse> {
    // 读取文件与绘图都是同步计算，放到阻塞线程池执行
    let result = tokio::task::spawn_blocking(move || {
        if state.reload_on_request {
            state.store.reload();
        }
        let series = state.store.get();
        state.composer.compose(&series)
    })
    .await;

    match result {
        Ok(Ok(page)) => Ok(HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(page.into_html())),
        Ok(Err(e)) => {
            log::error!("页面渲染失败: {}", e);
            Ok(internal_error())
        }
        Err(e) => {
            log::error!("渲染任务异常终止: {}", e);
            Ok(internal_error())
        }
    }
}

fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError()
        .content_type("text/plain; charset=utf-8")
        .body("Internal Server Error")
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index));
}
